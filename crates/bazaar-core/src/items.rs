//! Line items held by cart and wishlist collections.
//!
//! [`LineItem`] is the canonical shape every collection stores. The other
//! types here describe the upstream shapes that get collapsed into it by
//! [`crate::normalize`]:
//!
//! - [`RemoteLineItem`]: whatever the remote commerce API sends back. Ids
//!   arrive as `productId`, `id`, or `_id` (string or number), titles as
//!   `title` or `name`, images as `image`, `img`, or `imageUrl`, and prices
//!   and quantities as numbers or numeric strings.
//! - [`ItemDraft`]: an item a caller wants to add, with everything except
//!   the id optional.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel label used when an upstream item does not name one.
pub const DEFAULT_SOURCE: &str = "marketplace";

/// Title used when an upstream item has neither `title` nor `name`.
pub const UNTITLED: &str = "Untitled";

/// A cart or wishlist entry in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Canonical product id. Unique within a collection.
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub image_url: String,
    /// Always at least 1. Wishlist entries carry 1.
    pub quantity: u32,
    /// Seller or channel label, e.g. `"marketplace"`.
    pub source: String,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

impl LineItem {
    /// Unit price plus add-on prices, multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let addons: Decimal = self.addons.iter().map(|a| a.price).sum();
        (self.price + addons) * Decimal::from(self.quantity)
    }
}

/// An optional extra attached to a line item (gift wrap, installation, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
}

/// Raw line item as returned by the remote collection endpoints.
///
/// Every field is an untyped JSON value so that deserialization succeeds on
/// any object; interpretation happens in [`crate::normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteLineItem {
    #[serde(rename = "productId")]
    pub product_id: Option<Value>,
    pub id: Option<Value>,
    #[serde(rename = "_id")]
    pub object_id: Option<Value>,
    pub title: Option<Value>,
    pub name: Option<Value>,
    pub price: Option<Value>,
    pub quantity: Option<Value>,
    pub image: Option<Value>,
    pub img: Option<Value>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<Value>,
    pub source: Option<Value>,
    pub addons: Option<Value>,
}

/// An item supplied by a caller who wants to add it to a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    /// Requested quantity; values below 1 normalize to 1.
    pub quantity: Option<i64>,
    pub source: Option<String>,
    pub addons: Vec<Addon>,
}

impl ItemDraft {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_addon(mut self, addon: Addon) -> Self {
        self.addons.push(addon);
        self
    }
}
