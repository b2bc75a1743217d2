//! Catalog entities (studios, materials, generic products) and the facet
//! summary computed over them.
//!
//! Field names follow the camelCase wire format of the remote marketplace
//! API; the same shape is used by the fallback dataset files.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::ItemDraft;

/// Currency reported by a facet summary when no entity names one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Which marketplace listing an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Studios,
    Materials,
}

impl CatalogKind {
    /// Path segment used by `GET /marketplace/{kind}`.
    #[must_use]
    pub fn as_path(self) -> &'static str {
        match self {
            CatalogKind::Studios => "studios",
            CatalogKind::Materials => "materials",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "studios" | "studio" => Ok(CatalogKind::Studios),
            "materials" | "material" => Ok(CatalogKind::Materials),
            other => Err(format!("unknown catalog kind \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<Vendor>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub variation_dimensions: Vec<Dimension>,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub delivery: Option<Delivery>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub base_price: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub tier_pricing: Vec<PriceTier>,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            base_price: None,
            currency: default_currency(),
            unit: None,
            tier_pricing: Vec::new(),
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Volume discount: `price` applies from `min_quantity` units upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub min_quantity: u32,
    pub price: Decimal,
}

/// A variation axis such as colour or finish, with its allowed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub values: Vec<DimensionValue>,
}

impl Dimension {
    /// Returns `true` if `value` is one of this dimension's options
    /// (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.value.eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValue {
    pub value: String,
    #[serde(default)]
    pub count: Option<u32>,
}

/// One purchasable combination of dimension values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub key: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// A seller's offer on an entity, priced per variation key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub seller_id: String,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub pricing_by_variation: BTreeMap<String, OfferPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferPrice {
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl CatalogEntity {
    /// Every price point the entity declares: variation prices, offer
    /// prices, and the base price.
    pub fn price_points(&self) -> impl Iterator<Item = Decimal> + '_ {
        let variations = self.variations.iter().filter_map(|v| v.price);
        let offers = self
            .offers
            .iter()
            .flat_map(|o| o.pricing_by_variation.values().map(|p| p.price));
        variations.chain(offers).chain(self.pricing.base_price)
    }

    /// Lowest and highest price point, or `None` if the entity has none.
    #[must_use]
    pub fn price_bounds(&self) -> Option<PriceRange> {
        self.price_points().fold(None, |acc, p| match acc {
            None => Some(PriceRange { min: p, max: p }),
            Some(r) => Some(PriceRange {
                min: r.min.min(p),
                max: r.max.max(p),
            }),
        })
    }

    /// Finds a variation dimension by code (case-insensitive).
    #[must_use]
    pub fn dimension(&self, code: &str) -> Option<&Dimension> {
        self.variation_dimensions
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(code))
    }
}

impl From<&CatalogEntity> for ItemDraft {
    /// Drafts a line item for the entity at its lowest price point, sold by
    /// its first offering seller.
    fn from(entity: &CatalogEntity) -> Self {
        let mut draft = ItemDraft::new(entity.id.clone()).with_title(entity.title.clone());
        if let Some(bounds) = entity.price_bounds() {
            draft = draft.with_price(bounds.min);
        }
        if let Some(image) = &entity.image_url {
            draft = draft.with_image_url(image.clone());
        }
        if let Some(offer) = entity.offers.first() {
            draft = draft.with_source(offer.seller_name.clone());
        }
        draft
    }
}

/// A `{min, max}` price window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Returns `true` if the two windows share at least one point.
    #[must_use]
    pub fn overlaps(&self, other: &PriceRange) -> bool {
        self.max >= other.min && self.min <= other.max
    }

    /// Smallest window covering both.
    #[must_use]
    pub fn union(&self, other: &PriceRange) -> PriceRange {
        PriceRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One facet bucket: a value and how many entities in the filtered set
/// carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    /// Aggregation pipelines commonly emit the group key as `_id`.
    #[serde(alias = "_id", alias = "value")]
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFacet {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub values: Vec<AttributeValueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValueCount {
    pub value: String,
    pub count: usize,
}

/// Guided-navigation counts over a filtered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSummary {
    #[serde(default)]
    pub categories: Vec<FacetBucket>,
    #[serde(default)]
    pub tags: Vec<FacetBucket>,
    #[serde(default)]
    pub styles: Vec<FacetBucket>,
    #[serde(default)]
    pub sellers: Vec<FacetBucket>,
    #[serde(default)]
    pub attributes: Vec<AttributeFacet>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for FacetSummary {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            tags: Vec::new(),
            styles: Vec::new(),
            sellers: Vec::new(),
            attributes: Vec::new(),
            price_range: PriceRange::default(),
            currency: default_currency(),
        }
    }
}

impl FacetSummary {
    /// Count for `name` in a bucket list, or 0 if absent.
    #[must_use]
    pub fn count_in(buckets: &[FacetBucket], name: &str) -> usize {
        buckets
            .iter()
            .find(|b| b.name == name)
            .map_or(0, |b| b.count)
    }
}
