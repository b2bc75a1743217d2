//! Normalization of upstream item shapes into [`LineItem`].
//!
//! This sits on the failure-recovery path of the collection stores, so every
//! function here is total: malformed input produces a best-effort item,
//! never an error or a panic. An item whose id cannot be resolved comes back
//! with an empty `id`; rejecting it is the caller's decision.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::items::{Addon, ItemDraft, LineItem, RemoteLineItem, DEFAULT_SOURCE, UNTITLED};

/// Every shape a line item can arrive in.
#[derive(Debug, Clone)]
pub enum UpstreamItem {
    /// Record from a remote collection endpoint.
    Remote(RemoteLineItem),
    /// Record read back from the local durable store.
    Local(LineItem),
    /// Item supplied by a caller.
    Caller(ItemDraft),
}

impl From<RemoteLineItem> for UpstreamItem {
    fn from(raw: RemoteLineItem) -> Self {
        UpstreamItem::Remote(raw)
    }
}

impl From<LineItem> for UpstreamItem {
    fn from(item: LineItem) -> Self {
        UpstreamItem::Local(item)
    }
}

impl From<ItemDraft> for UpstreamItem {
    fn from(draft: ItemDraft) -> Self {
        UpstreamItem::Caller(draft)
    }
}

/// Collapses any [`UpstreamItem`] into the canonical [`LineItem`].
#[must_use]
pub fn normalize_line_item(item: UpstreamItem) -> LineItem {
    match item {
        UpstreamItem::Remote(raw) => normalize_remote(&raw),
        UpstreamItem::Local(item) => normalize_local(item),
        UpstreamItem::Caller(draft) => normalize_draft(draft),
    }
}

/// Normalizes an arbitrary JSON value as a remote line item.
///
/// Non-object values normalize to an item with an empty id.
#[must_use]
pub fn normalize_line_item_value(value: &Value) -> LineItem {
    let raw = serde_json::from_value::<RemoteLineItem>(value.clone()).unwrap_or_default();
    normalize_remote(&raw)
}

fn normalize_remote(raw: &RemoteLineItem) -> LineItem {
    let id = [&raw.product_id, &raw.id, &raw.object_id]
        .into_iter()
        .find_map(|v| v.as_ref().and_then(id_from_value))
        .unwrap_or_default();

    let title = [&raw.title, &raw.name]
        .into_iter()
        .find_map(|v| v.as_ref().and_then(non_empty_str))
        .unwrap_or_else(|| UNTITLED.to_string());

    let image_url = [&raw.image, &raw.img, &raw.image_url]
        .into_iter()
        .find_map(|v| v.as_ref().and_then(non_empty_str))
        .unwrap_or_default();

    let source = raw
        .source
        .as_ref()
        .and_then(non_empty_str)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let addons = match &raw.addons {
        Some(Value::Array(values)) => values.iter().map(addon_from_value).collect(),
        _ => Vec::new(),
    };

    LineItem {
        id,
        title,
        price: coerce_price(raw.price.as_ref()),
        image_url,
        quantity: coerce_quantity(raw.quantity.as_ref()),
        source,
        addons,
    }
}

fn normalize_local(item: LineItem) -> LineItem {
    let title = if item.title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        item.title
    };
    let source = if item.source.trim().is_empty() {
        DEFAULT_SOURCE.to_string()
    } else {
        item.source
    };

    LineItem {
        id: item.id.trim().to_string(),
        title,
        price: item.price.max(Decimal::ZERO),
        image_url: item.image_url,
        quantity: item.quantity.max(1),
        source,
        addons: item.addons,
    }
}

fn normalize_draft(draft: ItemDraft) -> LineItem {
    LineItem {
        id: draft.id.trim().to_string(),
        title: draft
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        price: draft
            .price
            .filter(|p| !p.is_sign_negative())
            .unwrap_or(Decimal::ZERO),
        image_url: draft.image_url.unwrap_or_default(),
        quantity: draft
            .quantity
            .and_then(|q| u32::try_from(q).ok())
            .filter(|q| *q >= 1)
            .unwrap_or(1),
        source: draft
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        addons: draft.addons,
    }
}

/// Resolves an id from a string or numeric JSON value.
fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Coerces a JSON number or numeric string to a non-negative price.
/// Anything else becomes zero.
fn coerce_price(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(s).ok())
        }
        _ => None,
    };
    parsed
        .filter(|p| !p.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// Coerces a JSON number or numeric string to a quantity of at least 1.
fn coerce_quantity(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(q) if q.is_finite() && q >= 1.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let q = q.min(f64::from(u32::MAX)).trunc() as u32;
            q
        }
        _ => 1,
    }
}

fn addon_from_value(value: &Value) -> Addon {
    let field = |key: &str| value.get(key).and_then(non_empty_str);
    Addon {
        id: value
            .get("id")
            .and_then(id_from_value)
            .unwrap_or_default(),
        name: field("name").or_else(|| field("title")).unwrap_or_default(),
        price: coerce_price(value.get("price")),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
