//! Collection kinds: what differs between a cart and a wishlist.

use bazaar_core::LineItem;

/// Static description of a collection: where it lives and how duplicate
/// ids merge.
pub trait CollectionKind: Send + Sync + 'static {
    /// Human-readable name used in logs.
    const NAME: &'static str;
    /// Fixed key under which the collection is persisted locally.
    const STORAGE_KEY: &'static str;
    /// Path prefix of the remote endpoints, e.g. `"cart"` for `/cart/add`.
    const ENDPOINT: &'static str;
    /// Whether line items carry a meaningful quantity.
    const TRACKS_QUANTITY: bool;

    /// Folds `incoming` into `existing`, which has the same id.
    fn merge(existing: &mut LineItem, incoming: &LineItem);

    /// Adjusts a freshly normalized item to this kind's invariants.
    fn prepare(item: LineItem) -> LineItem {
        item
    }
}

/// Quantities add up when the same product is added twice.
#[derive(Debug, Clone, Copy)]
pub struct Cart;

/// Set semantics: adding an existing product changes nothing.
#[derive(Debug, Clone, Copy)]
pub struct Wishlist;

impl CollectionKind for Cart {
    const NAME: &'static str = "cart";
    const STORAGE_KEY: &'static str = "cart";
    const ENDPOINT: &'static str = "cart";
    const TRACKS_QUANTITY: bool = true;

    fn merge(existing: &mut LineItem, incoming: &LineItem) {
        existing.quantity = existing.quantity.saturating_add(incoming.quantity);
    }
}

impl CollectionKind for Wishlist {
    const NAME: &'static str = "wishlist";
    const STORAGE_KEY: &'static str = "wishlist";
    const ENDPOINT: &'static str = "wishlist";
    const TRACKS_QUANTITY: bool = false;

    fn merge(_existing: &mut LineItem, _incoming: &LineItem) {}

    fn prepare(mut item: LineItem) -> LineItem {
        item.quantity = 1;
        item
    }
}

/// Inserts `item`, merging with an existing entry of the same id.
/// New ids are appended, so insertion order is preserved.
pub(crate) fn merge_into<K: CollectionKind>(items: &mut Vec<LineItem>, item: LineItem) {
    let item = K::prepare(item);
    match items.iter_mut().find(|existing| existing.id == item.id) {
        Some(existing) => K::merge(existing, &item),
        None => items.push(item),
    }
}

/// Collapses duplicate ids in `items` using the kind's merge rule.
pub(crate) fn dedupe<K: CollectionKind>(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        merge_into::<K>(&mut out, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: id.to_string(),
            price: Decimal::ONE,
            image_url: String::new(),
            quantity,
            source: "marketplace".to_string(),
            addons: vec![],
        }
    }

    #[test]
    fn cart_merge_sums_quantities() {
        let mut items = vec![item("a", 2)];
        merge_into::<Cart>(&mut items, item("a", 3));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn wishlist_merge_is_idempotent() {
        let mut items = vec![item("a", 1)];
        merge_into::<Wishlist>(&mut items, item("a", 4));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn wishlist_forces_quantity_one() {
        let mut items = Vec::new();
        merge_into::<Wishlist>(&mut items, item("a", 9));
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn dedupe_keeps_first_position() {
        let items = dedupe::<Cart>(vec![item("a", 1), item("b", 1), item("a", 2)]);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(items[0].quantity, 3);
    }
}
