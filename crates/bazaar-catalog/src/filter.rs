//! Filter predicates over catalog entities.
//!
//! An entity matches a query when it passes every active predicate. Text
//! comparisons are case-insensitive; blank filter values are inactive.

use bazaar_core::CatalogEntity;

use crate::params::QueryParams;

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "All";

/// Returns the entities matching `params`, in their original order.
#[must_use]
pub fn filter_entities<'a>(
    entities: &'a [CatalogEntity],
    params: &QueryParams,
) -> Vec<&'a CatalogEntity> {
    entities.iter().filter(|e| matches(e, params)).collect()
}

/// Returns `true` if `entity` passes every predicate in `params`.
#[must_use]
pub fn matches(entity: &CatalogEntity, params: &QueryParams) -> bool {
    matches_category(entity, params.category.as_deref())
        && matches_tag(entity, params.tag.as_deref())
        && matches_style(entity, params.style.as_deref())
        && matches_search(entity, params.search.as_deref())
        && matches_seller(entity, params.seller.as_deref())
        && matches_all_tags(entity, &params.tags)
        && matches_price(entity, params)
        && matches_attributes(entity, params)
}

fn active(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

fn contains_ignore_case(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|h| h.eq_ignore_ascii_case(needle))
}

fn matches_category(entity: &CatalogEntity, category: Option<&str>) -> bool {
    match active(category) {
        None => true,
        Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
        Some(c) => contains_ignore_case(&entity.categories, c),
    }
}

fn matches_tag(entity: &CatalogEntity, tag: Option<&str>) -> bool {
    active(tag).is_none_or(|t| contains_ignore_case(&entity.tags, t))
}

fn matches_style(entity: &CatalogEntity, style: Option<&str>) -> bool {
    active(style).is_none_or(|s| {
        entity
            .style
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(s))
    })
}

fn matches_search(entity: &CatalogEntity, search: Option<&str>) -> bool {
    let Some(term) = active(search) else {
        return true;
    };
    let term = term.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&term);

    hit(&entity.title)
        || entity.description.as_deref().is_some_and(hit)
        || entity.vendor.as_ref().is_some_and(|v| hit(&v.name))
        || entity.search_keywords.iter().any(|k| hit(k))
}

fn matches_seller(entity: &CatalogEntity, seller: Option<&str>) -> bool {
    active(seller).is_none_or(|s| {
        entity
            .offers
            .iter()
            .any(|o| o.seller_id.eq_ignore_ascii_case(s) || o.seller_name.eq_ignore_ascii_case(s))
    })
}

fn matches_all_tags(entity: &CatalogEntity, tags: &[String]) -> bool {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .all(|t| contains_ignore_case(&entity.tags, t))
}

/// Overlap of the entity's price bounds with the requested window. An
/// entity without any price point never matches an active price filter.
fn matches_price(entity: &CatalogEntity, params: &QueryParams) -> bool {
    let Some(window) = params.price_window() else {
        return true;
    };
    entity
        .price_bounds()
        .is_some_and(|bounds| bounds.overlaps(&window))
}

fn matches_attributes(entity: &CatalogEntity, params: &QueryParams) -> bool {
    params.attributes.iter().all(|(code, values)| {
        entity.dimension(code.trim()).is_some_and(|dimension| {
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .all(|v| dimension.has_value(v))
        })
    })
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
