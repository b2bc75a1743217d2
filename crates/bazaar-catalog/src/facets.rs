//! Facet aggregation over a filtered entity set.
//!
//! [`build_facets`] is the reference aggregation: the remote service must
//! produce the same summary for the same filtered set.

use std::collections::{BTreeMap, BTreeSet};

use bazaar_core::{
    AttributeFacet, AttributeValueCount, CatalogEntity, FacetBucket, FacetSummary, PriceRange,
    DEFAULT_CURRENCY,
};

/// Computes guided-navigation counts over `entities`.
///
/// Each count is the number of entities carrying the value; an entity
/// listing a value twice still counts once. Buckets are ordered by count
/// descending, then name ascending. Attribute groups are ordered by code.
#[must_use]
pub fn build_facets<'a, I>(entities: I) -> FacetSummary
where
    I: IntoIterator<Item = &'a CatalogEntity>,
{
    let mut categories = Counter::default();
    let mut tags = Counter::default();
    let mut styles = Counter::default();
    let mut sellers = Counter::default();
    let mut attributes: BTreeMap<String, AttributeGroup> = BTreeMap::new();
    let mut price_range: Option<PriceRange> = None;
    let mut currency: Option<String> = None;

    for entity in entities {
        categories.add_distinct(entity.categories.iter().map(String::as_str));
        tags.add_distinct(entity.tags.iter().map(String::as_str));
        styles.add_distinct(entity.style.as_deref());
        sellers.add_distinct(entity.offers.iter().map(|o| {
            if o.seller_name.trim().is_empty() {
                o.seller_id.as_str()
            } else {
                o.seller_name.as_str()
            }
        }));

        let mut seen_codes = BTreeSet::new();
        for dimension in &entity.variation_dimensions {
            let code = dimension.code.trim();
            if code.is_empty() || !seen_codes.insert(code) {
                continue;
            }
            let group = attributes
                .entry(code.to_owned())
                .or_insert_with(|| AttributeGroup {
                    label: dimension.label.clone(),
                    values: Counter::default(),
                });
            group
                .values
                .add_distinct(dimension.values.iter().map(|v| v.value.as_str()));
        }

        if let Some(bounds) = entity.price_bounds() {
            price_range = Some(price_range.map_or(bounds, |r| r.union(&bounds)));
        }
        if currency.is_none() {
            currency = Some(entity.pricing.currency.trim().to_owned()).filter(|c| !c.is_empty());
        }
    }

    FacetSummary {
        categories: categories.into_buckets(),
        tags: tags.into_buckets(),
        styles: styles.into_buckets(),
        sellers: sellers.into_buckets(),
        attributes: attributes
            .into_iter()
            .map(|(code, group)| AttributeFacet {
                code,
                label: group.label,
                values: group
                    .values
                    .into_buckets()
                    .into_iter()
                    .map(|b| AttributeValueCount {
                        value: b.name,
                        count: b.count,
                    })
                    .collect(),
            })
            .collect(),
        price_range: price_range.unwrap_or_default(),
        currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
    }
}

struct AttributeGroup {
    label: String,
    values: Counter,
}

#[derive(Default)]
struct Counter(BTreeMap<String, usize>);

impl Counter {
    /// Counts each distinct non-blank value once.
    fn add_distinct<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) {
        let distinct: BTreeSet<&str> = values
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        for value in distinct {
            *self.0.entry(value.to_owned()).or_default() += 1;
        }
    }

    fn into_buckets(self) -> Vec<FacetBucket> {
        let mut buckets: Vec<FacetBucket> = self
            .0
            .into_iter()
            .map(|(name, count)| FacetBucket { name, count })
            .collect();
        // BTreeMap iteration is name-ordered, so a stable sort keeps ties
        // alphabetical.
        buckets.sort_by(|a, b| b.count.cmp(&a.count));
        buckets
    }
}

#[cfg(test)]
mod tests {
    use bazaar_core::CatalogKind;
    use rust_decimal::Decimal;

    use super::*;
    use crate::filter::filter_entities;
    use crate::params::QueryParams;
    use crate::test_support::{cement_and_steel, entity};

    #[test]
    fn empty_set_has_zero_range_and_default_currency() {
        let facets = build_facets(&Vec::<CatalogEntity>::new());
        assert!(facets.categories.is_empty());
        assert_eq!(facets.price_range, PriceRange::default());
        assert_eq!(facets.currency, "USD");
    }

    #[test]
    fn cement_scenario() {
        let data = cement_and_steel();
        let params = QueryParams::new(CatalogKind::Materials).with_tags(["cement"]);
        let facets = build_facets(filter_entities(&data, &params));

        assert_eq!(
            facets.tags,
            vec![FacetBucket {
                name: "cement".into(),
                count: 1
            }]
        );
        assert_eq!(
            facets.price_range,
            PriceRange {
                min: Decimal::from(50),
                max: Decimal::from(50)
            }
        );
    }

    #[test]
    fn duplicate_values_count_once_per_entity() {
        let data = vec![
            entity("1").tags(&["eco", "eco"]).build(),
            entity("2").tags(&["eco"]).build(),
        ];
        let facets = build_facets(&data);
        assert_eq!(FacetSummary::count_in(&facets.tags, "eco"), 2);
    }

    #[test]
    fn buckets_sort_by_count_then_name() {
        let data = vec![
            entity("1").categories(&["Tiles", "Lighting"]).build(),
            entity("2").categories(&["Tiles", "Flooring"]).build(),
        ];
        let names: Vec<String> = build_facets(&data)
            .categories
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["Tiles", "Flooring", "Lighting"]);
    }

    #[test]
    fn sellers_and_styles_are_counted() {
        let data = vec![
            entity("1")
                .style("Modern")
                .offer("s1", "Stone Co", 10)
                .offer("s1", "Stone Co", 12)
                .build(),
            entity("2").style("Modern").offer("s2", "", 10).build(),
        ];
        let facets = build_facets(&data);
        assert_eq!(FacetSummary::count_in(&facets.styles, "Modern"), 2);
        assert_eq!(FacetSummary::count_in(&facets.sellers, "Stone Co"), 1);
        assert_eq!(FacetSummary::count_in(&facets.sellers, "s2"), 1);
    }

    #[test]
    fn attributes_group_by_code() {
        let data = vec![
            entity("1")
                .dimension("finish", "Finish", &["matte", "gloss"])
                .dimension("color", "Color", &["red"])
                .build(),
            entity("2").dimension("finish", "Finish", &["matte"]).build(),
        ];
        let facets = build_facets(&data);
        let codes: Vec<&str> = facets.attributes.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, ["color", "finish"]);

        let finish = &facets.attributes[1];
        assert_eq!(finish.label, "Finish");
        assert_eq!(finish.values[0].value, "matte");
        assert_eq!(finish.values[0].count, 2);
        assert_eq!(finish.values[1].value, "gloss");
        assert_eq!(finish.values[1].count, 1);
    }

    #[test]
    fn price_range_is_union_of_bounds() {
        let facets = build_facets(&cement_and_steel());
        assert_eq!(facets.price_range.min, Decimal::from(50));
        assert_eq!(facets.price_range.max, Decimal::from(120));
    }

    #[test]
    fn currency_comes_from_first_entity() {
        let data = vec![
            entity("1").currency("EUR").build(),
            entity("2").currency("GBP").build(),
        ];
        assert_eq!(build_facets(&data).currency, "EUR");
    }

    #[test]
    fn facets_narrow_with_filters() {
        let data = cement_and_steel();
        let all = build_facets(&data);
        let params = QueryParams::new(CatalogKind::Materials).with_tag("steel");
        let narrowed = build_facets(filter_entities(&data, &params));

        for bucket in &narrowed.tags {
            assert!(bucket.count <= FacetSummary::count_in(&all.tags, &bucket.name));
        }
        assert_eq!(FacetSummary::count_in(&narrowed.categories, "Structural"), 1);
        assert_eq!(FacetSummary::count_in(&all.categories, "Structural"), 2);
    }
}
