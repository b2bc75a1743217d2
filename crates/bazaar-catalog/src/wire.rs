//! JSON shape of `GET /marketplace/{kind}` responses:
//! `{ items, meta: { total, page, pageSize, facets } }`.
//!
//! Deserialization is lenient. Missing or `null` facet groups become empty
//! and missing pagination fields fall back to the request's values.

use bazaar_core::{AttributeFacet, CatalogEntity, FacetBucket, FacetSummary, PriceRange};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CatalogEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: CatalogMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facets: WireFacets,
}

/// Facet summary as it travels on the wire; every group is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFacets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<FacetBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<FacetBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub styles: Vec<FacetBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sellers: Vec<FacetBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Vec<AttributeFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl From<WireFacets> for FacetSummary {
    fn from(wire: WireFacets) -> Self {
        let defaults = FacetSummary::default();
        FacetSummary {
            categories: wire.categories,
            tags: wire.tags,
            styles: wire.styles,
            sellers: wire.sellers,
            attributes: wire.attributes,
            price_range: wire.price_range.unwrap_or(defaults.price_range),
            currency: wire
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.currency),
        }
    }
}

impl From<FacetSummary> for WireFacets {
    fn from(summary: FacetSummary) -> Self {
        WireFacets {
            categories: summary.categories,
            tags: summary.tags,
            styles: summary.styles,
            sellers: summary.sellers,
            attributes: summary.attributes,
            price_range: Some(summary.price_range),
            currency: Some(summary.currency),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
