//! Catalog query engine: remote aggregation first, in-memory fallback
//! second.
//!
//! The engine keeps no mode flag. Every query tries the remote service (if
//! one is configured) and falls back to the local dataset on any transport
//! failure, so a recovered remote is used again on the next query.

use std::sync::Arc;

use bazaar_core::{CatalogEntity, FacetSummary};
use serde::Serialize;

use crate::dataset::CatalogDataset;
use crate::error::CatalogError;
use crate::facets::build_facets;
use crate::filter::filter_entities;
use crate::params::QueryParams;
use crate::remote::CatalogClient;

/// Which backend answered a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    Remote,
    Fallback,
}

/// One page of matching entities plus facets over the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub items: Vec<CatalogEntity>,
    pub facets: FacetSummary,
    /// Number of entities matching the filters, across all pages.
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub source: QuerySource,
}

pub struct CatalogQueryEngine {
    remote: Option<CatalogClient>,
    dataset: Arc<CatalogDataset>,
}

impl CatalogQueryEngine {
    #[must_use]
    pub fn new(remote: Option<CatalogClient>, dataset: Arc<CatalogDataset>) -> Self {
        Self { remote, dataset }
    }

    /// Answers a catalog query.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidParams`] if `params` fail validation.
    /// Remote failures are answered from the fallback dataset, never
    /// returned.
    pub async fn query(&self, params: &QueryParams) -> Result<QueryResult, CatalogError> {
        params.validate()?;

        if let Some(remote) = &self.remote {
            match remote.query(params).await {
                Ok(result) => {
                    tracing::debug!(
                        kind = %params.kind,
                        total = result.total,
                        "catalog query answered remotely"
                    );
                    return Ok(result);
                }
                Err(err) if err.is_transport() => {
                    tracing::warn!(
                        kind = %params.kind,
                        error = %err,
                        "remote catalog query failed; answering from fallback dataset"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(evaluate(self.dataset.entities(params.kind), params))
    }
}

/// Filters, aggregates facets, then paginates `entities`. Facets and
/// `total` cover the whole filtered set, not only the returned page.
///
/// `params` are assumed to be valid.
#[must_use]
pub fn evaluate(entities: &[CatalogEntity], params: &QueryParams) -> QueryResult {
    let filtered = filter_entities(entities, params);
    let facets = build_facets(filtered.iter().copied());
    let total = filtered.len();

    let page_size = usize::try_from(params.page_size).unwrap_or(usize::MAX);
    let offset = usize::try_from(params.page.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .saturating_mul(page_size);
    let items = filtered
        .into_iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();

    QueryResult {
        items,
        facets,
        total,
        page: params.page,
        page_size: params.page_size,
        source: QuerySource::Fallback,
    }
}
