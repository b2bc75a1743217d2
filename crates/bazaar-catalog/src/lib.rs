//! Catalog browsing: filtering, facet aggregation, and a query engine that
//! prefers a remote aggregation service and falls back to an in-memory
//! dataset with identical semantics.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod facets;
pub mod filter;
pub mod params;
pub mod remote;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_support;

pub use dataset::CatalogDataset;
pub use engine::{evaluate, CatalogQueryEngine, QueryResult, QuerySource};
pub use error::CatalogError;
pub use facets::build_facets;
pub use filter::{filter_entities, matches, ALL_CATEGORIES};
pub use params::{QueryParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use remote::CatalogClient;
pub use wire::{CatalogMeta, CatalogResponse, WireFacets};
