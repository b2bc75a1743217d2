pub mod app_config;
pub mod catalog;
pub mod config;
pub mod items;
pub mod normalize;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    AttributeFacet, AttributeValueCount, CatalogEntity, CatalogKind, Delivery, Dimension,
    DimensionValue, FacetBucket, FacetSummary, Location, Offer, OfferPrice, PriceRange, PriceTier,
    Pricing, Variation, Vendor, DEFAULT_CURRENCY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{Addon, ItemDraft, LineItem, RemoteLineItem, DEFAULT_SOURCE, UNTITLED};
pub use normalize::{normalize_line_item, normalize_line_item_value, UpstreamItem};

use thiserror::Error;

/// Errors raised while loading [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
