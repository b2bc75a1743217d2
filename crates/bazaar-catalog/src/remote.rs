//! HTTP client for the remote marketplace aggregation endpoint.

use std::time::Duration;

use bazaar_core::{AppConfig, FacetSummary};
use reqwest::{Client, Url};

use crate::engine::{QueryResult, QuerySource};
use crate::error::CatalogError;
use crate::params::QueryParams;
use crate::wire::CatalogResponse;

/// Client for `GET /marketplace/{studios|materials}`.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`CatalogError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Builds a client from application config, or `None` when no remote
    /// endpoint is configured.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, CatalogError> {
        config
            .api_base_url
            .as_deref()
            .map(|url| Self::new(url, config.request_timeout_secs, &config.user_agent))
            .transpose()
    }

    /// Runs the query remotely.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] on any non-2xx status.
    /// - [`CatalogError::MalformedBody`] if the body is not the catalog shape.
    pub async fn query(&self, params: &QueryParams) -> Result<QueryResult, CatalogError> {
        let path = format!("marketplace/{}", params.kind.as_path());
        let url = self
            .base_url
            .join(&path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;

        let response = self
            .client
            .get(url.clone())
            .query(&params.to_query_pairs())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: CatalogResponse =
            serde_json::from_str(&body).map_err(|source| CatalogError::MalformedBody {
                url: url.to_string(),
                source,
            })?;

        let meta = parsed.meta;
        Ok(QueryResult {
            total: meta.total.unwrap_or(parsed.items.len()),
            page: meta.page.unwrap_or(params.page),
            page_size: meta.page_size.unwrap_or(params.page_size),
            facets: FacetSummary::from(meta.facets),
            items: parsed.items,
            source: QuerySource::Remote,
        })
    }
}
