//! HTTP client for the remote cart and wishlist endpoints.
//!
//! Wraps `reqwest` with endpoint construction, the optional demo identity
//! header, bounded retry, and lenient parsing of collection responses.

use std::time::Duration;

use bazaar_core::{normalize_line_item_value, AppConfig, LineItem};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::TransportError;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Header carrying the demo identity. The remote service may use it to
/// partition demo sessions; this layer attaches no meaning to it.
pub const DEMO_USER_HEADER: &str = "x-demo-user";

/// Client for `GET /{collection}` and `POST /{collection}/{action}`.
#[derive(Debug, Clone)]
pub struct RemoteCollectionClient {
    client: Client,
    base_url: Url,
    demo_user: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RemoteCollectionClient {
    /// Creates a client rooted at `base_url` with no retries.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`TransportError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| TransportError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            demo_user: None,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from application config, or `None` when no remote
    /// endpoint is configured.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, TransportError> {
        let Some(base_url) = config.api_base_url.as_deref() else {
            return Ok(None);
        };
        let mut client = Self::new(base_url, config.request_timeout_secs, &config.user_agent)?
            .with_retry(config.max_retries, config.retry_backoff_base_ms);
        if let Some(user) = &config.demo_user {
            client = client.with_demo_user(user.clone());
        }
        Ok(Some(client))
    }

    #[must_use]
    pub fn with_demo_user(mut self, user: impl Into<String>) -> Self {
        self.demo_user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches the collection at `GET /{collection}`.
    ///
    /// Accepts either a bare JSON array or an object with an `items` array.
    /// Records whose id cannot be resolved are dropped.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Http`] on network failure.
    /// - [`TransportError::UnexpectedStatus`] on any non-2xx status.
    /// - [`TransportError::MalformedBody`] if the body is not JSON or has
    ///   neither accepted shape.
    pub async fn fetch_items(&self, collection: &str) -> Result<Vec<LineItem>, TransportError> {
        let url = self.url(collection)?;
        let body = retry_with_backoff(
            RetryPolicy::Read,
            self.max_retries,
            self.backoff_base_ms,
            || self.send(self.client.get(url.clone()), &url),
        )
        .await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| TransportError::MalformedBody {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let records = match &value {
            serde_json::Value::Array(records) => records,
            serde_json::Value::Object(map) => match map.get("items") {
                Some(serde_json::Value::Array(records)) => records,
                _ => {
                    return Err(TransportError::MalformedBody {
                        url: url.to_string(),
                        reason: "object response has no `items` array".to_owned(),
                    })
                }
            },
            _ => {
                return Err(TransportError::MalformedBody {
                    url: url.to_string(),
                    reason: "expected an array or an object with `items`".to_owned(),
                })
            }
        };

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let item = normalize_line_item_value(record);
            if item.id.is_empty() {
                tracing::debug!(collection, "dropping remote record without a product id");
                continue;
            }
            items.push(item);
        }
        Ok(items)
    }

    /// Sends `POST /{collection}/{action}` with a JSON payload. The response
    /// body is ignored. Writes are only re-sent when they cannot have
    /// reached the server.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Http`] on network failure.
    /// - [`TransportError::UnexpectedStatus`] on any non-2xx status.
    pub async fn post<P: Serialize + Sync>(
        &self,
        collection: &str,
        action: &str,
        payload: &P,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("{collection}/{action}"))?;
        retry_with_backoff(
            RetryPolicy::Write,
            self.max_retries,
            self.backoff_base_ms,
            || self.send(self.client.post(url.clone()).json(payload), &url),
        )
        .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }

    /// Sends a request, requires a 2xx status, and returns the body text.
    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<String, TransportError> {
        request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(user) = &self.demo_user {
            request = request.header(DEMO_USER_HEADER, user);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Body of `POST /{collection}/add`. Wishlists omit `quantity`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddPayload<'a> {
    product_id: &'a str,
    source: &'a str,
    name: &'a str,
    image: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

impl<'a> AddPayload<'a> {
    pub(crate) fn new(item: &'a LineItem, with_quantity: bool) -> Self {
        Self {
            product_id: &item.id,
            source: &item.source,
            name: &item.title,
            image: &item.image_url,
            price: item.price,
            quantity: with_quantity.then_some(item.quantity),
        }
    }
}

/// Body of `POST /cart/update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePayload<'a> {
    product_id: &'a str,
    source: &'a str,
    quantity: u32,
}

impl<'a> UpdatePayload<'a> {
    pub(crate) fn new(item: &'a LineItem, quantity: u32) -> Self {
        Self {
            product_id: &item.id,
            source: &item.source,
            quantity,
        }
    }
}

/// Body of `POST /{collection}/remove`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemovePayload<'a> {
    product_id: &'a str,
    source: &'a str,
}

impl<'a> RemovePayload<'a> {
    pub(crate) fn new(item: &'a LineItem) -> Self {
        Self {
            product_id: &item.id,
            source: &item.source,
        }
    }
}
