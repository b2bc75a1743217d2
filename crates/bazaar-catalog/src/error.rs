use thiserror::Error;

/// Errors returned by the catalog query engine and its collaborators.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Query parameters failed validation. Raised before any I/O.
    #[error("invalid query parameters: {0}")]
    InvalidParams(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the catalog shape.
    #[error("malformed catalog response from {url}: {source}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("failed to read catalog dataset at {path}: {source}")]
    DatasetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog dataset at {path}: {reason}")]
    DatasetParse { path: String, reason: String },

    #[error("invalid catalog dataset: {0}")]
    DatasetValidation(String),
}

impl CatalogError {
    /// `true` for failures of the remote call itself, which the engine
    /// answers from the fallback dataset instead.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_)
                | CatalogError::UnexpectedStatus { .. }
                | CatalogError::MalformedBody { .. }
                | CatalogError::InvalidBaseUrl { .. }
        )
    }
}
