use thiserror::Error;

/// Failure of a single call to the remote collection API.
///
/// These never reach callers of the collection stores: any of them
/// downgrades the store to local fallback instead.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("malformed response body from {url}: {reason}")]
    MalformedBody { url: String, reason: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Failure of the local durable store.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("I/O error on local key \"{key}\": {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize collection for local key \"{key}\": {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt record under local key \"{key}\": {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("local store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced to callers of a collection store.
///
/// Remote failures are absent on purpose: they are absorbed by the mode
/// downgrade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Local(#[from] LocalStoreError),

    #[error("invalid item: {reason}")]
    InvalidItem { reason: String },
}
