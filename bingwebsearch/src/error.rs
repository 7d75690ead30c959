use bingwebsearch_http::HttpError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a search call can fail with.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing subscription key, unusable header value, bad endpoint or
    /// configured default. Raised before any request is sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A search parameter the API would reject (e.g. an empty query).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network failure, timeout, or non-2xx status.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// The body is not the JSON document we expect.
    #[error("response does not match the search schema: {0}")]
    SchemaValidation(#[from] serde_json::Error),

    /// Writing the response dump failed. `body` holds the payload that was
    /// received so the search result is still available to the caller.
    #[error("failed to write response dump to {}: {source}", path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        body: Vec<u8>,
    },
}

impl SearchError {
    /// The raw response body carried by a [`SearchError::Dump`].
    pub fn received_body(&self) -> Option<&[u8]> {
        match self {
            SearchError::Dump { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
