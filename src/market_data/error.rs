//! Fetch error types.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response is not a JSON array")]
    NotAnArray,

    #[error("tick {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("tick {index} has non-numeric {field}: {}", display_raw(.raw))]
    InvalidPrice {
        index: usize,
        field: &'static str,
        raw: Option<Value>,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;

pub(crate) fn display_raw(raw: &Option<Value>) -> String {
    match raw {
        Some(value) => value.to_string(),
        None => "<missing>".to_string(),
    }
}
