//! Error types for the Lognex API client.
//!
//! # Design
//! A single enum covers every failure the core can report so callers can
//! branch on the kind: `Network` means the server could not be reached,
//! `Api` means the server answered with a non-success status and an error
//! envelope. Client-side validation (`InvalidExpandPath`, `ExpandNotAllowed`,
//! `QueryEncoding`) always fails before any byte is sent. Nothing is retried
//! or downgraded to a default value.

use std::fmt;

use thiserror::Error;

use crate::config::QueryCharset;
use crate::http::HttpMethod;
use crate::request::MAX_EXPAND_DEPTH;
use crate::responses::ErrorResponse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the request executor, the decoder and the copier.
#[derive(Debug, Error)]
pub enum Error {
    /// An expand path is deeper than the API supports or has an empty segment.
    #[error("expand path `{path}` has {depth} segments, at most {max} are allowed", max = MAX_EXPAND_DEPTH)]
    InvalidExpandPath { path: String, depth: usize },

    /// The endpoint declares which fields can be expanded and this is not one of them.
    #[error("`{path}` cannot be expanded on {endpoint}")]
    ExpandNotAllowed { path: String, endpoint: String },

    /// A query parameter contains characters the configured charset cannot represent.
    #[error("query parameter `{key}` cannot be encoded as {charset}")]
    QueryEncoding { key: String, charset: QueryCharset },

    /// The HTTP round trip itself failed: unreachable host, timeout, broken response.
    #[error("network error on {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a status other than 200, 201 or 204.
    #[error("{0}")]
    Api(Box<ApiFailure>),

    /// A polymorphic value has no `meta` object to read its type from.
    #[error("cannot decode {family}: `meta` is missing")]
    MissingDiscriminatorContext { family: &'static str },

    /// A polymorphic value has `meta` but no `meta.type`.
    #[error("cannot decode {family}: `meta.type` is missing")]
    MissingDiscriminatorValue { family: &'static str },

    /// `meta.type` names a variant nobody registered for the family.
    #[error("cannot decode {family}: unknown `meta.type` value `{value}`")]
    UnknownVariant { family: &'static str, value: String },

    /// Field values were copied between two different entity shapes.
    #[error("cannot assign fields of {found} to {expected}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A request body could not be converted to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A response body did not match the requested shape.
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// True when the request never got an HTTP answer.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// The HTTP status of an `Api` error.
    pub fn api_status(&self) -> Option<u16> {
        match self {
            Error::Api(failure) => Some(failure.status),
            _ => None,
        }
    }
}

/// Everything known about a request the server rejected.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub reason: String,
    pub response: ErrorResponse,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} failed with {} {}",
            self.method, self.url, self.status, self.reason
        )?;
        for error in &self.response.errors {
            f.write_str(";")?;
            if !error.error.is_empty() {
                write!(f, " {}", error.error)?;
            }
            if let Some(code) = error.code {
                write!(f, " (code {code})")?;
            }
        }
        Ok(())
    }
}
