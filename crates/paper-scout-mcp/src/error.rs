//! Error types for the paper-scout MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From`
//! implementations. Three layers: `SourceError` (one provider call),
//! `SearchError` (pipeline orchestration), `ToolError` (MCP facade).

use std::time::Duration;

use crate::models::SourceKind;

/// Errors from a single paper source or the embeddings endpoint.
///
/// At search time any of these counts as "source unavailable": the
/// pipeline records the failure and keeps going with the other sources.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the provider (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response, or an identity the provider
    /// cannot have)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the provider
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body did not have the expected shape (malformed Atom
    /// feed, embedding count mismatch, missing fields)
    #[error("Failed to decode response: {message}")]
    Decode {
        /// What was wrong with the payload
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl SourceError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SourceError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::decode(err.to_string())
    }
}

/// Errors from the search pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// Query rejected before any provider was contacted
    #[error("Invalid query: {field}: {message}")]
    InvalidQuery {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Every selected source failed; no partial result is possible
    #[error("All selected sources failed")]
    AllSourcesFailed,

    /// Identity did not resolve to a paper
    #[error("Paper not found: {identity}")]
    NotFound {
        /// The identity that failed to resolve
        identity: String,
    },

    /// A single-source operation (fetch) failed for a reason other
    /// than the paper being absent
    #[error("Source {source} failed: {message}")]
    Source {
        /// Which source failed
        source: SourceKind,
        /// Underlying failure
        message: String,
    },
}

impl SearchError {
    /// Create an invalid query error.
    #[must_use]
    pub fn invalid_query(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQuery { field: field.into(), message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn paper_not_found(identity: impl Into<String>) -> Self {
        Self::NotFound { identity: identity.into() }
    }

    /// Create a source failure error.
    #[must_use]
    pub fn source(source: SourceKind, message: impl Into<String>) -> Self {
        Self::Source { source, message: message.into() }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the search pipeline
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Input validation failed at the tool boundary
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal tool logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Convert to a user-friendly error message for the MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Search(SearchError::InvalidQuery { field, message })
            | Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            Self::Search(SearchError::NotFound { identity }) => {
                format!("Not found: {identity}. Check the identity is correct (e.g. 'arxiv:2503.01469').")
            }
            Self::Search(SearchError::AllSourcesFailed) => {
                "All paper sources are currently unavailable. Please try again shortly.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for pipeline operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
