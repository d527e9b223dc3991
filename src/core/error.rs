//! Typed error handling for the collection engine
//!
//! The engine mostly *consumes* errors: a failed fetch belongs to the fetch
//! contract, a missing column makes a filter inert, a malformed response is
//! defaulted. The types here cover what is left over: request-level failures
//! surfaced to the caller, configuration validation, and URL decoding.
//!
//! # Error Categories
//!
//! - [`FetchError`]: the remote fetch contract failed
//! - [`ConfigError`]: a configuration is internally inconsistent
//! - [`UrlError`]: a query string could not be interpreted
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.refresh().await {
//!     Ok(outcome) => render(controller.snapshot()),
//!     Err(CollectionError::Fetch(e)) => show_banner(&e.to_string()),
//!     Err(e) => tracing::error!(code = e.error_code(), "{}", e),
//! }
//! ```

use std::fmt;

/// The main error type for the collection engine
#[derive(Debug)]
pub enum CollectionError {
    /// The fetch contract failed (network/server failure)
    Fetch(FetchError),

    /// Configuration errors
    Config(ConfigError),

    /// URL query-string errors
    Url(UrlError),

    /// Internal engine errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Fetch(e) => write!(f, "{}", e),
            CollectionError::Config(e) => write!(f, "{}", e),
            CollectionError::Url(e) => write!(f, "{}", e),
            CollectionError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Fetch(e) => Some(e),
            CollectionError::Config(e) => Some(e),
            CollectionError::Url(e) => Some(e),
            CollectionError::Internal(_) => None,
        }
    }
}

impl CollectionError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CollectionError::Fetch(_) => "FETCH_FAILED",
            CollectionError::Config(e) => e.error_code(),
            CollectionError::Url(_) => "INVALID_URL_STATE",
            CollectionError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error came from the remote data source
    ///
    /// Callers use this to decide between a retry banner and a bug report.
    pub fn is_request_level(&self) -> bool {
        matches!(self, CollectionError::Fetch(_))
    }
}

impl From<FetchError> for CollectionError {
    fn from(err: FetchError) -> Self {
        CollectionError::Fetch(err)
    }
}

impl From<ConfigError> for CollectionError {
    fn from(err: ConfigError) -> Self {
        CollectionError::Config(err)
    }
}

impl From<UrlError> for CollectionError {
    fn from(err: UrlError) -> Self {
        CollectionError::Url(err)
    }
}

pub type CollectionResult<T> = std::result::Result<T, CollectionError>;

// =============================================================================
// Fetch Errors
// =============================================================================

/// A failed call to the remote fetch contract
///
/// Wraps whatever the fetcher returned together with the identity of the
/// request that failed, so the caller can tell which view it belonged to.
#[derive(Debug)]
pub struct FetchError {
    /// Fingerprint of the request that failed
    pub identity: String,
    source: anyhow::Error,
}

impl FetchError {
    pub fn new(identity: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            identity: identity.into(),
            source,
        }
    }

    /// The underlying error reported by the fetcher
    pub fn inner(&self) -> &anyhow::Error {
        &self.source
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to fetch collection: {}", self.source)
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors found while validating or loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Two state slices would write the same query parameter
    #[error("Query parameter '{name}' is used by both {first} and {second}")]
    DuplicateParam {
        name: String,
        first: String,
        second: String,
    },

    /// A static extra field collides with a request field
    #[error("Static parameter '{name}' collides with a reserved request field")]
    ReservedParam { name: String },

    /// A page size of zero was configured
    #[error("Page size must be positive")]
    ZeroPageSize,

    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::DuplicateParam { .. } => "DUPLICATE_QUERY_PARAM",
            ConfigError::ReservedParam { .. } => "RESERVED_QUERY_PARAM",
            ConfigError::ZeroPageSize => "ZERO_PAGE_SIZE",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }
}

// =============================================================================
// URL Errors
// =============================================================================

/// Errors raised while reading or writing the navigable URL
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    /// The navigator refused or failed to update the location
    #[error("Failed to update location: {0}")]
    Navigation(String),
}
