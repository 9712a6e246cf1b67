//! Error types for the pool manager client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors produced by a population callback.
///
/// Populate steps run arbitrary caller code (migrations, fixtures), so the
/// client carries whatever error they return without interpreting it.
pub type PopulateError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// Reason the value was rejected.
        message: String,
    },

    /// The configured base URL could not be parsed or extended.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The offending URL.
        url: String,
        /// Reason the URL was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    HttpClient {
        /// Reason for failure.
        reason: String,
    },
}

/// Errors returned by client operations against the pool manager.
///
/// Every variant maps to one outcome of the wire protocol; nothing is
/// retried or absorbed internally, except that the `setup_template`
/// convenience wrappers convert [`ClientError::TemplateAlreadyInitialized`]
/// into success.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The manager is temporarily refusing work (503). Callers may retry
    /// later; no state change should be assumed.
    #[error("pool manager is not ready")]
    ManagerNotReady,

    /// The template already exists or is being initialized by another
    /// caller (423). A valid convergence outcome for setup wrappers, not
    /// a failure.
    #[error("template is already initialized")]
    TemplateAlreadyInitialized,

    /// No template is known under the given hash (404).
    #[error("template not found")]
    TemplateNotFound,

    /// The template existed but was torn down, typically because its
    /// population failed (410).
    #[error("database was discarded (typically failed during initialize/finalize)")]
    DatabaseDiscarded,

    /// Reserved: the manager currently reports a missing test instance
    /// with the same not-found status as a missing template, so this
    /// variant is never produced by status classification.
    #[error("test database not found")]
    TestNotFound,

    /// The response status does not match the documented vocabulary for
    /// the operation.
    #[error("received unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// The raw status code, for diagnostics.
        status: reqwest::StatusCode,
    },

    /// The tracking reset was rejected; carries the response body as
    /// diagnostic text.
    #[error("failed to reset all tracking: {message}")]
    ResetFailed {
        /// Response body text.
        message: String,
    },

    /// The exchange itself failed (connectivity, timeout, cancellation).
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A request payload could not be serialized or a response payload
    /// could not be decoded.
    #[error("codec failure: {reason}")]
    Codec {
        /// Reason for failure.
        reason: String,
    },

    /// The caller-supplied populate step failed. The template is left
    /// unfinalized; discard it or rely on manager-side cleanup.
    #[error("template population failed: {0}")]
    Populate(#[source] PopulateError),

    /// A live database handle could not be opened, probed, or closed in
    /// the DB-client setup variant.
    #[error("database connection error: {reason}")]
    Database {
        /// Reason for failure.
        reason: String,
    },
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec {
            reason: err.to_string(),
        }
    }
}

/// Failures of a single transport exchange.
///
/// A completed exchange with an error status code is not a transport
/// failure; these cover only the cases where no usable response exists.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller's cancellation token fired before a response arrived.
    #[error("request cancelled by caller")]
    Cancelled,

    /// The exchange exceeded the configured request timeout.
    #[error("request timed out")]
    Timeout,

    /// Connectivity or protocol failure before a status code was received.
    #[error("request failed: {reason}")]
    Request {
        /// Reason for failure.
        reason: String,
    },
}
