//! Error types for limiteds-catalog
//!
//! Every failure in the pipeline aborts the whole run. The taxonomy keeps the
//! offending operation attached so a failed run can be diagnosed and re-run:
//! - [`TransportError`] for network and HTTP status failures at any call site
//! - [`Error::UpstreamProtocol`] for well-formed responses with invalid payloads
//! - [`Error::LocalIo`] for filesystem failures while writing outputs
//!
//! Unparseable prices are not errors; they degrade to an unknown price.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for limiteds-catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for limiteds-catalog
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// Network or HTTP failure while talking to an upstream API
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The upstream answered, but the payload is not what the API promises
    #[error("upstream protocol error from {api} API: {message}")]
    UpstreamProtocol {
        /// Which API produced the payload ("market", "thumbnails")
        api: &'static str,
        /// What was wrong with the payload
        message: String,
    },

    /// Filesystem failure while writing an image or a JSON document
    #[error("I/O error at {}: {source}", path.display())]
    LocalIo {
        /// The path being read or written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error while rendering an output document
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Network-level failures, tagged with the operation that triggered them
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or its body could not be read
    #[error("{operation} failed: {source}")]
    Request {
        /// The operation that failed (e.g., "thumbnail batch 2/3")
        operation: String,
        /// The underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code
    #[error("{operation} returned HTTP {status}")]
    Status {
        /// The operation that failed
        operation: String,
        /// The status code returned by the server
        status: reqwest::StatusCode,
    },
}

impl Error {
    /// Build a configuration error for the given key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Build a transport error from a reqwest failure
    pub fn request(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Transport(TransportError::Request {
            operation: operation.into(),
            source,
        })
    }

    /// Build a transport error from a non-success status code
    pub fn status(operation: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Error::Transport(TransportError::Status {
            operation: operation.into(),
            status,
        })
    }

    /// Build a local I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable code for the error category
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config",
            Error::Transport(_) => "transport",
            Error::UpstreamProtocol { .. } => "upstream_protocol",
            Error::LocalIo { .. } => "local_io",
            Error::Serialization(_) => "serialization",
        }
    }
}
