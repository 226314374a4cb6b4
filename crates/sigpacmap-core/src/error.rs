//! Error types for sigpacmap

use std::path::PathBuf;
use thiserror::Error;

/// Configuration failures.
///
/// One widget's configuration failure never affects another instance; the
/// embedding host decides whether to skip the instance or surface the error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed widget configuration: {reason}")]
    Malformed { reason: String },

    #[error("Failed to load deployment defaults from {path}: {reason}")]
    DeploymentFile { path: PathBuf, reason: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Failures of the SIGPAC coordinate-lookup call.
///
/// Cancellation is deliberately absent: a cancelled lookup is a normal
/// click outcome, not an error.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP {status}: {body_prefix}")]
    Http { status: u16, body_prefix: String },

    #[error("SIGPAC request failed: {reason}")]
    Network { reason: String },

    #[error("SIGPAC request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// WKT geometry parse failures.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Invalid WKT geometry: {reason}")]
    InvalidWkt { reason: String },
}

/// Failure reported by a host bridge emit. Broadcast never propagates it.
#[derive(Debug, Error)]
#[error("Host bridge emit failed: {reason}")]
pub struct BridgeError {
    pub reason: String,
}

impl BridgeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Errors that can occur while wiring up a widget instance.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize lookup client: {0}")]
    Lookup(#[from] LookupError),
}
