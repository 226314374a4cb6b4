//! Sigpacmap Core - domain models, configuration, and port definitions
//!
//! This crate contains the parcel domain model, the layered configuration
//! resolver, the error taxonomy, and the port traits the embedding host
//! implements.

pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod ports;

pub use config::ResolvedConfig;
pub use error::{BridgeError, ConfigError, GeometryError, LookupError, SetupError};
