//! Parcel lookup: coordinate cache, wire client, and the cache-aware
//! lookup service.

pub mod cache;
pub mod endpoint;
pub mod ports;
pub mod service;

pub use cache::CoordinateCache;
pub use endpoint::HttpParcelEndpoint;
pub use ports::{ParcelEndpoint, ParcelSource};
pub use service::LookupService;
