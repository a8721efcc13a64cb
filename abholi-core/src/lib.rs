//! Core types and service wiring for the abholi waste pickup matcher.

/// Distances on the WGS-84 ellipsoid.
pub mod geodesy;
/// Nearest online collector selection.
pub mod matching;
/// Domain models and identifiers.
pub mod model;
/// Traits describing the geocoder and record store.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use model::*;
pub use ports::*;
pub use service::*;
