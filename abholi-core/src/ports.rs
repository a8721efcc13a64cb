//! Traits describing the geocoding and persistence collaborators, and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Error as ReqwestError;

use crate::model::{
    Coordinates, NewPickupRequest, NewUser, PickupRequest, RequestId, User, UserId,
};

#[derive(thiserror::Error, Debug)]
/// Errors raised by port implementations.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The geocoder returned no match for the location text.
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    /// Coordinates are outside the valid range.
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates {
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },
    /// A stored or entered role is not one of the known roles.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    /// A stored request status is not one of the known states.
    #[error("Unknown request status: {0}")]
    UnknownStatus(String),
    /// The record store failed.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Internal adapter error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Forward geocoding of human-readable place names.
pub trait Geocoder: Send + Sync {
    /// Resolve a place name such as "Kumasi, Ghana" to coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::LocationNotFound`] when nothing matches, or another
    /// [`PortError`] when the lookup itself fails.
    async fn resolve(&self, location_text: &str) -> Result<Coordinates, PortError>;
}

#[async_trait]
/// Durable storage for users and pickup requests.
///
/// Identifiers are assigned on insert and increase in insertion order.
pub trait RecordStore: Send + Sync {
    /// Persist a new user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the write fails.
    async fn insert_user(&self, user: NewUser) -> Result<User, PortError>;

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn user(&self, id: UserId) -> Result<Option<User>, PortError>;

    /// All users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn users(&self) -> Result<Vec<User>, PortError>;

    /// Users with the collector role that are currently online, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn online_collectors(&self) -> Result<Vec<User>, PortError>;

    /// Overwrite a user's online flag. Returns `false` when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the write fails.
    async fn set_online(&self, id: UserId, online: bool) -> Result<bool, PortError>;

    /// Persist a new pending request and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the write fails.
    async fn insert_request(&self, request: NewPickupRequest) -> Result<PickupRequest, PortError>;

    /// Look up a request by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn request(&self, id: RequestId) -> Result<Option<PickupRequest>, PortError>;

    /// All requests ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn requests(&self) -> Result<Vec<PickupRequest>, PortError>;

    /// Pending requests assigned to a collector, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the read fails.
    async fn pending_requests_for(&self, collector: UserId)
    -> Result<Vec<PickupRequest>, PortError>;

    /// Move a pending request to completed. Returns `false` when no pending
    /// request with that id exists.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the write fails.
    async fn mark_completed(&self, id: RequestId, at: DateTime<Utc>) -> Result<bool, PortError>;
}
