//! Domain data structures for users, locations, and pickup requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a registered user, assigned by the record store.
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a pickup request, assigned by the record store.
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// What a user does in the waste chain.
pub enum Role {
    /// Produces waste and requests pickups.
    Creator,
    /// Picks waste up; matched to requests while online.
    Collector,
    /// Processes collected waste. Not part of matching.
    Recycler,
}

impl Role {
    /// All roles in menu order.
    pub const ALL: [Role; 3] = [Role::Creator, Role::Collector, Role::Recycler];

    /// Stable lowercase name used for persistence.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Collector => "collector",
            Role::Recycler => "recycler",
        }
    }

    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Role::Creator => "Waste Creator",
            Role::Collector => "Waste Collector",
            Role::Recycler => "Recycling Company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.slug())
    }
}

impl FromStr for Role {
    type Err = PortError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();

        Role::ALL
            .into_iter()
            .find(|role| normalized == role.slug() || normalized == role.label().to_lowercase())
            .ok_or_else(|| PortError::UnknownRole(raw.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
/// WGS-84 latitude/longitude pair in decimal degrees.
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and build a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::InvalidCoordinates`] when a value is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PortError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(PortError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Unchecked wire form; deserialization goes through [`Coordinates::new`].
#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = PortError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Location as typed by the user together with its resolved coordinates.
pub struct Location {
    /// Free-text place name, e.g. "Accra, Ghana".
    pub text: String,
    /// Coordinates resolved once at registration.
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Registered participant.
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Where the user is based.
    pub location: Location,
    /// Role chosen at registration.
    pub role: Role,
    /// Whether the user is currently available.
    pub online: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may be matched to a pickup right now.
    #[must_use]
    pub fn is_available_collector(&self) -> bool {
        self.role == Role::Collector && self.online
    }
}

#[derive(Debug, Clone)]
/// Registration data as entered by the user, before geocoding.
pub struct Registration {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-text place name to geocode.
    pub location_text: String,
    /// Chosen role.
    pub role: Role,
}

impl Registration {
    /// Construct a registration from raw input.
    #[must_use]
    pub fn new<N: Into<String>, P: Into<String>, L: Into<String>>(
        name: N,
        phone: P,
        location_text: L,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            location_text: location_text.into(),
            role,
        }
    }
}

#[derive(Debug, Clone)]
/// User row to insert; the store assigns the identifier.
pub struct NewUser {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Location text and resolved coordinates.
    pub location: Location,
    /// Chosen role.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Lifecycle state of a pickup request.
pub enum RequestStatus {
    /// Created and waiting to be picked up.
    Pending,
    /// Picked up. Terminal.
    Completed,
}

impl RequestStatus {
    /// Stable lowercase name used for persistence.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.slug())
    }
}

impl FromStr for RequestStatus {
    type Err = PortError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(PortError::UnknownStatus(raw.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Request from a creator to have waste picked up.
pub struct PickupRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Creator who asked for the pickup.
    pub creator: UserId,
    /// Collector matched at creation, if any was online.
    pub collector: Option<UserId>,
    /// Current state.
    pub status: RequestStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Completion time, set once the request is completed.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
/// Request row to insert; the store assigns the identifier.
pub struct NewPickupRequest {
    /// Requesting creator.
    pub creator: UserId,
    /// Matched collector, if any.
    pub collector: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Outcome of the nearest-collector search.
pub struct CollectorMatch {
    /// Selected collector.
    pub collector: UserId,
    /// Geodesic distance from the requester in kilometres.
    pub distance_km: f64,
}

#[derive(Debug, Clone)]
/// A freshly created request and the collector it was matched to.
pub struct Dispatch {
    /// The persisted request.
    pub request: PickupRequest,
    /// `None` when no collector was online.
    pub assignment: Option<CollectorMatch>,
}

#[derive(Debug, Clone)]
/// Request joined with the names of the people involved, for listings.
pub struct RequestView {
    /// The request itself.
    pub request: PickupRequest,
    /// Name of the creator.
    pub creator_name: String,
    /// Name of the matched collector.
    pub collector_name: Option<String>,
}
