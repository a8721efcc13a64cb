//! High-level service facade combining the geocoder, the record store, and matching.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::matching::nearest_collector;
use crate::model::{
    CollectorMatch, Coordinates, Dispatch, Location, NewPickupRequest, NewUser, PickupRequest,
    Registration, RequestId, RequestStatus, RequestView, Role, User, UserId,
};
use crate::ports::{Geocoder, PortError, RecordStore};

#[derive(thiserror::Error, Debug)]
/// Reasons an operation was refused or failed.
pub enum ServiceError {
    /// The location text could not be turned into coordinates.
    #[error("Could not resolve location \"{location}\": {source}")]
    GeocodingFailed {
        /// Location text as entered.
        location: String,
        /// Underlying geocoder failure.
        #[source]
        source: PortError,
    },
    /// A required registration field was blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// No user with this id.
    #[error("User {0} not found")]
    UserNotFound(UserId),
    /// No creator with this id.
    #[error("Creator {0} not found")]
    CreatorNotFound(UserId),
    /// The user exists but may not request pickups.
    #[error("User {0} is not a waste creator; only waste creators can request pickups")]
    NotACreator(UserId),
    /// The user exists but does not collect waste.
    #[error("User {0} is not a waste collector")]
    NotACollector(UserId),
    /// No pickup request with this id.
    #[error("Pickup request {0} not found")]
    RequestNotFound(RequestId),
    /// The request was completed before; nothing changed.
    #[error("Pickup request {0} is already completed")]
    AlreadyCompleted(RequestId),
    /// The collector has no pending pickups assigned.
    #[error("Collector {0} has no pending pickups")]
    NoActiveRequests(UserId),
    /// The record store failed.
    #[error(transparent)]
    Store(#[from] PortError),
}

impl ServiceError {
    /// Whether the error only reports that nothing needed doing.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            ServiceError::AlreadyCompleted(_) | ServiceError::NoActiveRequests(_)
        )
    }
}

/// Public entry point for registering users and tracking pickups.
pub struct AbholiService {
    store: Arc<dyn RecordStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl AbholiService {
    /// Create a new service bound to the provided store and geocoder.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Geocode the location and persist a new, offline user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyField`] for blank input,
    /// [`ServiceError::GeocodingFailed`] when the location cannot be resolved,
    /// or [`ServiceError::Store`] when the write fails. Nothing is persisted on error.
    pub async fn register_user(&self, registration: Registration) -> Result<User, ServiceError> {
        let name = required(&registration.name, "Name")?;
        let phone = required(&registration.phone, "Phone number")?;
        let location_text = required(&registration.location_text, "Location")?;

        let coordinates = self
            .geocoder
            .resolve(location_text)
            .await
            .map_err(|source| {
                warn!(location = location_text, error = %source, "geocoding failed");
                ServiceError::GeocodingFailed {
                    location: location_text.to_owned(),
                    source,
                }
            })?;
        debug!(location = location_text, %coordinates, "location resolved");

        let user = self
            .store
            .insert_user(NewUser {
                name: name.to_owned(),
                phone: phone.to_owned(),
                location: Location {
                    text: location_text.to_owned(),
                    coordinates,
                },
                role: registration.role,
                created_at: Utc::now(),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Flip a user's online flag and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] for an unknown id.
    pub async fn toggle_online_status(&self, user_id: UserId) -> Result<User, ServiceError> {
        let mut user = self
            .store
            .user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let online = !user.online;
        if !self.store.set_online(user_id, online).await? {
            return Err(ServiceError::UserNotFound(user_id));
        }
        user.online = online;

        info!(user_id = %user_id, online, "online status toggled");
        Ok(user)
    }

    /// Find the online collector closest to `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] when the collectors cannot be loaded.
    pub async fn find_nearest_collector(
        &self,
        origin: Coordinates,
    ) -> Result<Option<CollectorMatch>, ServiceError> {
        let collectors = self.store.online_collectors().await?;
        debug!(candidates = collectors.len(), "searching nearest collector");
        Ok(nearest_collector(origin, &collectors))
    }

    /// Create a pending pickup request for a creator, matched to the nearest
    /// online collector if there is one.
    ///
    /// The request is persisted even when no collector is available.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CreatorNotFound`] for an unknown id and
    /// [`ServiceError::NotACreator`] when the user has another role.
    pub async fn create_request(&self, creator_id: UserId) -> Result<Dispatch, ServiceError> {
        let creator = self
            .store
            .user(creator_id)
            .await?
            .ok_or(ServiceError::CreatorNotFound(creator_id))?;

        if creator.role != Role::Creator {
            return Err(ServiceError::NotACreator(creator_id));
        }

        let assignment = self
            .find_nearest_collector(creator.location.coordinates)
            .await?;

        let request = self
            .store
            .insert_request(NewPickupRequest {
                creator: creator_id,
                collector: assignment.map(|found| found.collector),
                created_at: Utc::now(),
            })
            .await?;

        match assignment {
            Some(found) => info!(
                request_id = %request.id,
                collector_id = %found.collector,
                distance_km = found.distance_km,
                "pickup request matched"
            ),
            None => warn!(request_id = %request.id, "no collector available"),
        }

        Ok(Dispatch {
            request,
            assignment,
        })
    }

    /// Mark a pickup request as completed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RequestNotFound`] for an unknown id and
    /// [`ServiceError::AlreadyCompleted`] when the request is already terminal;
    /// in that case nothing is written.
    pub async fn complete_request(
        &self,
        request_id: RequestId,
    ) -> Result<PickupRequest, ServiceError> {
        let mut request = self
            .store
            .request(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        if request.status == RequestStatus::Completed {
            return Err(ServiceError::AlreadyCompleted(request_id));
        }

        let completed_at = Utc::now();
        if !self.store.mark_completed(request_id, completed_at).await? {
            return Err(ServiceError::AlreadyCompleted(request_id));
        }

        request.status = RequestStatus::Completed;
        request.completed_at = Some(completed_at);

        info!(request_id = %request_id, "pickup completed");
        Ok(request)
    }

    /// Complete the oldest pending pickup assigned to a collector.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`], [`ServiceError::NotACollector`],
    /// or [`ServiceError::NoActiveRequests`] when there is nothing to complete.
    pub async fn complete_next_for_collector(
        &self,
        collector_id: UserId,
    ) -> Result<PickupRequest, ServiceError> {
        let collector = self
            .store
            .user(collector_id)
            .await?
            .ok_or(ServiceError::UserNotFound(collector_id))?;

        if collector.role != Role::Collector {
            return Err(ServiceError::NotACollector(collector_id));
        }

        let next = self
            .store
            .pending_requests_for(collector_id)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::NoActiveRequests(collector_id))?;

        self.complete_request(next.id).await
    }

    /// Look up a single user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] for an unknown id.
    pub async fn user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.store
            .user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    /// All registered users, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] when the read fails.
    pub async fn users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.users().await?)
    }

    /// All pickup requests with creator and collector names, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] when the read fails.
    pub async fn requests(&self) -> Result<Vec<RequestView>, ServiceError> {
        let names: HashMap<UserId, String> = self
            .store
            .users()
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        let views = self
            .store
            .requests()
            .await?
            .into_iter()
            .map(|request| {
                let creator_name = names
                    .get(&request.creator)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", request.creator));
                let collector_name = request
                    .collector
                    .map(|id| names.get(&id).cloned().unwrap_or_else(|| format!("#{id}")));
                RequestView {
                    request,
                    creator_name,
                    collector_name,
                }
            })
            .collect();

        Ok(views)
    }
}

fn required<'input>(value: &'input str, field: &'static str) -> Result<&'input str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::EmptyField(field))
    } else {
        Ok(trimmed)
    }
}
