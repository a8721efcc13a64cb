//! End-to-end pickup scenarios on the SQLite store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use abholi_core::{
    model::{Coordinates, Registration, RequestStatus, Role, User},
    ports::{Geocoder, PortError},
    service::{AbholiService, ServiceError},
};
use abholi_store_sqlite::SqliteRecordStore;

struct FixedGeocoder {
    places: HashMap<&'static str, (f64, f64)>,
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, location_text: &str) -> Result<Coordinates, PortError> {
        let (latitude, longitude) = self
            .places
            .get(location_text)
            .copied()
            .ok_or_else(|| PortError::LocationNotFound(location_text.to_owned()))?;
        Coordinates::new(latitude, longitude)
    }
}

async fn service() -> AbholiService {
    let geocoder = FixedGeocoder {
        places: HashMap::from([
            ("Null Island", (0.0, 0.0)),
            ("One East", (0.0, 1.0)),
            ("Five East", (0.0, 5.0)),
        ]),
    };
    let store = SqliteRecordStore::in_memory()
        .await
        .expect("in-memory database opens");
    AbholiService::new(Arc::new(store), Arc::new(geocoder))
}

async fn register(service: &AbholiService, name: &str, place: &str, role: Role) -> User {
    service
        .register_user(Registration::new(name, "+254 700 000000", place, role))
        .await
        .expect("registration succeeds")
}

#[tokio::test]
async fn creator_is_matched_to_the_nearer_online_collector() {
    let service = service().await;
    let creator = register(&service, "A", "Null Island", Role::Creator).await;
    let near = register(&service, "B", "One East", Role::Collector).await;
    let far = register(&service, "C", "Five East", Role::Collector).await;
    service.toggle_online_status(near.id).await.expect("B online");
    service.toggle_online_status(far.id).await.expect("C online");

    let dispatch = service
        .create_request(creator.id)
        .await
        .expect("request created");

    assert_eq!(dispatch.request.collector, Some(near.id));
    assert_eq!(dispatch.request.status, RequestStatus::Pending);

    let views = service.requests().await.expect("requests listed");
    assert_eq!(views.len(), 1);
    assert_eq!(
        views.first().and_then(|view| view.collector_name.clone()),
        Some(String::from("B"))
    );
}

#[tokio::test]
async fn request_without_online_collectors_is_stored_unmatched() {
    let service = service().await;
    let creator = register(&service, "A", "Null Island", Role::Creator).await;
    register(&service, "B", "One East", Role::Collector).await;

    let dispatch = service
        .create_request(creator.id)
        .await
        .expect("request created");
    assert!(dispatch.assignment.is_none());

    let views = service.requests().await.expect("requests listed");
    let stored = views.first().expect("request persisted");
    assert_eq!(stored.request.collector, None);
    assert_eq!(stored.request.status, RequestStatus::Pending);
    assert_eq!(stored.collector_name, None);
}

#[tokio::test]
async fn unresolvable_location_persists_no_user() {
    let service = service().await;

    let result = service
        .register_user(Registration::new(
            "A",
            "+254 700 000000",
            "Nowhere In Particular",
            Role::Creator,
        ))
        .await;

    assert!(matches!(result, Err(ServiceError::GeocodingFailed { .. })));
    assert!(service.users().await.expect("users listed").is_empty());
}

#[tokio::test]
async fn completing_twice_keeps_the_request_completed() {
    let service = service().await;
    let creator = register(&service, "A", "Null Island", Role::Creator).await;
    let request_id = service
        .create_request(creator.id)
        .await
        .expect("request created")
        .request
        .id;

    service
        .complete_request(request_id)
        .await
        .expect("first completion");
    let second = service.complete_request(request_id).await;
    assert!(matches!(second, Err(ServiceError::AlreadyCompleted(id)) if id == request_id));

    let views = service.requests().await.expect("requests listed");
    let stored = views.first().expect("request persisted");
    assert_eq!(stored.request.status, RequestStatus::Completed);
    assert!(stored.request.completed_at.is_some());
}

#[tokio::test]
async fn toggling_twice_is_an_involution() {
    let service = service().await;
    let collector = register(&service, "B", "One East", Role::Collector).await;

    service.toggle_online_status(collector.id).await.expect("on");
    service.toggle_online_status(collector.id).await.expect("off");

    let reloaded = service.user(collector.id).await.expect("user exists");
    assert_eq!(reloaded.online, collector.online);
}
