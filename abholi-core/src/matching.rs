//! Nearest-collector selection.
//!
//! A linear scan over the candidates: each online collector is scored by its
//! geodesic distance to the requester and the closest one wins. Equal
//! distances resolve to the lowest user id, so the result does not depend on
//! the order the store returns candidates in.

use std::cmp::Ordering;

use crate::geodesy::geodesic_distance_m;
use crate::model::{CollectorMatch, Coordinates, User};

/// Pick the online collector closest to `origin`.
///
/// Users that are not collectors or are offline are skipped. Returns `None`
/// when no candidate is left.
#[must_use]
pub fn nearest_collector<'users, I>(origin: Coordinates, candidates: I) -> Option<CollectorMatch>
where
    I: IntoIterator<Item = &'users User>,
{
    candidates
        .into_iter()
        .filter(|user| user.is_available_collector())
        .map(|user| CollectorMatch {
            collector: user.id,
            distance_km: geodesic_distance_m(origin, user.location.coordinates) / 1000.0,
        })
        .min_by(compare_matches)
}

/// Order two matches by distance, then by collector id.
fn compare_matches(left: &CollectorMatch, right: &CollectorMatch) -> Ordering {
    left.distance_km
        .total_cmp(&right.distance_km)
        .then_with(|| left.collector.cmp(&right.collector))
}
