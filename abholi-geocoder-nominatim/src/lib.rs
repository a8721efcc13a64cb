//! Geocoder implementation using the OpenStreetMap Nominatim search API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use abholi_core::{
    model::Coordinates,
    ports::{Geocoder, PortError},
};

/// Public Nominatim instance. Its usage policy requires a descriptive User-Agent.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Single hit from /search?format=jsonv2
#[derive(Debug, Deserialize)]
struct Place {
    // Nominatim sends coordinates as strings
    lat: String,
    lon: String,

    #[serde(default)]
    display_name: String,
}

/// Forward geocoder bound to a Nominatim-compatible endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Create a geocoder for `base_url` (without the `/search` suffix).
    #[must_use]
    pub fn new<S: Into<String>>(client: Client, base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    /// Create a geocoder for the public Nominatim instance.
    #[must_use]
    pub fn public(client: Client) -> Self {
        Self::new(client, DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, location_text: &str) -> Result<Coordinates, PortError> {
        let query = location_text.trim();
        if query.is_empty() {
            return Err(PortError::LocationNotFound(location_text.to_owned()));
        }

        let req = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")]);

        let places = fetch_json::<Vec<Place>>(req).await?;

        first_hit(places, query)
    }
}

/// Turn the first search hit into coordinates.
fn first_hit(places: Vec<Place>, query: &str) -> Result<Coordinates, PortError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| PortError::LocationNotFound(query.to_owned()))?;

    debug!(query, display_name = %place.display_name, "nominatim hit");

    let latitude = parse_degrees(&place.lat)?;
    let longitude = parse_degrees(&place.lon)?;
    Coordinates::new(latitude, longitude)
}

fn parse_degrees(raw: &str) -> Result<f64, PortError> {
    raw.trim().parse::<f64>().map_err(|err| {
        PortError::Internal(format!("Invalid coordinate \"{raw}\" from Nominatim: {err}"))
    })
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places(json: &str) -> Vec<Place> {
        serde_json::from_str(json).expect("valid nominatim payload")
    }

    #[test]
    fn first_hit_is_parsed_into_coordinates() {
        let payload = places(
            r#"[
                {"place_id": 1, "lat": "5.5600141", "lon": "-0.2057437",
                 "display_name": "Accra, Greater Accra Region, Ghana", "importance": 0.8},
                {"place_id": 2, "lat": "39.6", "lon": "-86.9", "display_name": "Accra, Indiana"}
            ]"#,
        );

        let coordinates = first_hit(payload, "Accra, Ghana").expect("hit resolves");
        assert!((coordinates.latitude() - 5.560_014_1).abs() < 1e-9);
        assert!((coordinates.longitude() + 0.205_743_7).abs() < 1e-9);
    }

    #[test]
    fn empty_result_is_location_not_found() {
        let result = first_hit(places("[]"), "Atlantis");
        assert!(matches!(result, Err(PortError::LocationNotFound(query)) if query == "Atlantis"));
    }

    #[test]
    fn garbage_coordinates_are_rejected() {
        let result = first_hit(places(r#"[{"lat": "north", "lon": "0"}]"#), "Somewhere");
        assert!(matches!(result, Err(PortError::Internal(_))));

        let result = first_hit(places(r#"[{"lat": "91.0", "lon": "0"}]"#), "Somewhere");
        assert!(matches!(result, Err(PortError::InvalidCoordinates { .. })));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let geocoder = NominatimGeocoder::new(Client::new(), "http://localhost:8080/");
        assert_eq!(geocoder.base_url, "http://localhost:8080");
    }
}
