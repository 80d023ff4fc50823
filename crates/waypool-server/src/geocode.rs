//! Google Maps geocoding client.
//!
//! Errors here are soft: the API layer degrades a failed geocode to an
//! address substring match, so this client reports `Unavailable` rather
//! than aborting anything.

use serde::Deserialize;
use waypool_core::external::{GeocodeError, GeocodedPlace, Geocoder};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GoogleGeocoder {
  api_key: Option<String>,
  http:    reqwest::Client,
}

impl GoogleGeocoder {
  pub fn new(api_key: Option<String>) -> Self {
    Self { api_key, http: reqwest::Client::new() }
  }
}

// Just the fields we read out of the geocoding response.
#[derive(Deserialize)]
struct GeocodeResponse {
  results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
  formatted_address: String,
  geometry:          Geometry,
}

#[derive(Deserialize)]
struct Geometry {
  location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
  lat: f64,
  lng: f64,
}

impl Geocoder for GoogleGeocoder {
  async fn geocode(&self, address: &str) -> Result<GeocodedPlace, GeocodeError> {
    let Some(key) = &self.api_key else {
      return Err(GeocodeError::Unavailable("no geocoding key configured".into()));
    };

    let response = self
      .http
      .get(GEOCODE_URL)
      .query(&[("address", address), ("key", key.as_str())])
      .send()
      .await
      .map_err(|e| GeocodeError::Unavailable(e.to_string()))?
      .error_for_status()
      .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

    let body: GeocodeResponse = response
      .json()
      .await
      .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

    let Some(first) = body.results.into_iter().next() else {
      return Err(GeocodeError::NotFound);
    };

    Ok(GeocodedPlace {
      lat:               first.geometry.location.lat,
      lng:               first.geometry.location.lng,
      formatted_address: first.formatted_address,
    })
  }
}
