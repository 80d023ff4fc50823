//! Great-circle radius predicates over ride endpoints.
//!
//! Containment is a spherical cap around the query center, not a lat/lng
//! bounding box — a box misbehaves near the poles and across the date
//! line. The radius is converted to radians by dividing by Earth's mean
//! radius, matching the stored-side index convention.

use serde::Deserialize;

/// Earth's mean radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Tolerance on the central angle so a point exactly on the boundary is
/// included despite floating-point noise.
const ANGLE_EPSILON: f64 = 1e-9;

/// A spherical cap: all points within `radius_km` of `(lat, lng)` along
/// the surface.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoCircle {
  pub lat:       f64,
  pub lng:       f64,
  pub radius_km: f64,
}

impl GeoCircle {
  /// Inclusive containment test.
  pub fn contains(&self, lat: f64, lng: f64) -> bool {
    central_angle(self.lat, self.lng, lat, lng)
      <= self.radius_km / EARTH_RADIUS_KM + ANGLE_EPSILON
  }

  /// Great-circle distance from the center to `(lat, lng)` in km.
  pub fn distance_km(&self, lat: f64, lng: f64) -> f64 {
    central_angle(self.lat, self.lng, lat, lng) * EARTH_RADIUS_KM
  }
}

/// Central angle between two points, in radians, via the haversine form
/// (numerically stable for small separations).
fn central_angle(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
  let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
  let d_phi = (lat2 - lat1).to_radians();
  let d_lambda = (lng2 - lng1).to_radians();

  let a = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  2.0 * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_distance_is_contained() {
    let c = GeoCircle { lat: 12.97, lng: 77.59, radius_km: 0.0 };
    assert!(c.contains(12.97, 77.59));
  }

  #[test]
  fn known_distance_bangalore_to_mysore() {
    // Roughly 128 km apart.
    let c = GeoCircle { lat: 12.9716, lng: 77.5946, radius_km: 10.0 };
    let d = c.distance_km(12.2958, 76.6394);
    assert!((120.0..140.0).contains(&d), "got {d}");
    assert!(!c.contains(12.2958, 76.6394));
  }

  #[test]
  fn boundary_is_inclusive() {
    let center = GeoCircle { lat: 0.0, lng: 0.0, radius_km: 0.0 };
    let d = center.distance_km(0.05, 0.05);

    let exact = GeoCircle { lat: 0.0, lng: 0.0, radius_km: d };
    assert!(exact.contains(0.05, 0.05));

    let just_under = GeoCircle { lat: 0.0, lng: 0.0, radius_km: d - 0.001 };
    assert!(!just_under.contains(0.05, 0.05));
  }

  #[test]
  fn date_line_crossing() {
    // 179.9°E and 179.9°W are ~22 km apart at the equator, not half the
    // globe.
    let c = GeoCircle { lat: 0.0, lng: 179.9, radius_km: 30.0 };
    assert!(c.contains(0.0, -179.9));
  }
}
