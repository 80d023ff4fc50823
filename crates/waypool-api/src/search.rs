//! `GET /rides` — attribute + geospatial ride search.
//!
//! Query parameters (all optional):
//!
//! | Param | Meaning |
//! |-------|---------|
//! | `vehicle_type` | exact match |
//! | `status` | exact match; defaults to the open statuses |
//! | `min_seats` | `available_seats >= min_seats` |
//! | `max_price` | `price_per_seat <= max_price` |
//! | `date` | single UTC calendar day; wins over `from_date`/`to_date` |
//! | `from_date` / `to_date` | RFC 3339 window |
//! | `source_lat`+`source_lng` | circle centre; `source_radius_km` defaults to 10 |
//! | `source_address` | geocoded to a circle, or substring fallback |
//! | `destination_*` | same shape as the source params |
//! | `page` / `limit` | 1-based page, limit clamped to 1..=50 |
//!
//! Geocoding failures never fail the request: the place filter degrades to
//! a case-insensitive substring match on the stored address.

use axum::{Json, extract::{Query, State}};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use waypool_core::{
  external::{Geocoder, IdentityProvider},
  geo::GeoCircle,
  query::{Page, Pagination, PlaceFilter, RideQuery},
  ride::{Ride, RideStatus, VehicleType},
  store::RideStore,
};

use crate::{AppState, error::ApiError, projection::RideSummary};

/// Search radius applied when a place resolves to coordinates but the
/// caller gave no explicit radius.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub vehicle_type: Option<VehicleType>,
  pub status:       Option<RideStatus>,
  pub min_seats:    Option<u32>,
  pub max_price:    Option<f64>,

  pub date:      Option<NaiveDate>,
  pub from_date: Option<DateTime<Utc>>,
  pub to_date:   Option<DateTime<Utc>>,

  pub source_address:   Option<String>,
  pub source_lat:       Option<f64>,
  pub source_lng:       Option<f64>,
  pub source_radius_km: Option<f64>,

  pub destination_address:   Option<String>,
  pub destination_lat:       Option<f64>,
  pub destination_lng:       Option<f64>,
  pub destination_radius_km: Option<f64>,

  pub page:  Option<u32>,
  pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  pub items:    Vec<RideSummary>,
  pub page:     u32,
  pub limit:    u32,
  pub total:    usize,
  pub has_more: bool,
}

impl From<Page<Ride>> for SearchResponse {
  fn from(page: Page<Ride>) -> Self {
    Self {
      items:    page.items.iter().map(RideSummary::from).collect(),
      page:     page.page,
      limit:    page.limit,
      total:    page.total,
      has_more: page.has_more,
    }
  }
}

/// Resolve one endpoint's place parameters into a filter.
///
/// Explicit coordinates win. An address alone is geocoded; if the geocoder
/// cannot resolve it, the filter degrades to an address substring match.
async fn place_filter<G: Geocoder>(
  geocoder: &G,
  address: Option<String>,
  lat: Option<f64>,
  lng: Option<f64>,
  radius_km: Option<f64>,
) -> Result<Option<PlaceFilter>, ApiError> {
  let radius_km = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
  if !(radius_km.is_finite() && radius_km > 0.0) {
    return Err(ApiError::BadRequest("radius_km must be positive".into()));
  }

  if let (Some(lat), Some(lng)) = (lat, lng) {
    return Ok(Some(PlaceFilter::Within(GeoCircle { lat, lng, radius_km })));
  }

  let Some(address) = address.filter(|a| !a.trim().is_empty()) else {
    return Ok(None);
  };

  match geocoder.geocode(&address).await {
    Ok(place) => Ok(Some(PlaceFilter::Within(GeoCircle {
      lat: place.lat,
      lng: place.lng,
      radius_km,
    }))),
    Err(err) => {
      tracing::debug!(%address, %err, "geocode failed, degrading to address match");
      Ok(Some(PlaceFilter::AddressContains(address)))
    }
  }
}

/// `GET /rides`
pub async fn handler<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let source = place_filter(
    state.geocoder.as_ref(),
    params.source_address,
    params.source_lat,
    params.source_lng,
    params.source_radius_km,
  )
  .await?;
  let destination = place_filter(
    state.geocoder.as_ref(),
    params.destination_address,
    params.destination_lat,
    params.destination_lng,
    params.destination_radius_km,
  )
  .await?;

  let query = RideQuery {
    vehicle_type: params.vehicle_type,
    statuses: match params.status {
      Some(s) => vec![s],
      None => RideStatus::OPEN.to_vec(),
    },
    min_seats: params.min_seats,
    max_price: params.max_price,
    on_date: params.date,
    from_date: params.from_date,
    to_date: params.to_date,
    source,
    destination,
  };
  let pagination = Pagination::new(params.page, params.limit);

  let page = state
    .lifecycle
    .store()
    .search(&query, pagination)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(SearchResponse::from(page)))
}
