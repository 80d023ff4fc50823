//! Wire projections of the ride entity.
//!
//! The core [`Ride`] stays free of transport concerns; these DTOs are the
//! only shapes that cross the API boundary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use waypool_core::ride::{JoinRequest, Location, Passenger, Ride, RideStatus, VehicleType};

/// The listing shape: everything a browse result needs, no membership
/// lists.
#[derive(Debug, Clone, Serialize)]
pub struct RideSummary {
  pub id:              Uuid,
  pub created_by:      Uuid,
  pub source:          Location,
  pub destination:     Location,
  pub date:            DateTime<Utc>,
  pub vehicle_type:    VehicleType,
  pub total_seats:     u32,
  pub available_seats: u32,
  pub price_per_seat:  f64,
  pub status:          RideStatus,
}

/// The single-ride shape: the summary plus both membership lists.
#[derive(Debug, Clone, Serialize)]
pub struct RideDetail {
  #[serde(flatten)]
  pub summary:    RideSummary,
  pub passengers: Vec<Passenger>,
  pub requests:   Vec<JoinRequest>,
}

impl From<&Ride> for RideSummary {
  fn from(ride: &Ride) -> Self {
    Self {
      id:              ride.ride_id,
      created_by:      ride.created_by,
      source:          ride.source.clone(),
      destination:     ride.destination.clone(),
      date:            ride.date,
      vehicle_type:    ride.vehicle_type,
      total_seats:     ride.total_seats,
      available_seats: ride.available_seats,
      price_per_seat:  ride.price_per_seat,
      status:          ride.status,
    }
  }
}

impl From<&Ride> for RideDetail {
  fn from(ride: &Ride) -> Self {
    Self {
      summary:    RideSummary::from(ride),
      passengers: ride.passengers.clone(),
      requests:   ride.requests.clone(),
    }
  }
}
