//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings (fixed UTC offset, so lexicographic
//! order matches chronological order and date filters can run in SQL).
//! The passenger/request lists are compact JSON. UUIDs are hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use waypool_core::{
  ride::{JoinRequest, Location, Passenger, Ride},
  store::{RideRef, VersionedRide},
  user::User,
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Embedded lists ──────────────────────────────────────────────────────────

pub fn encode_passengers(list: &[Passenger]) -> Result<String> {
  Ok(serde_json::to_string(list)?)
}

pub fn decode_passengers(s: &str) -> Result<Vec<Passenger>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_requests(list: &[JoinRequest]) -> Result<String> {
  Ok(serde_json::to_string(list)?)
}

pub fn decode_requests(s: &str) -> Result<Vec<JoinRequest>> {
  Ok(serde_json::from_str(s)?)
}

// ─── RideRef ─────────────────────────────────────────────────────────────────

pub fn encode_ride_ref(kind: RideRef) -> &'static str {
  match kind {
    RideRef::Created => "created",
    RideRef::Joined => "joined",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `rides` row.
pub struct RawRide {
  pub ride_id:         String,
  pub revision:        i64,
  pub created_by:      String,
  pub source_address:  String,
  pub source_lat:      f64,
  pub source_lng:      f64,
  pub dest_address:    String,
  pub dest_lat:        f64,
  pub dest_lng:        f64,
  pub date:            String,
  pub vehicle_type:    String,
  pub total_seats:     i64,
  pub available_seats: i64,
  pub price_per_seat:  f64,
  pub passengers:      String,
  pub requests:        String,
  pub status:          String,
  pub created_at:      String,
}

impl RawRide {
  /// Column list matching the field order expected by [`Self::from_row`].
  pub const COLUMNS: &'static str = "ride_id, revision, created_by, \
     source_address, source_lat, source_lng, \
     dest_address, dest_lat, dest_lng, \
     date, vehicle_type, total_seats, available_seats, price_per_seat, \
     passengers, requests, status, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ride_id:         row.get(0)?,
      revision:        row.get(1)?,
      created_by:      row.get(2)?,
      source_address:  row.get(3)?,
      source_lat:      row.get(4)?,
      source_lng:      row.get(5)?,
      dest_address:    row.get(6)?,
      dest_lat:        row.get(7)?,
      dest_lng:        row.get(8)?,
      date:            row.get(9)?,
      vehicle_type:    row.get(10)?,
      total_seats:     row.get(11)?,
      available_seats: row.get(12)?,
      price_per_seat:  row.get(13)?,
      passengers:      row.get(14)?,
      requests:        row.get(15)?,
      status:          row.get(16)?,
      created_at:      row.get(17)?,
    })
  }

  pub fn into_versioned(self) -> Result<VersionedRide> {
    let ride = Ride {
      ride_id:         decode_uuid(&self.ride_id)?,
      created_by:      decode_uuid(&self.created_by)?,
      source:          Location {
        address: self.source_address,
        lat:     self.source_lat,
        lng:     self.source_lng,
      },
      destination:     Location {
        address: self.dest_address,
        lat:     self.dest_lat,
        lng:     self.dest_lng,
      },
      date:            decode_dt(&self.date)?,
      vehicle_type:    waypool_core::ride::VehicleType::parse(&self.vehicle_type)?,
      total_seats:     self.total_seats as u32,
      available_seats: self.available_seats as u32,
      price_per_seat:  self.price_per_seat,
      passengers:      decode_passengers(&self.passengers)?,
      requests:        decode_requests(&self.requests)?,
      status:          waypool_core::ride::RideStatus::parse(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
    };
    Ok(VersionedRide { ride, revision: self.revision })
  }
}

/// Raw strings read directly from a `users` row, plus its back-references.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub email:      String,
  pub rating:     f64,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(
    self,
    created_rides: Vec<String>,
    joined_rides: Vec<String>,
  ) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      name:          self.name,
      email:         self.email,
      rating:        self.rating,
      created_rides: created_rides
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      joined_rides:  joined_rides
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
