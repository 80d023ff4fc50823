//! [`SqliteStore`] — the SQLite implementation of [`RideStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use waypool_core::{
  query::{Page, Pagination, RideQuery},
  ride::{Ride, RideStatus},
  store::{RideRef, RideStore, SwapOutcome, VersionedRide},
  user::{DEFAULT_RATING, NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawRide, RawUser, encode_dt, encode_passengers, encode_requests,
    encode_ride_ref, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Waypool ride store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a ride SELECT with a dynamically-built WHERE clause and decode
  /// the rows.
  async fn select_rides(
    &self,
    where_clause: String,
    values: Vec<Value>,
  ) -> Result<Vec<VersionedRide>> {
    let sql = format!(
      "SELECT {} FROM rides {where_clause} ORDER BY date ASC",
      RawRide::COLUMNS,
    );

    let raws: Vec<RawRide> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), RawRide::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRide::into_versioned).collect()
  }
}

/// `status IN (?, ?, ...)` fragment for a non-empty status set, plus its
/// bound values.
fn status_cond(statuses: &[RideStatus], values: &mut Vec<Value>) -> Option<String> {
  if statuses.is_empty() {
    return None;
  }
  let marks = vec!["?"; statuses.len()].join(", ");
  for s in statuses {
    values.push(Value::Text(s.as_str().to_owned()));
  }
  Some(format!("status IN ({marks})"))
}

fn where_clause(conds: &[String]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

// ─── RideStore impl ──────────────────────────────────────────────────────────

impl RideStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      rating:        DEFAULT_RATING,
      created_rides: Vec::new(),
      joined_rides:  Vec::new(),
      created_at:    Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let at_str = encode_dt(user.created_at);
    let (name, email, rating) = (user.name.clone(), user.email.clone(), user.rating);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, rating, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, email, rating, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let found: Option<(RawUser, Vec<(String, String)>)> = self
      .conn
      .call(move |conn| {
        let raw: Option<RawUser> = conn
          .query_row(
            "SELECT user_id, name, email, rating, created_at
             FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                name:       row.get(1)?,
                email:      row.get(2)?,
                rating:     row.get(3)?,
                created_at: row.get(4)?,
              })
            },
          )
          .optional()?;

        let Some(raw) = raw else { return Ok(None) };

        let mut stmt = conn
          .prepare("SELECT kind, ride_id FROM user_rides WHERE user_id = ?1")?;
        let refs = stmt
          .query_map(rusqlite::params![raw.user_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<(String, String)>>>()?;

        Ok(Some((raw, refs)))
      })
      .await?;

    let Some((raw, refs)) = found else { return Ok(None) };

    let (mut created, mut joined) = (Vec::new(), Vec::new());
    for (kind, ride_id) in refs {
      match kind.as_str() {
        "joined" => joined.push(ride_id),
        _ => created.push(ride_id),
      }
    }
    Ok(Some(raw.into_user(created, joined)?))
  }

  async fn note_ride_ref(
    &self,
    user_id: Uuid,
    ride_id: Uuid,
    kind: RideRef,
  ) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let ride_str = encode_uuid(ride_id);
    let kind_str = encode_ride_ref(kind);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO user_rides (user_id, ride_id, kind)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, ride_str, kind_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Rides ─────────────────────────────────────────────────────────────

  async fn insert_ride(&self, ride: Ride) -> Result<()> {
    let ride_id_str    = encode_uuid(ride.ride_id);
    let created_by_str = encode_uuid(ride.created_by);
    let date_str       = encode_dt(ride.date);
    let created_at_str = encode_dt(ride.created_at);
    let passengers_str = encode_passengers(&ride.passengers)?;
    let requests_str   = encode_requests(&ride.requests)?;
    let vehicle_str    = ride.vehicle_type.as_str();
    let status_str     = ride.status.as_str();
    let source         = ride.source.clone();
    let destination    = ride.destination.clone();
    let (total, available, price) =
      (ride.total_seats, ride.available_seats, ride.price_per_seat);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rides (
             ride_id, revision, created_by,
             source_address, source_lat, source_lng,
             dest_address, dest_lat, dest_lng,
             date, vehicle_type, total_seats, available_seats,
             price_per_seat, passengers, requests, status, created_at
           ) VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            ride_id_str,
            created_by_str,
            source.address,
            source.lat,
            source.lng,
            destination.address,
            destination.lat,
            destination.lng,
            date_str,
            vehicle_str,
            total,
            available,
            price,
            passengers_str,
            requests_str,
            status_str,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_ride(&self, id: Uuid) -> Result<Option<VersionedRide>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM rides WHERE ride_id = ?1",
      RawRide::COLUMNS,
    );

    let raw: Option<RawRide> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawRide::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRide::into_versioned).transpose()
  }

  async fn swap_ride(
    &self,
    expected_revision: i64,
    ride: Ride,
  ) -> Result<SwapOutcome> {
    let ride_id_str    = encode_uuid(ride.ride_id);
    let passengers_str = encode_passengers(&ride.passengers)?;
    let requests_str   = encode_requests(&ride.requests)?;
    let status_str     = ride.status.as_str();
    let available      = ride.available_seats;

    // Only the mutable portion of the row is written; route, schedule,
    // capacity and price are immutable after insert.
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE rides
           SET available_seats = ?1,
               passengers      = ?2,
               requests        = ?3,
               status          = ?4,
               revision        = revision + 1
           WHERE ride_id = ?5 AND revision = ?6",
          rusqlite::params![
            available,
            passengers_str,
            requests_str,
            status_str,
            ride_id_str,
            expected_revision,
          ],
        )?)
      })
      .await?;

    if changed == 1 {
      Ok(SwapOutcome::Applied)
    } else {
      tracing::debug!(ride = %ride.ride_id, expected_revision, "stale ride swap");
      Ok(SwapOutcome::Stale)
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  async fn search(
    &self,
    query: &RideQuery,
    pagination: Pagination,
  ) -> Result<Page<Ride>> {
    // Attribute dimensions go to SQL; the geo/address predicates run over
    // the decoded rows so pagination counts post-filter matches.
    let mut conds: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(vt) = query.vehicle_type {
      conds.push("vehicle_type = ?".into());
      values.push(Value::Text(vt.as_str().to_owned()));
    }
    if let Some(cond) = status_cond(&query.statuses, &mut values) {
      conds.push(cond);
    }
    if let Some(min) = query.min_seats {
      conds.push("available_seats >= ?".into());
      values.push(Value::Integer(min as i64));
    }
    if let Some(max) = query.max_price {
      conds.push("price_per_seat <= ?".into());
      values.push(Value::Real(max));
    }
    let (lower, upper) = query.date_window();
    if let Some(lo) = lower {
      conds.push("date >= ?".into());
      values.push(Value::Text(encode_dt(lo)));
    }
    if let Some(hi) = upper {
      conds.push("date <= ?".into());
      values.push(Value::Text(encode_dt(hi)));
    }

    let candidates = self.select_rides(where_clause(&conds), values).await?;

    let matched: Vec<Ride> = candidates
      .into_iter()
      .map(|v| v.ride)
      .filter(|r| {
        query.source.as_ref().is_none_or(|f| f.matches(&r.source))
          && query
            .destination
            .as_ref()
            .is_none_or(|f| f.matches(&r.destination))
      })
      .collect();

    tracing::debug!(total = matched.len(), "ride search evaluated");
    Ok(Page::from_matches(matched, pagination))
  }

  async fn rides_created_by(
    &self,
    owner: Uuid,
    statuses: &[RideStatus],
  ) -> Result<Vec<Ride>> {
    let mut conds = vec!["created_by = ?".to_owned()];
    let mut values = vec![Value::Text(encode_uuid(owner))];
    if let Some(cond) = status_cond(statuses, &mut values) {
      conds.push(cond);
    }

    let rides = self.select_rides(where_clause(&conds), values).await?;
    Ok(rides.into_iter().map(|v| v.ride).collect())
  }

  async fn rides_joined_by(
    &self,
    user: Uuid,
    statuses: &[RideStatus],
  ) -> Result<Vec<Ride>> {
    // Passenger membership lives inside the JSON list; filter after
    // decoding rather than poking at the JSON from SQL.
    let mut conds = Vec::new();
    let mut values = Vec::new();
    if let Some(cond) = status_cond(statuses, &mut values) {
      conds.push(cond);
    }

    let rides = self.select_rides(where_clause(&conds), values).await?;
    Ok(
      rides
        .into_iter()
        .map(|v| v.ride)
        .filter(|r| r.is_passenger(user))
        .collect(),
    )
  }
}
