//! Query and pagination types for ride search.
//!
//! A [`RideQuery`] is a conjunction of optional filter dimensions: an
//! absent dimension imposes no constraint. Status defaults are deliberately
//! NOT applied here — a browse context wants open rides, a history context
//! wants terminal ones, and only the caller knows which it is.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::{
  geo::GeoCircle,
  ride::{Location, Ride, RideStatus, VehicleType},
};

// ─── Place filter ────────────────────────────────────────────────────────────

/// Geo filter on one ride endpoint. The circle form is the real spatial
/// predicate; the address form is the degraded fallback used when no
/// coordinates could be obtained — a case-insensitive substring match on
/// the stored address text, not a geo match.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceFilter {
  Within(GeoCircle),
  AddressContains(String),
}

impl PlaceFilter {
  pub fn matches(&self, place: &Location) -> bool {
    match self {
      Self::Within(circle) => circle.contains(place.lat, place.lng),
      Self::AddressContains(needle) => place
        .address
        .to_lowercase()
        .contains(&needle.to_lowercase()),
    }
  }
}

// ─── RideQuery ───────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::RideStore::search`]. All dimensions are
/// ANDed.
#[derive(Debug, Clone, Default)]
pub struct RideQuery {
  pub vehicle_type: Option<VehicleType>,
  /// Match any of these statuses. Empty means unconstrained.
  pub statuses:     Vec<RideStatus>,
  /// `available_seats >= min_seats`.
  pub min_seats:    Option<u32>,
  /// `price_per_seat <= max_price`, inclusive.
  pub max_price:    Option<f64>,
  /// Single UTC calendar day, both boundaries inclusive. Takes precedence
  /// over `from_date`/`to_date` when both are supplied.
  pub on_date:      Option<NaiveDate>,
  pub from_date:    Option<DateTime<Utc>>,
  pub to_date:      Option<DateTime<Utc>>,
  pub source:       Option<PlaceFilter>,
  pub destination:  Option<PlaceFilter>,
}

impl RideQuery {
  /// Resolve the date dimensions into one closed/open window.
  /// Returns `(lower, upper)`, either bound possibly absent.
  pub fn date_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    if let Some(day) = self.on_date {
      let start = day
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc());
      // Last representable instant of the day at millisecond granularity.
      let end = day
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc() + TimeDelta::days(1) - TimeDelta::milliseconds(1));
      return (start, end);
    }
    (self.from_date, self.to_date)
  }

  /// Full predicate evaluation against one ride. Storage backends are free
  /// to push whatever dimensions they can into their query language, but
  /// this is the semantics they must agree with.
  pub fn matches(&self, ride: &Ride) -> bool {
    if let Some(vt) = self.vehicle_type
      && ride.vehicle_type != vt
    {
      return false;
    }
    if !self.statuses.is_empty() && !self.statuses.contains(&ride.status) {
      return false;
    }
    if let Some(min) = self.min_seats
      && ride.available_seats < min
    {
      return false;
    }
    if let Some(max) = self.max_price
      && ride.price_per_seat > max
    {
      return false;
    }
    let (lower, upper) = self.date_window();
    if let Some(lo) = lower
      && ride.date < lo
    {
      return false;
    }
    if let Some(hi) = upper
      && ride.date > hi
    {
      return false;
    }
    if let Some(f) = &self.source
      && !f.matches(&ride.source)
    {
      return false;
    }
    if let Some(f) = &self.destination
      && !f.matches(&ride.destination)
    {
      return false;
    }
    true
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// 1-based page selection. `limit` is clamped to 1..=50.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  page:  u32,
  limit: u32,
}

impl Pagination {
  pub const DEFAULT_LIMIT: u32 = 10;
  pub const MAX_LIMIT: u32 = 50;

  pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
    Self {
      page:  page.unwrap_or(1).max(1),
      limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
    }
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn limit(&self) -> u32 { self.limit }

  pub fn skip(&self) -> usize {
    (self.page as usize - 1) * self.limit as usize
  }
}

impl Default for Pagination {
  fn default() -> Self { Self::new(None, None) }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// One page of a sorted result set, with the total match count across all
/// pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items:    Vec<T>,
  pub page:     u32,
  pub limit:    u32,
  pub total:    usize,
  pub has_more: bool,
}

impl<T> Page<T> {
  /// Slice `matched` (already filtered and sorted) down to the requested
  /// window.
  pub fn from_matches(matched: Vec<T>, pagination: Pagination) -> Self {
    let total = matched.len();
    let items: Vec<T> = matched
      .into_iter()
      .skip(pagination.skip())
      .take(pagination.limit() as usize)
      .collect();
    let has_more = pagination.skip() + items.len() < total;
    Self {
      items,
      page: pagination.page(),
      limit: pagination.limit(),
      total,
      has_more,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pagination_defaults_and_clamps() {
    let p = Pagination::default();
    assert_eq!((p.page(), p.limit()), (1, 10));

    let p = Pagination::new(Some(0), Some(0));
    assert_eq!((p.page(), p.limit()), (1, 1));

    let p = Pagination::new(Some(3), Some(500));
    assert_eq!((p.page(), p.limit()), (3, 50));
    assert_eq!(p.skip(), 100);
  }

  #[test]
  fn single_day_window_takes_precedence_over_range() {
    let q = RideQuery {
      on_date: Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
      from_date: Some("2020-01-01T00:00:00Z".parse().unwrap()),
      to_date: Some("2030-01-01T00:00:00Z".parse().unwrap()),
      ..Default::default()
    };
    let (lo, hi) = q.date_window();
    assert_eq!(lo.unwrap(), "2024-06-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    assert_eq!(hi.unwrap(), "2024-06-15T23:59:59.999Z".parse::<DateTime<Utc>>().unwrap());
  }

  #[test]
  fn page_from_matches_reports_has_more() {
    let page = Page::from_matches((0..25).collect(), Pagination::new(Some(2), Some(10)));
    assert_eq!(page.items, (10..20).collect::<Vec<_>>());
    assert_eq!(page.total, 25);
    assert!(page.has_more);

    let last = Page::from_matches((0..25).collect(), Pagination::new(Some(3), Some(10)));
    assert_eq!(last.items.len(), 5);
    assert!(!last.has_more);
  }

  #[test]
  fn address_filter_is_case_insensitive() {
    let f = PlaceFilter::AddressContains("indiranagar".into());
    let place = Location {
      address: "100 Feet Rd, Indiranagar, Bengaluru".into(),
      lat:     12.97,
      lng:     77.64,
    };
    assert!(f.matches(&place));
  }
}
