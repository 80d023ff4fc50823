//! SQL schema for the Waypool SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    rating      REAL NOT NULL DEFAULT 5,
    created_at  TEXT NOT NULL
);

-- One row per ride. The embedded lists are JSON arrays of
-- {user_id, joined_at} / {user_id, requested_at} objects; together with
-- available_seats they only ever change through a revision-guarded UPDATE.
CREATE TABLE IF NOT EXISTS rides (
    ride_id         TEXT    PRIMARY KEY,
    revision        INTEGER NOT NULL DEFAULT 0,
    created_by      TEXT    NOT NULL REFERENCES users(user_id),
    source_address  TEXT    NOT NULL,
    source_lat      REAL    NOT NULL,
    source_lng      REAL    NOT NULL,
    dest_address    TEXT    NOT NULL,
    dest_lat        REAL    NOT NULL,
    dest_lng        REAL    NOT NULL,
    date            TEXT    NOT NULL,   -- ISO 8601 UTC departure
    vehicle_type    TEXT    NOT NULL DEFAULT 'auto',
    total_seats     INTEGER NOT NULL CHECK (total_seats >= 1),
    available_seats INTEGER NOT NULL CHECK (available_seats >= 0),
    price_per_seat  REAL    NOT NULL CHECK (price_per_seat >= 0),
    passengers      TEXT    NOT NULL DEFAULT '[]',
    requests        TEXT    NOT NULL DEFAULT '[]',
    status          TEXT    NOT NULL DEFAULT 'scheduled',
    created_at      TEXT    NOT NULL
);

-- Denormalized created/joined back-references; best-effort convenience
-- only, never consulted for invariants.
CREATE TABLE IF NOT EXISTS user_rides (
    user_id TEXT NOT NULL REFERENCES users(user_id),
    ride_id TEXT NOT NULL REFERENCES rides(ride_id),
    kind    TEXT NOT NULL,   -- 'created' | 'joined'
    UNIQUE (user_id, ride_id, kind)
);

CREATE INDEX IF NOT EXISTS rides_date_idx   ON rides(date);
CREATE INDEX IF NOT EXISTS rides_status_idx ON rides(status);
CREATE INDEX IF NOT EXISTS rides_owner_idx  ON rides(created_by);

PRAGMA user_version = 1;
";
