//! SQL schema for the relief SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Rows are never deleted. After insertion only `status` is ever updated.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS missing_persons (
    id          TEXT PRIMARY KEY,
    status      TEXT NOT NULL CHECK (status IN ('missing', 'found')),
    reported_at TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    document    TEXT NOT NULL    -- JSON content fields
);

-- Damage reports are terminal on creation and carry no status.
CREATE TABLE IF NOT EXISTS damage_reports (
    id          TEXT PRIMARY KEY,
    reported_at TEXT NOT NULL,
    document    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS supply_requests (
    id          TEXT PRIMARY KEY,
    status      TEXT NOT NULL CHECK (status IN ('pending', 'fulfilled')),
    reported_at TEXT NOT NULL,
    document    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sos_alerts (
    id          TEXT PRIMARY KEY,
    status      TEXT NOT NULL CHECK (status IN ('active', 'resolved')),
    reported_at TEXT NOT NULL,
    document    TEXT NOT NULL
);

PRAGMA user_version = 1;
";
