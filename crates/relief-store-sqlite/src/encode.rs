//! Encoding and decoding helpers between domain types and the columns stored
//! in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings. Everything that is neither id, status nor timestamp lives in the
//! JSON `document` column.

use chrono::{DateTime, Utc};
use relief_core::report::{Report, ReportKind, Status};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Collections ─────────────────────────────────────────────────────────────

pub fn table(kind: ReportKind) -> &'static str {
  match kind {
    ReportKind::MissingPerson => "missing_persons",
    ReportKind::DamageReport => "damage_reports",
    ReportKind::SupplyRequest => "supply_requests",
    ReportKind::SosAlert => "sos_alerts",
  }
}

/// Columns in [`RawReport`] order. Kinds without a lifecycle select a `NULL`
/// status so every collection decodes the same way.
pub fn select_columns(kind: ReportKind) -> &'static str {
  if kind.lifecycle().is_some() {
    "id, status, reported_at, document"
  } else {
    "id, NULL, reported_at, document"
  }
}

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(status: Status) -> String { status.to_string() }

/// Parse a stored status and check it belongs to `kind`'s lifecycle.
pub fn decode_status(kind: ReportKind, s: &str) -> Result<Status> {
  let invalid = || relief_core::Error::InvalidStatus { kind, status: s.to_owned() };
  let status: Status = s.parse().map_err(|_| invalid())?;
  if kind.accepts(status) { Ok(status) } else { Err(invalid().into()) }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Fields held in dedicated columns rather than in the document.
const METADATA_KEYS: [&str; 4] = ["kind", "id", "status", "reported_at"];

/// Serialise the content fields of `report` for the `document` column.
pub fn encode_document(report: &Report) -> Result<String> {
  let mut value = serde_json::to_value(report)?;
  if let Some(object) = value.as_object_mut() {
    for key in METADATA_KEYS {
      object.remove(key);
    }
  }
  Ok(value.to_string())
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a collection row.
pub struct RawReport {
  pub id:          String,
  pub status:      Option<String>,
  pub reported_at: String,
  pub document:    String,
}

impl RawReport {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      status:      row.get(1)?,
      reported_at: row.get(2)?,
      document:    row.get(3)?,
    })
  }

  pub fn into_report(self, kind: ReportKind) -> Result<Report> {
    let id = decode_uuid(&self.id)?;
    let reported_at = decode_dt(&self.reported_at)?;
    let status = self
      .status
      .as_deref()
      .map(|s| decode_status(kind, s))
      .transpose()?;

    let Value::Object(mut document) = serde_json::from_str::<Value>(&self.document)? else {
      return Err(Error::MalformedDocument(id));
    };
    document.insert("kind".into(), json!(kind.as_str()));
    document.insert("id".into(), json!(id));
    document.insert("reported_at".into(), json!(reported_at));
    if let Some(status) = status {
      document.insert("status".into(), json!(status));
    }

    Ok(serde_json::from_value(Value::Object(document))?)
  }
}
