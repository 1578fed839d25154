//! [`SqliteStore`] — the SQLite implementation of [`ReportStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use relief_core::{
  report::{NewReport, Record, Report, ReportKind, Status},
  store::ReportStore,
};

use crate::{
  Result,
  encode::{
    RawReport, encode_document, encode_dt, encode_status, encode_uuid, select_columns,
    table,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A relief report store backed by a single SQLite file.
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

  /// Insert a fully-built [`Report`] into its collection.
  async fn insert(&self, report: &Report) -> Result<()> {
    let kind            = report.kind();
    let id_str          = encode_uuid(report.id());
    let reported_at_str = encode_dt(report.reported_at());
    let status_str      = report.status().map(encode_status);
    let document_str    = encode_document(report)?;

    self
      .conn
      .call(move |conn| {
        match status_str {
          Some(status) => conn.execute(
            &format!(
              "INSERT INTO {} (id, status, reported_at, document) VALUES (?1, ?2, ?3, ?4)",
              table(kind)
            ),
            rusqlite::params![id_str, status, reported_at_str, document_str],
          )?,
          None => conn.execute(
            &format!(
              "INSERT INTO {} (id, reported_at, document) VALUES (?1, ?2, ?3)",
              table(kind)
            ),
            rusqlite::params![id_str, reported_at_str, document_str],
          )?,
        };
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewReport) -> Result<Report> {
    let report = input.into_report(Uuid::new_v4(), Utc::now());
    self.insert(&report).await?;
    Ok(report)
  }

  async fn get(&self, kind: ReportKind, id: Uuid) -> Result<Option<Report>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                select_columns(kind),
                table(kind)
              ),
              rusqlite::params![id_str],
              RawReport::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_report(kind)).transpose()
  }

  async fn list_all(&self, kind: ReportKind) -> Result<Vec<Report>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM {} ORDER BY rowid",
          select_columns(kind),
          table(kind)
        ))?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_report(kind)).collect()
  }

  async fn update_status(
    &self,
    kind:   ReportKind,
    id:     Uuid,
    status: Status,
  ) -> Result<Option<Report>> {
    if !kind.accepts(status) {
      return Err(
        relief_core::Error::InvalidStatus { kind, status: status.to_string() }.into(),
      );
    }

    let id_str     = encode_uuid(id);
    let status_str = encode_status(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE {} SET status = ?1 WHERE id = ?2", table(kind)),
          rusqlite::params![status_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get(kind, id).await
  }
}
