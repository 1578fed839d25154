//! The `ReportStore` trait.
//!
//! Implemented by storage backends (e.g. `relief-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::report::{NewReport, Report, ReportKind, Status};

/// Abstraction over the authoritative record store.
///
/// Each kind lives in its own collection; ids are only unique within a kind.
/// Records are never deleted. The only mutation after creation is a status
/// write, and concurrent writers resolve last-writer-wins.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReportStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record. The store assigns the id, the `reported_at`
  /// timestamp and the kind's initial status.
  fn create(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  /// Retrieve a record by kind and id. Returns `None` if not found.
  fn get(
    &self,
    kind: ReportKind,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  /// Every record of `kind`, in insertion order, regardless of status.
  fn list_all(
    &self,
    kind: ReportKind,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  /// Overwrite the status of one record and return the updated record, or
  /// `None` if it does not exist. Fails if `status` is not part of the kind's
  /// lifecycle.
  fn update_status(
    &self,
    kind: ReportKind,
    id: Uuid,
    status: Status,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;
}
