//! Error types for `relief-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{report::ReportKind, submission::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("location out of range: lat {lat}, lng {lng}")]
  InvalidLocation { lat: f64, lng: f64 },

  #[error("permission denied: this role may not transition {kind} records")]
  PermissionDenied { kind: ReportKind },

  #[error("{kind} {id} is already in its terminal status")]
  AlreadyTerminal { kind: ReportKind, id: Uuid },

  #[error("unknown report kind: {0:?}")]
  InvalidReportKind(String),

  #[error("status {status:?} is not part of the {kind} lifecycle")]
  InvalidStatus { kind: ReportKind, status: String },

  #[error("{kind} {id} not found")]
  ReportNotFound { kind: ReportKind, id: Uuid },

  #[error("authentication required")]
  Unauthenticated,

  #[error("session is still being resolved")]
  SessionPending,

  #[error("report store unavailable: {0}")]
  StoreUnavailable(String),

  #[error("identity provider unavailable: {0}")]
  AuthUnavailable(String),
}

impl Error {
  /// A retried transition that reports `AlreadyTerminal` has, in effect,
  /// succeeded: the record is in the state the caller asked for.
  pub fn is_already_terminal(&self) -> bool {
    matches!(self, Self::AlreadyTerminal { .. })
  }

  /// Transient failures of an external collaborator.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::StoreUnavailable(_) | Self::AuthUnavailable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
