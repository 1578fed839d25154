//! Handlers for `/reports` and `/sos`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reports/{kind}` | Body: [`SubmissionForm`]; returns 201 + stored record |
//! | `GET`  | `/reports/{kind}` | Full listing; `?open_only=true` drops terminal records |
//! | `GET`  | `/reports/{kind}/{id}` | Single record |
//! | `POST` | `/reports/{kind}/{id}/transition` | Resolved session required |
//! | `POST` | `/sos` | Body: `{"lat":..,"lng":..}`; one-tap emergency alert |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use relief_core::{
  Error as CoreError,
  lifecycle::{self, can_transition, is_open},
  report::{Location, NewReport, NewSosAlert, Record, Report, ReportKind},
  session::SessionProvider,
  store::ReportStore,
  submission::{self, SubmissionForm},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, session::RequestSession};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /reports/{kind}` — validates the form, then returns 201 + the stored
/// record. Field errors come back as 422 with a `fields` map.
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  Path(kind): Path<String>,
  body: Result<Json<SubmissionForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let kind: ReportKind = kind.parse()?;
  let Json(form) = body?;
  let report = submission::submit(&*state.store, kind, &form)
    .await
    .inspect_err(|e| {
      if e.is_transient() {
        tracing::warn!(%kind, error = %e, "submission failed");
      }
    })?;

  tracing::info!(%kind, id = %report.id(), "report submitted");
  Ok((StatusCode::CREATED, Json(report)))
}

/// `POST /sos` — the one-tap alert, located by the sender's device.
pub async fn sos<S, P>(
  State(state): State<AppState<S, P>>,
  body: Result<Json<Location>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let Json(location) = body?;
  let alert = state
    .store
    .create(NewReport::SosAlert(NewSosAlert::emergency(location)))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::warn!(id = %alert.id(), lat = location.lat(), lng = location.lng(), "SOS received");
  Ok((StatusCode::CREATED, Json(alert)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, omit records that reached their terminal status.
  #[serde(default)]
  pub open_only: bool,
}

/// A listing that fails open: when the store cannot be read the collection is
/// empty and `error` says why.
#[derive(Debug, Serialize)]
pub struct Listing {
  pub reports: Vec<Report>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

/// `GET /reports/{kind}[?open_only=true]`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  Path(kind): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Listing>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let kind: ReportKind = kind.parse()?;

  let listing = match state.store.list_all(kind).await {
    Ok(mut reports) => {
      if params.open_only {
        reports.retain(|r| is_open(r));
      }
      Listing { reports, error: None }
    }
    Err(e) => {
      tracing::warn!(%kind, error = %e, "listing failed; serving an empty collection");
      Listing { reports: Vec::new(), error: Some(e.to_string()) }
    }
  };

  Ok(Json(listing))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /reports/{kind}/{id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Report>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let kind: ReportKind = kind.parse()?;
  let report = state
    .store
    .get(kind, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::ReportNotFound { kind, id })?;
  Ok(Json(report))
}

// ─── Transition ───────────────────────────────────────────────────────────────

/// `POST /reports/{kind}/{id}/transition` — move the record to its terminal
/// status on behalf of the authenticated actor.
///
/// The role is checked before the record is loaded, so callers without the
/// capability learn nothing about which ids exist.
pub async fn transition_one<S, P>(
  State(state): State<AppState<S, P>>,
  Path((kind, id)): Path<(String, Uuid)>,
  RequestSession(session): RequestSession,
) -> Result<Json<Report>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let kind: ReportKind = kind.parse()?;
  let actor = session.require_actor()?;
  if !can_transition(actor.role, kind) {
    return Err(CoreError::PermissionDenied { kind }.into());
  }

  let current = state
    .store
    .get(kind, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::ReportNotFound { kind, id })?;

  let next = lifecycle::transition(current, actor.role).inspect_err(|e| {
    tracing::info!(%kind, %id, actor = %actor.id, error = %e, "transition rejected");
  })?;
  let status = next
    .status()
    .ok_or_else(|| ApiError::BadRequest(format!("{kind} records have no status")))?;

  let stored = state
    .store
    .update_status(kind, id, status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::ReportNotFound { kind, id })?;

  tracing::info!(%kind, %id, %status, actor = %actor.id, "report transitioned");
  Ok(Json(stored))
}
