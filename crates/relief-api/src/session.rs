//! Request-scoped session extraction.
//!
//! Credentials travel as HTTP Basic auth. The session is resolved once per
//! request against the configured [`SessionProvider`] and handed to handlers
//! explicitly.

use axum::{
  Json,
  extract::{FromRequestParts, Query, State},
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use relief_core::{
  session::{Credentials, Session, SessionProvider},
  store::ReportStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Parse `Authorization: Basic …`. A missing or malformed header yields
/// `None`, which resolves to an anonymous session.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
  let header_val = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = header_val.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some(Credentials { username: username.to_owned(), password: password.to_owned() })
}

/// The credentials presented with the request, if any.
pub struct RequestCredentials(pub Option<Credentials>);

impl<S> FromRequestParts<S> for RequestCredentials
where
  S: Send + Sync,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
    Ok(RequestCredentials(basic_credentials(&parts.headers)))
  }
}

/// A session resolved through the authoritative provider lookup.
pub struct RequestSession(pub Session);

impl<S, P> FromRequestParts<AppState<S, P>> for RequestSession
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let credentials = basic_credentials(&parts.headers);
    let mut session = Session::new();
    if let Err(e) = session.resolve(&*state.sessions, credentials.as_ref()).await {
      tracing::warn!(error = %e, "identity provider lookup failed");
      return Err(e.into());
    }
    Ok(RequestSession(session))
  }
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
  /// Answer from the provider's best-effort lookup without waiting for the
  /// authoritative one. The result is for display only.
  #[serde(default)]
  pub provisional: bool,
}

/// `GET /session[?provisional=true]`
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<SessionParams>,
  RequestCredentials(credentials): RequestCredentials,
) -> Result<Json<Session>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let mut session = Session::new();
  match (&credentials, params.provisional) {
    (Some(c), true) => session.begin(state.sessions.current_actor_best_effort(c)),
    _ => {
      session.resolve(&*state.sessions, credentials.as_ref()).await?;
    }
  }
  Ok(Json(session))
}
