//! JSON REST API for relief coordination.
//!
//! Exposes an axum [`Router`] backed by any [`ReportStore`] and
//! [`SessionProvider`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `POST` | `/reports/{kind}` | none |
//! | `GET`  | `/reports/{kind}` | none |
//! | `GET`  | `/reports/{kind}/{id}` | none |
//! | `POST` | `/reports/{kind}/{id}/transition` | resolved actor with the kind's role |
//! | `POST` | `/sos` | none |
//! | `GET`  | `/dashboard` | resolved actor |
//! | `GET`  | `/map` | none |
//! | `GET`  | `/session` | optional |
//!
//! `{kind}` is one of `missing_person`, `damage_report`, `supply_request` or
//! `sos_alert`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", relief_api::api_router(state))
//! ```

pub mod dashboard;
pub mod error;
pub mod map;
pub mod reports;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use relief_core::{session::SessionProvider, store::ReportStore};

pub use error::ApiError;

/// Shared state threaded through every handler.
pub struct AppState<S, P> {
  pub store:    Arc<S>,
  pub sessions: Arc<P>,
}

impl<S, P> AppState<S, P> {
  pub fn new(store: Arc<S>, sessions: Arc<P>) -> Self { Self { store, sessions } }
}

// Derived `Clone` would demand `S: Clone` and `P: Clone`.
impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), sessions: Arc::clone(&self.sessions) }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(state: AppState<S, P>) -> Router<()>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  Router::new()
    // Reports
    .route(
      "/reports/{kind}",
      get(reports::list::<S, P>).post(reports::create::<S, P>),
    )
    .route("/reports/{kind}/{id}", get(reports::get_one::<S, P>))
    .route(
      "/reports/{kind}/{id}/transition",
      post(reports::transition_one::<S, P>),
    )
    .route("/sos", post(reports::sos::<S, P>))
    // Views
    .route("/dashboard", get(dashboard::handler::<S, P>))
    .route("/map", get(map::handler::<S, P>))
    .route("/session", get(session::handler::<S, P>))
    .with_state(state)
}
