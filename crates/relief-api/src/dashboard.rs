//! `GET /dashboard` — the coordinator view, rebuilt from a fresh snapshot on
//! every request.

use axum::{Json, extract::State};
use relief_core::{
  dashboard::{Dashboard, FetchFailure},
  report::{Report, ReportKind, ReportSet},
  session::SessionProvider,
  store::ReportStore,
};

use crate::{AppState, error::ApiError, session::RequestSession};

/// One snapshot of all four collections. A collection that fails to load is
/// recorded in `failures` and contributes nothing to `reports`.
#[derive(Debug, Default)]
pub struct Refresh {
  pub reports:  ReportSet,
  pub failures: Vec<FetchFailure>,
}

impl Refresh {
  fn absorb<E: std::fmt::Display>(
    &mut self,
    kind: ReportKind,
    fetched: Result<Vec<Report>, E>,
  ) {
    match fetched {
      Ok(reports) => self.reports.extend(reports),
      Err(e) => {
        tracing::warn!(%kind, error = %e, "collection unavailable");
        self.failures.push(FetchFailure { kind, message: e.to_string() });
      }
    }
  }
}

/// Fetch the four collections concurrently. Never fails as a whole.
pub async fn refresh<S: ReportStore>(store: &S) -> Refresh {
  let (missing, damage, supply, sos) = tokio::join!(
    store.list_all(ReportKind::MissingPerson),
    store.list_all(ReportKind::DamageReport),
    store.list_all(ReportKind::SupplyRequest),
    store.list_all(ReportKind::SosAlert),
  );

  let mut refresh = Refresh::default();
  refresh.absorb(ReportKind::MissingPerson, missing);
  refresh.absorb(ReportKind::DamageReport, damage);
  refresh.absorb(ReportKind::SupplyRequest, supply);
  refresh.absorb(ReportKind::SosAlert, sos);
  refresh
}

pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  RequestSession(session): RequestSession,
) -> Result<Json<Dashboard>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let actor = session.require_actor()?.clone();
  let Refresh { reports, failures } = refresh(&*state.store).await;
  Ok(Json(Dashboard::build(actor, reports, failures)))
}
