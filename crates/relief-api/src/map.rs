//! `GET /map` — markers for every enabled category, e.g.
//! `/map?damage=false&supply=false`.

use axum::{
  Json,
  extract::{Query, State},
};
use relief_core::{
  dashboard::FetchFailure,
  marker::{Marker, MarkerFilter, aggregate},
  session::SessionProvider,
  store::ReportStore,
};
use serde::Serialize;

use crate::{AppState, dashboard::refresh, error::ApiError};

/// Markers plus the collections that could not be read. An unreadable
/// collection contributes no pins.
#[derive(Debug, Serialize)]
pub struct MapView {
  pub markers:  Vec<Marker>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub failures: Vec<FetchFailure>,
}

pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(filter): Query<MarkerFilter>,
) -> Result<Json<MapView>, ApiError>
where
  S: ReportStore + 'static,
  P: SessionProvider + 'static,
{
  let snapshot = refresh(&*state.store).await;
  Ok(Json(MapView {
    markers:  aggregate(&snapshot.reports, &filter),
    failures: snapshot.failures,
  }))
}
