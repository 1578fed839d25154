//! The coordinator dashboard: summary counts, role-gated action rows and the
//! marker overview, derived from one fresh snapshot per request.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  lifecycle::{can_transition, is_open},
  marker::{Marker, MarkerFilter, aggregate},
  report::{Record, Report, ReportKind, ReportSet},
  session::Actor,
};

/// Headline numbers shown above the tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub missing_open:   usize,
  /// Damage reports have no status, so every one counts.
  pub damage_total:   usize,
  pub supply_pending: usize,
  pub sos_active:     usize,
}

impl Summary {
  pub fn of(reports: &ReportSet) -> Self {
    Self {
      missing_open:   reports.missing_persons.iter().filter(|r| is_open(*r)).count(),
      damage_total:   reports.damage_reports.len(),
      supply_pending: reports.supply_requests.iter().filter(|r| is_open(*r)).count(),
      sos_active:     reports.sos_alerts.iter().filter(|r| is_open(*r)).count(),
    }
  }
}

/// A transition the current actor may trigger on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
  pub kind:  ReportKind,
  pub id:    Uuid,
  pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
  pub report: Report,
  pub open:   bool,
  /// Present only when the record is open and the actor's role may
  /// transition its kind.
  pub action: Option<Action>,
}

impl Row {
  fn new(report: Report, actor: &Actor) -> Self {
    let kind = report.kind();
    let open = is_open(&report);
    let action = (open && kind.lifecycle().is_some() && can_transition(actor.role, kind))
      .then(|| kind.action_label())
      .flatten()
      .map(|label| Action { kind, id: report.id(), label });
    Self { report, open, action }
  }
}

/// A collection that could not be fetched; its section renders empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
  pub kind:    ReportKind,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub actor:    Actor,
  pub summary:  Summary,
  pub rows:     Vec<Row>,
  pub markers:  Vec<Marker>,
  pub failures: Vec<FetchFailure>,
}

impl Dashboard {
  pub fn build(actor: Actor, reports: ReportSet, failures: Vec<FetchFailure>) -> Self {
    let summary = Summary::of(&reports);
    let markers = aggregate(&reports, &MarkerFilter::default());
    let rows = reports.into_reports().map(|r| Row::new(r, &actor)).collect();
    Self { actor, summary, rows, markers, failures }
  }

  /// Rows of one kind, in source order.
  pub fn tab(&self, kind: ReportKind) -> impl Iterator<Item = &Row> {
    self.rows.iter().filter(move |row| row.report.kind() == kind)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    lifecycle::transition,
    report::{Location, NewReport, NewSosAlert, NewSupplyRequest, Level},
    session::Role,
  };

  fn actor(role: Option<Role>) -> Actor {
    Actor { id: "u1".into(), display_name: "Responder".into(), role }
  }

  fn reports() -> ReportSet {
    let loc = Location::new(0.0, 0.0).unwrap();
    let supply = NewReport::SupplyRequest(NewSupplyRequest {
      supply_type:  "water".into(),
      quantity:     5,
      urgency:      Level::High,
      description:  String::new(),
      contact_info: "x".into(),
      location:     loc,
    });
    let sos = NewReport::SosAlert(NewSosAlert::emergency(loc));
    let resolved = transition(
      sos.clone().into_report(Uuid::new_v4(), Utc::now()),
      Some(Role::Sar),
    )
    .unwrap();
    [
      supply.into_report(Uuid::new_v4(), Utc::now()),
      sos.into_report(Uuid::new_v4(), Utc::now()),
      resolved,
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn summary_counts_open_records() {
    let summary = Summary::of(&reports());
    assert_eq!(summary, Summary {
      missing_open:   0,
      damage_total:   0,
      supply_pending: 1,
      sos_active:     1,
    });
  }

  #[test]
  fn ngo_sees_only_supply_actions() {
    let dash = Dashboard::build(actor(Some(Role::Ngo)), reports(), Vec::new());
    let actions: Vec<&Action> = dash.rows.iter().filter_map(|r| r.action.as_ref()).collect();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ReportKind::SupplyRequest);
    assert_eq!(actions[0].label, "Mark as Fulfilled");
  }

  #[test]
  fn sar_gets_no_action_on_resolved_alert() {
    let dash = Dashboard::build(actor(Some(Role::Sar)), reports(), Vec::new());
    let sos: Vec<&Row> = dash.tab(ReportKind::SosAlert).collect();
    assert_eq!(sos.len(), 2);
    assert_eq!(sos.iter().filter(|r| r.action.is_some()).count(), 1);
    assert!(sos.iter().all(|r| r.action.is_some() == r.open));
  }

  #[test]
  fn roleless_actor_gets_no_actions() {
    let dash = Dashboard::build(actor(None), reports(), Vec::new());
    assert!(dash.rows.iter().all(|r| r.action.is_none()));
    assert_eq!(dash.markers.len(), 2);
  }
}
