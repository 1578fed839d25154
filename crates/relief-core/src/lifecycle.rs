//! Status lifecycles and the rules for who may advance them.
//!
//! Each report kind with a status has exactly two states: an initial "open"
//! status and a terminal one. Transitions are one-way. Damage reports have no
//! lifecycle and can never be transitioned.

use serde::Serialize;

use crate::{
  Error, Result,
  report::{Record, Report, ReportKind, Status},
  session::Role,
};

// ─── Lifecycle table ─────────────────────────────────────────────────────────

/// The two states a report kind moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
  pub initial:  Status,
  pub terminal: Status,
}

impl ReportKind {
  /// `None` for kinds that are terminal on creation.
  pub fn lifecycle(self) -> Option<Lifecycle> {
    let (initial, terminal) = match self {
      Self::MissingPerson => (Status::Missing, Status::Found),
      Self::SupplyRequest => (Status::Pending, Status::Fulfilled),
      Self::SosAlert => (Status::Active, Status::Resolved),
      Self::DamageReport => return None,
    };
    Some(Lifecycle { initial, terminal })
  }

  /// Whether `status` is one of this kind's lifecycle states.
  pub fn accepts(self, status: Status) -> bool {
    self
      .lifecycle()
      .is_some_and(|l| status == l.initial || status == l.terminal)
  }

  /// The role allowed to move this kind to its terminal status.
  pub fn transition_role(self) -> Option<Role> {
    match self {
      Self::MissingPerson | Self::SosAlert => Some(Role::Sar),
      Self::SupplyRequest => Some(Role::Ngo),
      Self::DamageReport => None,
    }
  }

  /// Button label for the transition action.
  pub fn action_label(self) -> Option<&'static str> {
    match self {
      Self::MissingPerson => Some("Mark as Found"),
      Self::SupplyRequest => Some("Mark as Fulfilled"),
      Self::SosAlert => Some("Mark as Resolved"),
      Self::DamageReport => None,
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// A record is open until it reaches its terminal status. Damage reports are
/// always open: they are counted in totals but never closed.
pub fn is_open(record: &impl Record) -> bool {
  match (record.kind().lifecycle(), record.status()) {
    (Some(lifecycle), Some(status)) => status != lifecycle.terminal,
    _ => true,
  }
}

/// SAR may transition missing persons and SOS alerts, NGO may transition
/// supply requests. A missing role has no permissions.
pub fn can_transition(role: Option<Role>, kind: ReportKind) -> bool {
  role.is_some() && kind.transition_role() == role
}

/// Like [`can_transition`] but from raw names, as they arrive from a session
/// profile or a request path. Unknown roles resolve to no permissions; unknown
/// kinds are an error.
pub fn can_transition_named(role: &str, kind: &str) -> Result<bool> {
  let kind: ReportKind = kind.parse()?;
  Ok(can_transition(Role::parse(role), kind))
}

/// Move `report` to its terminal status on behalf of an actor holding `role`.
///
/// Only the status changes; the id, timestamp and content fields are returned
/// untouched. Re-transitioning a terminal record is rejected with
/// [`Error::AlreadyTerminal`] rather than silently accepted.
pub fn transition(mut report: Report, role: Option<Role>) -> Result<Report> {
  let kind = report.kind();
  let lifecycle = match kind.lifecycle() {
    Some(l) if can_transition(role, kind) => l,
    _ => return Err(Error::PermissionDenied { kind }),
  };

  if report.status() == Some(lifecycle.terminal) {
    return Err(Error::AlreadyTerminal { kind, id: report.id() });
  }

  report.set_status(lifecycle.terminal);
  Ok(report)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::report::{
    Level, Location, NewDamageReport, NewMissingPerson, NewReport, NewSosAlert,
    NewSupplyRequest,
  };

  fn loc() -> Location { Location::new(40.7128, -74.006).unwrap() }

  fn make(kind: ReportKind) -> Report {
    let new = match kind {
      ReportKind::MissingPerson => NewReport::MissingPerson(NewMissingPerson {
        name:         "Ada".into(),
        age:          34,
        gender:       "female".into(),
        last_seen:    "Riverside, Tuesday evening".into(),
        description:  String::new(),
        contact_info: "555-0100".into(),
        location:     loc(),
      }),
      ReportKind::DamageReport => NewReport::DamageReport(NewDamageReport {
        damage_type: "road".into(),
        severity:    Level::Low,
        description: "potholes".into(),
        location:    loc(),
      }),
      ReportKind::SupplyRequest => NewReport::SupplyRequest(NewSupplyRequest {
        supply_type:  "water".into(),
        quantity:     5,
        urgency:      Level::High,
        description:  String::new(),
        contact_info: "555-0101".into(),
        location:     loc(),
      }),
      ReportKind::SosAlert => NewReport::SosAlert(NewSosAlert::emergency(loc())),
    };
    new.into_report(Uuid::new_v4(), Utc::now())
  }

  #[test]
  fn fresh_records_are_open() {
    for kind in ReportKind::ALL {
      assert!(is_open(&make(kind)), "{kind} should start open");
    }
  }

  #[test]
  fn role_capabilities() {
    assert!(can_transition(Some(Role::Ngo), ReportKind::SupplyRequest));
    assert!(!can_transition(Some(Role::Ngo), ReportKind::MissingPerson));
    assert!(!can_transition(Some(Role::Ngo), ReportKind::SosAlert));
    assert!(can_transition(Some(Role::Sar), ReportKind::MissingPerson));
    assert!(can_transition(Some(Role::Sar), ReportKind::SosAlert));
    assert!(!can_transition(Some(Role::Sar), ReportKind::SupplyRequest));
    for role in [Some(Role::Ngo), Some(Role::Sar), None] {
      assert!(!can_transition(role, ReportKind::DamageReport));
    }
    for kind in ReportKind::ALL {
      assert!(!can_transition(None, kind));
    }
  }

  #[test]
  fn named_capabilities() {
    assert!(can_transition_named("ngo", "SupplyRequest").unwrap());
    assert!(!can_transition_named("ngo", "MissingPerson").unwrap());
    assert!(!can_transition_named("sar", "DamageReport").unwrap());
    assert!(!can_transition_named("volunteer", "sos_alert").unwrap());
    assert!(matches!(
      can_transition_named("sar", "shelter"),
      Err(Error::InvalidReportKind(_))
    ));
  }

  #[test]
  fn transition_sets_terminal_and_keeps_content() {
    let before = make(ReportKind::SupplyRequest);
    let after = transition(before.clone(), Some(Role::Ngo)).unwrap();
    assert_eq!(after.status(), Some(Status::Fulfilled));
    assert!(!is_open(&after));

    let (Report::SupplyRequest(b), Report::SupplyRequest(a)) = (&before, &after) else {
      panic!("kind changed");
    };
    assert_eq!(a.id, b.id);
    assert_eq!(a.reported_at, b.reported_at);
    assert_eq!(a.supply_type, b.supply_type);
    assert_eq!(a.quantity, b.quantity);
    assert_eq!(a.location, b.location);
  }

  #[test]
  fn second_transition_is_already_terminal() {
    let found = transition(make(ReportKind::MissingPerson), Some(Role::Sar)).unwrap();
    let err = transition(found.clone(), Some(Role::Sar)).unwrap_err();
    assert!(err.is_already_terminal());
    assert_eq!(found.status(), Some(Status::Found));
  }

  #[test]
  fn wrong_role_is_denied() {
    let err = transition(make(ReportKind::SosAlert), Some(Role::Ngo)).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { kind: ReportKind::SosAlert }));

    let err = transition(make(ReportKind::SosAlert), None).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
  }

  #[test]
  fn damage_reports_cannot_transition() {
    for role in [Some(Role::Ngo), Some(Role::Sar)] {
      let err = transition(make(ReportKind::DamageReport), role).unwrap_err();
      assert!(matches!(err, Error::PermissionDenied { kind: ReportKind::DamageReport }));
    }
  }

  #[test]
  fn accepts_only_own_states() {
    assert!(ReportKind::SosAlert.accepts(Status::Resolved));
    assert!(!ReportKind::SosAlert.accepts(Status::Found));
    assert!(!ReportKind::DamageReport.accepts(Status::Active));
  }
}
