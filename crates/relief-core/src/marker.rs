//! Projection of the four report collections into one set of map markers.
//!
//! The aggregator is a pure function of its inputs: it performs no I/O and
//! can be exercised without a live store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  lifecycle::is_open,
  report::{Location, ReportKind, ReportSet},
};

/// Category tag of a marker; one per report kind.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerCategory {
  Missing,
  Damage,
  Supply,
  Sos,
}

impl MarkerCategory {
  pub fn of(kind: ReportKind) -> Self {
    match kind {
      ReportKind::MissingPerson => Self::Missing,
      ReportKind::DamageReport => Self::Damage,
      ReportKind::SupplyRequest => Self::Supply,
      ReportKind::SosAlert => Self::Sos,
    }
  }

  /// Icon colour used by the map widget.
  pub fn color(self) -> &'static str {
    match self {
      Self::Missing => "blue",
      Self::Damage => "red",
      Self::Supply => "green",
      Self::Sos => "orange",
    }
  }
}

/// A map-displayable projection of one underlying record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
  /// `"{category}-{record id}"`; unique even when record ids collide across
  /// kinds.
  pub id:       String,
  pub position: Location,
  pub title:    String,
  pub category: MarkerCategory,
  pub color:    &'static str,
}

impl Marker {
  fn new(category: MarkerCategory, id: Uuid, position: Location, title: String) -> Self {
    Self {
      id: format!("{category}-{id}"),
      position,
      title,
      category,
      color: category.color(),
    }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

fn enabled() -> bool { true }

/// Per-category visibility. Every category is shown unless switched off;
/// deserialises from query parameters such as `?damage=false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerFilter {
  #[serde(default = "enabled")]
  pub missing: bool,
  #[serde(default = "enabled")]
  pub damage:  bool,
  #[serde(default = "enabled")]
  pub supply:  bool,
  #[serde(default = "enabled")]
  pub sos:     bool,
}

impl Default for MarkerFilter {
  fn default() -> Self {
    Self { missing: true, damage: true, supply: true, sos: true }
  }
}

impl MarkerFilter {
  pub fn is_enabled(&self, category: MarkerCategory) -> bool {
    match category {
      MarkerCategory::Missing => self.missing,
      MarkerCategory::Damage => self.damage,
      MarkerCategory::Supply => self.supply,
      MarkerCategory::Sos => self.sos,
    }
  }

  pub fn toggle(&mut self, category: MarkerCategory) {
    let flag = match category {
      MarkerCategory::Missing => &mut self.missing,
      MarkerCategory::Damage => &mut self.damage,
      MarkerCategory::Supply => &mut self.supply,
      MarkerCategory::Sos => &mut self.sos,
    };
    *flag = !*flag;
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Merge the four collections into markers, in source order within each
/// category. Missing persons, supply requests and SOS alerts appear only while
/// open; damage reports appear unconditionally. Disabled categories are
/// dropped entirely.
pub fn aggregate(reports: &ReportSet, filter: &MarkerFilter) -> Vec<Marker> {
  let mut markers = Vec::new();

  if filter.missing {
    markers.extend(reports.missing_persons.iter().filter(|r| is_open(*r)).map(|r| {
      Marker::new(MarkerCategory::Missing, r.id, r.location, format!("Missing: {}", r.name))
    }));
  }

  if filter.damage {
    markers.extend(reports.damage_reports.iter().map(|r| {
      Marker::new(
        MarkerCategory::Damage,
        r.id,
        r.location,
        format!("Damage: {} ({})", r.damage_type, r.severity),
      )
    }));
  }

  if filter.supply {
    markers.extend(reports.supply_requests.iter().filter(|r| is_open(*r)).map(|r| {
      Marker::new(
        MarkerCategory::Supply,
        r.id,
        r.location,
        format!("Supply Request: {} ({})", r.supply_type, r.urgency),
      )
    }));
  }

  if filter.sos {
    markers.extend(reports.sos_alerts.iter().filter(|r| is_open(*r)).map(|r| {
      Marker::new(MarkerCategory::Sos, r.id, r.location, format!("SOS: {}", r.name))
    }));
  }

  markers
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::Utc;

  use super::*;
  use crate::report::{DamageReport, Level, MissingPerson, SosAlert, Status, SupplyRequest};

  fn loc() -> Location { Location::new(40.7128, -74.006).unwrap() }

  fn missing(id: Uuid, name: &str, status: Status) -> MissingPerson {
    MissingPerson {
      id,
      name: name.into(),
      age: 40,
      gender: "male".into(),
      last_seen: "market".into(),
      description: String::new(),
      contact_info: "555".into(),
      location: loc(),
      status,
      reported_at: Utc::now(),
    }
  }

  fn damage(id: Uuid) -> DamageReport {
    DamageReport {
      id,
      damage_type: "building".into(),
      severity: Level::High,
      description: "roof gone".into(),
      location: loc(),
      reported_at: Utc::now(),
    }
  }

  fn supply(id: Uuid, status: Status) -> SupplyRequest {
    SupplyRequest {
      id,
      supply_type: "water".into(),
      quantity: 5,
      urgency: Level::High,
      description: String::new(),
      contact_info: "555".into(),
      location: loc(),
      status,
      reported_at: Utc::now(),
    }
  }

  fn sos(id: Uuid, status: Status) -> SosAlert {
    SosAlert {
      id,
      name: "Emergency SOS".into(),
      contact_info: "555".into(),
      description: "help".into(),
      location: loc(),
      status,
      reported_at: Utc::now(),
    }
  }

  fn mixed() -> ReportSet {
    ReportSet {
      missing_persons: vec![
        missing(Uuid::new_v4(), "Ada", Status::Missing),
        missing(Uuid::new_v4(), "Bo", Status::Found),
      ],
      damage_reports:  vec![damage(Uuid::new_v4())],
      supply_requests: vec![
        supply(Uuid::new_v4(), Status::Pending),
        supply(Uuid::new_v4(), Status::Fulfilled),
      ],
      sos_alerts:      vec![
        sos(Uuid::new_v4(), Status::Active),
        sos(Uuid::new_v4(), Status::Resolved),
      ],
    }
  }

  fn count(markers: &[Marker], category: MarkerCategory) -> usize {
    markers.iter().filter(|m| m.category == category).count()
  }

  #[test]
  fn only_open_records_and_all_damage() {
    let markers = aggregate(&mixed(), &MarkerFilter::default());
    assert_eq!(markers.len(), 4);
    for category in [
      MarkerCategory::Missing,
      MarkerCategory::Damage,
      MarkerCategory::Supply,
      MarkerCategory::Sos,
    ] {
      assert_eq!(count(&markers, category), 1, "{category}");
    }
  }

  #[test]
  fn titles_follow_category_format() {
    let markers = aggregate(&mixed(), &MarkerFilter::default());
    let titles: Vec<&str> = markers.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, [
      "Missing: Ada",
      "Damage: building (high)",
      "Supply Request: water (high)",
      "SOS: Emergency SOS",
    ]);
  }

  #[test]
  fn disabling_a_category_removes_only_that_category() {
    let reports = mixed();
    let all = aggregate(&reports, &MarkerFilter::default());
    for category in [
      MarkerCategory::Missing,
      MarkerCategory::Damage,
      MarkerCategory::Supply,
      MarkerCategory::Sos,
    ] {
      let mut filter = MarkerFilter::default();
      filter.toggle(category);
      assert!(!filter.is_enabled(category));

      let filtered = aggregate(&reports, &filter);
      assert_eq!(count(&filtered, category), 0);
      let expected: Vec<&Marker> = all.iter().filter(|m| m.category != category).collect();
      let actual: Vec<&Marker> = filtered.iter().collect();
      assert_eq!(actual, expected);
    }
  }

  #[test]
  fn ids_are_unique_across_colliding_sources() {
    let shared = Uuid::new_v4();
    let reports = ReportSet {
      missing_persons: vec![missing(shared, "Ada", Status::Missing)],
      damage_reports:  vec![damage(shared)],
      supply_requests: vec![supply(shared, Status::Pending)],
      sos_alerts:      vec![sos(shared, Status::Active)],
    };
    let markers = aggregate(&reports, &MarkerFilter::default());
    assert_eq!(markers.len(), 4);
    let ids: HashSet<&str> = markers.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(format!("supply-{shared}").as_str()));
  }

  #[test]
  fn supply_markers_are_green() {
    let markers = aggregate(&mixed(), &MarkerFilter::default());
    let supply = markers.iter().find(|m| m.category == MarkerCategory::Supply).unwrap();
    assert_eq!(supply.color, "green");
  }

  #[test]
  fn empty_input_yields_no_markers() {
    assert!(aggregate(&ReportSet::default(), &MarkerFilter::default()).is_empty());
  }

  #[test]
  fn filter_defaults_missing_query_fields_to_enabled() {
    let filter: MarkerFilter = serde_json::from_str(r#"{"damage":false}"#).unwrap();
    assert_eq!(filter, MarkerFilter { missing: true, damage: false, supply: true, sos: true });
  }
}
