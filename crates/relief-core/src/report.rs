//! Report types — the four independent record kinds citizens can submit.
//!
//! Missing persons, damage reports, supply requests and SOS alerts share no
//! relationships; they are unified only when projected for display. Every
//! record carries a store-assigned id and `reported_at` timestamp that callers
//! never supply.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Report kind ─────────────────────────────────────────────────────────────

/// One of the four record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
  MissingPerson,
  DamageReport,
  SupplyRequest,
  SosAlert,
}

impl ReportKind {
  pub const ALL: [ReportKind; 4] = [
    Self::MissingPerson,
    Self::DamageReport,
    Self::SupplyRequest,
    Self::SosAlert,
  ];

  /// The name used in URLs, in the database and on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::MissingPerson => "missing_person",
      Self::DamageReport => "damage_report",
      Self::SupplyRequest => "supply_request",
      Self::SosAlert => "sos_alert",
    }
  }
}

impl fmt::Display for ReportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ReportKind {
  type Err = Error;

  /// Accepts the snake_case wire name as well as the type name
  /// (`"supply_request"` or `"SupplyRequest"`).
  fn from_str(s: &str) -> Result<Self> {
    match s {
      "missing_person" | "MissingPerson" => Ok(Self::MissingPerson),
      "damage_report" | "DamageReport" => Ok(Self::DamageReport),
      "supply_request" | "SupplyRequest" => Ok(Self::SupplyRequest),
      "sos_alert" | "SosAlert" | "SOSAlert" => Ok(Self::SosAlert),
      other => Err(Error::InvalidReportKind(other.to_owned())),
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// The status vocabulary shared by every lifecycle. Which values are legal for
/// a given kind is decided by [`ReportKind::lifecycle`](crate::lifecycle).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  Missing,
  Found,
  Pending,
  Fulfilled,
  Active,
  Resolved,
}

/// Severity of damage, or urgency of a supply request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Level {
  Low,
  #[default]
  Medium,
  High,
}

// ─── Location ────────────────────────────────────────────────────────────────

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Coordinates")]
pub struct Location {
  lat: f64,
  lng: f64,
}

/// A latitude/longitude pair exactly as submitted, before range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

impl Location {
  /// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`.
  pub fn new(lat: f64, lng: f64) -> Result<Self> {
    let valid = lat.is_finite()
      && lng.is_finite()
      && (-90.0..=90.0).contains(&lat)
      && (-180.0..=180.0).contains(&lng);
    if valid {
      Ok(Self { lat, lng })
    } else {
      Err(Error::InvalidLocation { lat, lng })
    }
  }

  pub fn lat(&self) -> f64 { self.lat }

  pub fn lng(&self) -> f64 { self.lng }
}

impl TryFrom<Coordinates> for Location {
  type Error = Error;

  fn try_from(raw: Coordinates) -> Result<Self> { Self::new(raw.lat, raw.lng) }
}

impl From<Location> for Coordinates {
  fn from(location: Location) -> Self { Self { lat: location.lat, lng: location.lng } }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingPerson {
  pub id:           Uuid,
  pub name:         String,
  pub age:          u32,
  pub gender:       String,
  /// When and where the person was last seen, as described by the reporter.
  pub last_seen:    String,
  pub description:  String,
  pub contact_info: String,
  pub location:     Location,
  pub status:       Status,
  pub reported_at:  DateTime<Utc>,
}

/// Damage reports have no status; they are final once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
  pub id:          Uuid,
  pub damage_type: String,
  pub severity:    Level,
  pub description: String,
  pub location:    Location,
  pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyRequest {
  pub id:           Uuid,
  pub supply_type:  String,
  pub quantity:     u32,
  pub urgency:      Level,
  pub description:  String,
  pub contact_info: String,
  pub location:     Location,
  pub status:       Status,
  pub reported_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosAlert {
  pub id:           Uuid,
  pub name:         String,
  pub contact_info: String,
  pub description:  String,
  pub location:     Location,
  pub status:       Status,
  pub reported_at:  DateTime<Utc>,
}

/// Accessors shared by every record kind and by [`Report`] itself.
pub trait Record {
  fn kind(&self) -> ReportKind;
  fn id(&self) -> Uuid;
  fn location(&self) -> Location;
  fn reported_at(&self) -> DateTime<Utc>;
  /// `None` for kinds without a lifecycle.
  fn status(&self) -> Option<Status>;
}

macro_rules! impl_record {
  ($ty:ty, $kind:expr, |$s:ident| $status:expr) => {
    impl Record for $ty {
      fn kind(&self) -> ReportKind { $kind }

      fn id(&self) -> Uuid { self.id }

      fn location(&self) -> Location { self.location }

      fn reported_at(&self) -> DateTime<Utc> { self.reported_at }

      fn status(&self) -> Option<Status> {
        let $s = self;
        $status
      }
    }
  };
}

impl_record!(MissingPerson, ReportKind::MissingPerson, |r| Some(r.status));
impl_record!(DamageReport, ReportKind::DamageReport, |_r| None);
impl_record!(SupplyRequest, ReportKind::SupplyRequest, |r| Some(r.status));
impl_record!(SosAlert, ReportKind::SosAlert, |r| Some(r.status));

// ─── Report ──────────────────────────────────────────────────────────────────

/// Any stored record, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
  MissingPerson(MissingPerson),
  DamageReport(DamageReport),
  SupplyRequest(SupplyRequest),
  SosAlert(SosAlert),
}

impl Report {
  fn as_record(&self) -> &dyn Record {
    match self {
      Self::MissingPerson(r) => r,
      Self::DamageReport(r) => r,
      Self::SupplyRequest(r) => r,
      Self::SosAlert(r) => r,
    }
  }

  /// Overwrite the status field. Returns `false` for kinds without a status.
  pub(crate) fn set_status(&mut self, status: Status) -> bool {
    match self {
      Self::MissingPerson(r) => r.status = status,
      Self::SupplyRequest(r) => r.status = status,
      Self::SosAlert(r) => r.status = status,
      Self::DamageReport(_) => return false,
    }
    true
  }
}

impl Record for Report {
  fn kind(&self) -> ReportKind { self.as_record().kind() }

  fn id(&self) -> Uuid { self.as_record().id() }

  fn location(&self) -> Location { self.as_record().location() }

  fn reported_at(&self) -> DateTime<Utc> { self.as_record().reported_at() }

  fn status(&self) -> Option<Status> { self.as_record().status() }
}

// ─── New reports ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReportStore::create`]. Id, timestamp and initial
/// status are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMissingPerson {
  pub name:         String,
  pub age:          u32,
  pub gender:       String,
  pub last_seen:    String,
  pub description:  String,
  pub contact_info: String,
  pub location:     Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDamageReport {
  pub damage_type: String,
  pub severity:    Level,
  pub description: String,
  pub location:    Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSupplyRequest {
  pub supply_type:  String,
  pub quantity:     u32,
  pub urgency:      Level,
  pub description:  String,
  pub contact_info: String,
  pub location:     Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSosAlert {
  pub name:         String,
  pub contact_info: String,
  pub description:  String,
  pub location:     Location,
}

impl NewSosAlert {
  /// The alert sent by the one-tap SOS button, located by the device.
  pub fn emergency(location: Location) -> Self {
    Self {
      name: "Emergency SOS".into(),
      contact_info: "Emergency Contact".into(),
      description: "Emergency SOS signal sent from mobile device".into(),
      location,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewReport {
  MissingPerson(NewMissingPerson),
  DamageReport(NewDamageReport),
  SupplyRequest(NewSupplyRequest),
  SosAlert(NewSosAlert),
}

impl NewReport {
  pub fn kind(&self) -> ReportKind {
    match self {
      Self::MissingPerson(_) => ReportKind::MissingPerson,
      Self::DamageReport(_) => ReportKind::DamageReport,
      Self::SupplyRequest(_) => ReportKind::SupplyRequest,
      Self::SosAlert(_) => ReportKind::SosAlert,
    }
  }

  /// Materialise the stored record from store-assigned metadata. The status
  /// is the kind's initial status.
  pub fn into_report(self, id: Uuid, reported_at: DateTime<Utc>) -> Report {
    match self {
      Self::MissingPerson(n) => Report::MissingPerson(MissingPerson {
        id,
        name: n.name,
        age: n.age,
        gender: n.gender,
        last_seen: n.last_seen,
        description: n.description,
        contact_info: n.contact_info,
        location: n.location,
        status: Status::Missing,
        reported_at,
      }),
      Self::DamageReport(n) => Report::DamageReport(DamageReport {
        id,
        damage_type: n.damage_type,
        severity: n.severity,
        description: n.description,
        location: n.location,
        reported_at,
      }),
      Self::SupplyRequest(n) => Report::SupplyRequest(SupplyRequest {
        id,
        supply_type: n.supply_type,
        quantity: n.quantity,
        urgency: n.urgency,
        description: n.description,
        contact_info: n.contact_info,
        location: n.location,
        status: Status::Pending,
        reported_at,
      }),
      Self::SosAlert(n) => Report::SosAlert(SosAlert {
        id,
        name: n.name,
        contact_info: n.contact_info,
        description: n.description,
        location: n.location,
        status: Status::Active,
        reported_at,
      }),
    }
  }
}

// ─── ReportSet ───────────────────────────────────────────────────────────────

/// A snapshot of the four collections, each in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSet {
  pub missing_persons: Vec<MissingPerson>,
  pub damage_reports:  Vec<DamageReport>,
  pub supply_requests: Vec<SupplyRequest>,
  pub sos_alerts:      Vec<SosAlert>,
}

impl ReportSet {
  pub fn push(&mut self, report: Report) {
    match report {
      Report::MissingPerson(r) => self.missing_persons.push(r),
      Report::DamageReport(r) => self.damage_reports.push(r),
      Report::SupplyRequest(r) => self.supply_requests.push(r),
      Report::SosAlert(r) => self.sos_alerts.push(r),
    }
  }

  /// Number of records of `kind`, regardless of status.
  pub fn count(&self, kind: ReportKind) -> usize {
    match kind {
      ReportKind::MissingPerson => self.missing_persons.len(),
      ReportKind::DamageReport => self.damage_reports.len(),
      ReportKind::SupplyRequest => self.supply_requests.len(),
      ReportKind::SosAlert => self.sos_alerts.len(),
    }
  }

  /// All records, grouped by kind in [`ReportKind::ALL`] order.
  pub fn into_reports(self) -> impl Iterator<Item = Report> {
    let missing = self.missing_persons.into_iter().map(Report::MissingPerson);
    let damage = self.damage_reports.into_iter().map(Report::DamageReport);
    let supply = self.supply_requests.into_iter().map(Report::SupplyRequest);
    let sos = self.sos_alerts.into_iter().map(Report::SosAlert);
    missing.chain(damage).chain(supply).chain(sos)
  }
}

impl Extend<Report> for ReportSet {
  fn extend<I: IntoIterator<Item = Report>>(&mut self, iter: I) {
    for report in iter {
      self.push(report);
    }
  }
}

impl FromIterator<Report> for ReportSet {
  fn from_iter<I: IntoIterator<Item = Report>>(iter: I) -> Self {
    let mut set = Self::default();
    set.extend(iter);
    set
  }
}
