//! One submission workflow shared by every report kind.
//!
//! A kind is described by a [`FormConfig`]: its fields, how each is validated,
//! and how the validated values become a [`NewReport`]. Validation collects
//! every field error at once so the submitter can fix them in a single pass,
//! and never touches the store.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  report::{
    Coordinates, Level, Location, NewDamageReport, NewMissingPerson, NewReport, NewSosAlert,
    NewSupplyRequest, Report, ReportKind, Status,
  },
  store::ReportStore,
};

// ─── Raw input ───────────────────────────────────────────────────────────────

/// Raw form input, exactly as typed by the submitter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionForm {
  #[serde(default)]
  pub fields:   BTreeMap<String, String>,
  /// `None` until the submitter picks a point on the map. Range checks
  /// happen in [`FormConfig::validate`] alongside the other fields.
  #[serde(default)]
  pub location: Option<Coordinates>,
}

impl SubmissionForm {
  pub fn new() -> Self { Self::default() }

  pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
    self.fields.insert(name.to_owned(), value.into());
    self
  }

  pub fn at(mut self, location: impl Into<Coordinates>) -> Self {
    self.location = Some(location.into());
    self
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Field name → message, for inline display next to each field. Location
/// problems are reported under `"location"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
  fn insert(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.insert(field, message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> { self.0.get(field).map(String::as_str) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ { self.0.keys().copied() }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields: Vec<&str> = self.fields().collect();
    write!(f, "invalid fields: {}", fields.join(", "))
  }
}

// ─── Field configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
  /// Non-blank text.
  Required,
  /// Any text, including blank.
  Optional,
  /// A whole number greater than zero.
  PositiveInteger,
  /// One of `low`, `medium`, `high`.
  Level,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub name:    &'static str,
  /// Used in messages: "{label} is required".
  pub label:   &'static str,
  pub rule:    FieldRule,
  /// Applied when the field is absent from the form, not when it is blank.
  pub default: Option<&'static str>,
}

const fn field(
  name: &'static str,
  label: &'static str,
  rule: FieldRule,
  default: Option<&'static str>,
) -> FieldSpec {
  FieldSpec { name, label, rule, default }
}

#[derive(Debug, Clone)]
enum FieldValue {
  Text(String),
  Number(u32),
  Level(Level),
}

impl FieldSpec {
  fn check(&self, raw: &str) -> Result<FieldValue, String> {
    match self.rule {
      FieldRule::Optional => Ok(FieldValue::Text(raw.to_owned())),
      FieldRule::Required if raw.is_empty() => Err(format!("{} is required", self.label)),
      FieldRule::Required => Ok(FieldValue::Text(raw.to_owned())),
      FieldRule::PositiveInteger if raw.is_empty() => {
        Err(format!("{} is required", self.label))
      }
      FieldRule::PositiveInteger => match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(FieldValue::Number(n)),
        _ => Err(format!("{} must be a positive number", self.label)),
      },
      FieldRule::Level => raw
        .parse::<Level>()
        .map(FieldValue::Level)
        .map_err(|_| format!("{} must be low, medium, or high", self.label)),
    }
  }
}

/// Validated values keyed by field name.
#[derive(Debug, Default)]
pub struct Values(BTreeMap<&'static str, FieldValue>);

impl Values {
  fn text(&self, name: &str) -> String {
    match self.0.get(name) {
      Some(FieldValue::Text(s)) => s.clone(),
      _ => String::new(),
    }
  }

  fn number(&self, name: &str) -> u32 {
    match self.0.get(name) {
      Some(FieldValue::Number(n)) => *n,
      _ => 0,
    }
  }

  fn level(&self, name: &str) -> Level {
    match self.0.get(name) {
      Some(FieldValue::Level(l)) => *l,
      _ => Level::default(),
    }
  }
}

/// Everything the workflow needs to know about one report kind.
pub struct FormConfig {
  pub kind:   ReportKind,
  pub fields: &'static [FieldSpec],
  build:      fn(&Values, Location) -> NewReport,
}

impl fmt::Debug for FormConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FormConfig")
      .field("kind", &self.kind)
      .field("fields", &self.fields)
      .finish_non_exhaustive()
  }
}

const CONTACT_INFO: FieldSpec =
  field("contact_info", "Contact information", FieldRule::Required, None);

static MISSING_PERSON_FORM: FormConfig = FormConfig {
  kind:   ReportKind::MissingPerson,
  fields: &[
    field("name", "Name", FieldRule::Required, None),
    field("age", "Age", FieldRule::PositiveInteger, None),
    field("gender", "Gender", FieldRule::Required, Some("male")),
    field("last_seen", "Last seen date/time", FieldRule::Required, None),
    field("description", "Description", FieldRule::Optional, None),
    CONTACT_INFO,
  ],
  build:  |v, location| {
    NewReport::MissingPerson(NewMissingPerson {
      name: v.text("name"),
      age: v.number("age"),
      gender: v.text("gender"),
      last_seen: v.text("last_seen"),
      description: v.text("description"),
      contact_info: v.text("contact_info"),
      location,
    })
  },
};

static DAMAGE_REPORT_FORM: FormConfig = FormConfig {
  kind:   ReportKind::DamageReport,
  fields: &[
    field("damage_type", "Damage type", FieldRule::Required, Some("building")),
    field("severity", "Severity", FieldRule::Level, Some("medium")),
    field("description", "Description", FieldRule::Required, None),
  ],
  build:  |v, location| {
    NewReport::DamageReport(NewDamageReport {
      damage_type: v.text("damage_type"),
      severity: v.level("severity"),
      description: v.text("description"),
      location,
    })
  },
};

static SUPPLY_REQUEST_FORM: FormConfig = FormConfig {
  kind:   ReportKind::SupplyRequest,
  fields: &[
    field("supply_type", "Supply type", FieldRule::Required, Some("food")),
    field("quantity", "Quantity", FieldRule::PositiveInteger, None),
    field("urgency", "Urgency", FieldRule::Level, Some("medium")),
    field("description", "Description", FieldRule::Optional, None),
    CONTACT_INFO,
  ],
  build:  |v, location| {
    NewReport::SupplyRequest(NewSupplyRequest {
      supply_type: v.text("supply_type"),
      quantity: v.number("quantity"),
      urgency: v.level("urgency"),
      description: v.text("description"),
      contact_info: v.text("contact_info"),
      location,
    })
  },
};

static SOS_ALERT_FORM: FormConfig = FormConfig {
  kind:   ReportKind::SosAlert,
  fields: &[
    field("name", "Name", FieldRule::Required, None),
    CONTACT_INFO,
    field("description", "Description", FieldRule::Required, None),
  ],
  build:  |v, location| {
    NewReport::SosAlert(NewSosAlert {
      name: v.text("name"),
      contact_info: v.text("contact_info"),
      description: v.text("description"),
      location,
    })
  },
};

impl ReportKind {
  pub fn form(self) -> &'static FormConfig {
    match self {
      Self::MissingPerson => &MISSING_PERSON_FORM,
      Self::DamageReport => &DAMAGE_REPORT_FORM,
      Self::SupplyRequest => &SUPPLY_REQUEST_FORM,
      Self::SosAlert => &SOS_ALERT_FORM,
    }
  }
}

impl FormConfig {
  /// The status the store will assign on creation.
  pub fn initial_status(&self) -> Option<Status> {
    self.kind.lifecycle().map(|l| l.initial)
  }

  /// Check every field and the location, then build the typed input.
  pub fn validate(&self, form: &SubmissionForm) -> Result<NewReport> {
    let mut errors = ValidationErrors::default();
    let mut values = Values::default();

    for spec in self.fields {
      let raw = match form.fields.get(spec.name) {
        Some(value) => value.trim(),
        None => spec.default.unwrap_or(""),
      };
      match spec.check(raw) {
        Ok(value) => {
          values.0.insert(spec.name, value);
        }
        Err(message) => errors.insert(spec.name, message),
      }
    }

    let location = match form.location {
      None => {
        errors.insert("location", "Please select a location on the map");
        None
      }
      Some(c) => Location::new(c.lat, c.lng)
        .inspect_err(|_| errors.insert("location", "Location is outside valid coordinates"))
        .ok(),
    };

    match location {
      Some(location) if errors.is_empty() => Ok((self.build)(&values, location)),
      _ => Err(Error::Validation(errors)),
    }
  }
}

/// Validate `form` as a `kind` report and persist it. On any error the caller
/// still owns the form, so entered data is never lost.
pub async fn submit<S: ReportStore>(
  store: &S,
  kind: ReportKind,
  form: &SubmissionForm,
) -> Result<Report> {
  let input = kind.form().validate(form)?;
  store
    .create(input)
    .await
    .map_err(|e| Error::StoreUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn loc() -> Location { Location::new(40.7128, -74.006).unwrap() }

  fn errors_of(result: Result<NewReport>) -> ValidationErrors {
    match result {
      Err(Error::Validation(errors)) => errors,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn supply_request_with_defaults() {
    let form = SubmissionForm::new()
      .field("quantity", "5")
      .field("contact_info", "555-0100")
      .at(loc());
    let input = ReportKind::SupplyRequest.form().validate(&form).unwrap();
    let NewReport::SupplyRequest(req) = input else { panic!("wrong kind") };
    assert_eq!(req.supply_type, "food");
    assert_eq!(req.quantity, 5);
    assert_eq!(req.urgency, Level::Medium);
    assert_eq!(req.description, "");
  }

  #[test]
  fn collects_every_error_at_once() {
    let form = SubmissionForm::new()
      .field("name", "  ")
      .field("age", "-3")
      .field("last_seen", "");
    let errors = errors_of(ReportKind::MissingPerson.form().validate(&form));
    assert_eq!(errors.get("name"), Some("Name is required"));
    assert_eq!(errors.get("age"), Some("Age must be a positive number"));
    assert_eq!(errors.get("last_seen"), Some("Last seen date/time is required"));
    assert_eq!(errors.get("contact_info"), Some("Contact information is required"));
    assert_eq!(errors.get("location"), Some("Please select a location on the map"));
    assert_eq!(errors.get("gender"), None);
    assert_eq!(errors.len(), 5);
  }

  #[test]
  fn quantity_rules() {
    let base = SubmissionForm::new().field("contact_info", "x").at(loc());

    let missing = errors_of(ReportKind::SupplyRequest.form().validate(&base));
    assert_eq!(missing.get("quantity"), Some("Quantity is required"));

    for bad in ["0", "2.5", "lots"] {
      let form = base.clone().field("quantity", bad);
      let errors = errors_of(ReportKind::SupplyRequest.form().validate(&form));
      assert_eq!(errors.get("quantity"), Some("Quantity must be a positive number"));
    }
  }

  #[test]
  fn blank_field_does_not_fall_back_to_default() {
    let form = SubmissionForm::new()
      .field("damage_type", "")
      .field("description", "cracked wall")
      .at(loc());
    let errors = errors_of(ReportKind::DamageReport.form().validate(&form));
    assert_eq!(errors.get("damage_type"), Some("Damage type is required"));
  }

  #[test]
  fn level_must_be_known() {
    let form = SubmissionForm::new()
      .field("severity", "catastrophic")
      .field("description", "flooded")
      .at(loc());
    let errors = errors_of(ReportKind::DamageReport.form().validate(&form));
    assert_eq!(errors.get("severity"), Some("Severity must be low, medium, or high"));
  }

  #[test]
  fn valid_location_alone_is_not_enough() {
    let form = SubmissionForm::new().at(loc());
    let errors = errors_of(ReportKind::SosAlert.form().validate(&form));
    assert_eq!(errors.get("location"), None);
    assert_eq!(errors.len(), 3);
  }

  #[test]
  fn out_of_range_location_is_a_field_error() {
    let form = SubmissionForm::new()
      .field("name", "")
      .field("contact_info", "555-0100")
      .field("description", "trapped")
      .at(Coordinates { lat: 95.0, lng: 0.0 });
    let errors = errors_of(ReportKind::SosAlert.form().validate(&form));
    assert_eq!(errors.get("location"), Some("Location is outside valid coordinates"));
    assert_eq!(errors.get("name"), Some("Name is required"));
    assert_eq!(errors.len(), 2);
  }

  #[test]
  fn initial_statuses() {
    assert_eq!(ReportKind::MissingPerson.form().initial_status(), Some(Status::Missing));
    assert_eq!(ReportKind::SupplyRequest.form().initial_status(), Some(Status::Pending));
    assert_eq!(ReportKind::SosAlert.form().initial_status(), Some(Status::Active));
    assert_eq!(ReportKind::DamageReport.form().initial_status(), None);
  }

  #[test]
  fn form_deserialises_without_location() {
    let form: SubmissionForm =
      serde_json::from_str(r#"{"fields":{"name":"Ada"}}"#).unwrap();
    assert!(form.location.is_none());
    assert_eq!(form.fields["name"], "Ada");
  }
}
