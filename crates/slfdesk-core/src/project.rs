//! Clients and projects.
//!
//! A project moves through the workflow codes in [`crate::status`]; its
//! phase and badge are always derived from the stored code, never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  phase::Phase,
  status::{StatusInfo, StatusValue},
};

// ─── Client ──────────────────────────────────────────────────────────────────

/// The building owner or applicant a project is run for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
  pub client_id:  Uuid,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub address:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::PermitStore::create_client`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewClient {
  pub name:    String,
  pub email:   Option<String>,
  pub phone:   Option<String>,
  pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
  pub name:    Option<String>,
  pub email:   Option<String>,
  pub phone:   Option<String>,
  pub address: Option<String>,
}

impl Client {
  pub fn apply(&mut self, patch: ClientPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if patch.email.is_some() {
      self.email = patch.email;
    }
    if patch.phone.is_some() {
      self.phone = patch.phone;
    }
    if patch.address.is_some() {
      self.address = patch.address;
    }
  }
}

// ─── Application type ────────────────────────────────────────────────────────

/// Which government approval the project is working towards.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationType {
  /// Sertifikat Laik Fungsi: building-function-worthiness certificate.
  #[default]
  Slf,
  /// Building-construction permit.
  Pbg,
}

impl ApplicationType {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub project_id:       Uuid,
  pub name:             String,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub status:           StatusValue,
  pub application_type: ApplicationType,
  pub client_id:        Option<Uuid>,
  /// The assigned project lead.
  pub lead_id:          Option<Uuid>,
  pub created_at:       DateTime<Utc>,
  pub start_date:       Option<NaiveDate>,
  pub due_date:         Option<NaiveDate>,
}

impl Project {
  pub fn phase(&self) -> Phase { self.status.phase() }

  pub fn status_info(&self) -> StatusInfo { self.status.info() }

  pub fn progress_percent(&self) -> u8 { self.phase().progress_percent() }

  pub fn apply(&mut self, patch: ProjectPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if patch.address.is_some() {
      self.address = patch.address;
    }
    if patch.city.is_some() {
      self.city = patch.city;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(kind) = patch.application_type {
      self.application_type = kind;
    }
    if patch.client_id.is_some() {
      self.client_id = patch.client_id;
    }
    if patch.lead_id.is_some() {
      self.lead_id = patch.lead_id;
    }
    if patch.start_date.is_some() {
      self.start_date = patch.start_date;
    }
    if patch.due_date.is_some() {
      self.due_date = patch.due_date;
    }
  }
}

/// Input to [`crate::store::PermitStore::create_project`].
/// `project_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
  pub name:             String,
  pub address:          Option<String>,
  pub city:             Option<String>,
  #[serde(default)]
  pub status:           StatusValue,
  #[serde(default)]
  pub application_type: ApplicationType,
  pub client_id:        Option<Uuid>,
  pub lead_id:          Option<Uuid>,
  pub start_date:       Option<NaiveDate>,
  pub due_date:         Option<NaiveDate>,
}

impl NewProject {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
  pub name:             Option<String>,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub status:           Option<StatusValue>,
  pub application_type: Option<ApplicationType>,
  pub client_id:        Option<Uuid>,
  pub lead_id:          Option<Uuid>,
  pub start_date:       Option<NaiveDate>,
  pub due_date:         Option<NaiveDate>,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A project joined with its client's display name, as listed on dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
  #[serde(flatten)]
  pub project:     Project,
  pub client_name: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::status::ProjectStatus;

  fn project() -> Project {
    Project {
      project_id:       Uuid::new_v4(),
      name:             "Gedung Serbaguna".into(),
      address:          None,
      city:             Some("Bandung".into()),
      status:           ProjectStatus::Draft.into(),
      application_type: ApplicationType::Slf,
      client_id:        None,
      lead_id:          None,
      created_at:       Utc::now(),
      start_date:       None,
      due_date:         None,
    }
  }

  #[test]
  fn patch_only_touches_given_fields() {
    let mut p = project();
    let lead = Uuid::new_v4();
    p.apply(ProjectPatch {
      status: Some(ProjectStatus::InspectionScheduled.into()),
      lead_id: Some(lead),
      ..ProjectPatch::default()
    });
    assert_eq!(p.name, "Gedung Serbaguna");
    assert_eq!(p.city.as_deref(), Some("Bandung"));
    assert_eq!(p.lead_id, Some(lead));
    assert_eq!(p.phase(), Phase::FieldInspection);
    assert_eq!(p.progress_percent(), 40);
  }

  #[test]
  fn new_project_defaults_to_draft_slf() {
    let p: NewProject = serde_json::from_str(r#"{"name":"Ruko"}"#).unwrap();
    assert_eq!(p.status.known(), Some(ProjectStatus::Draft));
    assert_eq!(p.application_type, ApplicationType::Slf);
  }

  #[test]
  fn view_flattens_project_fields() {
    let view = ProjectView {
      project:     project(),
      client_name: Some("PT Maju".into()),
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["name"], "Gedung Serbaguna");
    assert_eq!(json["status"], "draft");
    assert_eq!(json["client_name"], "PT Maju");
  }
}
