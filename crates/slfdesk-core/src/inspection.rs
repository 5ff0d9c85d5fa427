//! Field inspections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::status::{BadgeStyle, Badged};

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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InspectionStatus {
  #[default]
  Scheduled,
  InProgress,
  Completed,
  Cancelled,
}

impl InspectionStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

impl Badged for InspectionStatus {
  fn code(self) -> &'static str { self.as_str() }

  fn label(self) -> &'static str {
    match self {
      Self::Scheduled => "Scheduled",
      Self::InProgress => "In Progress",
      Self::Completed => "Completed",
      Self::Cancelled => "Cancelled",
    }
  }

  fn badge(self) -> BadgeStyle {
    match self {
      Self::Scheduled => BadgeStyle::Info,
      Self::InProgress => BadgeStyle::Progress,
      Self::Completed => BadgeStyle::Success,
      Self::Cancelled => BadgeStyle::Muted,
    }
  }
}

/// The inspector specialisation an inspection needs.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InspectionCategory {
  #[default]
  Administrative,
  Technical,
}

impl InspectionCategory {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
  pub inspection_id: Uuid,
  pub project_id:    Uuid,
  pub inspector_id:  Option<Uuid>,
  pub scheduled_at:  DateTime<Utc>,
  pub status:        InspectionStatus,
  pub category:      InspectionCategory,
  pub notes:         Option<String>,
  pub created_at:    DateTime<Utc>,
}

impl Inspection {
  pub fn apply(&mut self, patch: InspectionPatch) {
    if patch.inspector_id.is_some() {
      self.inspector_id = patch.inspector_id;
    }
    if let Some(at) = patch.scheduled_at {
      self.scheduled_at = at;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(category) = patch.category {
      self.category = category;
    }
    if patch.notes.is_some() {
      self.notes = patch.notes;
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInspection {
  pub project_id:   Uuid,
  pub inspector_id: Option<Uuid>,
  pub scheduled_at: DateTime<Utc>,
  #[serde(default)]
  pub category:     InspectionCategory,
  pub notes:        Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionPatch {
  pub inspector_id: Option<Uuid>,
  pub scheduled_at: Option<DateTime<Utc>>,
  pub status:       Option<InspectionStatus>,
  pub category:     Option<InspectionCategory>,
  pub notes:        Option<String>,
}
