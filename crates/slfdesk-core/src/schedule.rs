//! Calendar entries: inspections, meetings, deadlines.

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
pub enum ScheduleType {
  #[default]
  Inspection,
  Meeting,
  Deadline,
  Rescheduled,
}

impl ScheduleType {
  pub fn as_str(self) -> &'static str { self.into() }
}

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
pub enum ScheduleStatus {
  #[default]
  Scheduled,
  Completed,
  Cancelled,
}

impl ScheduleStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

impl Badged for ScheduleStatus {
  fn code(self) -> &'static str { self.as_str() }

  fn label(self) -> &'static str {
    match self {
      Self::Scheduled => "Scheduled",
      Self::Completed => "Completed",
      Self::Cancelled => "Cancelled",
    }
  }

  fn badge(self) -> BadgeStyle {
    match self {
      Self::Scheduled => BadgeStyle::Info,
      Self::Completed => BadgeStyle::Success,
      Self::Cancelled => BadgeStyle::Muted,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
  pub schedule_id:   Uuid,
  pub project_id:    Uuid,
  pub schedule_type: ScheduleType,
  pub title:         String,
  pub scheduled_at:  DateTime<Utc>,
  pub location:      Option<String>,
  pub assignee_id:   Option<Uuid>,
  pub status:        ScheduleStatus,
  pub created_at:    DateTime<Utc>,
}

impl Schedule {
  pub fn apply(&mut self, patch: SchedulePatch) {
    if let Some(kind) = patch.schedule_type {
      self.schedule_type = kind;
    }
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(at) = patch.scheduled_at {
      self.scheduled_at = at;
    }
    if patch.location.is_some() {
      self.location = patch.location;
    }
    if patch.assignee_id.is_some() {
      self.assignee_id = patch.assignee_id;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchedule {
  pub project_id:    Uuid,
  #[serde(default)]
  pub schedule_type: ScheduleType,
  pub title:         String,
  pub scheduled_at:  DateTime<Utc>,
  pub location:      Option<String>,
  pub assignee_id:   Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulePatch {
  pub schedule_type: Option<ScheduleType>,
  pub title:         Option<String>,
  pub scheduled_at:  Option<DateTime<Utc>>,
  pub location:      Option<String>,
  pub assignee_id:   Option<Uuid>,
  pub status:        Option<ScheduleStatus>,
}
