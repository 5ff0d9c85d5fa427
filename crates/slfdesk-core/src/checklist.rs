//! Checklist responses recorded during an inspection.
//!
//! Each checklist item declares one or more input columns; the answer for a
//! column is shaped by the column's kind. Answers are a tagged union rather
//! than a free-form map so that a numeric column can never hold free text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::status::{BadgeStyle, Badged};

// ─── Answers ─────────────────────────────────────────────────────────────────

/// The payload for one input column. The variant name is the column kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AnswerValue {
  /// One of the column's declared options.
  Radio { choice: String },
  /// An option plus an optional free-text elaboration.
  RadioWithText {
    choice: String,
    text:   Option<String>,
  },
  Textarea { text: String },
  Numeric {
    value: f64,
    unit:  Option<String>,
  },
}

impl AnswerValue {
  /// The column kind discriminant. Must match the serde tags above.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Radio { .. } => "radio",
      Self::RadioWithText { .. } => "radio_with_text",
      Self::Textarea { .. } => "textarea",
      Self::Numeric { .. } => "numeric",
    }
  }

  /// The textual part of the answer, if any; numeric answers have none.
  pub fn text(&self) -> Option<&str> {
    match self {
      Self::Radio { choice } => Some(choice),
      Self::RadioWithText { choice, text } => {
        text.as_deref().or(Some(choice.as_str()))
      }
      Self::Textarea { text } => Some(text),
      Self::Numeric { .. } => None,
    }
  }
}

/// The answer given for a single declared column of a checklist item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnswer {
  pub column: String,
  pub value:  AnswerValue,
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Two-stage review: project lead first, then head consultant.
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
pub enum ResponseStatus {
  #[default]
  Submitted,
  ProjectLeadApproved,
  HeadConsultantApproved,
  Rejected,
}

impl ResponseStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

impl Badged for ResponseStatus {
  fn code(self) -> &'static str { self.as_str() }

  fn label(self) -> &'static str {
    match self {
      Self::Submitted => "Submitted",
      Self::ProjectLeadApproved => "Approved by Project Lead",
      Self::HeadConsultantApproved => "Approved by Head Consultant",
      Self::Rejected => "Rejected",
    }
  }

  fn badge(self) -> BadgeStyle {
    match self {
      Self::Submitted => BadgeStyle::Warning,
      Self::ProjectLeadApproved => BadgeStyle::Info,
      Self::HeadConsultantApproved => BadgeStyle::Success,
      Self::Rejected => BadgeStyle::Danger,
    }
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistResponse {
  pub response_id:     Uuid,
  pub inspection_id:   Uuid,
  /// Identifier of the item in the static checklist template.
  pub item_id:         String,
  pub responder_id:    Uuid,
  pub answers:         Vec<ColumnAnswer>,
  pub status:          ResponseStatus,
  pub rejection_notes: Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl ChecklistResponse {
  /// Apply a patch. `updated_at` is left to the store.
  pub fn apply(&mut self, patch: ResponsePatch) {
    if let Some(answers) = patch.answers {
      self.answers = answers;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if patch.rejection_notes.is_some() {
      self.rejection_notes = patch.rejection_notes;
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResponse {
  pub inspection_id: Uuid,
  pub item_id:       String,
  pub responder_id:  Uuid,
  pub answers:       Vec<ColumnAnswer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsePatch {
  pub answers:         Option<Vec<ColumnAnswer>>,
  pub status:          Option<ResponseStatus>,
  pub rejection_notes: Option<String>,
}
