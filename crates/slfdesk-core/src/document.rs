//! Uploaded documents and their verification status.
//!
//! A document may exist without a project (uploaded ahead of time and waiting
//! for manual assignment).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::status::{BadgeStyle, Badged};

/// Verification state of a document.
///
/// `verified_by_admin_team` is the first review stage; `approved` is the
/// terminal success state. The two are never interchangeable.
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
pub enum DocumentStatus {
  #[default]
  Pending,
  /// Older rows use the bare `verified` code for this stage.
  #[serde(alias = "verified")]
  #[strum(to_string = "verified_by_admin_team", serialize = "verified")]
  VerifiedByAdminTeam,
  Approved,
  Rejected,
}

impl DocumentStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Approved | Self::Rejected)
  }
}

impl Badged for DocumentStatus {
  fn code(self) -> &'static str { self.as_str() }

  fn label(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::VerifiedByAdminTeam => "Verified by Admin Team",
      Self::Approved => "Approved",
      Self::Rejected => "Rejected",
    }
  }

  fn badge(self) -> BadgeStyle {
    match self {
      Self::Pending => BadgeStyle::Warning,
      Self::VerifiedByAdminTeam => BadgeStyle::Info,
      Self::Approved => BadgeStyle::Success,
      Self::Rejected => BadgeStyle::Danger,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub document_id:      Uuid,
  pub name:             String,
  /// Category tag, e.g. `"imb"`, `"as_built_drawing"`.
  pub doc_type:         String,
  pub status:           DocumentStatus,
  /// `None` while the document is unassigned.
  pub project_id:       Option<Uuid>,
  pub uploaded_by:      Option<Uuid>,
  /// Location returned by the object store.
  pub url:              String,
  pub rejection_reason: Option<String>,
  pub reviewed_by:      Option<Uuid>,
  pub reviewed_at:      Option<DateTime<Utc>>,
  pub created_at:       DateTime<Utc>,
}

impl Document {
  pub fn apply(&mut self, patch: DocumentPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(doc_type) = patch.doc_type {
      self.doc_type = doc_type;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if patch.unassign {
      self.project_id = None;
    } else if patch.project_id.is_some() {
      self.project_id = patch.project_id;
    }
    if let Some(url) = patch.url {
      self.url = url;
    }
    if patch.rejection_reason.is_some() {
      self.rejection_reason = patch.rejection_reason;
    }
    if patch.reviewed_by.is_some() {
      self.reviewed_by = patch.reviewed_by;
    }
    if patch.reviewed_at.is_some() {
      self.reviewed_at = patch.reviewed_at;
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
  pub name:        String,
  pub doc_type:    String,
  pub project_id:  Option<Uuid>,
  pub uploaded_by: Option<Uuid>,
  pub url:         String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
  pub name:             Option<String>,
  pub doc_type:         Option<String>,
  pub status:           Option<DocumentStatus>,
  pub project_id:       Option<Uuid>,
  pub url:              Option<String>,
  pub rejection_reason: Option<String>,
  pub reviewed_by:      Option<Uuid>,
  pub reviewed_at:      Option<DateTime<Utc>>,
  /// Detach the document from its project. Wins over `project_id`.
  #[serde(default)]
  pub unassign:         bool,
}

impl DocumentPatch {
  /// Move the document to `project_id`, or back to the unassigned pool.
  pub fn assign(project_id: Option<Uuid>) -> Self {
    Self {
      project_id,
      unassign: project_id.is_none(),
      ..Self::default()
    }
  }
}

/// Which documents [`crate::store::PermitStore::list_documents`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentScope {
  #[default]
  All,
  Project(Uuid),
  /// Only documents with no project yet.
  Unassigned,
}
