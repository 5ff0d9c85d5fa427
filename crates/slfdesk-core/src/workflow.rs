//! Approval workflows for documents, checklist responses, and inspections.
//!
//! Each action is checked in three steps, and the first failure wins:
//!
//! 1. [`validate`](DocumentAction::validate): required input such as a
//!    rejection reason (no store access needed).
//! 2. Role: the actor must hold one of the roles allowed for the action at
//!    the record's current stage.
//! 3. State: the record's current status must allow the action.
//!
//! A successful check yields the patch to write. Nothing here retries; a
//! failed write leaves the record in its previous state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  checklist::{ChecklistResponse, ResponsePatch, ResponseStatus},
  document::{Document, DocumentPatch, DocumentStatus},
  inspection::{Inspection, InspectionPatch, InspectionStatus},
  role::{Actor, Role},
};

fn require_text(value: Option<&str>, what: &str) -> Result<String> {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_owned()),
    _ => Err(Error::Validation(format!("{what} is required"))),
  }
}

fn require_role(actor: &Actor, allowed: &[Role], action: &'static str) -> Result<()> {
  if actor.has_any(allowed) {
    Ok(())
  } else {
    Err(Error::Forbidden { actor: actor.username.clone(), action })
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A one-click action on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DocumentAction {
  /// First-stage check by the admin team.
  Verify,
  Approve,
  Reject { reason: Option<String> },
}

impl DocumentAction {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Verify => "verify document",
      Self::Approve => "approve document",
      Self::Reject { .. } => "reject document",
    }
  }

  pub fn validate(&self) -> Result<()> {
    if let Self::Reject { reason } = self {
      require_text(reason.as_deref(), "rejection reason")?;
    }
    Ok(())
  }

  fn allowed_roles(&self) -> &'static [Role] {
    match self {
      Self::Verify => &[Role::AdminTeam, Role::AdminLead],
      Self::Approve => &[Role::AdminLead, Role::HeadConsultant],
      Self::Reject { .. } => {
        &[Role::AdminTeam, Role::AdminLead, Role::HeadConsultant]
      }
    }
  }
}

/// Check `action` against `doc` and return the patch that records it.
pub fn document_transition(
  doc: &Document,
  action: &DocumentAction,
  actor: &Actor,
  at: DateTime<Utc>,
) -> Result<DocumentPatch> {
  action.validate()?;
  require_role(actor, action.allowed_roles(), action.name())?;

  use DocumentStatus::*;
  let next = match (doc.status, action) {
    (Pending, DocumentAction::Verify) => VerifiedByAdminTeam,
    (Pending | VerifiedByAdminTeam, DocumentAction::Approve) => Approved,
    (Pending | VerifiedByAdminTeam, DocumentAction::Reject { .. }) => Rejected,
    (from, _) => {
      return Err(Error::InvalidTransition {
        from:   from.as_str().to_owned(),
        action: action.name(),
      });
    }
  };

  let rejection_reason = match action {
    DocumentAction::Reject { reason } => reason.as_deref().map(|r| r.trim().to_owned()),
    _ => None,
  };

  Ok(DocumentPatch {
    status: Some(next),
    rejection_reason,
    reviewed_by: Some(actor.user_id),
    reviewed_at: Some(at),
    ..DocumentPatch::default()
  })
}

// ─── Checklist responses ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResponseAction {
  Approve,
  Reject { notes: Option<String> },
}

impl ResponseAction {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Approve => "approve checklist response",
      Self::Reject { .. } => "reject checklist response",
    }
  }

  pub fn validate(&self) -> Result<()> {
    if let Self::Reject { notes } = self {
      require_text(notes.as_deref(), "rejection notes")?;
    }
    Ok(())
  }
}

/// The reviewer role responsible for a response at its current stage.
fn response_reviewer(status: ResponseStatus) -> Option<Role> {
  match status {
    ResponseStatus::Submitted => Some(Role::ProjectLead),
    ResponseStatus::ProjectLeadApproved => Some(Role::HeadConsultant),
    ResponseStatus::HeadConsultantApproved | ResponseStatus::Rejected => None,
  }
}

pub fn response_transition(
  response: &ChecklistResponse,
  action: &ResponseAction,
  actor: &Actor,
) -> Result<ResponsePatch> {
  action.validate()?;

  let invalid = || Error::InvalidTransition {
    from:   response.status.as_str().to_owned(),
    action: action.name(),
  };

  let reviewer = response_reviewer(response.status).ok_or_else(invalid)?;
  require_role(actor, &[reviewer], action.name())?;

  let patch = match action {
    ResponseAction::Approve => ResponsePatch {
      status: Some(match response.status {
        ResponseStatus::Submitted => ResponseStatus::ProjectLeadApproved,
        ResponseStatus::ProjectLeadApproved => ResponseStatus::HeadConsultantApproved,
        _ => return Err(invalid()),
      }),
      ..ResponsePatch::default()
    },
    ResponseAction::Reject { notes } => ResponsePatch {
      status: Some(ResponseStatus::Rejected),
      rejection_notes: notes.as_deref().map(|n| n.trim().to_owned()),
      ..ResponsePatch::default()
    },
  };
  Ok(patch)
}

// ─── Inspections ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InspectionAction {
  Start,
  Complete,
  Cancel,
}

impl InspectionAction {
  pub fn name(self) -> &'static str {
    match self {
      Self::Start => "start inspection",
      Self::Complete => "complete inspection",
      Self::Cancel => "cancel inspection",
    }
  }

  fn allowed_roles(self) -> &'static [Role] {
    match self {
      Self::Start | Self::Complete => &[Role::Inspector],
      Self::Cancel => &[Role::AdminLead, Role::ProjectLead],
    }
  }
}

pub fn inspection_transition(
  inspection: &Inspection,
  action: InspectionAction,
  actor: &Actor,
) -> Result<InspectionPatch> {
  require_role(actor, action.allowed_roles(), action.name())?;

  use InspectionStatus::*;
  let next = match (inspection.status, action) {
    (Scheduled, InspectionAction::Start) => InProgress,
    (InProgress, InspectionAction::Complete) => Completed,
    (Scheduled | InProgress, InspectionAction::Cancel) => Cancelled,
    (from, _) => {
      return Err(Error::InvalidTransition {
        from:   from.as_str().to_owned(),
        action: action.name(),
      });
    }
  };

  Ok(InspectionPatch {
    status: Some(next),
    ..InspectionPatch::default()
  })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::inspection::InspectionCategory;

  fn actor(roles: Vec<Role>) -> Actor { Actor::new(Uuid::new_v4(), "tester", roles) }

  fn document(status: DocumentStatus) -> Document {
    Document {
      document_id:      Uuid::new_v4(),
      name:             "IMB.pdf".into(),
      doc_type:         "imb".into(),
      status,
      project_id:       None,
      uploaded_by:      None,
      url:              "/files/abc".into(),
      rejection_reason: None,
      reviewed_by:      None,
      reviewed_at:      None,
      created_at:       Utc::now(),
    }
  }

  fn response(status: ResponseStatus) -> ChecklistResponse {
    ChecklistResponse {
      response_id: Uuid::new_v4(),
      inspection_id: Uuid::new_v4(),
      item_id: "struktur-01".into(),
      responder_id: Uuid::new_v4(),
      answers: vec![],
      status,
      rejection_notes: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn inspection(status: InspectionStatus) -> Inspection {
    Inspection {
      inspection_id: Uuid::new_v4(),
      project_id: Uuid::new_v4(),
      inspector_id: None,
      scheduled_at: Utc::now(),
      status,
      category: InspectionCategory::Technical,
      notes: None,
      created_at: Utc::now(),
    }
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  #[test]
  fn pending_document_approves_to_approved() {
    let lead = actor(vec![Role::AdminLead]);
    let patch = document_transition(
      &document(DocumentStatus::Pending),
      &DocumentAction::Approve,
      &lead,
      Utc::now(),
    )
    .unwrap();
    assert_eq!(patch.status, Some(DocumentStatus::Approved));
    assert_eq!(patch.reviewed_by, Some(lead.user_id));
  }

  #[test]
  fn reject_without_reason_fails_validation_first() {
    // Even an actor without any role gets the validation error, because
    // validation runs before anything else.
    let nobody = actor(vec![]);
    for reason in [None, Some("   ".to_owned())] {
      let err = document_transition(
        &document(DocumentStatus::Pending),
        &DocumentAction::Reject { reason },
        &nobody,
        Utc::now(),
      )
      .unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "{err}");
    }
  }

  #[test]
  fn reject_records_trimmed_reason() {
    let patch = document_transition(
      &document(DocumentStatus::VerifiedByAdminTeam),
      &DocumentAction::Reject { reason: Some("  scan blurred ".into()) },
      &actor(vec![Role::HeadConsultant]),
      Utc::now(),
    )
    .unwrap();
    assert_eq!(patch.status, Some(DocumentStatus::Rejected));
    assert_eq!(patch.rejection_reason.as_deref(), Some("scan blurred"));
  }

  #[test]
  fn two_stage_document_flow() {
    let team = actor(vec![Role::AdminTeam]);
    let head = actor(vec![Role::HeadConsultant]);
    let mut doc = document(DocumentStatus::Pending);

    doc.apply(document_transition(&doc, &DocumentAction::Verify, &team, Utc::now()).unwrap());
    assert_eq!(doc.status, DocumentStatus::VerifiedByAdminTeam);

    // The admin team cannot give final approval.
    let err = document_transition(&doc, &DocumentAction::Approve, &team, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    doc.apply(document_transition(&doc, &DocumentAction::Approve, &head, Utc::now()).unwrap());
    assert_eq!(doc.status, DocumentStatus::Approved);
  }

  #[test]
  fn terminal_documents_do_not_move() {
    let lead = actor(vec![Role::AdminLead]);
    for status in [DocumentStatus::Approved, DocumentStatus::Rejected] {
      let err = document_transition(&document(status), &DocumentAction::Approve, &lead, Utc::now())
        .unwrap_err();
      assert!(matches!(err, Error::InvalidTransition { .. }));
    }
    let err = document_transition(
      &document(DocumentStatus::VerifiedByAdminTeam),
      &DocumentAction::Verify,
      &lead,
      Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
  }

  #[test]
  fn document_action_wire_format() {
    let a: DocumentAction = serde_json::from_str(r#"{"action":"reject","reason":"x"}"#).unwrap();
    assert_eq!(a, DocumentAction::Reject { reason: Some("x".into()) });
    let a: DocumentAction = serde_json::from_str(r#"{"action":"reject"}"#).unwrap();
    assert!(a.validate().is_err());
  }

  // ── Checklist responses ───────────────────────────────────────────────────

  #[test]
  fn response_needs_lead_then_head_consultant() {
    let lead = actor(vec![Role::ProjectLead]);
    let head = actor(vec![Role::HeadConsultant]);
    let mut r = response(ResponseStatus::Submitted);

    let err = response_transition(&r, &ResponseAction::Approve, &head).unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    r.apply(response_transition(&r, &ResponseAction::Approve, &lead).unwrap());
    assert_eq!(r.status, ResponseStatus::ProjectLeadApproved);

    let err = response_transition(&r, &ResponseAction::Approve, &lead).unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    r.apply(response_transition(&r, &ResponseAction::Approve, &head).unwrap());
    assert_eq!(r.status, ResponseStatus::HeadConsultantApproved);

    let err = response_transition(&r, &ResponseAction::Approve, &head).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
  }

  #[test]
  fn response_reject_requires_notes() {
    let head = actor(vec![Role::HeadConsultant]);
    let r = response(ResponseStatus::ProjectLeadApproved);

    let err = response_transition(&r, &ResponseAction::Reject { notes: None }, &head).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let patch = response_transition(
      &r,
      &ResponseAction::Reject { notes: Some("foto kurang jelas".into()) },
      &head,
    )
    .unwrap();
    assert_eq!(patch.status, Some(ResponseStatus::Rejected));
    assert_eq!(patch.rejection_notes.as_deref(), Some("foto kurang jelas"));
  }

  // ── Inspections ───────────────────────────────────────────────────────────

  #[test]
  fn inspection_lifecycle() {
    let inspector = actor(vec![Role::Inspector]);
    let mut i = inspection(InspectionStatus::Scheduled);

    let err = inspection_transition(&i, InspectionAction::Complete, &inspector).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));

    i.apply(inspection_transition(&i, InspectionAction::Start, &inspector).unwrap());
    assert_eq!(i.status, InspectionStatus::InProgress);
    i.apply(inspection_transition(&i, InspectionAction::Complete, &inspector).unwrap());
    assert_eq!(i.status, InspectionStatus::Completed);
  }

  #[test]
  fn only_leads_cancel_inspections() {
    let i = inspection(InspectionStatus::InProgress);
    let err = inspection_transition(&i, InspectionAction::Cancel, &actor(vec![Role::Inspector]))
      .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let patch =
      inspection_transition(&i, InspectionAction::Cancel, &actor(vec![Role::ProjectLead])).unwrap();
    assert_eq!(patch.status, Some(InspectionStatus::Cancelled));
  }
}
