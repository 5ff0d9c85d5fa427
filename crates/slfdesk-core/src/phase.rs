//! Phase Classifier: collapses a fine-grained project status into one of
//! five coarse stages (plus a sentinel for closed projects).

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  status::{BadgeStyle, ProjectStatus},
};

/// A coarse project stage. Serialises as its number (0–5).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Phase {
  /// Sentinel for cancelled and rejected projects.
  Closed          = 0,
  #[default]
  Preparation     = 1,
  FieldInspection = 2,
  ReportDrafting  = 3,
  Approval        = 4,
  Submission      = 5,
}

impl Phase {
  pub const ALL: [Phase; 6] = [
    Phase::Closed,
    Phase::Preparation,
    Phase::FieldInspection,
    Phase::ReportDrafting,
    Phase::Approval,
    Phase::Submission,
  ];

  pub fn number(self) -> u8 { self as u8 }

  pub fn label(self) -> &'static str {
    match self {
      Self::Closed => "Closed",
      Self::Preparation => "Preparation",
      Self::FieldInspection => "Field Inspection",
      Self::ReportDrafting => "Report Drafting",
      Self::Approval => "Approval",
      Self::Submission => "Submission / Issuance",
    }
  }

  /// The badge style used for phase summary cards.
  pub fn badge(self) -> BadgeStyle {
    match self {
      Self::Closed => BadgeStyle::Muted,
      Self::Preparation => BadgeStyle::Neutral,
      Self::FieldInspection => BadgeStyle::Info,
      Self::ReportDrafting => BadgeStyle::Progress,
      Self::Approval => BadgeStyle::Warning,
      Self::Submission => BadgeStyle::Success,
    }
  }

  /// `round(n / 5 * 100)`, clamped to `0..=100`. The closed sentinel is 0%.
  pub fn progress_percent(self) -> u8 {
    let pct = (f64::from(self.number()) / 5.0 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
  }
}

impl From<Phase> for u8 {
  fn from(p: Phase) -> Self { p.number() }
}

impl TryFrom<u8> for Phase {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self, Self::Error> {
    Phase::ALL
      .into_iter()
      .find(|p| p.number() == n)
      .ok_or(Error::InvalidPhase(n))
  }
}

impl ProjectStatus {
  /// The fixed business mapping from status to phase.
  pub fn phase(self) -> Phase {
    match self {
      Self::Draft | Self::Submitted | Self::ProjectLeadReview => {
        Phase::Preparation
      }
      Self::InspectionScheduled
      | Self::InspectionInProgress
      | Self::InspectionCompleted => Phase::FieldInspection,
      Self::ReportDraft | Self::ReportReview | Self::HeadConsultantReview => {
        Phase::ReportDrafting
      }
      Self::ClientReview | Self::ClientApproved | Self::PaymentVerified => {
        Phase::Approval
      }
      Self::GovernmentSubmitted | Self::SlfIssued | Self::Completed => {
        Phase::Submission
      }
      Self::Cancelled | Self::Rejected => Phase::Closed,
    }
  }
}

/// Classify a raw status code. Unrecognised or missing codes are phase 1.
pub fn phase_of(status: Option<&str>) -> Phase {
  status
    .and_then(|s| s.parse::<ProjectStatus>().ok())
    .map_or(Phase::Preparation, ProjectStatus::phase)
}

/// Progress through the workflow for a raw status code, in percent.
pub fn progress_percent(status: Option<&str>) -> u8 {
  phase_of(status).progress_percent()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mapping_matches_business_rule() {
    let cases = [
      ("draft", 1),
      ("submitted", 1),
      ("project_lead_review", 1),
      ("inspection_scheduled", 2),
      ("inspection_in_progress", 2),
      ("inspection_completed", 2),
      ("report_draft", 3),
      ("report_review", 3),
      ("head_consultant_review", 3),
      ("client_review", 4),
      ("client_approved", 4),
      ("payment_verified", 4),
      ("government_submitted", 5),
      ("slf_issued", 5),
      ("completed", 5),
      ("cancelled", 0),
      ("rejected", 0),
    ];
    for (code, expected) in cases {
      assert_eq!(phase_of(Some(code)).number(), expected, "{code}");
    }
  }

  #[test]
  fn every_enum_code_is_in_range_and_deterministic() {
    for status in ProjectStatus::all() {
      let first = phase_of(Some(status.as_str()));
      assert!(first.number() <= 5);
      assert_eq!(first, phase_of(Some(status.as_str())));
    }
  }

  #[test]
  fn unknown_and_missing_default_to_preparation() {
    assert_eq!(phase_of(None), Phase::Preparation);
    assert_eq!(phase_of(Some("")), Phase::Preparation);
    assert_eq!(phase_of(Some("Draft")), Phase::Preparation);
    assert_eq!(phase_of(Some("on_hold")), Phase::Preparation);
  }

  #[test]
  fn progress_is_clamped_and_closed_is_zero() {
    assert_eq!(progress_percent(Some("rejected")), 0);
    assert_eq!(progress_percent(Some("cancelled")), 0);
    assert_eq!(progress_percent(Some("draft")), 20);
    assert_eq!(progress_percent(Some("report_review")), 60);
    assert_eq!(progress_percent(Some("slf_issued")), 100);
    assert_eq!(progress_percent(None), 20);
  }

  #[test]
  fn phase_serialises_as_number() {
    assert_eq!(serde_json::to_string(&Phase::Approval).unwrap(), "4");
    let p: Phase = serde_json::from_str("0").unwrap();
    assert_eq!(p, Phase::Closed);
    assert!(serde_json::from_str::<Phase>("6").is_err());
  }
}
