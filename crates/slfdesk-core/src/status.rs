//! Status Registry: the one table that maps a workflow status code to its
//! display label, badge style, and phase.
//!
//! Every view that renders a status badge goes through [`describe`] (for
//! projects) or the [`Badged`] trait (for documents, inspections, checklist
//! responses, and schedules). Unrecognised project codes never fail: they
//! degrade to a neutral badge, a humanised label, and phase 1.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result, phase::Phase};

// ─── Badge styles ────────────────────────────────────────────────────────────

/// Semantic style token for a status badge. Rendering layers map these to
/// concrete colours.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
  #[default]
  Neutral,
  Info,
  Progress,
  Warning,
  Success,
  Danger,
  Muted,
}

/// Implemented by every closed status enum that is shown as a badge.
pub trait Badged: Copy {
  /// The snake_case wire code.
  fn code(self) -> &'static str;
  fn label(self) -> &'static str;
  fn badge(self) -> BadgeStyle;

  fn badge_entry(self) -> BadgeEntry {
    BadgeEntry {
      code:  self.code().to_owned(),
      label: self.label().to_owned(),
      badge: self.badge(),
    }
  }
}

/// A registry row for a status without a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEntry {
  pub code:  String,
  pub label: String,
  pub badge: BadgeStyle,
}

// ─── Project status ──────────────────────────────────────────────────────────

/// The closed set of project workflow codes, in workflow order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
  Draft,
  Submitted,
  ProjectLeadReview,
  InspectionScheduled,
  InspectionInProgress,
  InspectionCompleted,
  ReportDraft,
  ReportReview,
  HeadConsultantReview,
  ClientReview,
  ClientApproved,
  PaymentVerified,
  GovernmentSubmitted,
  SlfIssued,
  Completed,
  Cancelled,
  Rejected,
}

impl ProjectStatus {
  /// All known codes in workflow order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn as_str(self) -> &'static str { self.into() }
}

impl Badged for ProjectStatus {
  fn code(self) -> &'static str { self.as_str() }

  fn label(self) -> &'static str {
    match self {
      Self::Draft => "Draft",
      Self::Submitted => "Submitted",
      Self::ProjectLeadReview => "Project Lead Review",
      Self::InspectionScheduled => "Inspection Scheduled",
      Self::InspectionInProgress => "Inspection In Progress",
      Self::InspectionCompleted => "Inspection Completed",
      Self::ReportDraft => "Report Draft",
      Self::ReportReview => "Report Review",
      Self::HeadConsultantReview => "Head Consultant Review",
      Self::ClientReview => "Client Review",
      Self::ClientApproved => "Client Approved",
      Self::PaymentVerified => "Payment Verified",
      Self::GovernmentSubmitted => "Government Submitted",
      Self::SlfIssued => "SLF Issued",
      Self::Completed => "Completed",
      Self::Cancelled => "Cancelled",
      Self::Rejected => "Rejected",
    }
  }

  fn badge(self) -> BadgeStyle {
    match self {
      Self::Draft | Self::ReportDraft => BadgeStyle::Neutral,
      Self::Submitted | Self::InspectionScheduled => BadgeStyle::Info,
      Self::InspectionInProgress
      | Self::InspectionCompleted
      | Self::GovernmentSubmitted => BadgeStyle::Progress,
      Self::ProjectLeadReview
      | Self::ReportReview
      | Self::HeadConsultantReview
      | Self::ClientReview => BadgeStyle::Warning,
      Self::ClientApproved
      | Self::PaymentVerified
      | Self::SlfIssued
      | Self::Completed => BadgeStyle::Success,
      Self::Cancelled => BadgeStyle::Muted,
      Self::Rejected => BadgeStyle::Danger,
    }
  }
}

// ─── Raw status value ────────────────────────────────────────────────────────

/// A project status as stored: usually one of [`ProjectStatus`], but rows
/// written by other sessions may carry codes this build does not know.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StatusValue(String);

impl StatusValue {
  pub fn new(code: impl Into<String>) -> Self { Self(code.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The recognised status, if any.
  pub fn known(&self) -> Option<ProjectStatus> { self.0.parse().ok() }

  pub fn phase(&self) -> Phase { crate::phase::phase_of(Some(self.as_str())) }

  pub fn info(&self) -> StatusInfo { describe(Some(self.as_str())) }
}

impl Default for StatusValue {
  fn default() -> Self { ProjectStatus::Draft.into() }
}

impl From<ProjectStatus> for StatusValue {
  fn from(s: ProjectStatus) -> Self { Self(s.as_str().to_owned()) }
}

impl fmt::Display for StatusValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Registry lookup ─────────────────────────────────────────────────────────

/// Everything a view needs to render a project status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
  pub code:  String,
  pub label: String,
  pub badge: BadgeStyle,
  pub phase: Phase,
}

/// Look up a project status code. Never panics; unknown or missing codes get
/// the neutral default.
pub fn describe(code: Option<&str>) -> StatusInfo {
  let raw = code.unwrap_or_default();
  match raw.parse::<ProjectStatus>() {
    Ok(status) => StatusInfo {
      code:  status.as_str().to_owned(),
      label: status.label().to_owned(),
      badge: status.badge(),
      phase: status.phase(),
    },
    Err(_) => StatusInfo {
      code:  raw.to_owned(),
      label: humanize(raw),
      badge: BadgeStyle::Neutral,
      phase: Phase::default(),
    },
  }
}

/// The full project registry, in workflow order.
pub fn registry() -> Vec<StatusInfo> {
  ProjectStatus::all()
    .map(|s| describe(Some(s.as_str())))
    .collect()
}

/// Parse the code of a closed status enum such as
/// [`DocumentStatus`](crate::document::DocumentStatus).
pub fn parse_code<T: FromStr>(kind: &'static str, code: &str) -> Result<T> {
  code.trim().parse().map_err(|_| Error::UnknownCode {
    kind,
    code: code.to_owned(),
  })
}

/// Turn a snake_case code into a display label: underscores become spaces
/// and each word gets an upper-case first letter.
pub fn humanize(code: &str) -> String {
  let words: Vec<String> = code
    .split(['_', ' '])
    .filter(|w| !w.is_empty())
    .map(|w| {
      let mut chars = w.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect();

  if words.is_empty() {
    "Unknown".to_owned()
  } else {
    words.join(" ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::DocumentStatus;

  #[test]
  fn parse_code_names_the_kind() {
    let s: DocumentStatus = parse_code("document status", " verified ").unwrap();
    assert_eq!(s, DocumentStatus::VerifiedByAdminTeam);

    let err = parse_code::<DocumentStatus>("document status", "lost").unwrap_err();
    assert_eq!(err.to_string(), "unknown document status code: \"lost\"");
  }

  #[test]
  fn known_code_uses_fixed_label() {
    let info = describe(Some("slf_issued"));
    assert_eq!(info.label, "SLF Issued");
    assert_eq!(info.badge, BadgeStyle::Success);
    assert_eq!(info.phase, Phase::Submission);
  }

  #[test]
  fn review_states_are_warnings() {
    for code in [
      "project_lead_review",
      "report_review",
      "head_consultant_review",
      "client_review",
    ] {
      assert_eq!(describe(Some(code)).badge, BadgeStyle::Warning, "{code}");
    }
    assert_eq!(describe(Some("inspection_in_progress")).badge, BadgeStyle::Progress);
  }

  #[test]
  fn unknown_code_degrades_to_neutral() {
    let info = describe(Some("awaiting_site_photos"));
    assert_eq!(info.code, "awaiting_site_photos");
    assert_eq!(info.label, "Awaiting Site Photos");
    assert_eq!(info.badge, BadgeStyle::Neutral);
    assert_eq!(info.phase, Phase::Preparation);
  }

  #[test]
  fn missing_code_is_labelled_unknown() {
    let info = describe(None);
    assert_eq!(info.label, "Unknown");
    assert_eq!(info.phase, Phase::Preparation);

    assert_eq!(describe(Some("")).label, "Unknown");
    assert_eq!(describe(Some("__")).label, "Unknown");
  }

  #[test]
  fn every_known_status_round_trips_through_its_code() {
    for status in ProjectStatus::all() {
      let value = StatusValue::from(status);
      assert_eq!(value.known(), Some(status));
      assert_eq!(describe(Some(status.as_str())).code, status.as_str());
    }
  }

  #[test]
  fn registry_lists_all_seventeen_codes_in_order() {
    let reg = registry();
    assert_eq!(reg.len(), 17);
    assert_eq!(reg.first().map(|i| i.code.as_str()), Some("draft"));
    assert_eq!(reg.last().map(|i| i.code.as_str()), Some("rejected"));
  }

  #[test]
  fn humanize_keeps_acronyms() {
    assert_eq!(humanize("PBG_review"), "PBG Review");
    assert_eq!(humanize("on_hold"), "On Hold");
  }

  #[test]
  fn status_value_serialises_as_plain_string() {
    let v = StatusValue::from(ProjectStatus::ReportReview);
    assert_eq!(serde_json::to_string(&v).unwrap(), "\"report_review\"");
    let back: StatusValue = serde_json::from_str("\"mystery\"").unwrap();
    assert_eq!(back.known(), None);
  }
}
