//! Aggregator: per-status and per-phase counts for dashboard summary cards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  filter::Record,
  phase::{Phase, phase_of},
  status::{BadgeStyle, ProjectStatus, describe},
};

/// Counts over a set of projects.
///
/// Every known status and every phase has a bucket, even at zero, so a
/// summary card always has a number to show. Unrecognised status codes get a
/// bucket of their own; the sum of either map is always `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total:     usize,
  pub by_status: BTreeMap<String, usize>,
  pub by_phase:  BTreeMap<Phase, usize>,
}

impl Default for Summary {
  fn default() -> Self {
    Self {
      total:     0,
      by_status: ProjectStatus::all()
        .map(|s| (s.as_str().to_owned(), 0))
        .collect(),
      by_phase:  Phase::ALL.into_iter().map(|p| (p, 0)).collect(),
    }
  }
}

/// One row of a summary-card strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCard {
  pub key:     String,
  pub label:   String,
  pub badge:   BadgeStyle,
  pub count:   usize,
  pub percent: u32,
}

/// `round(count / total * 100)`; zero when `total` is zero.
pub fn percent_of(count: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  (count as f64 / total as f64 * 100.0).round() as u32
}

/// Count `records` by status and by phase in a single pass.
pub fn aggregate<'a, R, I>(records: I) -> Summary
where
  R: Record + 'a,
  I: IntoIterator<Item = &'a R>,
{
  let mut summary = Summary::default();
  for record in records {
    let code = record.status_code();
    let key = describe(code).code;
    *summary.by_status.entry(key).or_default() += 1;
    *summary.by_phase.entry(phase_of(code)).or_default() += 1;
    summary.total += 1;
  }
  summary
}

impl Summary {
  pub fn status_count(&self, code: &str) -> usize {
    self.by_status.get(code).copied().unwrap_or_default()
  }

  pub fn phase_count(&self, phase: Phase) -> usize {
    self.by_phase.get(&phase).copied().unwrap_or_default()
  }

  pub fn status_percent(&self, code: &str) -> u32 {
    percent_of(self.status_count(code), self.total)
  }

  pub fn phase_percent(&self, phase: Phase) -> u32 {
    percent_of(self.phase_count(phase), self.total)
  }

  /// One card per phase, Preparation through Submission, then Closed.
  pub fn phase_cards(&self) -> Vec<SummaryCard> {
    Phase::ALL
      .into_iter()
      .cycle()
      .skip(1)
      .take(Phase::ALL.len())
      .map(|phase| SummaryCard {
        key:     phase.number().to_string(),
        label:   phase.label().to_owned(),
        badge:   phase.badge(),
        count:   self.phase_count(phase),
        percent: self.phase_percent(phase),
      })
      .collect()
  }

  /// One card per known status in workflow order, followed by any
  /// unrecognised codes that were counted.
  pub fn status_cards(&self) -> Vec<SummaryCard> {
    let known = ProjectStatus::all().map(|s| s.as_str().to_owned());
    let unknown = self
      .by_status
      .keys()
      .filter(|k| k.parse::<ProjectStatus>().is_err())
      .cloned();

    known
      .chain(unknown)
      .map(|code| {
        let info = describe(Some(code.as_str()));
        SummaryCard {
          count:   self.status_count(&code),
          percent: self.status_percent(&code),
          label:   info.label,
          badge:   info.badge,
          key:     code,
        }
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::project::{ApplicationType, Project};

  fn project(status: &str) -> Project {
    Project {
      project_id:       Uuid::new_v4(),
      name:             format!("proyek {status}"),
      address:          None,
      city:             None,
      status:           crate::status::StatusValue::new(status),
      application_type: ApplicationType::Pbg,
      client_id:        None,
      lead_id:          None,
      created_at:       Utc::now(),
      start_date:       None,
      due_date:         None,
    }
  }

  #[test]
  fn empty_input_has_zero_buckets_and_no_nan() {
    let summary = aggregate(&Vec::<Project>::new());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.by_status.len(), 17);
    assert!(summary.by_status.values().all(|c| *c == 0));
    assert_eq!(summary.by_phase.len(), 6);
    assert!(summary.by_phase.values().all(|c| *c == 0));
    assert!(summary.phase_cards().iter().all(|c| c.percent == 0));
    assert!(summary.status_cards().iter().all(|c| c.percent == 0));
  }

  #[test]
  fn example_portfolio() {
    let projects: Vec<_> = [
      "draft",
      "inspection_in_progress",
      "slf_issued",
      "slf_issued",
      "rejected",
    ]
    .into_iter()
    .map(project)
    .collect();

    let summary = aggregate(&projects);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.status_count("slf_issued"), 2);
    assert_eq!(summary.phase_count(Phase::Closed), 1);
    assert_eq!(summary.phase_count(Phase::Preparation), 1);
    assert_eq!(summary.phase_count(Phase::FieldInspection), 1);
    assert_eq!(summary.phase_count(Phase::ReportDrafting), 0);
    assert_eq!(summary.phase_count(Phase::Approval), 0);
    assert_eq!(summary.phase_count(Phase::Submission), 2);
    assert_eq!(summary.phase_percent(Phase::Submission), 40);
  }

  #[test]
  fn sums_equal_total_even_with_unknown_codes() {
    let projects: Vec<_> = ["draft", "on_hold", "completed", "on_hold"]
      .into_iter()
      .map(project)
      .collect();
    let summary = aggregate(&projects);

    assert_eq!(summary.by_status.values().sum::<usize>(), 4);
    assert_eq!(summary.by_phase.values().sum::<usize>(), 4);
    assert_eq!(summary.status_count("on_hold"), 2);
    // Unknown codes count as preparation.
    assert_eq!(summary.phase_count(Phase::Preparation), 3);

    let cards = summary.status_cards();
    let last = cards.last().unwrap();
    assert_eq!(last.key, "on_hold");
    assert_eq!(last.label, "On Hold");
    assert_eq!(last.percent, 50);
  }

  #[test]
  fn phase_cards_end_with_closed() {
    let cards = Summary::default().phase_cards();
    let keys: Vec<_> = cards.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["1", "2", "3", "4", "5", "0"]);
  }

  #[test]
  fn percent_rounds_to_nearest() {
    assert_eq!(percent_of(1, 3), 33);
    assert_eq!(percent_of(2, 3), 67);
    assert_eq!(percent_of(0, 0), 0);
    assert_eq!(percent_of(5, 0), 0);
  }

  #[test]
  fn summary_json_uses_numeric_phase_keys() {
    let summary = aggregate(&[project("report_draft")]);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["by_phase"]["3"], 1);
    assert_eq!(json["by_status"]["report_draft"], 1);
  }
}
