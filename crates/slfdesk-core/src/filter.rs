//! Filter Engine: the AND-combined predicates behind every list view.
//!
//! Records opt in through [`Record`], declaring which string fields free-text
//! search looks at and which fields the exact-match predicates compare.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  checklist::ChecklistResponse,
  document::Document,
  inspection::Inspection,
  project::{Project, ProjectView},
  schedule::Schedule,
};

/// Sentinel that disables a status or reference predicate.
pub const ALL: &str = "all";

// ─── Record ──────────────────────────────────────────────────────────────────

/// The view of a record the filter engine and aggregator need.
pub trait Record {
  /// Fields free-text search matches against.
  fn search_fields(&self) -> Vec<&str>;

  /// The raw status code.
  fn status_code(&self) -> Option<&str>;

  /// The user the record is assigned to (lead, inspector, assignee, ...).
  fn assignee_id(&self) -> Option<Uuid> { None }

  /// The project the record belongs to.
  fn project_ref(&self) -> Option<Uuid> { None }

  /// The date used by date-range filters.
  fn record_date(&self) -> Option<NaiveDate> { None }
}

impl Record for Project {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = vec![self.name.as_str()];
    fields.extend(self.city.as_deref());
    fields.extend(self.address.as_deref());
    fields
  }

  fn status_code(&self) -> Option<&str> { Some(self.status.as_str()) }

  fn assignee_id(&self) -> Option<Uuid> { self.lead_id }

  fn project_ref(&self) -> Option<Uuid> { Some(self.project_id) }

  fn record_date(&self) -> Option<NaiveDate> {
    self.start_date.or_else(|| Some(self.created_at.date_naive()))
  }
}

impl Record for ProjectView {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = self.project.search_fields();
    fields.extend(self.client_name.as_deref());
    fields
  }

  fn status_code(&self) -> Option<&str> { self.project.status_code() }

  fn assignee_id(&self) -> Option<Uuid> { self.project.assignee_id() }

  fn project_ref(&self) -> Option<Uuid> { self.project.project_ref() }

  fn record_date(&self) -> Option<NaiveDate> { self.project.record_date() }
}

impl Record for Document {
  fn search_fields(&self) -> Vec<&str> {
    vec![self.name.as_str(), self.doc_type.as_str()]
  }

  fn status_code(&self) -> Option<&str> { Some(self.status.as_str()) }

  fn assignee_id(&self) -> Option<Uuid> { self.uploaded_by }

  fn project_ref(&self) -> Option<Uuid> { self.project_id }

  fn record_date(&self) -> Option<NaiveDate> { Some(self.created_at.date_naive()) }
}

impl Record for Inspection {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = vec![self.category.as_str()];
    fields.extend(self.notes.as_deref());
    fields
  }

  fn status_code(&self) -> Option<&str> { Some(self.status.as_str()) }

  fn assignee_id(&self) -> Option<Uuid> { self.inspector_id }

  fn project_ref(&self) -> Option<Uuid> { Some(self.project_id) }

  fn record_date(&self) -> Option<NaiveDate> { Some(self.scheduled_at.date_naive()) }
}

impl Record for Schedule {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = vec![self.title.as_str(), self.schedule_type.as_str()];
    fields.extend(self.location.as_deref());
    fields
  }

  fn status_code(&self) -> Option<&str> { Some(self.status.as_str()) }

  fn assignee_id(&self) -> Option<Uuid> { self.assignee_id }

  fn project_ref(&self) -> Option<Uuid> { Some(self.project_id) }

  fn record_date(&self) -> Option<NaiveDate> { Some(self.scheduled_at.date_naive()) }
}

impl Record for ChecklistResponse {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = vec![self.item_id.as_str()];
    fields.extend(self.answers.iter().filter_map(|a| a.value.text()));
    fields
  }

  fn status_code(&self) -> Option<&str> { Some(self.status.as_str()) }

  fn assignee_id(&self) -> Option<Uuid> { Some(self.responder_id) }

  fn record_date(&self) -> Option<NaiveDate> { Some(self.created_at.date_naive()) }
}

// ─── FilterSpec ───────────────────────────────────────────────────────────────

/// Inclusive date window; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

impl DateRange {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
  }

  fn is_unbounded(&self) -> bool { self.from.is_none() && self.to.is_none() }
}

/// The predicates applied by [`filter`]. Every field left at its default
/// disables the corresponding predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
  pub search_text: Option<String>,
  /// Exact status code; empty or `"all"` disables.
  pub status:      Option<String>,
  pub assignee_id: Option<Uuid>,
  pub project_id:  Option<Uuid>,
  pub date_range:  Option<DateRange>,
}

impl FilterSpec {
  pub fn search(mut self, text: impl Into<String>) -> Self {
    self.search_text = Some(text.into());
    self
  }

  pub fn status(mut self, code: impl Into<String>) -> Self {
    self.status = Some(code.into());
    self
  }

  pub fn assignee(mut self, id: Uuid) -> Self {
    self.assignee_id = Some(id);
    self
  }

  pub fn project(mut self, id: Uuid) -> Self {
    self.project_id = Some(id);
    self
  }

  pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
    self.date_range = Some(DateRange { from, to });
    self
  }

  /// Precompute the normalised predicates once per filter pass.
  fn compile(&self) -> Compiled<'_> {
    Compiled {
      needle:     self
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase),
      status:     self
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ALL),
      assignee:   self.assignee_id,
      project:    self.project_id,
      date_range: self.date_range.filter(|r| !r.is_unbounded()),
    }
  }

  /// Whether a single record passes every active predicate.
  pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
    self.compile().matches(record)
  }
}

struct Compiled<'a> {
  needle:     Option<String>,
  status:     Option<&'a str>,
  assignee:   Option<Uuid>,
  project:    Option<Uuid>,
  date_range: Option<DateRange>,
}

impl Compiled<'_> {
  fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
    if let Some(needle) = &self.needle {
      let hit = record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle.as_str()));
      if !hit {
        return false;
      }
    }
    if let Some(status) = self.status
      && record.status_code() != Some(status)
    {
      return false;
    }
    if let Some(assignee) = self.assignee
      && record.assignee_id() != Some(assignee)
    {
      return false;
    }
    if let Some(project) = self.project
      && record.project_ref() != Some(project)
    {
      return false;
    }
    if let Some(range) = self.date_range {
      match record.record_date() {
        Some(date) if range.contains(date) => {}
        _ => return false,
      }
    }
    true
  }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Return the matching records, cloned, in their original order.
pub fn filter<R: Record + Clone>(records: &[R], spec: &FilterSpec) -> Vec<R> {
  let compiled = spec.compile();
  records
    .iter()
    .filter(|r| compiled.matches(*r))
    .cloned()
    .collect()
}

/// Like [`filter`], but borrows instead of cloning.
pub fn filter_refs<'a, R: Record>(records: &'a [R], spec: &FilterSpec) -> Vec<&'a R> {
  let compiled = spec.compile();
  records.iter().filter(|r| compiled.matches(*r)).collect()
}

/// Parse a reference selector from a query string: empty or `"all"` means no
/// filter.
pub fn parse_ref(raw: Option<&str>) -> Result<Option<Uuid>> {
  match raw.map(str::trim) {
    None | Some("") | Some(ALL) => Ok(None),
    Some(s) => Uuid::parse_str(s)
      .map(Some)
      .map_err(|_| Error::Validation(format!("invalid id: {s:?}"))),
  }
}
