//! Query-string parameters shared by the list endpoints.
//!
//! Every list endpoint fetches its collection from the store and then runs
//! the filter engine over it, so the parameters here map one-to-one onto a
//! [`FilterSpec`].

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use slfdesk_core::{
  filter::{ALL, FilterSpec, parse_ref},
  status::{Badged, parse_code},
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub search:       Option<String>,
  /// Exact status code, or `all`.
  pub status:       Option<String>,
  /// Owning project id, or `all`.
  pub project_id:   Option<String>,
  pub lead_id:      Option<String>,
  pub inspector_id: Option<String>,
  pub assignee_id:  Option<String>,
  /// Documents only: list the unassigned pool.
  #[serde(default)]
  pub unassigned:   bool,
  pub from:         Option<NaiveDate>,
  pub to:           Option<NaiveDate>,
}

impl ListParams {
  pub fn project(&self) -> Result<Option<Uuid>, ApiError> {
    Ok(parse_ref(self.project_id.as_deref())?)
  }

  /// Build the filter for this request. `assignee` is whichever of
  /// `lead_id`, `inspector_id` or `assignee_id` the endpoint honours.
  pub fn filter_spec(&self, assignee: Option<&str>) -> Result<FilterSpec, ApiError> {
    let mut spec = FilterSpec {
      search_text: self.search.clone(),
      status: self.status.clone(),
      ..FilterSpec::default()
    };
    if let Some(id) = parse_ref(assignee)? {
      spec = spec.assignee(id);
    }
    if let Some(id) = self.project()? {
      spec = spec.project(id);
    }
    if self.from.is_some() || self.to.is_some() {
      spec = spec.between(self.from, self.to);
    }
    Ok(spec)
  }

  /// [`filter_spec`](Self::filter_spec) for records whose status is the
  /// closed enum `T`: an unknown code is a bad request, and a known one is
  /// rewritten to its canonical spelling.
  pub fn closed_filter_spec<T: Badged + FromStr>(
    &self,
    kind: &'static str,
    assignee: Option<&str>,
  ) -> Result<FilterSpec, ApiError> {
    let mut spec = self.filter_spec(assignee)?;
    if let Some(code) = spec
      .status
      .as_deref()
      .map(str::trim)
      .filter(|c| !c.is_empty() && *c != ALL)
    {
      let status: T = parse_code(kind, code)?;
      spec.status = Some(status.code().to_owned());
    }
    Ok(spec)
  }
}
