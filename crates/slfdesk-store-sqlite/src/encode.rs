//! Encoding and decoding helpers between slfdesk domain types and the plain
//! text stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision so that
//! text order matches time order. Dates are `YYYY-MM-DD`. Enums are their
//! snake_case codes. Checklist answers are compact JSON. UUIDs are hyphenated
//! lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use slfdesk_core::{
  checklist::{ChecklistResponse, ColumnAnswer},
  document::Document,
  inspection::Inspection,
  project::{Client, Project, ProjectView},
  schedule::Schedule,
  status::StatusValue,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(column: &'static str, s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::Decode {
      column,
      value: s.to_owned(),
    })
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

fn decode_date(column: &'static str, s: Option<String>) -> Result<Option<NaiveDate>> {
  s.map(|s| {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| Error::Decode { column, value: s })
  })
  .transpose()
}

/// Parse a snake_case enum code; anything unrecognised is a decode error.
fn decode_code<T: FromStr>(column: &'static str, s: String) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { column, value: s })
}

pub fn encode_answers(answers: &[ColumnAnswer]) -> Result<String> {
  Ok(serde_json::to_string(answers)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `clients` row.
pub struct RawClient {
  pub client_id:  String,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub address:    Option<String>,
  pub created_at: String,
}

impl RawClient {
  pub const COLUMNS: &'static str = "client_id, name, email, phone, address, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      client_id:  row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      phone:      row.get(3)?,
      address:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      client_id:  decode_uuid(&self.client_id)?,
      name:       self.name,
      email:      self.email,
      phone:      self.phone,
      address:    self.address,
      created_at: decode_dt("clients.created_at", &self.created_at)?,
    })
  }
}

/// Raw strings from a `projects` row left-joined with its client's name.
pub struct RawProject {
  pub project_id:       String,
  pub name:             String,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub status:           String,
  pub application_type: String,
  pub client_id:        Option<String>,
  pub lead_id:          Option<String>,
  pub created_at:       String,
  pub start_date:       Option<String>,
  pub due_date:         Option<String>,
  pub client_name:      Option<String>,
}

impl RawProject {
  /// Column list for `projects p LEFT JOIN clients c`.
  pub const COLUMNS: &'static str = "p.project_id, p.name, p.address, p.city, p.status,
     p.application_type, p.client_id, p.lead_id, p.created_at,
     p.start_date, p.due_date, c.name";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:       row.get(0)?,
      name:             row.get(1)?,
      address:          row.get(2)?,
      city:             row.get(3)?,
      status:           row.get(4)?,
      application_type: row.get(5)?,
      client_id:        row.get(6)?,
      lead_id:          row.get(7)?,
      created_at:       row.get(8)?,
      start_date:       row.get(9)?,
      due_date:         row.get(10)?,
      client_name:      row.get(11)?,
    })
  }

  pub fn into_view(self) -> Result<ProjectView> {
    let project = Project {
      project_id:       decode_uuid(&self.project_id)?,
      name:             self.name,
      address:          self.address,
      city:             self.city,
      // Kept verbatim: unknown codes are still shown, just not classified.
      status:           StatusValue::new(self.status),
      application_type: decode_code("projects.application_type", self.application_type)?,
      client_id:        decode_opt_uuid(self.client_id)?,
      lead_id:          decode_opt_uuid(self.lead_id)?,
      created_at:       decode_dt("projects.created_at", &self.created_at)?,
      start_date:       decode_date("projects.start_date", self.start_date)?,
      due_date:         decode_date("projects.due_date", self.due_date)?,
    };
    Ok(ProjectView {
      project,
      client_name: self.client_name,
    })
  }
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub document_id:      String,
  pub name:             String,
  pub doc_type:         String,
  pub status:           String,
  pub project_id:       Option<String>,
  pub uploaded_by:      Option<String>,
  pub url:              String,
  pub rejection_reason: Option<String>,
  pub reviewed_by:      Option<String>,
  pub reviewed_at:      Option<String>,
  pub created_at:       String,
}

impl RawDocument {
  pub const COLUMNS: &'static str = "document_id, name, doc_type, status, project_id,
     uploaded_by, url, rejection_reason, reviewed_by, reviewed_at, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:      row.get(0)?,
      name:             row.get(1)?,
      doc_type:         row.get(2)?,
      status:           row.get(3)?,
      project_id:       row.get(4)?,
      uploaded_by:      row.get(5)?,
      url:              row.get(6)?,
      rejection_reason: row.get(7)?,
      reviewed_by:      row.get(8)?,
      reviewed_at:      row.get(9)?,
      created_at:       row.get(10)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      document_id:      decode_uuid(&self.document_id)?,
      name:             self.name,
      doc_type:         self.doc_type,
      status:           decode_code("documents.status", self.status)?,
      project_id:       decode_opt_uuid(self.project_id)?,
      uploaded_by:      decode_opt_uuid(self.uploaded_by)?,
      url:              self.url,
      rejection_reason: self.rejection_reason,
      reviewed_by:      decode_opt_uuid(self.reviewed_by)?,
      reviewed_at:      self
        .reviewed_at
        .as_deref()
        .map(|s| decode_dt("documents.reviewed_at", s))
        .transpose()?,
      created_at:       decode_dt("documents.created_at", &self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `inspections` row.
pub struct RawInspection {
  pub inspection_id: String,
  pub project_id:    String,
  pub inspector_id:  Option<String>,
  pub scheduled_at:  String,
  pub status:        String,
  pub category:      String,
  pub notes:         Option<String>,
  pub created_at:    String,
}

impl RawInspection {
  pub const COLUMNS: &'static str = "inspection_id, project_id, inspector_id, scheduled_at,
     status, category, notes, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      inspection_id: row.get(0)?,
      project_id:    row.get(1)?,
      inspector_id:  row.get(2)?,
      scheduled_at:  row.get(3)?,
      status:        row.get(4)?,
      category:      row.get(5)?,
      notes:         row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_inspection(self) -> Result<Inspection> {
    Ok(Inspection {
      inspection_id: decode_uuid(&self.inspection_id)?,
      project_id:    decode_uuid(&self.project_id)?,
      inspector_id:  decode_opt_uuid(self.inspector_id)?,
      scheduled_at:  decode_dt("inspections.scheduled_at", &self.scheduled_at)?,
      status:        decode_code("inspections.status", self.status)?,
      category:      decode_code("inspections.category", self.category)?,
      notes:         self.notes,
      created_at:    decode_dt("inspections.created_at", &self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `checklist_responses` row.
pub struct RawResponse {
  pub response_id:     String,
  pub inspection_id:   String,
  pub item_id:         String,
  pub responder_id:    String,
  pub answers_json:    String,
  pub status:          String,
  pub rejection_notes: Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawResponse {
  pub const COLUMNS: &'static str = "response_id, inspection_id, item_id, responder_id,
     answers_json, status, rejection_notes, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      response_id:     row.get(0)?,
      inspection_id:   row.get(1)?,
      item_id:         row.get(2)?,
      responder_id:    row.get(3)?,
      answers_json:    row.get(4)?,
      status:          row.get(5)?,
      rejection_notes: row.get(6)?,
      created_at:      row.get(7)?,
      updated_at:      row.get(8)?,
    })
  }

  pub fn into_response(self) -> Result<ChecklistResponse> {
    Ok(ChecklistResponse {
      response_id:     decode_uuid(&self.response_id)?,
      inspection_id:   decode_uuid(&self.inspection_id)?,
      item_id:         self.item_id,
      responder_id:    decode_uuid(&self.responder_id)?,
      answers:         serde_json::from_str(&self.answers_json)?,
      status:          decode_code("checklist_responses.status", self.status)?,
      rejection_notes: self.rejection_notes,
      created_at:      decode_dt("checklist_responses.created_at", &self.created_at)?,
      updated_at:      decode_dt("checklist_responses.updated_at", &self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `schedules` row.
pub struct RawSchedule {
  pub schedule_id:   String,
  pub project_id:    String,
  pub schedule_type: String,
  pub title:         String,
  pub scheduled_at:  String,
  pub location:      Option<String>,
  pub assignee_id:   Option<String>,
  pub status:        String,
  pub created_at:    String,
}

impl RawSchedule {
  pub const COLUMNS: &'static str = "schedule_id, project_id, schedule_type, title,
     scheduled_at, location, assignee_id, status, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      schedule_id:   row.get(0)?,
      project_id:    row.get(1)?,
      schedule_type: row.get(2)?,
      title:         row.get(3)?,
      scheduled_at:  row.get(4)?,
      location:      row.get(5)?,
      assignee_id:   row.get(6)?,
      status:        row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_schedule(self) -> Result<Schedule> {
    Ok(Schedule {
      schedule_id:   decode_uuid(&self.schedule_id)?,
      project_id:    decode_uuid(&self.project_id)?,
      schedule_type: decode_code("schedules.schedule_type", self.schedule_type)?,
      title:         self.title,
      scheduled_at:  decode_dt("schedules.scheduled_at", &self.scheduled_at)?,
      location:      self.location,
      assignee_id:   decode_opt_uuid(self.assignee_id)?,
      status:        decode_code("schedules.status", self.status)?,
      created_at:    decode_dt("schedules.created_at", &self.created_at)?,
    })
  }
}
