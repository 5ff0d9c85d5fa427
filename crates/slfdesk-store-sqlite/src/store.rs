//! [`SqliteStore`]: the SQLite implementation of [`PermitStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use slfdesk_core::{
  checklist::{ChecklistResponse, NewResponse, ResponsePatch, ResponseStatus},
  document::{Document, DocumentPatch, DocumentScope, DocumentStatus, NewDocument},
  inspection::{Inspection, InspectionPatch, InspectionStatus, NewInspection},
  project::{Client, ClientPatch, NewClient, NewProject, Project, ProjectPatch, ProjectView},
  schedule::{NewSchedule, Schedule, SchedulePatch, ScheduleStatus},
  store::PermitStore,
};

use crate::{
  Error, Result,
  encode::{
    RawClient, RawDocument, RawInspection, RawProject, RawResponse, RawSchedule,
    encode_answers, encode_date, encode_dt, encode_uuid,
  },
  schema::{PRAGMAS, SCHEMA, SCHEMA_VERSION},
};

/// Positional SQL arguments. Every column the store writes is text or NULL.
type Args = Vec<Option<String>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A permit store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let (found, created) = self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        let found: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if found != 0 {
          return Ok((found, false));
        }
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        Ok((SCHEMA_VERSION, true))
      })
      .await?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaTooNew {
        found,
        supported: SCHEMA_VERSION,
      });
    }
    tracing::debug!(version = found, created, "sqlite schema ready");
    Ok(())
  }

  /// Run a `SELECT` and map every row with `map`.
  async fn select<T, F>(&self, sql: String, args: Args, map: F) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), |row| map(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a single write statement, returning the number of rows changed.
  async fn execute(&self, sql: &'static str, args: Args) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(args.iter()))?))
      .await?;
    Ok(changed)
  }

  /// Read the row keyed by `id`, edit it, and write it back inside one
  /// immediate transaction. Concurrent updates to the same row serialise
  /// instead of overwriting each other's fields.
  async fn modify<R, T, D, E>(
    &self,
    select_sql: String,
    update_sql: &'static str,
    id: Uuid,
    decode: D,
    edit: E,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
    D: Fn(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
    E: FnOnce(R) -> Result<(T, Args)> + Send + 'static,
  {
    let key = encode_uuid(id);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(raw) = tx
          .query_row(&select_sql, rusqlite::params![key], |row| decode(row))
          .optional()?
        else {
          return Ok(Ok(None));
        };
        // a decode failure drops `tx`, rolling back
        let (value, args) = match edit(raw) {
          Ok(edited) => edited,
          Err(e) => return Ok(Err(e)),
        };
        tx.execute(update_sql, rusqlite::params_from_iter(args.iter()))?;
        tx.commit()?;
        Ok(Ok(Some(value)))
      })
      .await?;
    outcome
  }

  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    Ok(self.execute(sql, vec![Some(encode_uuid(id))]).await? > 0)
  }
}

// ─── Argument lists ──────────────────────────────────────────────────────────
//
// The id always comes first, so one list serves both `INSERT ... VALUES
// (?1, ...)` and `UPDATE ... SET col = ?2, ... WHERE id = ?1`.

fn client_args(c: &Client) -> Args {
  vec![
    Some(encode_uuid(c.client_id)),
    Some(c.name.clone()),
    c.email.clone(),
    c.phone.clone(),
    c.address.clone(),
    Some(encode_dt(c.created_at)),
  ]
}

fn project_args(p: &Project) -> Args {
  vec![
    Some(encode_uuid(p.project_id)),
    Some(p.name.clone()),
    p.address.clone(),
    p.city.clone(),
    Some(p.status.as_str().to_owned()),
    Some(p.application_type.as_str().to_owned()),
    p.client_id.map(encode_uuid),
    p.lead_id.map(encode_uuid),
    Some(encode_dt(p.created_at)),
    p.start_date.map(encode_date),
    p.due_date.map(encode_date),
  ]
}

fn document_args(d: &Document) -> Args {
  vec![
    Some(encode_uuid(d.document_id)),
    Some(d.name.clone()),
    Some(d.doc_type.clone()),
    Some(d.status.as_str().to_owned()),
    d.project_id.map(encode_uuid),
    d.uploaded_by.map(encode_uuid),
    Some(d.url.clone()),
    d.rejection_reason.clone(),
    d.reviewed_by.map(encode_uuid),
    d.reviewed_at.map(encode_dt),
    Some(encode_dt(d.created_at)),
  ]
}

fn inspection_args(i: &Inspection) -> Args {
  vec![
    Some(encode_uuid(i.inspection_id)),
    Some(encode_uuid(i.project_id)),
    i.inspector_id.map(encode_uuid),
    Some(encode_dt(i.scheduled_at)),
    Some(i.status.as_str().to_owned()),
    Some(i.category.as_str().to_owned()),
    i.notes.clone(),
    Some(encode_dt(i.created_at)),
  ]
}

fn response_args(r: &ChecklistResponse) -> Result<Args> {
  Ok(vec![
    Some(encode_uuid(r.response_id)),
    Some(encode_uuid(r.inspection_id)),
    Some(r.item_id.clone()),
    Some(encode_uuid(r.responder_id)),
    Some(encode_answers(&r.answers)?),
    Some(r.status.as_str().to_owned()),
    r.rejection_notes.clone(),
    Some(encode_dt(r.created_at)),
    Some(encode_dt(r.updated_at)),
  ])
}

fn schedule_args(s: &Schedule) -> Args {
  vec![
    Some(encode_uuid(s.schedule_id)),
    Some(encode_uuid(s.project_id)),
    Some(s.schedule_type.as_str().to_owned()),
    Some(s.title.clone()),
    Some(encode_dt(s.scheduled_at)),
    s.location.clone(),
    s.assignee_id.map(encode_uuid),
    Some(s.status.as_str().to_owned()),
    Some(encode_dt(s.created_at)),
  ]
}

// ─── SQL ─────────────────────────────────────────────────────────────────────

const INSERT_CLIENT: &str = "INSERT INTO clients (
   client_id, name, email, phone, address, created_at
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE_CLIENT: &str = "UPDATE clients
   SET name = ?2, email = ?3, phone = ?4, address = ?5, created_at = ?6
 WHERE client_id = ?1";

const INSERT_PROJECT: &str = "INSERT INTO projects (
   project_id, name, address, city, status, application_type,
   client_id, lead_id, created_at, start_date, due_date
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const UPDATE_PROJECT: &str = "UPDATE projects
   SET name = ?2, address = ?3, city = ?4, status = ?5, application_type = ?6,
       client_id = ?7, lead_id = ?8, created_at = ?9, start_date = ?10,
       due_date = ?11
 WHERE project_id = ?1";

const INSERT_DOCUMENT: &str = "INSERT INTO documents (
   document_id, name, doc_type, status, project_id, uploaded_by, url,
   rejection_reason, reviewed_by, reviewed_at, created_at
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const UPDATE_DOCUMENT: &str = "UPDATE documents
   SET name = ?2, doc_type = ?3, status = ?4, project_id = ?5, uploaded_by = ?6,
       url = ?7, rejection_reason = ?8, reviewed_by = ?9, reviewed_at = ?10,
       created_at = ?11
 WHERE document_id = ?1";

const INSERT_INSPECTION: &str = "INSERT INTO inspections (
   inspection_id, project_id, inspector_id, scheduled_at, status, category,
   notes, created_at
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const UPDATE_INSPECTION: &str = "UPDATE inspections
   SET project_id = ?2, inspector_id = ?3, scheduled_at = ?4, status = ?5,
       category = ?6, notes = ?7, created_at = ?8
 WHERE inspection_id = ?1";

const INSERT_RESPONSE: &str = "INSERT INTO checklist_responses (
   response_id, inspection_id, item_id, responder_id, answers_json, status,
   rejection_notes, created_at, updated_at
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const UPDATE_RESPONSE: &str = "UPDATE checklist_responses
   SET inspection_id = ?2, item_id = ?3, responder_id = ?4, answers_json = ?5,
       status = ?6, rejection_notes = ?7, created_at = ?8, updated_at = ?9
 WHERE response_id = ?1";

const INSERT_SCHEDULE: &str = "INSERT INTO schedules (
   schedule_id, project_id, schedule_type, title, scheduled_at, location,
   assignee_id, status, created_at
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const UPDATE_SCHEDULE: &str = "UPDATE schedules
   SET project_id = ?2, schedule_type = ?3, title = ?4, scheduled_at = ?5,
       location = ?6, assignee_id = ?7, status = ?8, created_at = ?9
 WHERE schedule_id = ?1";

fn project_select(where_clause: &str) -> String {
  format!(
    "SELECT {} FROM projects p LEFT JOIN clients c ON c.client_id = p.client_id
     {where_clause}
     ORDER BY p.created_at, p.project_id",
    RawProject::COLUMNS
  )
}

// ─── PermitStore impl ────────────────────────────────────────────────────────

impl PermitStore for SqliteStore {
  type Error = crate::Error;

  // ── Clients ───────────────────────────────────────────────────────────────

  async fn list_clients(&self) -> Result<Vec<Client>> {
    let sql = format!(
      "SELECT {} FROM clients ORDER BY created_at, client_id",
      RawClient::COLUMNS
    );
    let raws = self.select(sql, vec![], RawClient::from_row).await?;
    raws.into_iter().map(RawClient::into_client).collect()
  }

  async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
    let sql = format!("SELECT {} FROM clients WHERE client_id = ?1", RawClient::COLUMNS);
    let raws = self
      .select(sql, vec![Some(encode_uuid(id))], RawClient::from_row)
      .await?;
    raws.into_iter().next().map(RawClient::into_client).transpose()
  }

  async fn create_client(&self, input: NewClient) -> Result<Client> {
    let client = Client {
      client_id:  Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      phone:      input.phone,
      address:    input.address,
      created_at: Utc::now(),
    };
    self.execute(INSERT_CLIENT, client_args(&client)).await?;
    Ok(client)
  }

  async fn update_client(&self, id: Uuid, patch: ClientPatch) -> Result<Option<Client>> {
    let sql = format!("SELECT {} FROM clients WHERE client_id = ?1", RawClient::COLUMNS);
    self
      .modify(sql, UPDATE_CLIENT, id, RawClient::from_row, move |raw| {
        let mut client = raw.into_client()?;
        client.apply(patch);
        let args = client_args(&client);
        Ok((client, args))
      })
      .await
  }

  async fn delete_client(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM clients WHERE client_id = ?1", id)
      .await
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn list_projects(&self) -> Result<Vec<ProjectView>> {
    let raws = self
      .select(project_select(""), vec![], RawProject::from_row)
      .await?;
    raws.into_iter().map(RawProject::into_view).collect()
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<ProjectView>> {
    let raws = self
      .select(
        project_select("WHERE p.project_id = ?1"),
        vec![Some(encode_uuid(id))],
        RawProject::from_row,
      )
      .await?;
    raws.into_iter().next().map(RawProject::into_view).transpose()
  }

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let project = Project {
      project_id:       Uuid::new_v4(),
      name:             input.name,
      address:          input.address,
      city:             input.city,
      status:           input.status,
      application_type: input.application_type,
      client_id:        input.client_id,
      lead_id:          input.lead_id,
      created_at:       Utc::now(),
      start_date:       input.start_date,
      due_date:         input.due_date,
    };
    self.execute(INSERT_PROJECT, project_args(&project)).await?;
    Ok(project)
  }

  async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> Result<Option<Project>> {
    let sql = project_select("WHERE p.project_id = ?1");
    self
      .modify(sql, UPDATE_PROJECT, id, RawProject::from_row, move |raw| {
        let mut project = raw.into_view()?.project;
        project.apply(patch);
        let args = project_args(&project);
        Ok((project, args))
      })
      .await
  }

  async fn delete_project(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM projects WHERE project_id = ?1", id)
      .await
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn list_documents(&self, scope: DocumentScope) -> Result<Vec<Document>> {
    let (where_clause, args) = match scope {
      DocumentScope::All => ("", vec![]),
      DocumentScope::Project(id) => ("WHERE project_id = ?1", vec![Some(encode_uuid(id))]),
      DocumentScope::Unassigned => ("WHERE project_id IS NULL", vec![]),
    };
    let sql = format!(
      "SELECT {} FROM documents {where_clause} ORDER BY created_at, document_id",
      RawDocument::COLUMNS
    );
    let raws = self.select(sql, args, RawDocument::from_row).await?;
    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    let sql = format!(
      "SELECT {} FROM documents WHERE document_id = ?1",
      RawDocument::COLUMNS
    );
    let raws = self
      .select(sql, vec![Some(encode_uuid(id))], RawDocument::from_row)
      .await?;
    raws.into_iter().next().map(RawDocument::into_document).transpose()
  }

  async fn create_document(&self, input: NewDocument) -> Result<Document> {
    let document = Document {
      document_id:      Uuid::new_v4(),
      name:             input.name,
      doc_type:         input.doc_type,
      status:           DocumentStatus::Pending,
      project_id:       input.project_id,
      uploaded_by:      input.uploaded_by,
      url:              input.url,
      rejection_reason: None,
      reviewed_by:      None,
      reviewed_at:      None,
      created_at:       Utc::now(),
    };
    self.execute(INSERT_DOCUMENT, document_args(&document)).await?;
    Ok(document)
  }

  async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> Result<Option<Document>> {
    let sql = format!(
      "SELECT {} FROM documents WHERE document_id = ?1",
      RawDocument::COLUMNS
    );
    self
      .modify(sql, UPDATE_DOCUMENT, id, RawDocument::from_row, move |raw| {
        let mut document = raw.into_document()?;
        document.apply(patch);
        let args = document_args(&document);
        Ok((document, args))
      })
      .await
  }

  async fn delete_document(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM documents WHERE document_id = ?1", id)
      .await
  }

  // ── Inspections ───────────────────────────────────────────────────────────

  async fn list_inspections(&self, project_id: Option<Uuid>) -> Result<Vec<Inspection>> {
    let (where_clause, args) = match project_id {
      Some(id) => ("WHERE project_id = ?1", vec![Some(encode_uuid(id))]),
      None => ("", vec![]),
    };
    let sql = format!(
      "SELECT {} FROM inspections {where_clause} ORDER BY created_at, inspection_id",
      RawInspection::COLUMNS
    );
    let raws = self.select(sql, args, RawInspection::from_row).await?;
    raws.into_iter().map(RawInspection::into_inspection).collect()
  }

  async fn get_inspection(&self, id: Uuid) -> Result<Option<Inspection>> {
    let sql = format!(
      "SELECT {} FROM inspections WHERE inspection_id = ?1",
      RawInspection::COLUMNS
    );
    let raws = self
      .select(sql, vec![Some(encode_uuid(id))], RawInspection::from_row)
      .await?;
    raws
      .into_iter()
      .next()
      .map(RawInspection::into_inspection)
      .transpose()
  }

  async fn create_inspection(&self, input: NewInspection) -> Result<Inspection> {
    let inspection = Inspection {
      inspection_id: Uuid::new_v4(),
      project_id:    input.project_id,
      inspector_id:  input.inspector_id,
      scheduled_at:  input.scheduled_at,
      status:        InspectionStatus::Scheduled,
      category:      input.category,
      notes:         input.notes,
      created_at:    Utc::now(),
    };
    self.execute(INSERT_INSPECTION, inspection_args(&inspection)).await?;
    Ok(inspection)
  }

  async fn update_inspection(
    &self,
    id: Uuid,
    patch: InspectionPatch,
  ) -> Result<Option<Inspection>> {
    let sql = format!(
      "SELECT {} FROM inspections WHERE inspection_id = ?1",
      RawInspection::COLUMNS
    );
    self
      .modify(sql, UPDATE_INSPECTION, id, RawInspection::from_row, move |raw| {
        let mut inspection = raw.into_inspection()?;
        inspection.apply(patch);
        let args = inspection_args(&inspection);
        Ok((inspection, args))
      })
      .await
  }

  async fn delete_inspection(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM inspections WHERE inspection_id = ?1", id)
      .await
  }

  // ── Checklist responses ───────────────────────────────────────────────────

  async fn list_responses(&self, inspection_id: Uuid) -> Result<Vec<ChecklistResponse>> {
    let sql = format!(
      "SELECT {} FROM checklist_responses WHERE inspection_id = ?1
       ORDER BY created_at, response_id",
      RawResponse::COLUMNS
    );
    let raws = self
      .select(sql, vec![Some(encode_uuid(inspection_id))], RawResponse::from_row)
      .await?;
    raws.into_iter().map(RawResponse::into_response).collect()
  }

  async fn get_response(&self, id: Uuid) -> Result<Option<ChecklistResponse>> {
    let sql = format!(
      "SELECT {} FROM checklist_responses WHERE response_id = ?1",
      RawResponse::COLUMNS
    );
    let raws = self
      .select(sql, vec![Some(encode_uuid(id))], RawResponse::from_row)
      .await?;
    raws.into_iter().next().map(RawResponse::into_response).transpose()
  }

  async fn create_response(&self, input: NewResponse) -> Result<ChecklistResponse> {
    let now = Utc::now();
    let response = ChecklistResponse {
      response_id:     Uuid::new_v4(),
      inspection_id:   input.inspection_id,
      item_id:         input.item_id,
      responder_id:    input.responder_id,
      answers:         input.answers,
      status:          ResponseStatus::Submitted,
      rejection_notes: None,
      created_at:      now,
      updated_at:      now,
    };
    self.execute(INSERT_RESPONSE, response_args(&response)?).await?;
    Ok(response)
  }

  async fn update_response(
    &self,
    id: Uuid,
    patch: ResponsePatch,
  ) -> Result<Option<ChecklistResponse>> {
    let sql = format!(
      "SELECT {} FROM checklist_responses WHERE response_id = ?1",
      RawResponse::COLUMNS
    );
    self
      .modify(sql, UPDATE_RESPONSE, id, RawResponse::from_row, move |raw| {
        let mut response = raw.into_response()?;
        response.apply(patch);
        response.updated_at = Utc::now();
        let args = response_args(&response)?;
        Ok((response, args))
      })
      .await
  }

  async fn delete_response(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM checklist_responses WHERE response_id = ?1", id)
      .await
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  async fn list_schedules(&self, project_id: Option<Uuid>) -> Result<Vec<Schedule>> {
    let (where_clause, args) = match project_id {
      Some(id) => ("WHERE project_id = ?1", vec![Some(encode_uuid(id))]),
      None => ("", vec![]),
    };
    let sql = format!(
      "SELECT {} FROM schedules {where_clause} ORDER BY created_at, schedule_id",
      RawSchedule::COLUMNS
    );
    let raws = self.select(sql, args, RawSchedule::from_row).await?;
    raws.into_iter().map(RawSchedule::into_schedule).collect()
  }

  async fn get_schedule(&self, id: Uuid) -> Result<Option<Schedule>> {
    let sql = format!(
      "SELECT {} FROM schedules WHERE schedule_id = ?1",
      RawSchedule::COLUMNS
    );
    let raws = self
      .select(sql, vec![Some(encode_uuid(id))], RawSchedule::from_row)
      .await?;
    raws.into_iter().next().map(RawSchedule::into_schedule).transpose()
  }

  async fn create_schedule(&self, input: NewSchedule) -> Result<Schedule> {
    let schedule = Schedule {
      schedule_id:   Uuid::new_v4(),
      project_id:    input.project_id,
      schedule_type: input.schedule_type,
      title:         input.title,
      scheduled_at:  input.scheduled_at,
      location:      input.location,
      assignee_id:   input.assignee_id,
      status:        ScheduleStatus::Scheduled,
      created_at:    Utc::now(),
    };
    self.execute(INSERT_SCHEDULE, schedule_args(&schedule)).await?;
    Ok(schedule)
  }

  async fn update_schedule(&self, id: Uuid, patch: SchedulePatch) -> Result<Option<Schedule>> {
    let sql = format!(
      "SELECT {} FROM schedules WHERE schedule_id = ?1",
      RawSchedule::COLUMNS
    );
    self
      .modify(sql, UPDATE_SCHEDULE, id, RawSchedule::from_row, move |raw| {
        let mut schedule = raw.into_schedule()?;
        schedule.apply(patch);
        let args = schedule_args(&schedule);
        Ok((schedule, args))
      })
      .await
  }

  async fn delete_schedule(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM schedules WHERE schedule_id = ?1", id)
      .await
  }
}
