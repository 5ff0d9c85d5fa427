//! Page-scoped views over the API, one per listing the CLI shows.

use anyhow::Result;
use slfdesk_core::{
  aggregate::{Summary, aggregate},
  document::{Document, DocumentScope, DocumentStatus},
  filter::FilterSpec,
  project::ProjectView,
  schedule::{Schedule, ScheduleStatus},
  status::parse_code,
  view::ViewState,
  workflow::DocumentAction,
};
use uuid::Uuid;

use crate::client::ApiClient;

/// Top-level application state.
///
/// Each listing owns its own snapshot; nothing is shared between them, and
/// a write invalidates only the view it touched.
pub struct App {
  client:        ApiClient,
  pub projects:  ViewState<ProjectView>,
  pub documents: ViewState<Document>,
  pub schedules: ViewState<Schedule>,
}

/// Map a user-typed status onto its canonical wire code, so legacy aliases
/// match what the server stores.
fn canonical<T>(kind: &'static str, status: Option<String>) -> Result<Option<String>>
where
  T: std::str::FromStr + Into<&'static str>,
{
  match status.as_deref().map(str::trim) {
    None | Some("") | Some("all") => Ok(None),
    Some(code) => {
      let parsed: T = parse_code(kind, code)?;
      Ok(Some(parsed.into().to_string()))
    }
  }
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      projects: ViewState::new(),
      documents: ViewState::new(),
      schedules: ViewState::new(),
    }
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  pub async fn load_projects(&mut self) -> Result<()> {
    let client = &self.client;
    self.projects.refresh(|| client.list_projects()).await?;
    Ok(())
  }

  /// Project counts for the dashboard, over the projects `spec` keeps.
  pub fn summary(&self, spec: &FilterSpec) -> Summary {
    aggregate(self.projects.filtered(spec))
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  pub async fn load_documents(&mut self, scope: DocumentScope) -> Result<()> {
    let client = &self.client;
    self.documents.refresh(|| client.list_documents(scope)).await?;
    Ok(())
  }

  pub fn document_filter(
    search: Option<String>,
    status: Option<String>,
  ) -> Result<FilterSpec> {
    Ok(FilterSpec {
      search_text: search,
      status: canonical::<DocumentStatus>("document status", status)?,
      ..FilterSpec::default()
    })
  }

  /// Apply a review action. Client-side validation runs first, so an
  /// invalid action never reaches the server.
  pub async fn review(&mut self, id: Uuid, action: DocumentAction) -> Result<Document> {
    action.validate()?;
    let doc = self.client.transition_document(id, &action).await?;
    tracing::info!(%id, status = doc.status.as_str(), "document reviewed");
    self.documents.invalidate();
    Ok(doc)
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  pub async fn load_schedules(&mut self, project: Option<Uuid>) -> Result<()> {
    let client = &self.client;
    self.schedules.refresh(|| client.list_schedules(project)).await?;
    Ok(())
  }

  pub fn schedule_filter(
    search: Option<String>,
    status: Option<String>,
    assignee: Option<Uuid>,
  ) -> Result<FilterSpec> {
    Ok(FilterSpec {
      search_text: search,
      status: canonical::<ScheduleStatus>("schedule status", status)?,
      assignee_id: assignee,
      ..FilterSpec::default()
    })
  }
}
