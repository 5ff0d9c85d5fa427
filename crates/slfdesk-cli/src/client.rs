//! Async HTTP client wrapping the slfdesk JSON API.

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use slfdesk_core::{
  document::{Document, DocumentScope},
  project::ProjectView,
  schedule::Schedule,
  workflow::DocumentAction,
};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the slfdesk API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the slfdesk JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn checked(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|body| body["error"].as_str().map(str::to_owned))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    tracing::debug!(path, ?query, "GET");
    let resp = self
      .auth(self.client.get(self.url(path)))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::checked(resp, &format!("GET {path}"))
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  /// `GET /api/projects`
  pub async fn list_projects(&self) -> Result<Vec<ProjectView>> {
    self.get_json("/projects", &[]).await
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// `GET /api/documents[?project_id=<id>|?unassigned=true]`
  pub async fn list_documents(&self, scope: DocumentScope) -> Result<Vec<Document>> {
    let query = match scope {
      DocumentScope::All => vec![],
      DocumentScope::Project(id) => vec![("project_id", id.to_string())],
      DocumentScope::Unassigned => vec![("unassigned", "true".to_string())],
    };
    self.get_json("/documents", &query).await
  }

  /// `POST /api/documents/{id}/transition`
  pub async fn transition_document(
    &self,
    id: Uuid,
    action: &DocumentAction,
  ) -> Result<Document> {
    let path = format!("/documents/{id}/transition");
    tracing::debug!(%id, action = action.name(), "POST");
    let resp = self
      .auth(self.client.post(self.url(&path)))
      .json(action)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::checked(resp, &format!("{} {id}", action.name()))
      .await?
      .json()
      .await
      .context("deserialising document")
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  /// `GET /api/schedules[?project_id=<id>]`
  pub async fn list_schedules(&self, project: Option<Uuid>) -> Result<Vec<Schedule>> {
    let query: Vec<_> = project
      .map(|id| ("project_id", id.to_string()))
      .into_iter()
      .collect();
    self.get_json("/schedules", &query).await
  }
}
