//! Handlers for `/projects`, the dashboard summary and the status registry.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `GET`    | `/projects`          | `?search=&status=&lead_id=&from=&to=` |
//! | `POST`   | `/projects`          | Body: [`NewProject`] |
//! | `GET`    | `/projects/{id}`     | Includes status info and progress |
//! | `PATCH`  | `/projects/{id}`     | Body: [`ProjectPatch`] |
//! | `DELETE` | `/projects/{id}`     | Cascades to inspections and schedules |
//! | `GET`    | `/dashboard/summary` | Same filters as `GET /projects` |
//! | `GET`    | `/statuses`          | Every status code with label and badge |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use slfdesk_core::{
  aggregate::{Summary, SummaryCard, aggregate},
  checklist::ResponseStatus,
  document::DocumentStatus,
  filter::filter,
  inspection::InspectionStatus,
  project::{NewProject, Project, ProjectPatch, ProjectView},
  schedule::ScheduleStatus,
  status::{BadgeEntry, Badged, StatusInfo, registry},
  store::PermitStore,
};
use strum::IntoEnumIterator as _;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  query::ListParams,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("project {id} not found")) }

/// Reject references to clients that do not exist.
async fn check_client<S: PermitStore>(store: &S, client_id: Option<Uuid>) -> Result<(), ApiError> {
  if let Some(id) = client_id
    && store.get_client(id).await.map_err(ApiError::store)?.is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown client {id}")));
  }
  Ok(())
}

async fn filtered_projects<S: PermitStore>(
  store: &S,
  params: &ListParams,
) -> Result<Vec<ProjectView>, ApiError> {
  let spec = params.filter_spec(params.lead_id.as_deref())?;
  let projects = store.list_projects().await.map_err(ApiError::store)?;
  Ok(filter(&projects, &spec))
}

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProjectView>>, ApiError>
where
  S: PermitStore,
{
  Ok(Json(filtered_projects(state.store.as_ref(), &params).await?))
}

/// `POST /projects`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("project name must not be blank".into()));
  }
  check_client(state.store.as_ref(), body.client_id).await?;
  let project = state
    .store
    .create_project(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(project = %project.project_id, status = %project.status, "project created");
  Ok((StatusCode::CREATED, Json(project)))
}

// ─── Single project ───────────────────────────────────────────────────────────

/// A project with everything a detail page renders.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectDetail {
  #[serde(flatten)]
  pub view:             ProjectView,
  pub status_info:      StatusInfo,
  pub progress_percent: u8,
}

impl From<ProjectView> for ProjectDetail {
  fn from(view: ProjectView) -> Self {
    Self {
      status_info: view.project.status_info(),
      progress_percent: view.project.progress_percent(),
      view,
    }
  }
}

/// `GET /projects/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, ApiError>
where
  S: PermitStore,
{
  let view = state
    .store
    .get_project(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(view.into()))
}

/// `PATCH /projects/{id}`
///
/// Status codes are stored as given; an unrecognised code is kept and shown
/// with a neutral badge.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiError>
where
  S: PermitStore,
{
  if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("project name must not be blank".into()));
  }
  check_client(state.store.as_ref(), patch.client_id).await?;
  let new_status = patch.status.clone();
  let project = state
    .store
    .update_project(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  if let Some(status) = new_status {
    tracing::info!(project = %id, %status, phase = project.phase().number(), "project status changed");
  }
  Ok(Json(project))
}

/// `DELETE /projects/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_project(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardSummary {
  pub summary:      Summary,
  pub phase_cards:  Vec<SummaryCard>,
  pub status_cards: Vec<SummaryCard>,
}

/// `GET /dashboard/summary`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: PermitStore,
{
  let projects = filtered_projects(state.store.as_ref(), &params).await?;
  let summary = aggregate(&projects);
  Ok(Json(DashboardSummary {
    phase_cards: summary.phase_cards(),
    status_cards: summary.status_cards(),
    summary,
  }))
}

// ─── Status registry ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusRegistry {
  pub projects:    Vec<StatusInfo>,
  pub documents:   Vec<BadgeEntry>,
  pub inspections: Vec<BadgeEntry>,
  pub responses:   Vec<BadgeEntry>,
  pub schedules:   Vec<BadgeEntry>,
}

fn entries<T, I>(all: I) -> Vec<BadgeEntry>
where
  T: Badged,
  I: IntoIterator<Item = T>,
{
  all.into_iter().map(Badged::badge_entry).collect()
}

/// `GET /statuses`
pub async fn statuses() -> Json<StatusRegistry> {
  Json(StatusRegistry {
    projects:    registry(),
    documents:   entries(DocumentStatus::iter()),
    inspections: entries(InspectionStatus::iter()),
    responses:   entries(ResponseStatus::iter()),
    schedules:   entries(ScheduleStatus::iter()),
  })
}
