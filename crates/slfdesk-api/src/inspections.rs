//! Handlers for `/inspections` endpoints.
//!
//! | Method   | Path                            | Notes |
//! |----------|---------------------------------|-------|
//! | `GET`    | `/inspections`                  | `?project_id=&inspector_id=&status=&search=&from=&to=` |
//! | `POST`   | `/inspections`                  | Body: [`NewInspection`]; starts `scheduled` |
//! | `GET`    | `/inspections/{id}`             | |
//! | `PATCH`  | `/inspections/{id}`             | Reschedule / reassign; status goes through `transition` |
//! | `DELETE` | `/inspections/{id}`             | Removes its checklist responses |
//! | `POST`   | `/inspections/{id}/transition`  | Body: `{"action":"start"\|"complete"\|"cancel"}` |

use axum::{
  Extension,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use slfdesk_core::{
  filter::filter,
  inspection::{Inspection, InspectionCategory, InspectionPatch, InspectionStatus, NewInspection},
  role::Actor,
  store::PermitStore,
  workflow::{InspectionAction, inspection_transition},
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  query::ListParams,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("inspection {id} not found")) }

pub(crate) async fn fetch<S: PermitStore>(store: &S, id: Uuid) -> Result<Inspection, ApiError> {
  store
    .get_inspection(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))
}

/// `GET /inspections`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Inspection>>, ApiError>
where
  S: PermitStore,
{
  let spec = params.closed_filter_spec::<InspectionStatus>(
    "inspection status",
    params.inspector_id.as_deref(),
  )?;
  let inspections = state
    .store
    .list_inspections(params.project()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(filter(&inspections, &spec)))
}

/// `POST /inspections`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewInspection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  if state
    .store
    .get_project(body.project_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown project {}", body.project_id)));
  }
  let inspection = state
    .store
    .create_inspection(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    inspection = %inspection.inspection_id,
    project = %inspection.project_id,
    at = %inspection.scheduled_at,
    "inspection scheduled"
  );
  Ok((StatusCode::CREATED, Json(inspection)))
}

/// `GET /inspections/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Inspection>, ApiError>
where
  S: PermitStore,
{
  Ok(Json(fetch(state.store.as_ref(), id).await?))
}

/// Fields a plain edit may change.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditBody {
  pub inspector_id: Option<Uuid>,
  pub scheduled_at: Option<DateTime<Utc>>,
  pub category:     Option<InspectionCategory>,
  pub notes:        Option<String>,
}

/// `PATCH /inspections/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EditBody>,
) -> Result<Json<Inspection>, ApiError>
where
  S: PermitStore,
{
  let patch = InspectionPatch {
    inspector_id: body.inspector_id,
    scheduled_at: body.scheduled_at,
    category: body.category,
    notes: body.notes,
    status: None,
  };
  let inspection = state
    .store
    .update_inspection(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(inspection))
}

/// `DELETE /inspections/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_inspection(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}

/// `POST /inspections/{id}/transition`
pub async fn transition<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Extension(actor): Extension<Actor>,
  Json(action): Json<InspectionAction>,
) -> Result<Json<Inspection>, ApiError>
where
  S: PermitStore,
{
  let _ticket = state.in_flight.try_begin(id).ok_or_else(|| {
    ApiError::Conflict(format!("an action on inspection {id} is already in progress"))
  })?;

  let inspection = fetch(state.store.as_ref(), id).await?;
  let patch = inspection_transition(&inspection, action, &actor).map_err(|e| {
    tracing::warn!(inspection = %id, actor = %actor.username, action = action.name(), error = %e, "inspection transition refused");
    ApiError::from(e)
  })?;

  let updated = state
    .store
    .update_inspection(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  tracing::info!(
    inspection = %id,
    actor = %actor.username,
    action = action.name(),
    from = inspection.status.as_str(),
    to = updated.status.as_str(),
    "inspection transition"
  );
  Ok(Json(updated))
}
