//! Handlers for `/schedules` endpoints.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/schedules`      | `?project_id=&assignee_id=&status=&search=&from=&to=` |
//! | `POST`   | `/schedules`      | Body: [`NewSchedule`] |
//! | `GET`    | `/schedules/{id}` | |
//! | `PATCH`  | `/schedules/{id}` | Body: [`SchedulePatch`] |
//! | `DELETE` | `/schedules/{id}` | |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use slfdesk_core::{
  filter::filter,
  schedule::{NewSchedule, Schedule, SchedulePatch, ScheduleStatus},
  store::PermitStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  query::ListParams,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("schedule {id} not found")) }

/// `GET /schedules`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Schedule>>, ApiError>
where
  S: PermitStore,
{
  let spec = params.closed_filter_spec::<ScheduleStatus>(
    "schedule status",
    params.assignee_id.as_deref(),
  )?;
  let schedules = state
    .store
    .list_schedules(params.project()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(filter(&schedules, &spec)))
}

/// `POST /schedules`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewSchedule>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("schedule title must not be blank".into()));
  }
  if state
    .store
    .get_project(body.project_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown project {}", body.project_id)));
  }
  let schedule = state
    .store
    .create_schedule(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(schedule)))
}

/// `GET /schedules/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError>
where
  S: PermitStore,
{
  let schedule = state
    .store
    .get_schedule(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(schedule))
}

/// `PATCH /schedules/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<SchedulePatch>,
) -> Result<Json<Schedule>, ApiError>
where
  S: PermitStore,
{
  if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
    return Err(ApiError::BadRequest("schedule title must not be blank".into()));
  }
  let schedule = state
    .store
    .update_schedule(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(schedule))
}

/// `DELETE /schedules/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_schedule(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}
