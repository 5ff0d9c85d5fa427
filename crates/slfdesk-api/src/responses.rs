//! Handlers for checklist responses.
//!
//! | Method   | Path                          | Notes |
//! |----------|-------------------------------|-------|
//! | `GET`    | `/inspections/{id}/responses` | `?search=&status=` |
//! | `POST`   | `/inspections/{id}/responses` | Body: `{"item_id":..,"answers":[..]}`; responder is the caller |
//! | `GET`    | `/responses/{id}`             | |
//! | `PATCH`  | `/responses/{id}`             | Body: `{"answers":[..]}` |
//! | `DELETE` | `/responses/{id}`             | |
//! | `POST`   | `/responses/{id}/transition`  | Body: `{"action":"approve"}` or `{"action":"reject","notes":..}` |

use axum::{
  Extension,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use slfdesk_core::{
  checklist::{ChecklistResponse, ColumnAnswer, NewResponse, ResponsePatch, ResponseStatus},
  filter::filter,
  role::Actor,
  store::PermitStore,
  workflow::{ResponseAction, response_transition},
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  inspections,
  query::ListParams,
};

fn not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("checklist response {id} not found"))
}

async fn fetch<S: PermitStore>(store: &S, id: Uuid) -> Result<ChecklistResponse, ApiError> {
  store
    .get_response(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))
}

/// `GET /inspections/{id}/responses`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(inspection_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ChecklistResponse>>, ApiError>
where
  S: PermitStore,
{
  inspections::fetch(state.store.as_ref(), inspection_id).await?;
  let spec = params.closed_filter_spec::<ResponseStatus>(
    "checklist response status",
    params.assignee_id.as_deref(),
  )?;
  let responses = state
    .store
    .list_responses(inspection_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(filter(&responses, &spec)))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub item_id: String,
  pub answers: Vec<ColumnAnswer>,
}

/// `POST /inspections/{id}/responses`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(inspection_id): Path<Uuid>,
  Extension(actor): Extension<Actor>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  if body.item_id.trim().is_empty() {
    return Err(ApiError::BadRequest("checklist item id is required".into()));
  }
  inspections::fetch(state.store.as_ref(), inspection_id).await?;

  let response = state
    .store
    .create_response(NewResponse {
      inspection_id,
      item_id: body.item_id,
      responder_id: actor.user_id,
      answers: body.answers,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /responses/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
  S: PermitStore,
{
  Ok(Json(fetch(state.store.as_ref(), id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub answers: Vec<ColumnAnswer>,
}

/// `PATCH /responses/{id}`: answers are frozen once the head consultant has
/// signed off.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EditBody>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
  S: PermitStore,
{
  let current = fetch(state.store.as_ref(), id).await?;
  if current.status == ResponseStatus::HeadConsultantApproved {
    return Err(ApiError::Conflict(format!(
      "checklist response {id} is already approved"
    )));
  }
  let patch = ResponsePatch {
    answers: Some(body.answers),
    ..ResponsePatch::default()
  };
  let response = state
    .store
    .update_response(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(response))
}

/// `DELETE /responses/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_response(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}

/// `POST /responses/{id}/transition`
///
/// Project lead first, then head consultant. Rejection notes are checked
/// before the store is touched.
pub async fn transition<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Extension(actor): Extension<Actor>,
  Json(action): Json<ResponseAction>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
  S: PermitStore,
{
  let refuse = |e: slfdesk_core::Error| {
    tracing::warn!(response = %id, actor = %actor.username, action = action.name(), error = %e, "checklist transition refused");
    ApiError::from(e)
  };

  action.validate().map_err(refuse)?;

  let _ticket = state.in_flight.try_begin(id).ok_or_else(|| {
    ApiError::Conflict(format!("an action on checklist response {id} is already in progress"))
  })?;

  let response = fetch(state.store.as_ref(), id).await?;
  let patch = response_transition(&response, &action, &actor).map_err(refuse)?;

  let updated = state
    .store
    .update_response(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  tracing::info!(
    response = %id,
    actor = %actor.username,
    action = action.name(),
    from = response.status.as_str(),
    to = updated.status.as_str(),
    "checklist transition"
  );
  Ok(Json(updated))
}
