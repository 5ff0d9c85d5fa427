//! Handlers for `/documents` endpoints.
//!
//! | Method   | Path                          | Notes |
//! |----------|-------------------------------|-------|
//! | `GET`    | `/documents`                  | `?project_id=&unassigned=&search=&status=&from=&to=` |
//! | `POST`   | `/documents`                  | Body: [`NewDocument`]; starts `pending` |
//! | `GET`    | `/documents/{id}`             | 404 if not found |
//! | `PATCH`  | `/documents/{id}`             | Metadata only; status goes through `transition` |
//! | `DELETE` | `/documents/{id}`             | |
//! | `POST`   | `/documents/{id}/transition`  | Body: `{"action":"verify"\|"approve"\|"reject","reason":..}` |
//! | `POST`   | `/documents/{id}/assign`      | Body: `{"project_id": <uuid> \| null}` |

use axum::{
  Extension,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use slfdesk_core::{
  document::{Document, DocumentPatch, DocumentScope, DocumentStatus, NewDocument},
  filter::filter,
  role::Actor,
  store::PermitStore,
  workflow::{DocumentAction, document_transition},
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  query::ListParams,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("document {id} not found")) }

async fn fetch<S: PermitStore>(store: &S, id: Uuid) -> Result<Document, ApiError> {
  store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))
}

async fn check_project<S: PermitStore>(store: &S, project_id: Option<Uuid>) -> Result<(), ApiError> {
  if let Some(id) = project_id
    && store.get_project(id).await.map_err(ApiError::store)?.is_none()
  {
    return Err(ApiError::BadRequest(format!("unknown project {id}")));
  }
  Ok(())
}

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /documents`
///
/// `status=verified` is accepted for `verified_by_admin_team`.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  S: PermitStore,
{
  let scope = match (params.unassigned, params.project()?) {
    (true, _) => DocumentScope::Unassigned,
    (false, Some(id)) => DocumentScope::Project(id),
    (false, None) => DocumentScope::All,
  };

  let mut spec = params.closed_filter_spec::<DocumentStatus>("document status", None)?;
  if params.unassigned {
    spec.project_id = None;
  }

  let documents = state
    .store
    .list_documents(scope)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(filter(&documents, &spec)))
}

/// `POST /documents`: the uploader defaults to the caller.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Extension(actor): Extension<Actor>,
  Json(mut body): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  if body.name.trim().is_empty() || body.url.trim().is_empty() {
    return Err(ApiError::BadRequest("document name and url are required".into()));
  }
  check_project(state.store.as_ref(), body.project_id).await?;
  body.uploaded_by.get_or_insert(actor.user_id);

  let document = state
    .store
    .create_document(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(document)))
}

// ─── Single document ──────────────────────────────────────────────────────────

/// `GET /documents/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError>
where
  S: PermitStore,
{
  Ok(Json(fetch(state.store.as_ref(), id).await?))
}

/// Fields a plain edit may change.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditBody {
  pub name:     Option<String>,
  pub doc_type: Option<String>,
  pub url:      Option<String>,
}

/// `PATCH /documents/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EditBody>,
) -> Result<Json<Document>, ApiError>
where
  S: PermitStore,
{
  let patch = DocumentPatch {
    name: body.name,
    doc_type: body.doc_type,
    url: body.url,
    ..DocumentPatch::default()
  };
  let document = state
    .store
    .update_document(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(document))
}

/// `DELETE /documents/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_document(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}

// ─── Workflow ─────────────────────────────────────────────────────────────────

/// `POST /documents/{id}/transition`
///
/// Validation runs before the store is touched, so a rejection without a
/// reason never reaches the database. Only one action per document may be in
/// flight; a second concurrent request gets `409`.
pub async fn transition<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Extension(actor): Extension<Actor>,
  Json(action): Json<DocumentAction>,
) -> Result<Json<Document>, ApiError>
where
  S: PermitStore,
{
  let refuse = |e: slfdesk_core::Error| {
    tracing::warn!(document = %id, actor = %actor.username, action = action.name(), error = %e, "document transition refused");
    ApiError::from(e)
  };

  action.validate().map_err(refuse)?;

  let _ticket = state.in_flight.try_begin(id).ok_or_else(|| {
    ApiError::Conflict(format!("an action on document {id} is already in progress"))
  })?;

  let document = fetch(state.store.as_ref(), id).await?;
  let patch = document_transition(&document, &action, &actor, Utc::now()).map_err(refuse)?;

  let updated = state
    .store
    .update_document(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  tracing::info!(
    document = %id,
    actor = %actor.username,
    action = action.name(),
    from = document.status.as_str(),
    to = updated.status.as_str(),
    "document transition"
  );
  Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub project_id: Option<Uuid>,
}

/// `POST /documents/{id}/assign`: `null` returns the document to the
/// unassigned pool.
pub async fn assign<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Document>, ApiError>
where
  S: PermitStore,
{
  check_project(state.store.as_ref(), body.project_id).await?;
  let document = state
    .store
    .update_document(id, DocumentPatch::assign(body.project_id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(document = %id, project = ?body.project_id, "document assigned");
  Ok(Json(document))
}
