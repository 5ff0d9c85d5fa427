//! Handlers for `/clients` endpoints.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/clients`      | Optional `?search=` |
//! | `POST`   | `/clients`      | Body: [`NewClient`] |
//! | `GET`    | `/clients/{id}` | 404 if not found |
//! | `PATCH`  | `/clients/{id}` | Body: [`ClientPatch`] |
//! | `DELETE` | `/clients/{id}` | Linked projects are kept, unlinked |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use slfdesk_core::{
  project::{Client, ClientPatch, NewClient},
  store::PermitStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("client {id} not found")) }

fn require_name(name: Option<&str>) -> Result<(), ApiError> {
  match name {
    Some(n) if n.trim().is_empty() => {
      Err(ApiError::BadRequest("client name must not be blank".into()))
    }
    _ => Ok(()),
  }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub search: Option<String>,
}

/// `GET /clients[?search=<text>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Client>>, ApiError>
where
  S: PermitStore,
{
  let mut clients = state.store.list_clients().await.map_err(ApiError::store)?;
  if let Some(needle) = params
    .search
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
  {
    let needle = needle.to_lowercase();
    clients.retain(|c| {
      [Some(c.name.as_str()), c.email.as_deref(), c.phone.as_deref()]
        .into_iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(&needle))
    });
  }
  Ok(Json(clients))
}

/// `POST /clients`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PermitStore,
{
  require_name(Some(&body.name))?;
  let client = state
    .store
    .create_client(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Client>, ApiError>
where
  S: PermitStore,
{
  let client = state
    .store
    .get_client(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(client))
}

/// `PATCH /clients/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ClientPatch>,
) -> Result<Json<Client>, ApiError>
where
  S: PermitStore,
{
  require_name(patch.name.as_deref())?;
  let client = state
    .store
    .update_client(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(client))
}

/// `DELETE /clients/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PermitStore,
{
  if state.store.delete_client(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}
