//! `/files` handlers over the [`BlobStore`](crate::blobs::BlobStore).

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use slfdesk_core::store::PermitStore;

use crate::{
  AppState,
  blobs::StoredObject,
  error::{Error, Result},
};

/// `POST /files`: raw body, media type from `Content-Type`.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<(StatusCode, Json<StoredObject>)>
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  if body.is_empty() {
    return Err(Error::BadRequest("empty upload".into()));
  }
  let media_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();
  let object = state.blobs.upload(body, media_type).await?;
  Ok((StatusCode::CREATED, Json(object)))
}

/// `GET /files/{key}`
pub async fn download<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Response>
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  let blob = state.blobs.read(&key).await?.ok_or(Error::NotFound)?;
  Ok(([(header::CONTENT_TYPE, blob.media_type)], blob.bytes).into_response())
}

/// `DELETE /files/{key}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<StatusCode>
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  if state.blobs.delete(&key).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(Error::NotFound)
  }
}
