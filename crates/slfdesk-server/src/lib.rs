//! HTTP server for slfdesk.
//!
//! Puts Basic auth in front of the JSON API from `slfdesk-api`, serves
//! uploaded files from a local content-addressed store, and traces every
//! request.

pub mod auth;
pub mod blobs;
pub mod error;
pub mod files;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  middleware,
  routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use slfdesk_core::store::PermitStore;
use tower_http::trace::TraceLayer;

use auth::UserConfig;
use blobs::BlobStore;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_max_upload_bytes() -> usize { 25 * 1024 * 1024 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  pub blob_dir:         PathBuf,
  /// Base URL clients use to reach this server; prefixes file URLs.
  pub public_url:       String,
  #[serde(default)]
  pub users:            Vec<UserConfig>,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own handlers and middleware.
#[derive(Clone)]
pub struct AppState<S: PermitStore> {
  pub store:  Arc<S>,
  pub blobs:  Arc<BlobStore>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/health` is open, everything else
/// requires Basic auth.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  let files = Router::new()
    .route("/files", post(files::upload::<S>))
    .route(
      "/files/{key}",
      get(files::download::<S>).delete(files::remove::<S>),
    )
    .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
    .with_state(state.clone());

  let protected = Router::new()
    .nest("/api", slfdesk_api::api_router(state.store.clone()))
    .merge(files)
    .layer(middleware::from_fn_with_state(
      state.clone(),
      auth::require_auth::<S>,
    ));

  Router::new()
    .route("/health", get(health))
    .merge(protected)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────
