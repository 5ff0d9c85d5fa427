//! JSON REST API for slfdesk.
//!
//! Exposes an axum [`Router`] backed by any [`slfdesk_core::store::PermitStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility: every
//! request must carry an [`Actor`](slfdesk_core::role::Actor) extension,
//! which the server's auth layer inserts.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", slfdesk_api::api_router(store.clone()))
//! ```

pub mod clients;
pub mod documents;
pub mod error;
pub mod extract;
pub mod inspections;
pub mod projects;
pub mod query;
pub mod responses;
pub mod schedules;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use slfdesk_core::{store::PermitStore, view::InFlight};

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:     Arc<S>,
  /// Records with a workflow transition currently being applied.
  pub in_flight: InFlight,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  let state = ApiState {
    store,
    in_flight: InFlight::new(),
  };

  Router::new()
    // Clients
    .route("/clients", get(clients::list::<S>).post(clients::create::<S>))
    .route(
      "/clients/{id}",
      get(clients::get_one::<S>)
        .patch(clients::update::<S>)
        .delete(clients::delete::<S>),
    )
    // Projects & dashboard
    .route("/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route(
      "/projects/{id}",
      get(projects::get_one::<S>)
        .patch(projects::update::<S>)
        .delete(projects::delete::<S>),
    )
    .route("/dashboard/summary", get(projects::summary::<S>))
    .route("/statuses", get(projects::statuses))
    // Documents
    .route("/documents", get(documents::list::<S>).post(documents::create::<S>))
    .route(
      "/documents/{id}",
      get(documents::get_one::<S>)
        .patch(documents::update::<S>)
        .delete(documents::delete::<S>),
    )
    .route("/documents/{id}/transition", post(documents::transition::<S>))
    .route("/documents/{id}/assign", post(documents::assign::<S>))
    // Inspections & checklist responses
    .route(
      "/inspections",
      get(inspections::list::<S>).post(inspections::create::<S>),
    )
    .route(
      "/inspections/{id}",
      get(inspections::get_one::<S>)
        .patch(inspections::update::<S>)
        .delete(inspections::delete::<S>),
    )
    .route(
      "/inspections/{id}/transition",
      post(inspections::transition::<S>),
    )
    .route(
      "/inspections/{id}/responses",
      get(responses::list::<S>).post(responses::create::<S>),
    )
    .route(
      "/responses/{id}",
      get(responses::get_one::<S>)
        .patch(responses::update::<S>)
        .delete(responses::delete::<S>),
    )
    .route("/responses/{id}/transition", post(responses::transition::<S>))
    // Schedules
    .route("/schedules", get(schedules::list::<S>).post(schedules::create::<S>))
    .route(
      "/schedules/{id}",
      get(schedules::get_one::<S>)
        .patch(schedules::update::<S>)
        .delete(schedules::delete::<S>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
