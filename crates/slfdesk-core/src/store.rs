//! The `PermitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `slfdesk-store-sqlite`).
//! Higher layers (`slfdesk-api`, `slfdesk-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Per collection the store offers read-all-matching, get-by-id, insert,
//! partial update, and delete. There is no optimistic-concurrency check: the
//! last write wins, and callers re-read instead of trusting old rows.

use std::future::Future;

use uuid::Uuid;

use crate::{
  checklist::{ChecklistResponse, NewResponse, ResponsePatch},
  document::{Document, DocumentPatch, DocumentScope, NewDocument},
  inspection::{Inspection, InspectionPatch, NewInspection},
  project::{Client, ClientPatch, NewClient, NewProject, Project, ProjectPatch, ProjectView},
  schedule::{NewSchedule, Schedule, SchedulePatch},
};

/// Abstraction over the permit data store.
///
/// `update_*` returns `Ok(None)` and `delete_*` returns `Ok(false)` when the
/// id does not exist.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PermitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Clients ───────────────────────────────────────────────────────────

  fn list_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + '_;

  fn get_client(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  fn create_client(
    &self,
    input: NewClient,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  fn update_client(
    &self,
    id: Uuid,
    patch: ClientPatch,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// Projects that referenced the client keep existing, unlinked.
  fn delete_client(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  /// All projects joined with their client's name, oldest first.
  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<ProjectView>, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProjectView>, Self::Error>> + Send + '_;

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn update_project(
    &self,
    id: Uuid,
    patch: ProjectPatch,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Removes the project with its inspections and schedules. Its documents
  /// become unassigned.
  fn delete_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn list_documents(
    &self,
    scope: DocumentScope,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// New documents always start as `pending`.
  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  fn update_document(
    &self,
    id: Uuid,
    patch: DocumentPatch,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  fn delete_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Inspections ───────────────────────────────────────────────────────

  fn list_inspections(
    &self,
    project_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Inspection>, Self::Error>> + Send + '_;

  fn get_inspection(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Inspection>, Self::Error>> + Send + '_;

  fn create_inspection(
    &self,
    input: NewInspection,
  ) -> impl Future<Output = Result<Inspection, Self::Error>> + Send + '_;

  fn update_inspection(
    &self,
    id: Uuid,
    patch: InspectionPatch,
  ) -> impl Future<Output = Result<Option<Inspection>, Self::Error>> + Send + '_;

  fn delete_inspection(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Checklist responses ───────────────────────────────────────────────

  fn list_responses(
    &self,
    inspection_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChecklistResponse>, Self::Error>> + Send + '_;

  fn get_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ChecklistResponse>, Self::Error>> + Send + '_;

  /// New responses always start as `submitted`.
  fn create_response(
    &self,
    input: NewResponse,
  ) -> impl Future<Output = Result<ChecklistResponse, Self::Error>> + Send + '_;

  fn update_response(
    &self,
    id: Uuid,
    patch: ResponsePatch,
  ) -> impl Future<Output = Result<Option<ChecklistResponse>, Self::Error>> + Send + '_;

  fn delete_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Schedules ─────────────────────────────────────────────────────────

  fn list_schedules(
    &self,
    project_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Schedule>, Self::Error>> + Send + '_;

  fn get_schedule(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Schedule>, Self::Error>> + Send + '_;

  fn create_schedule(
    &self,
    input: NewSchedule,
  ) -> impl Future<Output = Result<Schedule, Self::Error>> + Send + '_;

  fn update_schedule(
    &self,
    id: Uuid,
    patch: SchedulePatch,
  ) -> impl Future<Output = Result<Option<Schedule>, Self::Error>> + Send + '_;

  fn delete_schedule(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
