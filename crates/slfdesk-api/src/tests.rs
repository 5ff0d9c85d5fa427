//! Router-level tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use slfdesk_core::role::{Actor, Role};
use slfdesk_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

fn app_as(store: &Arc<SqliteStore>, roles: &[Role]) -> Router {
  let actor = Actor::new(Uuid::new_v4(), "tester", roles.to_vec());
  api_router(store.clone()).layer(Extension(actor))
}

fn app(store: &Arc<SqliteStore>) -> Router { app_as(store, &[Role::AdminLead]) }

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
  let resp = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
  };
  (status, value)
}

async fn create_project(store: &Arc<SqliteStore>, body: Value) -> String {
  let (status, project) = call(app(store), "POST", "/projects", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{project}");
  project["project_id"].as_str().unwrap().to_owned()
}

async fn create_document(store: &Arc<SqliteStore>, name: &str) -> String {
  let (status, doc) = call(
    app(store),
    "POST",
    "/documents",
    Some(json!({ "name": name, "doc_type": "imb", "url": format!("/files/{name}") })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{doc}");
  assert_eq!(doc["status"], "pending");
  doc["document_id"].as_str().unwrap().to_owned()
}

async fn seed_portfolio(store: &Arc<SqliteStore>) {
  for (name, city, status) in [
    ("Hotel Melati", "Jakarta", "draft"),
    ("Mall Kota", "Bandung", "inspection_in_progress"),
    ("RS Harapan", "Jakarta", "slf_issued"),
    ("Pabrik Baja", "Surabaya", "slf_issued"),
    ("Kantor Pos", "Medan", "rejected"),
  ] {
    create_project(store, json!({ "name": name, "city": city, "status": status })).await;
  }
}

// ─── Projects & dashboard ────────────────────────────────────────────────────

#[tokio::test]
async fn project_search_is_case_insensitive() {
  let s = store().await;
  seed_portfolio(&s).await;

  let (status, body) = call(app(&s), "GET", "/projects?search=jakarta", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert_eq!(names.len(), 2);
  assert!(names.contains(&"Hotel Melati"));
  assert!(names.contains(&"RS Harapan"));

  let (_, all) = call(app(&s), "GET", "/projects?status=all&search=", None).await;
  assert_eq!(all.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn dashboard_summary_counts_phases() {
  let s = store().await;
  seed_portfolio(&s).await;

  let (status, body) = call(app(&s), "GET", "/dashboard/summary", None).await;
  assert_eq!(status, StatusCode::OK);
  let summary = &body["summary"];
  assert_eq!(summary["total"], 5);
  assert_eq!(summary["by_status"]["slf_issued"], 2);
  assert_eq!(summary["by_phase"]["0"], 1);
  assert_eq!(summary["by_phase"]["1"], 1);
  assert_eq!(summary["by_phase"]["2"], 1);
  assert_eq!(summary["by_phase"]["3"], 0);
  assert_eq!(summary["by_phase"]["5"], 2);

  let cards = body["phase_cards"].as_array().unwrap();
  assert_eq!(cards.len(), 6);
  assert_eq!(cards[4]["key"], "5");
  assert_eq!(cards[4]["percent"], 40);
}

#[tokio::test]
async fn empty_status_lists_every_project() {
  let s = store().await;
  seed_portfolio(&s).await;
  let (_, all) = call(app(&s), "GET", "/projects", None).await;
  let (status, blank) = call(app(&s), "GET", "/projects?status=", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(blank, all);
  assert!(!all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_summary_of_nothing_is_all_zero() {
  let s = store().await;
  let (status, body) = call(app(&s), "GET", "/dashboard/summary", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["summary"]["total"], 0);
  assert!(
    body["status_cards"]
      .as_array()
      .unwrap()
      .iter()
      .all(|c| c["count"] == 0 && c["percent"] == 0)
  );
}

#[tokio::test]
async fn project_detail_has_status_info() {
  let s = store().await;
  let id = create_project(&s, json!({ "name": "Menara", "status": "report_review" })).await;

  let (status, body) = call(app(&s), "GET", &format!("/projects/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Menara");
  assert_eq!(body["status_info"]["phase"], 3);
  assert_eq!(body["status_info"]["badge"], "warning");
  assert_eq!(body["progress_percent"], 60);
}

#[tokio::test]
async fn unknown_project_status_degrades_gracefully() {
  let s = store().await;
  let id = create_project(&s, json!({ "name": "Gudang", "status": "on_hold" })).await;

  let (status, body) = call(app(&s), "GET", &format!("/projects/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "on_hold");
  assert_eq!(body["status_info"]["label"], "On Hold");
  assert_eq!(body["status_info"]["badge"], "neutral");
  assert_eq!(body["status_info"]["phase"], 1);
}

#[tokio::test]
async fn project_date_range_uses_start_date() {
  let s = store().await;
  create_project(&s, json!({ "name": "Awal", "start_date": "2024-01-10" })).await;
  create_project(&s, json!({ "name": "Akhir", "start_date": "2024-03-01" })).await;

  let (status, body) = call(app(&s), "GET", "/projects?from=2024-02-01&to=2024-12-31", None).await;
  assert_eq!(status, StatusCode::OK);
  let list = body.as_array().unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0]["name"], "Akhir");
}

#[tokio::test]
async fn project_with_unknown_client_is_rejected() {
  let s = store().await;
  let (status, body) = call(
    app(&s),
    "POST",
    "/projects",
    Some(json!({ "name": "X", "client_id": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("unknown client"));
}

#[tokio::test]
async fn missing_project_is_404() {
  let s = store().await;
  let (status, body) = call(app(&s), "GET", &format!("/projects/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = call(app(&s), "DELETE", &format!("/projects/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_input_gets_a_json_error() {
  let s = store().await;

  let (status, body) = call(app(&s), "GET", "/documents/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let req = Request::builder()
    .method("POST")
    .uri("/projects")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let (status, body) = send(app(&s), req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = call(app(&s), "GET", "/projects?from=yesterday", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn status_registry_lists_every_code() {
  let s = store().await;
  let (status, body) = call(app(&s), "GET", "/statuses", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["projects"].as_array().unwrap().len(), 17);
  assert_eq!(body["documents"].as_array().unwrap().len(), 4);
  assert_eq!(body["projects"][0]["code"], "draft");
  assert_eq!(body["documents"][1]["code"], "verified_by_admin_team");
}

// ─── Document workflow ───────────────────────────────────────────────────────

#[tokio::test]
async fn approve_pending_document() {
  let s = store().await;
  let id = create_document(&s, "denah.pdf").await;

  let uri = format!("/documents/{id}/transition");
  let (status, body) = call(app(&s), "POST", &uri, Some(json!({ "action": "approve" }))).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["status"], "approved");
  assert!(body["reviewed_by"].is_string());
  assert!(body["reviewed_at"].is_string());

  // Approved is terminal.
  let (status, _) = call(
    app(&s),
    "POST",
    &uri,
    Some(json!({ "action": "reject", "reason": "terlambat" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reject_without_reason_writes_nothing() {
  let s = store().await;
  let id = create_document(&s, "tampak.pdf").await;

  for body in [
    json!({ "action": "reject" }),
    json!({ "action": "reject", "reason": "   " }),
  ] {
    let (status, err) = call(
      app(&s),
      "POST",
      &format!("/documents/{id}/transition"),
      Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("reason"));
  }

  let (_, doc) = call(app(&s), "GET", &format!("/documents/{id}"), None).await;
  assert_eq!(doc["status"], "pending");
  assert!(doc["reviewed_by"].is_null());
}

#[tokio::test]
async fn reject_records_trimmed_reason() {
  let s = store().await;
  let id = create_document(&s, "rab.pdf").await;

  let (status, doc) = call(
    app_as(&s, &[Role::HeadConsultant]),
    "POST",
    &format!("/documents/{id}/transition"),
    Some(json!({ "action": "reject", "reason": "  Stempel tidak ada " })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(doc["status"], "rejected");
  assert_eq!(doc["rejection_reason"], "Stempel tidak ada");
}

#[tokio::test]
async fn verify_requires_admin_role() {
  let s = store().await;
  let id = create_document(&s, "imb.pdf").await;
  let uri = format!("/documents/{id}/transition");

  let (status, _) = call(
    app_as(&s, &[Role::Drafter]),
    "POST",
    &uri,
    Some(json!({ "action": "verify" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, doc) = call(
    app_as(&s, &[Role::AdminTeam]),
    "POST",
    &uri,
    Some(json!({ "action": "verify" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(doc["status"], "verified_by_admin_team");

  // The legacy code filters the same bucket.
  let (_, list) = call(app(&s), "GET", "/documents?status=verified", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_document_status_filter_is_400() {
  let s = store().await;
  let (status, _) = call(app(&s), "GET", "/documents?status=lost", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assign_moves_document_between_pool_and_project() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Villa" })).await;
  let doc = create_document(&s, "sertifikat.pdf").await;

  let (_, pool) = call(app(&s), "GET", "/documents?unassigned=true", None).await;
  assert_eq!(pool.as_array().unwrap().len(), 1);

  let (status, moved) = call(
    app(&s),
    "POST",
    &format!("/documents/{doc}/assign"),
    Some(json!({ "project_id": project })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(moved["project_id"], project.as_str());

  let (_, owned) = call(app(&s), "GET", &format!("/documents?project_id={project}"), None).await;
  assert_eq!(owned.as_array().unwrap().len(), 1);
  let (_, pool) = call(app(&s), "GET", "/documents?unassigned=true", None).await;
  assert!(pool.as_array().unwrap().is_empty());

  let (_, back) = call(
    app(&s),
    "POST",
    &format!("/documents/{doc}/assign"),
    Some(json!({ "project_id": null })),
  )
  .await;
  assert!(back["project_id"].is_null());
}

#[tokio::test]
async fn document_edit_cannot_change_status() {
  let s = store().await;
  let id = create_document(&s, "a.pdf").await;

  let (status, _) = call(
    app(&s),
    "PATCH",
    &format!("/documents/{id}"),
    Some(json!({ "status": "approved" })),
  )
  .await;
  assert!(status.is_client_error());

  let (status, doc) = call(
    app(&s),
    "PATCH",
    &format!("/documents/{id}"),
    Some(json!({ "name": "b.pdf" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(doc["name"], "b.pdf");
  assert_eq!(doc["status"], "pending");
}

// ─── Inspections & checklist ─────────────────────────────────────────────────

async fn create_inspection(s: &Arc<SqliteStore>, project: &str) -> String {
  let (status, body) = call(
    app(s),
    "POST",
    "/inspections",
    Some(json!({
      "project_id": project,
      "scheduled_at": "2024-08-17T02:00:00Z",
      "category": "technical",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["inspection_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn inspection_runs_scheduled_to_completed() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Jembatan" })).await;
  let id = create_inspection(&s, &project).await;
  let uri = format!("/inspections/{id}/transition");

  let (status, _) = call(app(&s), "POST", &uri, Some(json!({ "action": "start" }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let inspector = || app_as(&s, &[Role::Inspector]);
  let (status, body) = call(inspector(), "POST", &uri, Some(json!({ "action": "start" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "in_progress");

  let (_, body) = call(inspector(), "POST", &uri, Some(json!({ "action": "complete" }))).await;
  assert_eq!(body["status"], "completed");

  let (status, _) = call(app(&s), "POST", &uri, Some(json!({ "action": "cancel" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn padded_status_filter_still_matches() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Stadion" })).await;
  create_inspection(&s, &project).await;

  let (status, hits) = call(app(&s), "GET", "/inspections?status=%20scheduled", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hits.as_array().unwrap().len(), 1);

  let (status, hits) = call(app(&s), "GET", "/inspections?status=", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn inspection_for_unknown_project_is_400() {
  let s = store().await;
  let (status, _) = call(
    app(&s),
    "POST",
    "/inspections",
    Some(json!({ "project_id": Uuid::new_v4(), "scheduled_at": "2024-08-17T02:00:00Z" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checklist_response_needs_both_approvals() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Sekolah" })).await;
  let inspection = create_inspection(&s, &project).await;

  let (status, response) = call(
    app_as(&s, &[Role::Inspector]),
    "POST",
    &format!("/inspections/{inspection}/responses"),
    Some(json!({
      "item_id": "struktur-01",
      "answers": [
        { "column": "kondisi", "value": { "kind": "radio", "data": { "choice": "sesuai" } } },
        { "column": "tinggi", "value": { "kind": "numeric", "data": { "value": 3.2, "unit": "m" } } },
      ],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{response}");
  assert_eq!(response["status"], "submitted");
  let id = response["response_id"].as_str().unwrap().to_owned();
  let uri = format!("/responses/{id}/transition");
  let approve = || Some(json!({ "action": "approve" }));

  // Head consultant cannot skip the project lead.
  let (status, _) = call(app_as(&s, &[Role::HeadConsultant]), "POST", &uri, approve()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = call(app_as(&s, &[Role::ProjectLead]), "POST", &uri, approve()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "project_lead_approved");

  let (status, body) = call(app_as(&s, &[Role::HeadConsultant]), "POST", &uri, approve()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "head_consultant_approved");

  let (status, _) = call(
    app(&s),
    "PATCH",
    &format!("/responses/{id}"),
    Some(json!({ "answers": [] })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, listed) = call(
    app(&s),
    "GET",
    &format!("/inspections/{inspection}/responses?status=head_consultant_approved"),
    None,
  )
  .await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checklist_reject_needs_notes() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Ruko" })).await;
  let inspection = create_inspection(&s, &project).await;
  let (_, response) = call(
    app(&s),
    "POST",
    &format!("/inspections/{inspection}/responses"),
    Some(json!({ "item_id": "listrik-02", "answers": [] })),
  )
  .await;
  let id = response["response_id"].as_str().unwrap();
  let uri = format!("/responses/{id}/transition");

  let (status, _) = call(
    app_as(&s, &[Role::ProjectLead]),
    "POST",
    &uri,
    Some(json!({ "action": "reject" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = call(
    app_as(&s, &[Role::ProjectLead]),
    "POST",
    &uri,
    Some(json!({ "action": "reject", "notes": "Foto kurang jelas" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "rejected");
  assert_eq!(body["rejection_notes"], "Foto kurang jelas");
}

// ─── Schedules & clients ─────────────────────────────────────────────────────

#[tokio::test]
async fn schedules_filter_by_assignee_and_status() {
  let s = store().await;
  let project = create_project(&s, json!({ "name": "Pasar" })).await;
  let budi = Uuid::new_v4();
  for (title, assignee) in [("Survey", Some(budi)), ("Rapat", None)] {
    let (status, _) = call(
      app(&s),
      "POST",
      "/schedules",
      Some(json!({
        "project_id": project,
        "schedule_type": "meeting",
        "title": title,
        "scheduled_at": "2024-09-01T03:00:00Z",
        "assignee_id": assignee,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (_, mine) = call(app(&s), "GET", &format!("/schedules?assignee_id={budi}"), None).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
  assert_eq!(mine[0]["title"], "Survey");

  let (_, done) = call(app(&s), "GET", "/schedules?status=completed", None).await;
  assert!(done.as_array().unwrap().is_empty());

  let (status, _) = call(app(&s), "GET", "/schedules?assignee_id=budi", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_crud() {
  let s = store().await;
  let (status, client) = call(
    app(&s),
    "POST",
    "/clients",
    Some(json!({ "name": "PT Maju", "email": "a@maju.id" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = client["client_id"].as_str().unwrap();

  let (status, client) = call(
    app(&s),
    "PATCH",
    &format!("/clients/{id}"),
    Some(json!({ "phone": "0812" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(client["name"], "PT Maju");
  assert_eq!(client["phone"], "0812");

  let (_, found) = call(app(&s), "GET", "/clients?search=MAJU", None).await;
  assert_eq!(found.as_array().unwrap().len(), 1);

  let (status, _) = call(app(&s), "DELETE", &format!("/clients/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(app(&s), "GET", &format!("/clients/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
