//! SQL schema for the slfdesk SQLite store.
//!
//! `PRAGMA user_version` records the schema revision. A database at version 0
//! gets the full DDL; one newer than [`SCHEMA_VERSION`] is refused.

pub const SCHEMA_VERSION: i64 = 1;

/// Per-connection settings, run on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Version 1 DDL.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS clients (
    client_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    address     TEXT,
    created_at  TEXT NOT NULL
);

-- status is free text: codes this build does not know are kept as-is.
CREATE TABLE IF NOT EXISTS projects (
    project_id        TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    address           TEXT,
    city              TEXT,
    status            TEXT NOT NULL DEFAULT 'draft',
    application_type  TEXT NOT NULL DEFAULT 'slf',   -- 'slf' | 'pbg'
    client_id         TEXT REFERENCES clients(client_id) ON DELETE SET NULL,
    lead_id           TEXT,
    created_at        TEXT NOT NULL,
    start_date        TEXT,                          -- YYYY-MM-DD
    due_date          TEXT
);

-- A NULL project_id is the unassigned pool.
CREATE TABLE IF NOT EXISTS documents (
    document_id       TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    doc_type          TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    project_id        TEXT REFERENCES projects(project_id) ON DELETE SET NULL,
    uploaded_by       TEXT,
    url               TEXT NOT NULL,
    rejection_reason  TEXT,
    reviewed_by       TEXT,
    reviewed_at       TEXT,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inspections (
    inspection_id  TEXT PRIMARY KEY,
    project_id     TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    inspector_id   TEXT,
    scheduled_at   TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'scheduled',
    category       TEXT NOT NULL DEFAULT 'administrative',
    notes          TEXT,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS checklist_responses (
    response_id      TEXT PRIMARY KEY,
    inspection_id    TEXT NOT NULL REFERENCES inspections(inspection_id) ON DELETE CASCADE,
    item_id          TEXT NOT NULL,
    responder_id     TEXT NOT NULL,
    answers_json     TEXT NOT NULL DEFAULT '[]',
    status           TEXT NOT NULL DEFAULT 'submitted',
    rejection_notes  TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    schedule_id    TEXT PRIMARY KEY,
    project_id     TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    schedule_type  TEXT NOT NULL DEFAULT 'inspection',
    title          TEXT NOT NULL,
    scheduled_at   TEXT NOT NULL,
    location       TEXT,
    assignee_id    TEXT,
    status         TEXT NOT NULL DEFAULT 'scheduled',
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS projects_created_idx     ON projects(created_at);
CREATE INDEX IF NOT EXISTS documents_project_idx    ON documents(project_id);
CREATE INDEX IF NOT EXISTS inspections_project_idx  ON inspections(project_id);
CREATE INDEX IF NOT EXISTS responses_inspection_idx ON checklist_responses(inspection_id);
CREATE INDEX IF NOT EXISTS schedules_project_idx    ON schedules(project_id);
";
