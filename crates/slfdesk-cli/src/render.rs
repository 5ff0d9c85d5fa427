//! Plain-text tables for terminal output.

use std::fmt::Write as _;

use slfdesk_core::{
  aggregate::{Summary, SummaryCard},
  document::Document,
  project::ProjectView,
  schedule::Schedule,
  status::Badged,
};

const EMPTY: &str = "(no matches)\n";

fn card_line(out: &mut String, card: &SummaryCard) {
  let _ = writeln!(
    out,
    "  {:<28} {:>5}  {:>3}%",
    card.label, card.count, card.percent
  );
}

pub fn summary(summary: &Summary) -> String {
  let mut out = format!("{} projects\n\nBy phase\n", summary.total);
  for card in summary.phase_cards() {
    card_line(&mut out, &card);
  }
  out.push_str("\nBy status\n");
  for card in summary.status_cards().iter().filter(|c| c.count > 0) {
    card_line(&mut out, card);
  }
  out
}

pub fn projects(rows: &[&ProjectView]) -> String {
  if rows.is_empty() {
    return EMPTY.to_string();
  }
  let mut out = String::new();
  for view in rows {
    let p = &view.project;
    let info = p.status_info();
    let _ = writeln!(
      out,
      "{}  {:<32} {:<16} {:<28} phase {} {:>3}%",
      p.project_id,
      p.name,
      p.city.as_deref().unwrap_or("-"),
      info.label,
      p.phase().number(),
      p.progress_percent(),
    );
  }
  out
}

pub fn documents(rows: &[&Document]) -> String {
  if rows.is_empty() {
    return EMPTY.to_string();
  }
  let mut out = String::new();
  for doc in rows {
    let _ = write!(
      out,
      "{}  {:<32} {:<12} {}",
      doc.document_id,
      doc.name,
      doc.doc_type,
      doc.status.label(),
    );
    if let Some(reason) = &doc.rejection_reason {
      let _ = write!(out, " ({reason})");
    }
    out.push('\n');
  }
  out
}

pub fn schedules(rows: &[&Schedule]) -> String {
  if rows.is_empty() {
    return EMPTY.to_string();
  }
  let mut out = String::new();
  for s in rows {
    let _ = writeln!(
      out,
      "{}  {}  {:<10} {:<32} {}",
      s.schedule_id,
      s.scheduled_at.format("%Y-%m-%d %H:%M"),
      s.schedule_type.as_str(),
      s.title,
      s.status.label(),
    );
  }
  out
}
