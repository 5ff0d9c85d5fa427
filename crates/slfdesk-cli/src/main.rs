//! `slfdesk`: command-line client for the slfdesk permit tracker.
//!
//! # Usage
//!
//! ```text
//! slfdesk --url http://localhost:8080 --user sari --password secret summary
//! slfdesk --config ~/.config/slfdesk/config.toml documents --unassigned
//! slfdesk reject 7d3c… --reason "Stempel tidak ada"
//! ```

mod app;
mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::App;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use slfdesk_core::{document::DocumentScope, filter::FilterSpec, workflow::DocumentAction};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "slfdesk", about = "Command-line client for the slfdesk permit tracker")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE", env = "SLFDESK_CONFIG")]
  config: Option<PathBuf>,

  /// Base URL of the slfdesk server (default: http://localhost:8080).
  #[arg(long, env = "SLFDESK_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "SLFDESK_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "SLFDESK_PASSWORD")]
  password: Option<String>,

  /// Print JSON instead of tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

/// Search and date filters shared by the listing commands.
#[derive(ClapArgs, Debug, Default)]
struct ListFilter {
  /// Case-insensitive text match.
  #[arg(short, long)]
  search: Option<String>,

  /// Exact status code, or `all`.
  #[arg(long)]
  status: Option<String>,

  /// Earliest date to include (YYYY-MM-DD).
  #[arg(long)]
  from: Option<NaiveDate>,

  /// Latest date to include (YYYY-MM-DD).
  #[arg(long)]
  to: Option<NaiveDate>,
}

impl ListFilter {
  fn apply_dates(&self, spec: FilterSpec) -> FilterSpec {
    if self.from.is_some() || self.to.is_some() {
      spec.between(self.from, self.to)
    } else {
      spec
    }
  }
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Project counts per phase and per status.
  Summary {
    #[command(flatten)]
    filter: ListFilter,
  },
  /// List projects.
  Projects {
    #[command(flatten)]
    filter: ListFilter,
    /// Only projects led by this user.
    #[arg(long)]
    lead: Option<Uuid>,
  },
  /// List documents.
  Documents {
    #[command(flatten)]
    filter: ListFilter,
    /// Only documents of this project.
    #[arg(long, conflicts_with = "unassigned")]
    project: Option<Uuid>,
    /// Only documents not yet assigned to a project.
    #[arg(long)]
    unassigned: bool,
  },
  /// List schedules.
  Schedules {
    #[command(flatten)]
    filter: ListFilter,
    #[arg(long)]
    project: Option<Uuid>,
    #[arg(long)]
    assignee: Option<Uuid>,
  },
  /// Mark a document as checked by the admin team.
  Verify { document: Uuid },
  /// Approve a document.
  Approve { document: Uuid },
  /// Reject a document. A reason is required.
  Reject {
    document: Uuid,
    #[arg(long)]
    reason: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_string()) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // Flags and env vars override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .clone()
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .clone()
      .or_else(|| non_empty(&file_cfg.username))
      .unwrap_or_default(),
    password: args
      .password
      .clone()
      .or_else(|| non_empty(&file_cfg.password))
      .unwrap_or_default(),
  };

  let mut app = App::new(ApiClient::new(api_config)?);
  run(&mut app, args.command, args.json).await
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

async fn run(app: &mut App, command: Command, json: bool) -> Result<()> {
  match command {
    Command::Summary { filter } => {
      app.load_projects().await?;
      let spec = filter.apply_dates(FilterSpec {
        search_text: filter.search.clone(),
        status: filter.status.clone(),
        ..FilterSpec::default()
      });
      let summary = app.summary(&spec);
      if json {
        print_json(&summary)?;
      } else {
        print!("{}", render::summary(&summary));
      }
    }
    Command::Projects { filter, lead } => {
      app.load_projects().await?;
      let mut spec = filter.apply_dates(FilterSpec {
        search_text: filter.search.clone(),
        status: filter.status.clone(),
        ..FilterSpec::default()
      });
      spec.assignee_id = lead;
      let rows = app.projects.filtered(&spec);
      if json {
        print_json(&rows)?;
      } else {
        print!("{}", render::projects(&rows));
      }
    }
    Command::Documents {
      filter,
      project,
      unassigned,
    } => {
      let scope = match (project, unassigned) {
        (Some(id), _) => DocumentScope::Project(id),
        (None, true) => DocumentScope::Unassigned,
        (None, false) => DocumentScope::All,
      };
      app.load_documents(scope).await?;
      let spec = filter.apply_dates(App::document_filter(
        filter.search.clone(),
        filter.status.clone(),
      )?);
      let rows = app.documents.filtered(&spec);
      if json {
        print_json(&rows)?;
      } else {
        print!("{}", render::documents(&rows));
      }
    }
    Command::Schedules {
      filter,
      project,
      assignee,
    } => {
      app.load_schedules(project).await?;
      let spec = filter.apply_dates(App::schedule_filter(
        filter.search.clone(),
        filter.status.clone(),
        assignee,
      )?);
      let rows = app.schedules.filtered(&spec);
      if json {
        print_json(&rows)?;
      } else {
        print!("{}", render::schedules(&rows));
      }
    }
    Command::Verify { document } => review(app, document, DocumentAction::Verify, json).await?,
    Command::Approve { document } => review(app, document, DocumentAction::Approve, json).await?,
    Command::Reject { document, reason } => {
      review(app, document, DocumentAction::Reject { reason }, json).await?
    }
  }
  Ok(())
}

async fn review(app: &mut App, id: Uuid, action: DocumentAction, json: bool) -> Result<()> {
  let doc = app.review(id, action).await?;
  if json {
    print_json(&doc)
  } else {
    print!("{}", render::documents(&[&doc]));
    Ok(())
  }
}
