//! Core types for slfdesk: the project phase & status model and the records
//! it is applied to.
//!
//! - [`status`]: Status Registry (labels, badge styles)
//! - [`phase`]: Phase Classifier
//! - [`aggregate`]: dashboard counts
//! - [`filter`]: the list-view Filter Engine
//! - [`workflow`]: approve / reject / verify transitions and their role rules
//!
//! No HTTP or database dependencies. All other crates depend on it.

pub mod aggregate;
pub mod checklist;
pub mod document;
pub mod error;
pub mod filter;
pub mod inspection;
pub mod phase;
pub mod project;
pub mod role;
pub mod schedule;
pub mod status;
pub mod store;
pub mod view;
pub mod workflow;

pub use error::{Error, Result};
