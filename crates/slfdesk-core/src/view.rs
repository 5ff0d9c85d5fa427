//! Page-scoped state: one owned snapshot per view, refreshed explicitly.
//!
//! There is no shared cache. Each view holds the rows it fetched, shows them
//! until told to refresh, and tolerates edits from other sessions by simply
//! fetching again.

use std::{
  collections::HashSet,
  future::Future,
  sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  aggregate::{Summary, aggregate},
  filter::{FilterSpec, Record, filter_refs},
};

// ─── ViewState ───────────────────────────────────────────────────────────────

/// The rows a single view is showing, plus when they were fetched.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
  items:      Vec<T>,
  fetched_at: Option<DateTime<Utc>>,
  stale:      bool,
}

impl<T> Default for ViewState<T> {
  fn default() -> Self {
    Self {
      items:      Vec::new(),
      fetched_at: None,
      stale:      true,
    }
  }
}

impl<T> ViewState<T> {
  pub fn new() -> Self { Self::default() }

  /// Replace the snapshot with a fresh fetch.
  ///
  /// On failure the previous rows stay visible and remain marked stale.
  pub async fn refresh<F, Fut, E>(&mut self, fetch: F) -> Result<&[T], E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    match fetch().await {
      Ok(items) => {
        self.items = items;
        self.fetched_at = Some(Utc::now());
        self.stale = false;
        Ok(self.items.as_slice())
      }
      Err(e) => {
        self.stale = true;
        Err(e)
      }
    }
  }

  /// Mark the snapshot out of date, e.g. after a write from this view.
  pub fn invalidate(&mut self) { self.stale = true; }

  /// True before the first successful fetch and after [`invalidate`].
  ///
  /// [`invalidate`]: Self::invalidate
  pub fn is_stale(&self) -> bool { self.stale }

  pub fn items(&self) -> &[T] { &self.items }

  pub fn fetched_at(&self) -> Option<DateTime<Utc>> { self.fetched_at }
}

impl<T: Record> ViewState<T> {
  pub fn filtered(&self, spec: &FilterSpec) -> Vec<&T> { filter_refs(&self.items, spec) }

  pub fn summary(&self) -> Summary { aggregate(&self.items) }
}

// ─── InFlight ────────────────────────────────────────────────────────────────

/// Advisory guard against submitting the same action twice.
///
/// Keys are record ids. Holding a [`Ticket`] marks the key busy; dropping it
/// frees the key. Actions on different records never block each other.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
  keys: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashSet<Uuid>> {
    // A panic while holding the lock cannot leave the set inconsistent.
    self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Claim `key`, or `None` if an action on it is already running.
  pub fn try_begin(&self, key: Uuid) -> Option<Ticket> {
    if self.lock().insert(key) {
      Some(Ticket {
        keys: Arc::clone(&self.keys),
        key,
      })
    } else {
      None
    }
  }

  pub fn is_busy(&self, key: Uuid) -> bool { self.lock().contains(&key) }
}

/// Proof that an action on `key` is in flight. Frees the key on drop.
#[derive(Debug)]
pub struct Ticket {
  keys: Arc<Mutex<HashSet<Uuid>>>,
  key:  Uuid,
}

impl Ticket {
  pub fn key(&self) -> Uuid { self.key }
}

impl Drop for Ticket {
  fn drop(&mut self) {
    self
      .keys
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .remove(&self.key);
  }
}
