//! Error types for `slfdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Client-side validation failed; nothing was written.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{actor} is not permitted to {action}")]
  Forbidden { actor: String, action: &'static str },

  #[error("cannot {action} from status {from:?}")]
  InvalidTransition { from: String, action: &'static str },

  #[error("invalid phase number: {0}")]
  InvalidPhase(u8),

  #[error("unknown {kind} code: {code:?}")]
  UnknownCode { kind: &'static str, code: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
