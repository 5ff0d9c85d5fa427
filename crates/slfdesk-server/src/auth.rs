//! HTTP Basic-auth verification and the middleware that attaches the
//! authenticated [`Actor`] to each request.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use slfdesk_core::{
  role::{Actor, Role},
  store::PermitStore,
};
use uuid::Uuid;

use crate::{AppState, error::Error};

/// One account allowed to sign in.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub user_id:       Uuid,
  #[serde(default)]
  pub roles:         Vec<Role>,
}

impl UserConfig {
  pub fn actor(&self) -> Actor {
    Actor::new(self.user_id, self.username.clone(), self.roles.clone())
  }
}

/// Verify Basic credentials against the configured accounts.
pub fn verify_auth(headers: &HeaderMap, users: &[UserConfig]) -> Result<Actor, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = users
    .iter()
    .find(|u| u.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&user.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(user.actor())
}

/// Middleware: reject unauthenticated requests, otherwise insert the
/// [`Actor`] extension the API handlers read.
pub async fn require_auth<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: PermitStore + Clone + Send + Sync + 'static,
{
  let actor = match verify_auth(req.headers(), &state.config.users) {
    Ok(actor) => actor,
    Err(e) => {
      tracing::debug!(uri = %req.uri(), "rejected credentials");
      return Err(e);
    }
  };
  req.extensions_mut().insert(actor);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, header};

  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  fn user(name: &str, password: &str, roles: Vec<Role>) -> UserConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    UserConfig {
      username: name.to_string(),
      password_hash: hash,
      user_id: Uuid::new_v4(),
      roles,
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials_carry_roles() {
    let users = [
      user("sari", "rahasia", vec![Role::AdminTeam]),
      user("dewi", "secret", vec![Role::Inspector, Role::Drafter]),
    ];
    let actor = verify_auth(&headers(&basic("dewi", "secret")), &users).unwrap();
    assert_eq!(actor.username, "dewi");
    assert_eq!(actor.user_id, users[1].user_id);
    assert!(actor.is_inspector());
    assert!(!actor.is_admin_lead());
  }

  #[test]
  fn wrong_password() {
    let users = [user("dewi", "secret", vec![])];
    let err = verify_auth(&headers(&basic("dewi", "wrong")), &users);
    assert!(matches!(err, Err(Error::Unauthorized)));
  }

  #[test]
  fn unknown_user() {
    let users = [user("dewi", "secret", vec![])];
    let err = verify_auth(&headers(&basic("budi", "secret")), &users);
    assert!(matches!(err, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let users = [user("dewi", "secret", vec![])];
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &users),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let users = [user("dewi", "secret", vec![])];
    let err = verify_auth(&headers("Basic !!!not-base64!!!"), &users);
    assert!(matches!(err, Err(Error::Unauthorized)));
  }

  #[test]
  fn roles_deserialise_from_config() {
    let cfg: UserConfig = serde_json::from_value(serde_json::json!({
      "username": "rina",
      "password_hash": "x",
      "user_id": Uuid::nil(),
      "roles": ["head_consultant", "project_lead"],
    }))
    .unwrap();
    assert_eq!(cfg.roles, [Role::HeadConsultant, Role::ProjectLead]);
  }
}
