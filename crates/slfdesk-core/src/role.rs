//! User roles and the acting user.
//!
//! Role checks decide which status transitions an actor may trigger. They are
//! advisory workflow rules, not an access-control boundary: authentication
//! happens in front of the API.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  AdminLead,
  AdminTeam,
  HeadConsultant,
  ProjectLead,
  Inspector,
  Drafter,
}

impl Role {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// The authenticated user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:  Uuid,
  pub username: String,
  pub roles:    Vec<Role>,
}

impl Actor {
  pub fn new(user_id: Uuid, username: impl Into<String>, roles: Vec<Role>) -> Self {
    Self { user_id, username: username.into(), roles }
  }

  pub fn has(&self, role: Role) -> bool { self.roles.contains(&role) }

  pub fn has_any(&self, roles: &[Role]) -> bool {
    roles.iter().any(|r| self.has(*r))
  }

  pub fn is_admin_lead(&self) -> bool { self.has(Role::AdminLead) }

  pub fn is_head_consultant(&self) -> bool { self.has(Role::HeadConsultant) }

  pub fn is_inspector(&self) -> bool { self.has(Role::Inspector) }
}
