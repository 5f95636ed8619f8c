//! Users, roles, and subscriptions.

use serde::{Deserialize, Serialize};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The closed set of roles an account can hold. Department-scoped roles
/// carry their department code (e.g. `"CE"`) on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
  Instructor { department: String },
  HeadOfDepartment { department: String },
  Admin,
}

impl Role {
  /// The department this role is affiliated with, if any.
  pub fn department(&self) -> Option<&str> {
    match self {
      Self::Instructor { department } => Some(department),
      Self::HeadOfDepartment { department } => Some(department),
      Self::Admin => None,
    }
  }

  /// One-line description shown on the login screen.
  pub fn describe(&self) -> &'static str {
    match self {
      Self::Instructor { .. } => "Instructor - edits syllabi in own department",
      Self::HeadOfDepartment { .. } => {
        "Head of Department - edits syllabi department-wide"
      }
      Self::Admin => "Admin - unrestricted, manages accounts",
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// An account. The credential is an argon2 PHC string, never a plaintext
/// password; see [`crate::accounts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id:            String,
  pub name:          String,
  pub password_hash: String,
  pub role:          Role,
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// Pairs an observer's user id with a course-code pattern — either a full
/// code (`"CE221"`) or a department prefix (`"CE"`). Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub observer_id: String,
  pub pattern:     String,
}
