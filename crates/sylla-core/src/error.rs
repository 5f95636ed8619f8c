//! Error types for `sylla-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::record::CourseCode;

#[derive(Debug, Error)]
pub enum Error {
  #[error("access denied: {user} may not {action}")]
  AccessDenied { user: String, action: String },

  #[error("syllabus not found: {0}")]
  CourseNotFound(CourseCode),

  #[error("commit not found: {0}")]
  CommitNotFound(Uuid),

  #[error("syllabus already exists: {0}")]
  AlreadyExists(CourseCode),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("cannot delete your own account")]
  SelfDeletion,

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("password hash error: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a storage backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
