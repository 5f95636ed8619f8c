//! Account management: admin-gated user creation and deletion, and
//! credential verification.
//!
//! Credentials are stored as argon2 PHC strings, salted from the OS RNG.
//! Plaintext passwords exist only transiently, on the way into the hasher
//! or the verifier.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{
  Error, Result,
  repo::Repository,
  store::SyllabusStore,
  user::{Role, User},
};

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| Error::PasswordHash(e.to_string()))?;
  Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. A malformed stored hash
/// verifies as false rather than erroring; the caller only learns that the
/// credentials did not match.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(stored_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Resolve `user_id` + `password` to a user. The error is uniform across
/// "no such user" and "wrong password".
pub fn authenticate<'a, S: SyllabusStore>(
  repo: &'a Repository<S>,
  user_id: &str,
  password: &str,
) -> Result<&'a User> {
  let user = repo.find_user(user_id).ok_or(Error::InvalidCredentials)?;
  if !verify_password(&user.password_hash, password) {
    return Err(Error::InvalidCredentials);
  }
  Ok(user)
}

// ─── User management ─────────────────────────────────────────────────────────

/// Create a new account. Admin-only. The id is the next free numeric id.
pub fn create_user<S: SyllabusStore>(
  repo: &mut Repository<S>,
  actor: &User,
  name: &str,
  password: &str,
  role: Role,
) -> Result<User> {
  require_admin(repo, actor, "create users")?;

  let user = User {
    id: next_user_id(&repo.users),
    name: name.to_string(),
    password_hash: hash_password(password)?,
    role,
  };

  repo.users.push(user.clone());
  if let Err(err) = repo.persist_users() {
    repo.users.pop();
    return Err(err);
  }

  repo.audit(&format!(
    "User Created: {} (Role: {}) by {}",
    user.name,
    role_name(&user.role),
    actor.name
  ));
  tracing::info!(id = %user.id, name = %user.name, "user created");
  Ok(user)
}

/// Delete an account. Admin-only; deleting yourself is rejected.
pub fn delete_user<S: SyllabusStore>(
  repo: &mut Repository<S>,
  actor: &User,
  user_id: &str,
) -> Result<()> {
  require_admin(repo, actor, "delete users")?;

  let index = repo
    .users
    .iter()
    .position(|u| u.id == user_id)
    .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

  if repo.users[index].id == actor.id {
    return Err(Error::SelfDeletion);
  }

  let removed = repo.users.remove(index);
  if let Err(err) = repo.persist_users() {
    repo.users.insert(index, removed);
    return Err(err);
  }

  repo.audit(&format!(
    "User Deleted: {} (ID: {user_id}) by {}",
    removed.name, actor.name
  ));
  tracing::info!(id = user_id, name = %removed.name, "user deleted");
  Ok(())
}

fn require_admin<S: SyllabusStore>(
  repo: &Repository<S>,
  actor: &User,
  action: &str,
) -> Result<()> {
  if matches!(actor.role, Role::Admin) {
    return Ok(());
  }
  repo.audit(&format!(
    "Access denied: {} ({}) may not {action}",
    actor.name, actor.id
  ));
  tracing::warn!(user = %actor.name, action, "access denied");
  Err(Error::AccessDenied {
    user:   actor.name.clone(),
    action: action.to_string(),
  })
}

fn next_user_id(users: &[User]) -> String {
  let max = users
    .iter()
    .filter_map(|u| u.id.parse::<u64>().ok())
    .max()
    .unwrap_or(0);
  (max + 1).to_string()
}

fn role_name(role: &Role) -> &'static str {
  match role {
    Role::Instructor { .. } => "Instructor",
    Role::HeadOfDepartment { .. } => "Head of Department",
    Role::Admin => "Admin",
  }
}
