//! The in-memory repository: live records, commit log, subscriptions, and
//! users, loaded once at startup and persisted through a [`SyllabusStore`]
//! after each mutation.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
  Error, Result,
  accounts,
  history::Commit,
  record::{CourseCode, SyllabusRecord},
  store::{StoreState, SyllabusStore},
  user::{Role, Subscription, User},
};

/// Password assigned to the seeded first-run accounts. Operators are
/// expected to rotate it through account management.
pub const SEED_PASSWORD: &str = "changeme";

// ─── Repository ──────────────────────────────────────────────────────────────

/// Single-owner aggregate of all in-memory state plus the store handle.
///
/// Records are keyed by normalized course code, which enforces the
/// one-live-record-per-code invariant and gives deterministic iteration
/// order. The commit log is append-only; nothing in this crate removes or
/// rewrites an entry once pushed.
pub struct Repository<S: SyllabusStore> {
  store: S,
  pub records:       BTreeMap<CourseCode, SyllabusRecord>,
  pub commits:       Vec<Commit>,
  pub subscriptions: Vec<Subscription>,
  pub users:         Vec<User>,
}

impl<S: SyllabusStore> Repository<S> {
  /// Load all collections from `store`. When no users are persisted (first
  /// run), seed the default accounts and persist them.
  pub fn open(store: S) -> Result<Self> {
    let StoreState { records, commits, subscriptions, users } =
      store.load_all().map_err(Error::store)?;

    let records = records
      .into_iter()
      .map(|r| (r.course_code.clone(), r))
      .collect();

    let mut repo = Self { store, records, commits, subscriptions, users };

    if repo.users.is_empty() {
      repo.users = seed_users()?;
      repo.persist_users()?;
      repo.audit("Seeded default user accounts");
      tracing::info!(count = repo.users.len(), "seeded first-run users");
    }

    Ok(repo)
  }

  // ── Persistence ───────────────────────────────────────────────────────

  pub fn persist_records(&self) -> Result<()> {
    let records: Vec<SyllabusRecord> =
      self.records.values().cloned().collect();
    self.store.save_records(&records).map_err(Error::store)
  }

  pub fn persist_commits(&self) -> Result<()> {
    self.store.save_commits(&self.commits).map_err(Error::store)
  }

  pub fn persist_subscriptions(&self) -> Result<()> {
    self
      .store
      .save_subscriptions(&self.subscriptions)
      .map_err(Error::store)
  }

  pub fn persist_users(&self) -> Result<()> {
    self.store.save_users(&self.users).map_err(Error::store)
  }

  /// Append an audit entry. Best-effort: a failing audit write is logged
  /// and swallowed so it cannot mask the outcome of the operation being
  /// audited.
  pub fn audit(&self, entry: &str) {
    if let Err(err) = self.store.append_audit(entry) {
      tracing::error!(%err, entry, "failed to append audit entry");
    }
  }

  // ── Lookups ───────────────────────────────────────────────────────────

  pub fn find_user(&self, id: &str) -> Option<&User> {
    self.users.iter().find(|u| u.id == id)
  }

  pub fn find_commit(&self, commit_id: Uuid) -> Option<&Commit> {
    self.commits.iter().find(|c| c.commit_id == commit_id)
  }

  /// Handle to the underlying store.
  pub fn store(&self) -> &S { &self.store }
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

fn seed_users() -> Result<Vec<User>> {
  let hash = accounts::hash_password(SEED_PASSWORD)?;
  let user = |id: &str, name: &str, role: Role| User {
    id:            id.to_string(),
    name:          name.to_string(),
    password_hash: hash.clone(),
    role,
  };

  Ok(vec![
    user("1", "Deniz Arslan", Role::Instructor { department: "CE".into() }),
    user("2", "Mert Kaplan", Role::Instructor { department: "SE".into() }),
    user("3", "Leyla Aydin", Role::HeadOfDepartment {
      department: "CE".into(),
    }),
    user("99", "Admin", Role::Admin),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::testing::MemStore;

  #[test]
  fn open_seeds_users_when_store_is_empty() {
    let repo = Repository::open(MemStore::default()).unwrap();
    assert_eq!(repo.users.len(), 4);
    assert!(repo.users.iter().any(|u| matches!(u.role, Role::Admin)));
    // Seeded users must round-trip through the store.
    assert_eq!(repo.store().saved_users(), 1);
  }

  #[test]
  fn open_does_not_reseed_when_users_exist() {
    let store = MemStore::default();
    store.put_users(vec![User {
      id:            "7".into(),
      name:          "Existing".into(),
      password_hash: "x".into(),
      role:          Role::Admin,
    }]);

    let repo = Repository::open(store).unwrap();
    assert_eq!(repo.users.len(), 1);
    assert_eq!(repo.users[0].name, "Existing");
  }

  #[test]
  fn records_are_keyed_by_course_code() {
    let store = MemStore::default();
    store.put_records(vec![
      SyllabusRecord::new("CE221", "Data Structures", "Fall 2025"),
      SyllabusRecord::new("SE101", "Intro SE", "Fall 2025"),
    ]);

    let repo = Repository::open(store).unwrap();
    assert_eq!(repo.records.len(), 2);
    assert!(repo.records.contains_key(&CourseCode::new("CE221")));
    assert!(repo.records.contains_key(&CourseCode::new("SE101")));
  }
}
