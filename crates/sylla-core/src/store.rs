//! The `SyllabusStore` trait — the persistence collaborator.
//!
//! The trait is implemented by storage backends (e.g. `sylla-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//! The contract is deliberately coarse: one bulk load at startup, one bulk
//! save per collection after each mutation. A save either succeeds in full
//! or fails in full; the caller rolls back its in-memory state on failure.

use crate::{
  history::Commit,
  record::SyllabusRecord,
  user::{Subscription, User},
};

/// Everything a backend holds, as loaded in one shot at startup.
///
/// Commit order in `commits` is append order; backends must preserve it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
  pub records:       Vec<SyllabusRecord>,
  pub commits:       Vec<Commit>,
  pub subscriptions: Vec<Subscription>,
  pub users:         Vec<User>,
}

/// Abstraction over a Sylla storage backend.
pub trait SyllabusStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load every collection. Missing backing data yields empty collections,
  /// not an error.
  fn load_all(&self) -> Result<StoreState, Self::Error>;

  /// Replace the persisted live record set.
  fn save_records(&self, records: &[SyllabusRecord])
  -> Result<(), Self::Error>;

  /// Replace the persisted commit log, preserving slice order.
  fn save_commits(&self, commits: &[Commit]) -> Result<(), Self::Error>;

  /// Replace the persisted subscription set.
  fn save_subscriptions(
    &self,
    subscriptions: &[Subscription],
  ) -> Result<(), Self::Error>;

  /// Replace the persisted user set.
  fn save_users(&self, users: &[User]) -> Result<(), Self::Error>;

  /// Append one entry to the audit log. The backend stamps the time.
  fn append_audit(&self, entry: &str) -> Result<(), Self::Error>;
}

// ─── Test support ────────────────────────────────────────────────────────────
