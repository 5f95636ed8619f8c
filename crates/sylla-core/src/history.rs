//! Commits and the diff engine.
//!
//! A commit is an immutable record of one create or update: who, when, why
//! (the free-text message), what changed (the computed diff), and a full
//! snapshot of the record as of that commit. Commits are never updated or
//! removed; the log is ordered by append order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{record::SyllabusRecord, user::User};

/// Diff text of the first commit for a course code.
pub const INITIAL_DIFF: &str = "Initial Commit - New Syllabus Created";

/// Diff text when old and new snapshots render identically.
pub const NO_CHANGES_DIFF: &str = "No changes detected.";

// ─── Commit ──────────────────────────────────────────────────────────────────

/// An append-only log entry. The snapshot is an owned deep copy — mutating
/// the live record later never changes history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
  pub commit_id:   Uuid,
  pub author_id:   String,
  pub author_name: String,
  pub recorded_at: DateTime<Utc>,
  /// The "why" — free-text rationale supplied by the author.
  pub message:     String,
  /// The "what" — computed field-level change description.
  pub diff:        String,
  pub snapshot:    SyllabusRecord,
}

/// Build a commit for the transition from `old` (`None` on first creation)
/// to `new`. Pure: generates the id and timestamp, computes the diff, and
/// copies the new snapshot; nothing is persisted here.
pub fn create_commit(
  old: Option<&SyllabusRecord>,
  new: &SyllabusRecord,
  author: &User,
  message: impl Into<String>,
) -> Commit {
  Commit {
    commit_id:   Uuid::new_v4(),
    author_id:   author.id.clone(),
    author_name: author.name.clone(),
    recorded_at: Utc::now(),
    message:     message.into(),
    diff:        compute_diff(old, new),
    snapshot:    new.clone(),
  }
}

// ─── Diff ────────────────────────────────────────────────────────────────────

/// Field-level textual diff between two snapshots.
///
/// Compares title, then semester, then every key in the union of the two
/// content maps in lexicographic order. Content values are compared by their
/// text rendering, with `null` standing in for an absent key.
fn compute_diff(old: Option<&SyllabusRecord>, new: &SyllabusRecord) -> String {
  let Some(old) = old else {
    return INITIAL_DIFF.to_string();
  };

  let mut lines = Vec::new();

  if old.title != new.title {
    lines.push(format!("Title changed: '{}' -> '{}'", old.title, new.title));
  }

  if old.semester != new.semester {
    lines.push(format!(
      "Semester changed: '{}' -> '{}'",
      old.semester, new.semester
    ));
  }

  // Union of content keys, in lexicographic order.
  let mut keys: Vec<&str> = old
    .content
    .keys()
    .chain(new.content.keys())
    .map(String::as_str)
    .collect();
  keys.sort_unstable();
  keys.dedup();

  for key in keys {
    let old_val = render(old, key);
    let new_val = render(new, key);
    if old_val != new_val {
      lines.push(format!(
        "Content['{key}'] changed: '{old_val}' -> '{new_val}'"
      ));
    }
  }

  if lines.is_empty() {
    return NO_CHANGES_DIFF.to_string();
  }
  lines.join("\n")
}

fn render(record: &SyllabusRecord, key: &str) -> String {
  match record.content.get(key) {
    Some(value) => value.to_string(),
    None => "null".to_string(),
  }
}
