//! [`SqliteStore`] — the SQLite implementation of [`SyllabusStore`].

use std::{
  path::Path,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use rusqlite::Connection;
use sylla_core::{
  history::Commit,
  record::SyllabusRecord,
  store::{StoreState, SyllabusStore},
  user::{Subscription, User},
};

use crate::{
  Error, Result,
  encode::{
    RawCommit, RawSyllabus, RawUser, encode_content, encode_dt, encode_role,
    encode_snapshot, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sylla store backed by a single SQLite file.
///
/// The save methods replace their collection wholesale inside one
/// transaction, so a failed save leaves the previous durable state intact.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| Error::LockPoisoned)
  }

  /// All audit entries in append order, rendered as
  /// `[<rfc3339>] <entry>` lines.
  pub fn audit_entries(&self) -> Result<Vec<String>> {
    let conn = self.conn()?;
    let mut stmt = conn
      .prepare("SELECT recorded_at, entry FROM audit_log ORDER BY seq")?;
    let rows = stmt.query_map([], |row| {
      let at: String = row.get(0)?;
      let entry: String = row.get(1)?;
      Ok(format!("[{at}] {entry}"))
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Error::from)
  }
}

// ─── SyllabusStore impl ──────────────────────────────────────────────────────

impl SyllabusStore for SqliteStore {
  type Error = Error;

  fn load_all(&self) -> Result<StoreState> {
    let conn = self.conn()?;

    let records = {
      let mut stmt = conn.prepare(
        "SELECT course_code, title, semester, content_json
         FROM syllabi ORDER BY course_code",
      )?;
      let raws = stmt.query_map([], |row| {
        Ok(RawSyllabus {
          course_code:  row.get(0)?,
          title:        row.get(1)?,
          semester:     row.get(2)?,
          content_json: row.get(3)?,
        })
      })?;
      raws
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(RawSyllabus::into_record)
        .collect::<Result<Vec<SyllabusRecord>>>()?
    };

    let commits = {
      let mut stmt = conn.prepare(
        "SELECT commit_id, author_id, author_name, recorded_at, message,
                diff, snapshot_json
         FROM commits ORDER BY seq",
      )?;
      let raws = stmt.query_map([], |row| {
        Ok(RawCommit {
          commit_id:     row.get(0)?,
          author_id:     row.get(1)?,
          author_name:   row.get(2)?,
          recorded_at:   row.get(3)?,
          message:       row.get(4)?,
          diff:          row.get(5)?,
          snapshot_json: row.get(6)?,
        })
      })?;
      raws
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(RawCommit::into_commit)
        .collect::<Result<Vec<Commit>>>()?
    };

    let subscriptions = {
      let mut stmt = conn.prepare(
        "SELECT observer_id, pattern FROM subscriptions ORDER BY rowid",
      )?;
      let rows = stmt.query_map([], |row| {
        Ok(Subscription {
          observer_id: row.get(0)?,
          pattern:     row.get(1)?,
        })
      })?;
      rows.collect::<std::result::Result<Vec<_>, _>>()?
    };

    let users = {
      let mut stmt = conn.prepare(
        "SELECT user_id, name, password_hash, role_json
         FROM users ORDER BY rowid",
      )?;
      let raws = stmt.query_map([], |row| {
        Ok(RawUser {
          user_id:       row.get(0)?,
          name:          row.get(1)?,
          password_hash: row.get(2)?,
          role_json:     row.get(3)?,
        })
      })?;
      raws
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(RawUser::into_user)
        .collect::<Result<Vec<User>>>()?
    };

    Ok(StoreState { records, commits, subscriptions, users })
  }

  fn save_records(&self, records: &[SyllabusRecord]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM syllabi", [])?;
    {
      let mut stmt = tx.prepare(
        "INSERT INTO syllabi (course_code, title, semester, content_json)
         VALUES (?1, ?2, ?3, ?4)",
      )?;
      for record in records {
        stmt.execute(rusqlite::params![
          record.course_code.as_str(),
          record.title,
          record.semester,
          encode_content(&record.content)?,
        ])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  fn save_commits(&self, commits: &[Commit]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM commits", [])?;
    {
      let mut stmt = tx.prepare(
        "INSERT INTO commits (commit_id, author_id, author_name,
                              recorded_at, message, diff, snapshot_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      )?;
      // Slice order becomes seq order, which load_all sorts by.
      for commit in commits {
        stmt.execute(rusqlite::params![
          encode_uuid(commit.commit_id),
          commit.author_id,
          commit.author_name,
          encode_dt(commit.recorded_at),
          commit.message,
          commit.diff,
          encode_snapshot(&commit.snapshot)?,
        ])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  fn save_subscriptions(&self, subscriptions: &[Subscription]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM subscriptions", [])?;
    {
      let mut stmt = tx.prepare(
        "INSERT INTO subscriptions (observer_id, pattern) VALUES (?1, ?2)",
      )?;
      for sub in subscriptions {
        stmt.execute(rusqlite::params![sub.observer_id, sub.pattern])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  fn save_users(&self, users: &[User]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM users", [])?;
    {
      let mut stmt = tx.prepare(
        "INSERT INTO users (user_id, name, password_hash, role_json)
         VALUES (?1, ?2, ?3, ?4)",
      )?;
      for user in users {
        stmt.execute(rusqlite::params![
          user.id,
          user.name,
          user.password_hash,
          encode_role(&user.role)?,
        ])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  fn append_audit(&self, entry: &str) -> Result<()> {
    let conn = self.conn()?;
    conn.execute(
      "INSERT INTO audit_log (recorded_at, entry) VALUES (?1, ?2)",
      rusqlite::params![encode_dt(Utc::now()), entry],
    )?;
    Ok(())
  }
}
