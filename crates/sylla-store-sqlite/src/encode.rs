//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, and structured fields (content map, role, commit snapshot) as
//! compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sylla_core::{
  history::Commit,
  record::{FieldValue, SyllabusRecord},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Content map ─────────────────────────────────────────────────────────────

pub fn encode_content(content: &BTreeMap<String, FieldValue>) -> Result<String> {
  Ok(serde_json::to_string(content)?)
}

pub fn decode_content(s: &str) -> Result<BTreeMap<String, FieldValue>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: &Role) -> Result<String> {
  Ok(serde_json::to_string(role)?)
}

pub fn decode_role(s: &str) -> Result<Role> { Ok(serde_json::from_str(s)?) }

// ─── Snapshot ────────────────────────────────────────────────────────────────

pub fn encode_snapshot(record: &SyllabusRecord) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

pub fn decode_snapshot(s: &str) -> Result<SyllabusRecord> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `syllabi` row.
pub struct RawSyllabus {
  pub course_code:  String,
  pub title:        String,
  pub semester:     String,
  pub content_json: String,
}

impl RawSyllabus {
  pub fn into_record(self) -> Result<SyllabusRecord> {
    Ok(SyllabusRecord {
      // Stored normalized; re-normalizing through the constructor is a
      // no-op for well-formed rows and repairs hand-edited ones.
      course_code: self.course_code.as_str().into(),
      title:       self.title,
      semester:    self.semester,
      content:     decode_content(&self.content_json)?,
    })
  }
}

/// Raw strings read directly from a `commits` row.
pub struct RawCommit {
  pub commit_id:     String,
  pub author_id:     String,
  pub author_name:   String,
  pub recorded_at:   String,
  pub message:       String,
  pub diff:          String,
  pub snapshot_json: String,
}

impl RawCommit {
  pub fn into_commit(self) -> Result<Commit> {
    Ok(Commit {
      commit_id:   decode_uuid(&self.commit_id)?,
      author_id:   self.author_id,
      author_name: self.author_name,
      recorded_at: decode_dt(&self.recorded_at)?,
      message:     self.message,
      diff:        self.diff,
      snapshot:    decode_snapshot(&self.snapshot_json)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub password_hash: String,
  pub role_json:     String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.user_id,
      name:          self.name,
      password_hash: self.password_hash,
      role:          decode_role(&self.role_json)?,
    })
  }
}
