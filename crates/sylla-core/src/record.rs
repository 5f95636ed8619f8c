//! Syllabus records — the live documents the store manages.
//!
//! A record is identified by its normalized course code. All meaningful
//! syllabus content beyond the title and semester lives in an open map of
//! scalar fields, so departments can attach whatever structure they need
//! without a schema migration.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── CourseCode ──────────────────────────────────────────────────────────────

/// A normalized course code, e.g. `CE221`.
///
/// Normalization strips every whitespace character and uppercases the rest,
/// so `" ce 221 "` and `CE221` name the same course. The live record set is
/// keyed by this type; ordering is lexicographic.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CourseCode(String);

impl CourseCode {
  pub fn new(raw: &str) -> Self {
    let normalized: String = raw
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect::<String>()
      .to_uppercase();
    Self(normalized)
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CourseCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for CourseCode {
  fn from(raw: &str) -> Self { Self::new(raw) }
}

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// A scalar syllabus field value.
///
/// The closed variant set keeps diffing well-defined: every value has a
/// canonical text rendering, and two values are "changed" when their
/// renderings differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
  Bool(bool),
  Number(f64),
  Text(String),
}

impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{b}"),
      Self::Number(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}

impl From<String> for FieldValue {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<f64> for FieldValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<bool> for FieldValue {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

// ─── SyllabusRecord ──────────────────────────────────────────────────────────

/// A live syllabus document. At most one exists per normalized course code.
///
/// Content keys iterate in lexicographic order (`BTreeMap`), which makes the
/// diff text produced by [`crate::history`] reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllabusRecord {
  pub course_code: CourseCode,
  pub title:       String,
  pub semester:    String,
  #[serde(default)]
  pub content:     BTreeMap<String, FieldValue>,
}

impl SyllabusRecord {
  pub fn new(
    course_code: impl Into<CourseCode>,
    title: impl Into<String>,
    semester: impl Into<String>,
  ) -> Self {
    Self {
      course_code: course_code.into(),
      title:       title.into(),
      semester:    semester.into(),
      content:     BTreeMap::new(),
    }
  }

  /// Builder-style content insertion, mostly for tests and seeding.
  pub fn with_field(
    mut self,
    key: impl Into<String>,
    value: impl Into<FieldValue>,
  ) -> Self {
    self.content.insert(key.into(), value.into());
    self
  }
}

impl fmt::Display for SyllabusRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} - {} ({})", self.course_code, self.title, self.semester)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn course_code_strips_whitespace_and_uppercases() {
    assert_eq!(CourseCode::new(" ce 221 ").as_str(), "CE221");
    assert_eq!(CourseCode::new("CE221").as_str(), "CE221");
    assert_eq!(CourseCode::new("se\t101\n").as_str(), "SE101");
  }

  #[test]
  fn equal_codes_compare_equal_across_spellings() {
    assert_eq!(CourseCode::new("ce221"), CourseCode::new(" CE 221"));
  }

  #[test]
  fn field_value_renders_as_text() {
    assert_eq!(FieldValue::from("3 ECTS").to_string(), "3 ECTS");
    assert_eq!(FieldValue::from(7.0).to_string(), "7");
    assert_eq!(FieldValue::from(2.5).to_string(), "2.5");
    assert_eq!(FieldValue::from(true).to_string(), "true");
  }

  #[test]
  fn field_value_json_roundtrip_keeps_variant() {
    let content: BTreeMap<String, FieldValue> = [
      ("credits".to_string(), FieldValue::Number(6.0)),
      ("elective".to_string(), FieldValue::Bool(false)),
      ("book".to_string(), FieldValue::Text("CLRS".into())),
    ]
    .into_iter()
    .collect();

    let json = serde_json::to_string(&content).unwrap();
    let back: BTreeMap<String, FieldValue> =
      serde_json::from_str(&json).unwrap();
    assert_eq!(back, content);
  }
}
