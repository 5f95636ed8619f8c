//! The syllabus service — orchestrates policy, history, persistence, and
//! notification for every mutation.
//!
//! Per course code the service is a small state machine: Absent → Live →
//! (Absent again via delete), with an unbounded append-only history of
//! prior Live states in the commit log. Every create and update appends
//! exactly one commit; delete appends none.

use uuid::Uuid;

use crate::{
  Error, Result,
  history::{self, Commit},
  notify::{self, Dispatcher},
  policy,
  record::{CourseCode, SyllabusRecord},
  repo::Repository,
  store::SyllabusStore,
  user::User,
};

/// Commit message recorded for every newly created syllabus.
const INITIAL_MESSAGE: &str = "Initial creation";

pub struct SyllabusService<S: SyllabusStore> {
  repo:       Repository<S>,
  dispatcher: Dispatcher,
}

impl<S: SyllabusStore> SyllabusService<S> {
  pub fn new(repo: Repository<S>, dispatcher: Dispatcher) -> Self {
    Self { repo, dispatcher }
  }

  pub fn repository(&self) -> &Repository<S> { &self.repo }

  pub fn repository_mut(&mut self) -> &mut Repository<S> { &mut self.repo }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Insert a new live record and its initial commit, then notify.
  pub fn create(&mut self, user: &User, record: SyllabusRecord) -> Result<Commit> {
    let code = record.course_code.clone();

    if !policy::can_create_or_edit(user, &code) {
      return Err(self.deny(user, format!("create syllabus {code}")));
    }

    if self.repo.records.contains_key(&code) {
      return Err(Error::AlreadyExists(code));
    }

    let commit = history::create_commit(None, &record, user, INITIAL_MESSAGE);
    self.repo.records.insert(code.clone(), record);
    self.repo.commits.push(commit.clone());

    if let Err(err) = self.persist_records_and_commits() {
      self.repo.records.remove(&code);
      self.repo.commits.pop();
      return Err(err);
    }

    self.repo.audit(&format!("Syllabus {code} created by {}", user.name));
    tracing::info!(course = %code, author = %user.name, "syllabus created");
    self
      .dispatcher
      .notify(&self.repo.subscriptions, &self.repo.users, &commit, &code);
    Ok(commit)
  }

  /// Replace the live record's fields, recording a commit computed against
  /// the pre-mutation state, then notify.
  pub fn update(
    &mut self,
    user: &User,
    course_code: &str,
    new_version: SyllabusRecord,
    message: &str,
  ) -> Result<Commit> {
    let code = CourseCode::new(course_code);

    let Some(existing) = self.repo.records.get(&code) else {
      return Err(Error::CourseNotFound(code));
    };

    if !policy::can_create_or_edit(user, &code) {
      return Err(self.deny(user, format!("edit syllabus {code}")));
    }

    // The commit must observe the pre-mutation state as "old".
    let mut new_version = new_version;
    new_version.course_code = code.clone();
    let commit =
      history::create_commit(Some(existing), &new_version, user, message);

    let previous = self.repo.records.insert(code.clone(), new_version);
    self.repo.commits.push(commit.clone());

    if let Err(err) = self.persist_records_and_commits() {
      if let Some(previous) = previous {
        self.repo.records.insert(code, previous);
      }
      self.repo.commits.pop();
      return Err(err);
    }

    self.repo.audit(&format!("Syllabus {code} updated by {}", user.name));
    tracing::info!(course = %code, author = %user.name, "syllabus updated");
    self
      .dispatcher
      .notify(&self.repo.subscriptions, &self.repo.users, &commit, &code);
    Ok(commit)
  }

  /// Remove a live record. A missing record is a no-op returning `false`;
  /// the commit log is left untouched either way, so history for the code
  /// survives deletion.
  pub fn delete(&mut self, user: &User, course_code: &str) -> Result<bool> {
    if !policy::can_delete(user) {
      return Err(self.deny(user, "delete syllabi".to_string()));
    }

    let code = CourseCode::new(course_code);
    let Some(removed) = self.repo.records.remove(&code) else {
      return Ok(false);
    };

    if let Err(err) = self.repo.persist_records() {
      self.repo.records.insert(code, removed);
      return Err(err);
    }

    self.repo.audit(&format!("Syllabus {code} deleted by {}", user.name));
    tracing::info!(course = %code, author = %user.name, "syllabus deleted");
    Ok(true)
  }

  /// Re-apply the snapshot stored in `commit_id` through the normal update
  /// path — authorization, a fresh commit, and notification included. A
  /// revert is new history, not a rewind.
  pub fn revert(&mut self, user: &User, commit_id: Uuid) -> Result<Commit> {
    let snapshot = self
      .repo
      .find_commit(commit_id)
      .map(|c| c.snapshot.clone())
      .ok_or(Error::CommitNotFound(commit_id))?;

    let code = snapshot.course_code.clone();
    let message = format!("Reverted to commit {commit_id} by {}", user.name);
    self.update(user, code.as_str(), snapshot, &message)
  }

  /// Record a subscription; see [`notify::subscribe`] for the (deliberate)
  /// lack of validation.
  pub fn subscribe(&mut self, observer_id: &str, pattern: &str) -> Result<()> {
    notify::subscribe(&mut self.repo, observer_id, pattern)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub fn get(&self, course_code: &str) -> Option<&SyllabusRecord> {
    self.repo.records.get(&CourseCode::new(course_code))
  }

  /// All live records, ordered by course code.
  pub fn get_all(&self) -> Vec<&SyllabusRecord> {
    self.repo.records.values().collect()
  }

  /// The ordered history for a course code: the subsequence of commits
  /// whose snapshot carries that code.
  pub fn history(&self, course_code: &str) -> Vec<&Commit> {
    let code = CourseCode::new(course_code);
    self
      .repo
      .commits
      .iter()
      .filter(|c| c.snapshot.course_code == code)
      .collect()
  }

  // ── Internals ─────────────────────────────────────────────────────────

  fn persist_records_and_commits(&self) -> Result<()> {
    self.repo.persist_records()?;
    self.repo.persist_commits()
  }

  fn deny(&self, user: &User, action: String) -> Error {
    self
      .repo
      .audit(&format!("Access denied: {} ({}) may not {action}", user.name, user.id));
    tracing::warn!(user = %user.name, action = %action, "access denied");
    Error::AccessDenied { user: user.name.clone(), action }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{
    history::INITIAL_DIFF,
    notify::DeliveryChannel,
    record::FieldValue,
    store::testing::MemStore,
    user::Role,
  };

  fn users() -> Vec<User> {
    let user = |id: &str, name: &str, role: Role| User {
      id:            id.to_string(),
      name:          name.to_string(),
      password_hash: String::new(),
      role,
    };
    vec![
      user("1", "Deniz Arslan", Role::Instructor { department: "CE".into() }),
      user("2", "Mert Kaplan", Role::Instructor { department: "SE".into() }),
      user("3", "Leyla Aydin", Role::HeadOfDepartment {
        department: "CE".into(),
      }),
      user("99", "Admin", Role::Admin),
    ]
  }

  fn service() -> SyllabusService<MemStore> {
    let store = MemStore::default();
    store.put_users(users());
    let repo = Repository::open(store).unwrap();
    SyllabusService::new(repo, Dispatcher::new())
  }

  fn ce_instructor(svc: &SyllabusService<MemStore>) -> User {
    svc.repository().find_user("1").unwrap().clone()
  }

  fn record(code: &str) -> SyllabusRecord {
    SyllabusRecord::new(code, "Data Structures", "Fall 2025")
      .with_field("credits", 6.0)
  }

  #[test]
  fn create_then_get_returns_the_created_record() {
    let mut svc = service();
    let user = ce_instructor(&svc);

    let created = record("CE221");
    svc.create(&user, created.clone()).unwrap();

    assert_eq!(svc.get("CE221"), Some(&created));
    // Normalization applies on lookup too.
    assert_eq!(svc.get(" ce 221"), Some(&created));

    let history = svc.history("CE221");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].diff, INITIAL_DIFF);
    assert_eq!(history[0].message, "Initial creation");
  }

  #[test]
  fn create_is_denied_outside_own_department() {
    let mut svc = service();
    let user = ce_instructor(&svc);

    let err = svc.create(&user, record("SE101")).unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));
    assert!(svc.get("SE101").is_none());
    assert!(svc.history("SE101").is_empty());
    assert!(
      svc
        .repository()
        .store()
        .audit_entries()
        .iter()
        .any(|e| e.contains("Access denied"))
    );
  }

  #[test]
  fn head_and_admin_create_in_any_department() {
    let mut svc = service();
    let head = svc.repository().find_user("3").unwrap().clone();
    let admin = svc.repository().find_user("99").unwrap().clone();

    svc.create(&head, record("SE101")).unwrap();
    svc.create(&admin, record("ME301")).unwrap();
  }

  #[test]
  fn create_rejects_duplicate_codes_across_spellings() {
    let mut svc = service();
    let user = ce_instructor(&svc);

    svc.create(&user, record("CE221")).unwrap();
    let err = svc.create(&user, record(" ce 221 ")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(svc.history("CE221").len(), 1);
  }

  #[test]
  fn update_missing_course_is_not_found() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    let err = svc
      .update(&user, "CE999", record("CE999"), "msg")
      .unwrap_err();
    assert!(matches!(err, Error::CourseNotFound(_)));
  }

  #[test]
  fn update_diffs_against_pre_mutation_state() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();

    let mut new_version = record("CE221");
    new_version.title = "Algorithms".into();
    new_version
      .content
      .insert("credits".into(), FieldValue::Number(7.0));

    let commit = svc
      .update(&user, "CE221", new_version, "curriculum revision")
      .unwrap();

    assert_eq!(commit.diff, [
      "Title changed: 'Data Structures' -> 'Algorithms'",
      "Content['credits'] changed: '6' -> '7'",
    ]
    .join("\n"));
    assert_eq!(commit.message, "curriculum revision");

    let live = svc.get("CE221").unwrap();
    assert_eq!(live.title, "Algorithms");
    assert_eq!(svc.history("CE221").len(), 2);
  }

  #[test]
  fn update_denied_leaves_record_untouched() {
    let mut svc = service();
    let admin = svc.repository().find_user("99").unwrap().clone();
    let se_instructor = svc.repository().find_user("2").unwrap().clone();
    svc.create(&admin, record("CE221")).unwrap();

    let mut new_version = record("CE221");
    new_version.title = "Hijacked".into();
    let err = svc
      .update(&se_instructor, "CE221", new_version, "nope")
      .unwrap_err();

    assert!(matches!(err, Error::AccessDenied { .. }));
    assert_eq!(svc.get("CE221").unwrap().title, "Data Structures");
    assert_eq!(svc.history("CE221").len(), 1);
  }

  #[test]
  fn delete_missing_course_is_a_silent_no_op() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();

    assert!(!svc.delete(&user, "CE999").unwrap());
    assert_eq!(svc.history("CE221").len(), 1);
    assert_eq!(svc.get_all().len(), 1);
  }

  #[test]
  fn delete_removes_record_but_keeps_history() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();

    assert!(svc.delete(&user, "CE221").unwrap());
    assert!(svc.get("CE221").is_none());
    assert_eq!(svc.history("CE221").len(), 1);
  }

  #[test]
  fn instructor_may_delete_outside_own_department() {
    let mut svc = service();
    let admin = svc.repository().find_user("99").unwrap().clone();
    let se_instructor = svc.repository().find_user("2").unwrap().clone();
    svc.create(&admin, record("CE221")).unwrap();

    assert!(svc.delete(&se_instructor, "CE221").unwrap());
  }

  #[test]
  fn revert_appends_a_new_commit_with_the_old_snapshot() {
    let mut svc = service();
    let user = ce_instructor(&svc);

    svc.create(&user, record("CE221")).unwrap();
    let v1 = svc.history("CE221")[0].clone();

    let mut v2 = record("CE221");
    v2.title = "Algorithms".into();
    svc.update(&user, "CE221", v2, "revision").unwrap();

    let v3 = svc.revert(&user, v1.commit_id).unwrap();

    assert_eq!(v3.snapshot.title, v1.snapshot.title);
    assert_eq!(v3.snapshot.content, v1.snapshot.content);
    assert_eq!(
      v3.message,
      format!("Reverted to commit {} by {}", v1.commit_id, user.name)
    );

    // Earlier commits are untouched; the log only grew.
    let history = svc.history("CE221");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0], &v1);
    assert_eq!(svc.get("CE221").unwrap().title, "Data Structures");
  }

  #[test]
  fn revert_unknown_commit_is_not_found() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    let err = svc.revert(&user, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, Error::CommitNotFound(_)));
  }

  #[test]
  fn revert_after_delete_reports_course_not_found() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();
    let initial = svc.history("CE221")[0].commit_id;
    svc.delete(&user, "CE221").unwrap();

    let err = svc.revert(&user, initial).unwrap_err();
    assert!(matches!(err, Error::CourseNotFound(_)));
  }

  #[test]
  fn failed_save_rolls_back_create() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.repository().store().fail_saves();

    let err = svc.create(&user, record("CE221")).unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(svc.get("CE221").is_none());
    assert!(svc.history("CE221").is_empty());
  }

  #[test]
  fn failed_save_rolls_back_update() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();
    svc.repository().store().fail_saves();

    let mut new_version = record("CE221");
    new_version.title = "Algorithms".into();
    let err = svc
      .update(&user, "CE221", new_version, "msg")
      .unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert_eq!(svc.get("CE221").unwrap().title, "Data Structures");
    assert_eq!(svc.history("CE221").len(), 1);
  }

  #[test]
  fn failed_save_rolls_back_delete() {
    let mut svc = service();
    let user = ce_instructor(&svc);
    svc.create(&user, record("CE221")).unwrap();
    svc.repository().store().fail_saves();

    let err = svc.delete(&user, "CE221").unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(svc.get("CE221").is_some());
  }

  // ── Notification wiring ───────────────────────────────────────────────

  struct RecordingChannel {
    sent: Rc<RefCell<Vec<(String, String)>>>,
  }

  impl DeliveryChannel for RecordingChannel {
    fn label(&self) -> &str { "recording" }

    fn send(
      &self,
      recipient: &str,
      message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
      self
        .sent
        .borrow_mut()
        .push((recipient.to_string(), message.to_string()));
      Ok(())
    }
  }

  fn service_with_channel()
  -> (SyllabusService<MemStore>, Rc<RefCell<Vec<(String, String)>>>) {
    let store = MemStore::default();
    store.put_users(users());
    let repo = Repository::open(store).unwrap();

    let sent = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_channel(Box::new(RecordingChannel {
      sent: Rc::clone(&sent),
    }));
    (SyllabusService::new(repo, dispatcher), sent)
  }

  #[test]
  fn mutations_notify_matching_subscribers() {
    let (mut svc, sent) = service_with_channel();
    let user = ce_instructor(&svc);

    // "2" is Mert Kaplan; subscribed to the whole CE department.
    svc.subscribe("2", "CE").unwrap();

    svc.create(&user, record("CE221")).unwrap();
    assert_eq!(sent.borrow().len(), 1);
    assert_eq!(sent.borrow()[0].0, "Mert Kaplan");

    let mut v2 = record("CE221");
    v2.title = "Algorithms".into();
    svc.update(&user, "CE221", v2, "revision").unwrap();
    assert_eq!(sent.borrow().len(), 2);
    assert!(sent.borrow()[1].1.contains("Message: revision"));
  }

  #[test]
  fn delete_does_not_notify() {
    let (mut svc, sent) = service_with_channel();
    let user = ce_instructor(&svc);
    svc.subscribe("2", "CE").unwrap();

    svc.create(&user, record("CE221")).unwrap();
    svc.delete(&user, "CE221").unwrap();
    // Only the create fan-out; deletion is silent.
    assert_eq!(sent.borrow().len(), 1);
  }
}
