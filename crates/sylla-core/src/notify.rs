//! Notification dispatch: subscription matching and channel fan-out.

use crate::{
  Result,
  history::Commit,
  record::CourseCode,
  repo::Repository,
  store::SyllabusStore,
  user::{Subscription, User},
};

// ─── DeliveryChannel ─────────────────────────────────────────────────────────

/// A pluggable delivery mechanism. Implementations live outside the core
/// (the CLI registers simulated email and SMS channels); zero channels is a
/// valid configuration.
pub trait DeliveryChannel {
  /// Short label used in logs, e.g. `"email"`.
  fn label(&self) -> &str;

  /// Deliver `message` to the named recipient. Fire-and-forget from the
  /// dispatcher's point of view: an error is logged and the remaining
  /// channels still run.
  fn send(
    &self,
    recipient: &str,
    message: &str,
  ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Fans a commit out to every subscription matching the affected course
/// code, through every registered channel.
#[derive(Default)]
pub struct Dispatcher {
  channels: Vec<Box<dyn DeliveryChannel>>,
}

impl Dispatcher {
  pub fn new() -> Self { Self::default() }

  pub fn add_channel(&mut self, channel: Box<dyn DeliveryChannel>) {
    self.channels.push(channel);
  }

  /// A subscription matches when the course code starts with its pattern or
  /// equals it exactly. Patterns are compared verbatim against the
  /// normalized code; subscribers of `"CE"` hear about `"CE221"`.
  pub fn notify(
    &self,
    subscriptions: &[Subscription],
    users: &[User],
    commit: &Commit,
    course_code: &CourseCode,
  ) {
    let code = course_code.as_str();
    tracing::debug!(%course_code, "processing notifications");

    for sub in subscriptions {
      if !(code.starts_with(&sub.pattern) || code == sub.pattern) {
        continue;
      }

      // Dangling observer ids are skipped silently; a subscription may
      // outlive its account.
      let Some(observer) = users.iter().find(|u| u.id == sub.observer_id)
      else {
        continue;
      };

      let message = format!(
        "Course {code} has been updated by {}. Message: {}",
        commit.author_name, commit.message
      );

      for channel in &self.channels {
        if let Err(err) = channel.send(&observer.name, &message) {
          tracing::warn!(
            %err,
            channel = channel.label(),
            recipient = %observer.name,
            "notification delivery failed"
          );
        }
      }
    }
  }
}

// ─── Subscribe ───────────────────────────────────────────────────────────────

/// Record a subscription for `observer_id` and persist the subscription
/// set. By contract there is no validation: neither the pattern nor the
/// observer id's existence is checked, and duplicates are allowed.
pub fn subscribe<S: SyllabusStore>(
  repo: &mut Repository<S>,
  observer_id: &str,
  pattern: &str,
) -> Result<()> {
  repo.subscriptions.push(Subscription {
    observer_id: observer_id.to_string(),
    pattern:     pattern.to_string(),
  });

  if let Err(err) = repo.persist_subscriptions() {
    repo.subscriptions.pop();
    return Err(err);
  }

  repo.audit(&format!("Subscribed: {observer_id} to pattern '{pattern}'"));
  tracing::info!(observer_id, pattern, "subscription recorded");
  Ok(())
}
