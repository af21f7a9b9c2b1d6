//! Post-mutation refresh and notifications.

use std::time::{Duration, Instant};

use crate::api::ResourceKind;
use crate::error::MenuboardError;

use super::FetchRequest;

/// How long a success notification stays up.
pub const SUCCESS_TTL: Duration = Duration::from_secs(4);

/// How long an error notification stays up.
pub const ERROR_TTL: Duration = Duration::from_secs(6);

/// How long a form-level error stays up.
pub const FORM_ERROR_TTL: Duration = Duration::from_secs(5);

/// The kind of write that settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn past_tense(&self) -> &'static str {
        match self {
            MutationKind::Create => "created",
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            MutationKind::Create | MutationKind::Update => "save",
            MutationKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message that disappears on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedMessage {
    pub message: String,
    pub expires_at: Instant,
}

impl TimedMessage {
    pub fn new(message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Transient banner shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: TimedMessage,
}

impl Notification {
    pub fn success(message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: TimedMessage::new(message, now, SUCCESS_TTL),
        }
    }

    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: TimedMessage::new(message, now, ERROR_TTL),
        }
    }

    pub fn message(&self) -> &str {
        &self.text.message
    }
}

/// A list that can be brought back to its first page.
pub trait RefreshTarget {
    /// Resource held by the list.
    fn kind(&self) -> ResourceKind;

    /// Move selection and scroll position to the top.
    fn scroll_to_origin(&mut self);

    /// Start a page-one refetch, invalidating in-flight responses.
    /// Returns None when the list no longer accepts updates.
    fn begin_refresh(&mut self) -> Option<FetchRequest>;
}

/// Reacts to settled mutations: refreshes the list and raises notifications.
#[derive(Debug, Clone, Default)]
pub struct RefreshCoordinator {
    notification: Option<Notification>,
    form_error: Option<TimedMessage>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the outcome of a create/update/delete.
    ///
    /// On success the target scrolls to origin and a page-one fetch is
    /// returned. On failure nothing about the list changes.
    pub fn on_mutation_settled<P: RefreshTarget + ?Sized>(
        &mut self,
        target: &mut P,
        mutation: MutationKind,
        result: Result<(), MenuboardError>,
        now: Instant,
    ) -> Option<FetchRequest> {
        let kind = target.kind();
        match result {
            Ok(()) => {
                target.scroll_to_origin();
                let request = target.begin_refresh();
                self.form_error = None;
                self.notification = Some(Notification::success(
                    format!("{} {}", kind.singular(), mutation.past_tense()),
                    now,
                ));
                request
            }
            Err(e) => {
                let fallback = format!(
                    "Could not {} {}",
                    mutation.verb(),
                    kind.singular().to_lowercase()
                );
                let message = e.user_message(&fallback);
                tracing::warn!(resource = kind.path(), error = %e, "mutation failed");
                self.form_error = Some(TimedMessage::new(message.clone(), now, FORM_ERROR_TTL));
                self.notification = Some(Notification::error(message, now));
                None
            }
        }
    }

    /// Show an error without a mutation (e.g. a failed validation).
    pub fn notify_error(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        self.form_error = Some(TimedMessage::new(message.clone(), now, FORM_ERROR_TTL));
        self.notification = Some(Notification::error(message, now));
    }

    /// Drop expired messages.
    pub fn tick(&mut self, now: Instant) {
        if self.notification.as_ref().is_some_and(|n| n.text.is_expired(now)) {
            self.notification = None;
        }
        if self.form_error.as_ref().is_some_and(|m| m.is_expired(now)) {
            self.form_error = None;
        }
    }

    /// Close the notification early.
    pub fn dismiss(&mut self) {
        self.notification = None;
    }

    pub fn clear_form_error(&mut self) {
        self.form_error = None;
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_ref().map(|m| m.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::Purpose;

    #[derive(Default)]
    struct FakeList {
        scrolled: bool,
        generation: u64,
    }

    impl RefreshTarget for FakeList {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Campaigns
        }

        fn scroll_to_origin(&mut self) {
            self.scrolled = true;
        }

        fn begin_refresh(&mut self) -> Option<FetchRequest> {
            self.generation += 1;
            Some(FetchRequest {
                kind: ResourceKind::Campaigns,
                page_index: 0,
                page_size: 10,
                generation: self.generation,
                purpose: Purpose::Refresh,
                delay: Duration::ZERO,
            })
        }
    }

    #[test]
    fn test_success_refreshes_and_notifies() {
        let mut coordinator = RefreshCoordinator::new();
        let mut list = FakeList::default();
        let now = Instant::now();

        let request = coordinator
            .on_mutation_settled(&mut list, MutationKind::Create, Ok(()), now)
            .unwrap();

        assert!(list.scrolled);
        assert_eq!(request.page_index, 0);
        assert_eq!(request.purpose, Purpose::Refresh);
        assert_eq!(request.generation, 1);

        let note = coordinator.notification().unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message(), "Campaign created");
        assert_eq!(note.text.expires_at, now + SUCCESS_TTL);
    }

    #[test]
    fn test_failure_leaves_list_alone() {
        let mut coordinator = RefreshCoordinator::new();
        let mut list = FakeList::default();
        let now = Instant::now();

        let err = MenuboardError::Server {
            status: 400,
            message: "Name taken".to_string(),
        };
        let request =
            coordinator.on_mutation_settled(&mut list, MutationKind::Update, Err(err), now);

        assert!(request.is_none());
        assert!(!list.scrolled);
        assert_eq!(list.generation, 0);

        let note = coordinator.notification().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message(), "Name taken");
        assert_eq!(note.text.expires_at, now + ERROR_TTL);
        assert_eq!(coordinator.form_error(), Some("Name taken"));
    }

    #[test]
    fn test_failure_fallback_message() {
        let mut coordinator = RefreshCoordinator::new();
        let mut list = FakeList::default();
        let err = MenuboardError::Network("timed out".to_string());

        coordinator.on_mutation_settled(&mut list, MutationKind::Delete, Err(err), Instant::now());
        assert_eq!(
            coordinator.notification().unwrap().message(),
            "Could not delete campaign"
        );
    }

    #[test]
    fn test_messages_expire() {
        let mut coordinator = RefreshCoordinator::new();
        let mut list = FakeList::default();
        let now = Instant::now();
        let err = MenuboardError::Network("down".to_string());

        coordinator.on_mutation_settled(&mut list, MutationKind::Create, Err(err), now);

        coordinator.tick(now + Duration::from_millis(4_999));
        assert!(coordinator.form_error().is_some());

        coordinator.tick(now + FORM_ERROR_TTL);
        assert!(coordinator.form_error().is_none());
        assert!(coordinator.notification().is_some());

        coordinator.tick(now + ERROR_TTL);
        assert!(coordinator.notification().is_none());
    }

    #[test]
    fn test_success_expires_after_four_seconds() {
        let mut coordinator = RefreshCoordinator::new();
        let mut list = FakeList::default();
        let now = Instant::now();

        coordinator.on_mutation_settled(&mut list, MutationKind::Delete, Ok(()), now);
        coordinator.tick(now + Duration::from_secs(3));
        assert!(coordinator.notification().is_some());
        coordinator.tick(now + SUCCESS_TTL);
        assert!(coordinator.notification().is_none());
    }
}
