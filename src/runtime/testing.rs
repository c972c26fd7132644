//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::journey::{Session, Step};
use crate::messaging::{
    ContentTemplate, ContentVariables, MessageReceipt, MessagingError, MessagingService,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock messenger
// ============================================================================

/// A message the mock accepted
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text {
        to: String,
        body: String,
    },
    Content {
        to: String,
        content_sid: String,
        variables: ContentVariables,
    },
}

impl SentMessage {
    pub fn text(to: &str, body: impl Into<String>) -> Self {
        SentMessage::Text {
            to: to.to_string(),
            body: body.into(),
        }
    }
}

/// Records every accepted message; failures are switched on per kind
#[derive(Default)]
pub struct MockMessenger {
    sent: Mutex<Vec<SentMessage>>,
    created: Mutex<Vec<String>>,
    failing_templates: Mutex<HashSet<String>>,
    fail_text: AtomicBool,
    fail_content: AtomicBool,
    send_delay: Mutex<Duration>,
}

#[allow(dead_code)]
impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_text(&self, fail: bool) {
        self.fail_text.store(fail, Ordering::SeqCst);
    }

    /// Every accepted send waits this long first
    pub fn slow_sends(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    async fn wait_before_send(&self) {
        let delay = *self.send_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn fail_content(&self, fail: bool) {
        self.fail_content.store(fail, Ordering::SeqCst);
    }

    /// Reject creation of the template with this friendly name
    pub fn fail_template(&self, friendly_name: &str) {
        self.failing_templates
            .lock()
            .unwrap()
            .insert(friendly_name.to_string());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent text bodies, in order
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text { body, .. } => Some(body),
                SentMessage::Content { .. } => None,
            })
            .collect()
    }

    /// Friendly names of created templates, in order
    pub fn created_templates(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    fn receipt(&self) -> MessageReceipt {
        MessageReceipt {
            sid: format!("SM{}", self.sent.lock().unwrap().len()),
            status: Some("accepted".to_string()),
        }
    }
}

#[async_trait]
impl MessagingService for MockMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageReceipt, MessagingError> {
        self.wait_before_send().await;
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(MessagingError::server_error("mock text failure"));
        }
        let receipt = self.receipt();
        self.sent.lock().unwrap().push(SentMessage::text(to, body));
        Ok(receipt)
    }

    async fn send_content(
        &self,
        to: &str,
        content_sid: &str,
        variables: &ContentVariables,
    ) -> Result<MessageReceipt, MessagingError> {
        self.wait_before_send().await;
        if self.fail_content.load(Ordering::SeqCst) {
            return Err(MessagingError::invalid_request("mock content failure"));
        }
        let receipt = self.receipt();
        self.sent.lock().unwrap().push(SentMessage::Content {
            to: to.to_string(),
            content_sid: content_sid.to_string(),
            variables: variables.clone(),
        });
        Ok(receipt)
    }

    async fn create_content(&self, template: &ContentTemplate) -> Result<String, MessagingError> {
        if self
            .failing_templates
            .lock()
            .unwrap()
            .contains(&template.friendly_name)
        {
            return Err(MessagingError::invalid_request("mock template failure"));
        }
        let mut created = self.created.lock().unwrap();
        created.push(template.friendly_name.clone());
        Ok(format!("HX{:03}", created.len()))
    }
}

// ============================================================================
// Failing store
// ============================================================================

/// Session store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn get_or_create(&self, _user_id: &str) -> Result<Session, String> {
        Err("store unavailable".to_string())
    }

    async fn get(&self, _user_id: &str) -> Result<Option<Session>, String> {
        Err("store unavailable".to_string())
    }

    async fn save(&self, _user_id: &str, _session: &Session) -> Result<(), String> {
        Err("store unavailable".to_string())
    }

    async fn clear_all(&self) -> Result<usize, String> {
        Err("store unavailable".to_string())
    }

    async fn user_count(&self) -> Result<usize, String> {
        Err("store unavailable".to_string())
    }

    async fn step_counts(&self) -> Result<BTreeMap<Step, usize>, String> {
        Err("store unavailable".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::{replies, JourneyContext, Notice, NoticeDelays, Scene};
    use crate::messaging::{templates, Dispatcher, TemplateRegistry};
    use crate::runtime::{JourneyRuntime, RuntimeError};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    const USER: &str = "+1555";

    fn runtime_with<S: SessionStore + 'static>(
        store: S,
        delays: NoticeDelays,
    ) -> (Arc<JourneyRuntime<S>>, Arc<MockMessenger>) {
        let messenger = Arc::new(MockMessenger::new());
        let dispatcher = Dispatcher::new(messenger.clone(), Arc::new(TemplateRegistry::new()));
        let runtime = JourneyRuntime::new(store, dispatcher, JourneyContext::new(delays));
        (Arc::new(runtime), messenger)
    }

    /// Notices far enough out that they never fire during a test
    fn runtime() -> (
        Arc<JourneyRuntime<Arc<InMemorySessionStore>>>,
        Arc<MockMessenger>,
        Arc<InMemorySessionStore>,
    ) {
        let store = Arc::new(InMemorySessionStore::new("Alex"));
        let (runtime, messenger) =
            runtime_with(store.clone(), NoticeDelays::uniform(Duration::from_secs(3600)));
        (runtime, messenger, store)
    }

    async fn wait_for_sends(messenger: &MockMessenger, count: usize) {
        for _ in 0..200 {
            if messenger.sent().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "Expected {count} sends, got {:?}",
            messenger.sent()
        );
    }

    async fn wait_for_no_pending<S: SessionStore + 'static>(
        runtime: &JourneyRuntime<S>,
        user_id: &str,
    ) {
        for _ in 0..200 {
            if runtime.pending_notices(user_id) == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("Notices still pending for {user_id}");
    }

    #[tokio::test]
    async fn test_plan_trip_end_to_end() {
        let (runtime, messenger, store) = runtime();

        let step = runtime
            .handle_inbound(USER, "plan my trip to market")
            .await
            .unwrap();

        assert_eq!(step, Step::AwaitingReminderChoice);
        assert_eq!(
            store.get(USER).await.unwrap().unwrap().step,
            Step::AwaitingReminderChoice
        );
        assert_eq!(
            messenger.sent(),
            vec![SentMessage::text(
                USER,
                templates::fallback_text(Scene::TripPlanning, "Alex")
            )]
        );
        assert!(messenger.texts()[0].contains("Alex"));
    }

    #[tokio::test]
    async fn test_reminder_yes_end_to_end() {
        let (runtime, messenger, _store) = runtime();

        runtime
            .handle_inbound(USER, "plan my trip to market")
            .await
            .unwrap();
        let step = runtime.handle_inbound(USER, "YES").await.unwrap();

        assert_eq!(step, Step::ReminderSet);
        assert_eq!(
            messenger.texts().last(),
            Some(&replies::reminder_confirmation("Alex"))
        );
        assert_eq!(messenger.sent().len(), 2);
        assert_eq!(runtime.pending_notices(USER), 1);
    }

    #[tokio::test]
    async fn test_templated_scene_when_registered() {
        let (runtime, messenger, _store) = runtime();
        runtime
            .templates()
            .record(Scene::TripPlanning, "HXplan")
            .await;

        runtime.handle_inbound(USER, "PLAN TRIP").await.unwrap();

        assert_eq!(
            messenger.sent(),
            vec![SentMessage::Content {
                to: USER.to_string(),
                content_sid: "HXplan".to_string(),
                variables: templates::variables(Scene::TripPlanning, "Alex"),
            }]
        );
    }

    #[tokio::test]
    async fn test_notice_fires_and_completes_journey() {
        let store = Arc::new(InMemorySessionStore::new("Alex"));
        let (runtime, messenger) =
            runtime_with(store.clone(), NoticeDelays::uniform(Duration::from_millis(10)));
        store
            .save(USER, &Session::new("Alex").at(Step::OnBus))
            .await
            .unwrap();

        runtime.handle_inbound(USER, "METRO_INFO").await.unwrap();
        assert_eq!(runtime.pending_notices(USER), 1);

        wait_for_sends(&messenger, 2).await;

        let session = store.get(USER).await.unwrap().unwrap();
        assert_eq!(session.step, Step::Completed);
        assert!(session.completed_at.is_some());
        assert_eq!(
            messenger.texts().last(),
            Some(&templates::fallback_text(Scene::JourneyComplete, "Alex"))
        );
        wait_for_no_pending(&runtime, USER).await;
    }

    #[tokio::test]
    async fn test_next_trip_cancels_pending_notices() {
        let store = Arc::new(InMemorySessionStore::new("Alex"));
        let (runtime, messenger) =
            runtime_with(store.clone(), NoticeDelays::uniform(Duration::from_millis(50)));
        store
            .save(USER, &Session::new("Alex").at(Step::OnBus))
            .await
            .unwrap();

        // Completion is scheduled, then the user restarts before it fires
        runtime.handle_inbound(USER, "BOOK").await.unwrap();
        store
            .save(USER, &Session::new("Alex").at(Step::Completed))
            .await
            .unwrap();
        runtime.handle_inbound(USER, "NEXT_TRIP").await.unwrap();
        assert_eq!(runtime.pending_notices(USER), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.get(USER).await.unwrap().unwrap().step, Step::Initial);
        assert_eq!(messenger.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_sessions_cancels_notices() {
        let store = Arc::new(InMemorySessionStore::new("Alex"));
        let (runtime, messenger) =
            runtime_with(store.clone(), NoticeDelays::uniform(Duration::from_millis(50)));

        runtime.handle_inbound(USER, "plan trip").await.unwrap();
        runtime.handle_inbound(USER, "YES").await.unwrap();
        assert_eq!(runtime.pending_notices(USER), 1);

        assert_eq!(runtime.clear_sessions().await.unwrap(), 1);
        assert_eq!(runtime.user_count().await.unwrap(), 0);
        assert_eq!(runtime.pending_notices(USER), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(messenger.sent().len(), 2);
        assert!(store.get(USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notice_for_cleared_session_sends_without_recreating() {
        let (runtime, messenger, store) = runtime();

        runtime
            .fire_notice(
                USER,
                Notice::FerryTransfer,
                "Sam".to_string(),
                &CancellationToken::new(),
            )
            .await;

        assert!(store.get(USER).await.unwrap().is_none());
        assert_eq!(
            messenger.texts(),
            vec![templates::fallback_text(Scene::FerryTransfer, "Sam")]
        );
    }

    #[tokio::test]
    async fn test_notice_uses_name_captured_at_scheduling() {
        let (runtime, messenger, store) = runtime();
        store
            .save(USER, &Session::new("Alex").at(Step::OnBus))
            .await
            .unwrap();

        runtime
            .fire_notice(
                USER,
                Notice::MetroConnection,
                "Jordan".to_string(),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(store.get(USER).await.unwrap().unwrap().step, Step::OnBus);
        assert_eq!(
            messenger.texts(),
            vec![templates::fallback_text(Scene::MetroConnection, "Jordan")]
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_a_handling_failure() {
        let (runtime, messenger) = runtime_with(FailingStore, NoticeDelays::default());

        let err = runtime.handle_inbound(USER, "plan trip").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Store(_)));
        assert!(messenger.sent().is_empty());

        let outcome = runtime.send_fallback(USER).await;
        assert!(outcome.is_delivered());
        assert_eq!(messenger.texts(), vec![replies::fallback()]);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_block_transition() {
        let (runtime, messenger, store) = runtime();
        messenger.fail_text(true);

        let step = runtime.handle_inbound(USER, "plan trip").await.unwrap();

        assert_eq!(step, Step::AwaitingReminderChoice);
        assert_eq!(
            store.get(USER).await.unwrap().unwrap().step,
            Step::AwaitingReminderChoice
        );
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_messages_for_one_user_are_serialized() {
        let (runtime, messenger, store) = runtime();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let runtime = Arc::clone(&runtime);
                tokio::spawn(async move { runtime.handle_inbound(USER, "hello").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.user_count().await.unwrap(), 1);
        assert_eq!(messenger.texts(), vec![replies::welcome(); 10]);
    }

    #[tokio::test]
    async fn test_dropped_caller_still_runs_effects() {
        let (runtime, messenger, store) = runtime();
        store
            .save(USER, &Session::new("Alex").at(Step::AwaitingReminderChoice))
            .await
            .unwrap();
        messenger.slow_sends(Duration::from_millis(100));

        let result =
            tokio::time::timeout(Duration::from_millis(20), runtime.handle_inbound(USER, "YES"))
                .await;
        assert!(result.is_err(), "caller should have given up");

        wait_for_sends(&messenger, 1).await;
        for _ in 0..200 {
            if runtime.pending_notices(USER) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(store.get(USER).await.unwrap().unwrap().step, Step::ReminderSet);
        assert_eq!(messenger.texts(), vec![replies::reminder_confirmation("Alex")]);
        assert_eq!(runtime.pending_notices(USER), 1);
    }

    #[tokio::test]
    async fn test_restart_wins_over_notice_waiting_for_lock() {
        let store = Arc::new(InMemorySessionStore::new("Alex"));
        let (runtime, messenger) =
            runtime_with(store.clone(), NoticeDelays::uniform(Duration::from_millis(50)));
        store
            .save(USER, &Session::new("Alex").at(Step::OnBus))
            .await
            .unwrap();

        runtime.handle_inbound(USER, "BOOK").await.unwrap();
        store
            .save(USER, &Session::new("Alex").at(Step::Completed))
            .await
            .unwrap();

        // The completion notice comes due while the restart still holds the lock
        messenger.slow_sends(Duration::from_millis(200));
        runtime.handle_inbound(USER, "NEXT_TRIP").await.unwrap();
        assert_eq!(store.get(USER).await.unwrap().unwrap().step, Step::Initial);

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.get(USER).await.unwrap().unwrap().step, Step::Initial);
        assert_eq!(
            messenger.texts(),
            vec![replies::rideshare_booked(), replies::next_trip("Alex")]
        );
        assert_eq!(runtime.pending_notices(USER), 0);
    }

    #[tokio::test]
    async fn test_clear_sessions_drops_idle_locks() {
        let (runtime, _messenger, _store) = runtime();
        runtime.handle_inbound("+1555", "hi").await.unwrap();
        runtime.handle_inbound("+1666", "hi").await.unwrap();
        assert_eq!(runtime.tracked_locks(), 2);

        runtime.clear_sessions().await.unwrap();

        assert_eq!(runtime.tracked_locks(), 0);
    }
}
