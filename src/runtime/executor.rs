//! Journey runtime executor

use super::scheduler::NoticeScheduler;
use super::traits::SessionStore;
use super::RuntimeError;

use crate::journey::{
    replies, transition, Effect, Event, JourneyContext, Notice, Step, TransitionResult,
};
use crate::messaging::{Dispatcher, SendOutcome, TemplateRegistry};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs transitions for every traveller and executes their effects
pub struct JourneyRuntime<S>
where
    S: SessionStore + 'static,
{
    store: S,
    dispatcher: Dispatcher,
    context: JourneyContext,
    scheduler: NoticeScheduler,
    /// One async lock per user, held across load, transition, save and send
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S> JourneyRuntime<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: S, dispatcher: Dispatcher, context: JourneyContext) -> Self {
        Self {
            store,
            dispatcher,
            context,
            scheduler: NoticeScheduler::new(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn templates(&self) -> &Arc<TemplateRegistry> {
        self.dispatcher.templates()
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }

    /// Handle one inbound message and return the step the user ended on.
    ///
    /// The work runs on its own task, so dropping the returned future does
    /// not stop a saved transition from having its effects executed.
    pub async fn handle_inbound(
        self: &Arc<Self>,
        user_id: &str,
        text: &str,
    ) -> Result<Step, RuntimeError> {
        let runtime = Arc::clone(self);
        let user_id = user_id.to_string();
        let text = text.to_string();

        tokio::spawn(async move { runtime.process_inbound(&user_id, &text).await })
            .await
            .map_err(|e| RuntimeError::Task(e.to_string()))?
    }

    async fn process_inbound(
        self: &Arc<Self>,
        user_id: &str,
        text: &str,
    ) -> Result<Step, RuntimeError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let session = self
            .store
            .get_or_create(user_id)
            .await
            .map_err(RuntimeError::Store)?;

        let event = Event::inbound(text);
        tracing::debug!(user = %user_id, step = %session.step, event = ?event, "Processing inbound");

        let TransitionResult {
            session: next,
            effects,
        } = transition(&session, &self.context, event);

        if next.step != session.step {
            tracing::info!(user = %user_id, from = %session.step, to = %next.step, "Step changed");
        }

        self.store
            .save(user_id, &next)
            .await
            .map_err(RuntimeError::Store)?;

        for effect in effects {
            self.execute_effect(user_id, effect).await;
        }

        Ok(next.step)
    }

    async fn execute_effect(self: &Arc<Self>, user_id: &str, effect: Effect) {
        match effect {
            Effect::ScheduleNotice {
                notice,
                delay,
                name,
            } => self.schedule_notice(user_id, notice, delay, name),

            Effect::CancelNotices => {
                let cancelled = self.scheduler.cancel_user(user_id);
                tracing::info!(user = %user_id, cancelled, "Cancelled pending notices");
            }

            send => self.deliver(user_id, send).await,
        }
    }

    fn schedule_notice(self: &Arc<Self>, user_id: &str, notice: Notice, delay: Duration, name: String) {
        let ticket = self.scheduler.register(user_id);
        let runtime = Arc::clone(self);
        let user_id = user_id.to_string();

        tracing::info!(
            user = %user_id,
            notice = %notice,
            delay_ms = %delay.as_millis(),
            pending = self.scheduler.pending(&user_id),
            "Notice scheduled"
        );

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = ticket.token.cancelled() => {
                    tracing::debug!(user = %user_id, notice = %notice, "Notice cancelled");
                }

                () = tokio::time::sleep(delay) => {
                    runtime.fire_notice(&user_id, notice, name, &ticket.token).await;
                    runtime.scheduler.complete(&user_id, ticket.generation);
                }
            }
        });
    }

    /// Deliver a due notice. The session is updated if it still exists; a
    /// cleared session is not recreated but the scene is still sent.
    ///
    /// `cancel` is checked again once the user lock is held: a restart or
    /// clear that ran while this notice waited for the lock wins.
    pub async fn fire_notice(
        &self,
        user_id: &str,
        notice: Notice,
        name: String,
        cancel: &CancellationToken,
    ) {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        if cancel.is_cancelled() {
            tracing::debug!(user = %user_id, notice = %notice, "Notice cancelled while waiting for user lock");
            return;
        }

        tracing::info!(user = %user_id, notice = %notice, "Notice due");

        let session = match self.store.get(user_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::info!(user = %user_id, notice = %notice, "No session for notice, sending scene only");
                self.dispatcher
                    .send_scene(user_id, notice.scene(), &name)
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!(user = %user_id, notice = %notice, error = %e, "Failed to load session for notice");
                self.dispatcher
                    .send_scene(user_id, notice.scene(), &name)
                    .await;
                return;
            }
        };

        let event = Event::NoticeDue {
            notice,
            name,
            at: Utc::now(),
        };
        let result = transition(&session, &self.context, event);

        if result.session.step != session.step {
            tracing::info!(user = %user_id, from = %session.step, to = %result.session.step, "Step changed");
        }

        if let Err(e) = self.store.save(user_id, &result.session).await {
            tracing::error!(user = %user_id, error = %e, "Failed to save session after notice");
        }

        for effect in result.effects {
            self.deliver(user_id, effect).await;
        }
    }

    /// Execute a send effect
    async fn deliver(&self, user_id: &str, effect: Effect) {
        let outcome = match effect {
            Effect::SendScene { scene, name } => {
                self.dispatcher.send_scene(user_id, scene, &name).await
            }
            Effect::SendText { body } => self.dispatcher.send_text(user_id, &body).await,
            other => {
                tracing::warn!(user = %user_id, effect = ?other, "Effect not deliverable here, skipping");
                return;
            }
        };

        match outcome {
            SendOutcome::Templated(receipt) | SendOutcome::PlainText(receipt) => {
                tracing::debug!(user = %user_id, sid = %receipt.sid, "Reply delivered");
            }
            SendOutcome::Degraded { cause, receipt } => {
                tracing::warn!(
                    user = %user_id,
                    cause = %cause,
                    kind = cause.kind.as_str(),
                    sid = receipt.as_ref().map_or("", |r| r.sid.as_str()),
                    "Reply degraded to text"
                );
            }
            SendOutcome::Failed(e) => {
                tracing::warn!(user = %user_id, error = %e, kind = e.kind.as_str(), "Reply not delivered");
            }
        }
    }

    /// Cancel every pending notice and drop every session. Locks nobody is
    /// holding or waiting on are dropped too.
    pub async fn clear_sessions(&self) -> Result<usize, RuntimeError> {
        let cancelled = self.scheduler.cancel_all();
        self.user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        let cleared = self.store.clear_all().await.map_err(RuntimeError::Store)?;
        tracing::info!(cleared, cancelled, "Sessions cleared");
        Ok(cleared)
    }

    /// Tell the user their message could not be handled
    pub async fn send_fallback(&self, user_id: &str) -> SendOutcome {
        self.dispatcher.send_text(user_id, &replies::fallback()).await
    }

    pub async fn user_count(&self) -> Result<usize, RuntimeError> {
        self.store.user_count().await.map_err(RuntimeError::Store)
    }

    pub async fn step_counts(&self) -> Result<BTreeMap<Step, usize>, RuntimeError> {
        self.store.step_counts().await.map_err(RuntimeError::Store)
    }

    #[cfg(test)]
    pub fn pending_notices(&self, user_id: &str) -> usize {
        self.scheduler.pending(user_id)
    }

    #[cfg(test)]
    pub fn tracked_locks(&self) -> usize {
        self.user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
