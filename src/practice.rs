use std::sync::mpsc::Sender;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::runtime::{ScheduledTask, TypingEvent};
use crate::session::{SessionResult, TypingSession};
use crate::store::SessionStore;

pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Drives one `TypingSession` against a session store: starts the countdown
/// on the first keystroke of a timed session, persists the result once and
/// stops the countdown whenever the session is left.
pub struct Practice<S: SessionStore> {
    session: TypingSession,
    store: S,
    ticks: Option<Sender<TypingEvent>>,
    tick_interval: Duration,
    countdown: Option<ScheduledTask>,
    saved: Option<SessionResult>,
}

impl<S: SessionStore> Practice<S> {
    /// `ticks` receives countdown ticks; without it timed sessions only
    /// expire when the caller drives `on_tick` itself.
    pub fn new(session: TypingSession, store: S, ticks: Option<Sender<TypingEvent>>) -> Self {
        Self {
            session,
            store,
            ticks,
            tick_interval: COUNTDOWN_INTERVAL,
            countdown: None,
            saved: None,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn on_input(&mut self, text: &str, now: DateTime<Local>) -> StoreResult<Option<SessionResult>> {
        let finished = self.session.apply_input(text, now);
        self.after_change(finished)
    }

    pub fn type_char(&mut self, c: char, now: DateTime<Local>) -> StoreResult<Option<SessionResult>> {
        let finished = self.session.type_char(c, now);
        self.after_change(finished)
    }

    pub fn backspace(&mut self, now: DateTime<Local>) {
        self.session.backspace(now);
    }

    pub fn on_tick(&mut self, now: DateTime<Local>) -> StoreResult<Option<SessionResult>> {
        let finished = self.session.on_tick(now);
        if self.session.is_completed() {
            self.teardown();
        }
        self.persist(finished)
    }

    /// Start the same passage again
    pub fn retry(&mut self) {
        self.teardown();
        self.session.retry();
        self.saved = None;
    }

    /// Swap in a different session, e.g. when moving to another passage
    pub fn replace(&mut self, session: TypingSession) {
        self.teardown();
        self.session = session;
        self.saved = None;
    }

    pub fn teardown(&mut self) {
        if let Some(mut task) = self.countdown.take() {
            task.cancel();
            debug!(passage = %self.session.passage_id(), "countdown stopped");
        }
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Stored copy of the finished session, id included
    pub fn saved(&self) -> Option<&SessionResult> {
        self.saved.as_ref()
    }

    fn after_change(&mut self, finished: Option<SessionResult>) -> StoreResult<Option<SessionResult>> {
        if self.session.is_completed() {
            self.teardown();
        } else {
            self.ensure_countdown();
        }
        self.persist(finished)
    }

    fn ensure_countdown(&mut self) {
        if self.countdown.is_some()
            || self.session.time_limit_secs().is_none()
            || !self.session.has_started()
        {
            return;
        }
        if let Some(tx) = &self.ticks {
            debug!(passage = %self.session.passage_id(), "countdown started");
            self.countdown = Some(ScheduledTask::every(self.tick_interval, tx.clone()));
        }
    }

    fn persist(&mut self, finished: Option<SessionResult>) -> StoreResult<Option<SessionResult>> {
        let Some(result) = finished else {
            return Ok(None);
        };
        let stored = self.store.append(result)?;
        info!(id = %stored.id, passage = %stored.passage_id, "session saved");
        self.saved = Some(stored.clone());
        Ok(Some(stored))
    }
}

impl<S: SessionStore> Drop for Practice<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
