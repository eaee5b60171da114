use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::diff::{ErrorRecord, ErrorTracker};
use crate::metrics::{self, LiveMetrics};
use crate::time_series::TimeSeriesPoint;
use crate::viewport::Viewport;

/// Finalized outcome of one typing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Assigned by the session store on append
    #[serde(default)]
    pub id: String,
    pub passage_id: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: Vec<ErrorRecord>,
    pub started_at: DateTime<Local>,
    pub ended_at: Option<DateTime<Local>>,
    pub completed: bool,
}

impl SessionResult {
    pub fn elapsed(&self) -> Option<Duration> {
        self.ended_at
            .map(|end| metrics::elapsed_between(self.started_at, end))
    }
}

/// Live state of a passage being typed
#[derive(Debug)]
pub struct TypingSession {
    passage_id: String,
    reference: Vec<char>,
    input: Vec<char>,
    started_at: Option<DateTime<Local>>,
    tracker: ErrorTracker,
    live: LiveMetrics,
    viewport: Viewport,
    time_limit_secs: Option<u64>,
    seconds_remaining: Option<u64>,
    wpm_samples: Vec<TimeSeriesPoint>,
    completed: bool,
    result: Option<SessionResult>,
}

impl TypingSession {
    pub fn new(
        passage_id: impl Into<String>,
        content: &str,
        time_limit_secs: Option<u64>,
        line_columns: usize,
    ) -> Self {
        Self {
            passage_id: passage_id.into(),
            reference: content.chars().collect(),
            input: Vec::new(),
            started_at: None,
            tracker: ErrorTracker::new(),
            live: LiveMetrics::default(),
            viewport: Viewport::new(content, line_columns),
            time_limit_secs,
            seconds_remaining: time_limit_secs,
            wpm_samples: Vec::new(),
            completed: false,
            result: None,
        }
    }

    /// Replace the whole input with `new_input`, as a text control would
    /// report it. Returns the result if this input completed the passage.
    pub fn apply_input(&mut self, new_input: &str, now: DateTime<Local>) -> Option<SessionResult> {
        self.apply_chars(new_input.chars().collect(), now)
    }

    pub fn type_char(&mut self, c: char, now: DateTime<Local>) -> Option<SessionResult> {
        let mut next = self.input.clone();
        next.push(c);
        self.apply_chars(next, now)
    }

    pub fn backspace(&mut self, now: DateTime<Local>) {
        if self.input.is_empty() {
            return;
        }
        let mut next = self.input.clone();
        next.pop();
        let _ = self.apply_chars(next, now);
    }

    fn apply_chars(&mut self, chars: Vec<char>, now: DateTime<Local>) -> Option<SessionResult> {
        if self.completed {
            return None;
        }

        if self.started_at.is_none() && !chars.is_empty() {
            info!(passage = %self.passage_id, "typing session started");
            self.started_at = Some(now);
        }

        self.tracker.update(&chars, &self.reference);
        self.input = chars;
        self.viewport.follow(self.input.len());
        self.refresh_metrics(now);

        if !self.input.is_empty() && self.input.len() >= self.reference.len() {
            return self.finalize(now);
        }
        None
    }

    fn refresh_metrics(&mut self, now: DateTime<Local>) {
        let Some(started_at) = self.started_at else {
            return;
        };
        let m = metrics::measure(&self.input, &self.reference, started_at, now);
        if self.live.apply(m) {
            let t = metrics::elapsed_between(started_at, now).as_secs_f64();
            self.wpm_samples
                .push(TimeSeriesPoint::new(t, f64::from(self.live.wpm)));
        }
    }

    /// Countdown tick. Safe to call at any rate: the remaining time is
    /// derived from the wall clock, and ticks before the first keystroke or
    /// after completion do nothing.
    pub fn on_tick(&mut self, now: DateTime<Local>) -> Option<SessionResult> {
        if self.completed {
            return None;
        }
        let (Some(limit), Some(started_at)) = (self.time_limit_secs, self.started_at) else {
            return None;
        };

        let elapsed = metrics::elapsed_between(started_at, now).as_secs();
        let remaining = limit.saturating_sub(elapsed);
        self.seconds_remaining = Some(remaining);

        if remaining == 0 {
            debug!(passage = %self.passage_id, "time limit reached");
            return self.finalize(now);
        }
        None
    }

    /// Check-and-set on the completed flag: only the first trigger produces
    /// a result, whichever of completion or timeout arrives first.
    pub fn finalize(&mut self, now: DateTime<Local>) -> Option<SessionResult> {
        if self.completed {
            return None;
        }
        let started_at = self.started_at?;
        self.completed = true;

        if self.input.is_empty() {
            warn!(passage = %self.passage_id, "session ended with no input, nothing to record");
            return None;
        }

        let m = metrics::measure(&self.input, &self.reference, started_at, now);
        let result = SessionResult {
            id: String::new(),
            passage_id: self.passage_id.clone(),
            wpm: m.wpm.unwrap_or(self.live.wpm),
            accuracy: m.accuracy.unwrap_or(self.live.accuracy),
            errors: self.tracker.errors().to_vec(),
            started_at,
            ended_at: Some(now),
            completed: true,
        };
        info!(
            passage = %self.passage_id,
            wpm = result.wpm,
            accuracy = result.accuracy,
            errors = result.errors.len(),
            "typing session finished"
        );

        self.live.wpm = result.wpm;
        self.live.accuracy = result.accuracy;
        self.result = Some(result.clone());
        Some(result)
    }

    /// Throw away everything typed so far and start over on the same passage
    pub fn retry(&mut self) {
        self.input.clear();
        self.started_at = None;
        self.tracker.reset();
        self.live = LiveMetrics::default();
        self.viewport.reset();
        self.seconds_remaining = self.time_limit_secs;
        self.wpm_samples.clear();
        self.completed = false;
        self.result = None;
    }

    pub fn passage_id(&self) -> &str {
        &self.passage_id
    }

    pub fn reference(&self) -> &[char] {
        &self.reference
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn input_text(&self) -> String {
        self.input.iter().collect()
    }

    pub fn cursor_pos(&self) -> usize {
        self.input.len()
    }

    pub fn errors(&self) -> &ErrorTracker {
        &self.tracker
    }

    pub fn live(&self) -> LiveMetrics {
        self.live
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_secs
    }

    pub fn seconds_remaining(&self) -> Option<u64> {
        self.seconds_remaining
    }

    pub fn wpm_samples(&self) -> &[TimeSeriesPoint] {
        &self.wpm_samples
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Fraction of the passage typed so far, capped at 1.0
    pub fn progress(&self) -> f64 {
        if self.reference.is_empty() {
            return 0.0;
        }
        (self.input.len() as f64 / self.reference.len() as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Local> {
        Local.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn session(content: &str, limit: Option<u64>) -> TypingSession {
        TypingSession::new("p1", content, limit, 100)
    }

    #[test]
    fn test_new_session() {
        let s = session("hello world", None);
        assert_eq!(s.passage_id(), "p1");
        assert_eq!(s.cursor_pos(), 0);
        assert!(!s.has_started());
        assert!(!s.is_completed());
        assert_eq!(s.live(), LiveMetrics::default());
        assert_eq!(s.seconds_remaining(), None);
    }

    #[test]
    fn test_start_time_set_once() {
        let mut s = session("hello", None);
        s.apply_input("h", at(100));
        s.apply_input("he", at(900));
        assert_eq!(s.started_at(), Some(at(100)));

        s.apply_input("", at(1_000));
        s.apply_input("h", at(1_500));
        assert_eq!(s.started_at(), Some(at(100)));
    }

    #[test]
    fn test_cat_scenario() {
        let mut s = session("cat", None);
        assert!(s.type_char('c', at(0)).is_none());
        assert!(s.type_char('b', at(500)).is_none());
        let result = s.type_char('t', at(12_000)).expect("completes");

        assert_eq!(result.errors, vec![ErrorRecord::new(1, 'a', 'b')]);
        assert_eq!(result.accuracy, 67);
        assert_eq!(result.wpm, 5);
        assert_eq!(result.ended_at, Some(at(12_000)));
        assert!(result.completed);
        assert!(s.is_completed());
    }

    #[test]
    fn test_overrun_via_paste_completes() {
        let mut s = session("hello world", None);
        s.apply_input("h", at(0));
        let result = s.apply_input("hello world!", at(6_000)).expect("completes");
        assert_eq!(result.accuracy, 92);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_burst_finish_keeps_live_wpm() {
        let burst = {
            let mut s = session("ab", None);
            s.type_char('a', at(0));
            s.type_char('b', at(0) + chrono::Duration::microseconds(500))
                .expect("completes")
        };
        let instant = {
            let mut s = session("ab", None);
            s.type_char('a', at(0));
            s.type_char('b', at(0)).expect("completes")
        };

        assert_eq!(burst.wpm, 0);
        assert_eq!(burst.wpm, instant.wpm);
        assert_eq!(burst.accuracy, 100);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut s = session("ab", Some(1));
        s.type_char('a', at(0));
        assert!(s.type_char('b', at(500)).is_some());
        assert!(s.on_tick(at(2_000)).is_none());
        assert!(s.finalize(at(3_000)).is_none());
        assert_eq!(s.result().map(|r| r.ended_at), Some(Some(at(500))));
    }

    #[test]
    fn test_input_ignored_after_completion() {
        let mut s = session("ab", None);
        s.apply_input("ab", at(1_000));
        assert!(s.is_completed());
        assert!(s.apply_input("abc", at(2_000)).is_none());
        assert_eq!(s.input_text(), "ab");
    }

    #[test]
    fn test_timer_counts_down_and_expires() {
        let mut s = session("a long passage to type", Some(3));
        assert!(s.on_tick(at(0)).is_none());
        assert_eq!(s.seconds_remaining(), Some(3));

        s.type_char('a', at(0));
        assert!(s.on_tick(at(1_200)).is_none());
        assert_eq!(s.seconds_remaining(), Some(2));

        let result = s.on_tick(at(3_100));
        assert_matches!(result, Some(SessionResult { completed: true, .. }));
        assert_eq!(s.seconds_remaining(), Some(0));
        assert!(s.type_char(' ', at(3_200)).is_none());
    }

    #[test]
    fn test_timeout_with_empty_input_records_nothing() {
        let mut s = session("abc", Some(1));
        s.type_char('a', at(0));
        s.backspace(at(100));
        assert!(s.on_tick(at(1_000)).is_none());
        assert!(s.is_completed());
        assert!(s.result().is_none());
    }

    #[test]
    fn test_live_metrics_keep_previous_on_spike() {
        let mut s = session("ab cd ef gh", None);
        s.type_char('a', at(0));
        // one word within a millisecond reads as tens of thousands of wpm
        s.type_char('b', at(1));
        assert_eq!(s.live().wpm, 0);
        assert_eq!(s.live().accuracy, 100);

        s.apply_input("ab cd", at(30_000));
        assert_eq!(s.live().wpm, 4);
        assert_eq!(s.wpm_samples().len(), 1);
    }

    #[test]
    fn test_backspace_drops_errors() {
        let mut s = session("hello", None);
        s.apply_input("hxl", at(0));
        assert_eq!(s.errors().len(), 1);
        s.backspace(at(10));
        s.backspace(at(20));
        assert!(s.errors().is_empty());
        assert_eq!(s.cursor_pos(), 1);
    }

    #[test]
    fn test_retry_resets_state() {
        let mut s = session("ab", Some(30));
        s.apply_input("ab", at(0));
        s.retry();

        assert!(!s.is_completed());
        assert!(!s.has_started());
        assert!(s.result().is_none());
        assert_eq!(s.seconds_remaining(), Some(30));
        assert_eq!(s.cursor_pos(), 0);
    }

    #[test]
    fn test_progress() {
        let mut s = session("abcd", None);
        assert_eq!(s.progress(), 0.0);
        s.apply_input("ab", at(0));
        assert_eq!(s.progress(), 0.5);
    }

    #[test]
    fn test_viewport_follows_cursor() {
        let content = "word ".repeat(60);
        let mut s = TypingSession::new("p", content.trim_end(), None, 20);
        assert_eq!(s.viewport().window().first(), 0);
        s.apply_input(&content[..45], at(0));
        assert_eq!(s.viewport().window().first(), 2);
    }
}
