use itertools::Itertools;

use crate::feedback::pattern_label;
use crate::session::SessionResult;
use crate::util::{mean, std_dev};

pub const TOP_PATTERNS: usize = 5;

/// Aggregates over a session history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypingStats {
    pub average_wpm: u32,
    pub average_accuracy: u32,
    /// Rounded to whole minutes
    pub total_practice_minutes: u64,
    /// Counts records flagged `completed`, which every saved result is
    pub sessions_completed: usize,
    pub best_wpm: u32,
    pub wpm_std_dev: f64,
    /// `(label, count)`, most frequent first
    pub common_errors: Vec<(String, usize)>,
    /// `(expected char, misses)`, most missed first
    pub missed_chars: Vec<(char, usize)>,
}

impl TypingStats {
    pub fn from_sessions(sessions: &[SessionResult]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let wpms: Vec<f64> = sessions.iter().map(|s| f64::from(s.wpm)).collect();
        let accuracies: Vec<f64> = sessions.iter().map(|s| f64::from(s.accuracy)).collect();

        let total_secs: f64 = sessions
            .iter()
            .filter_map(SessionResult::elapsed)
            .map(|d| d.as_secs_f64())
            .sum();

        let common_errors = sessions
            .iter()
            .flat_map(|s| s.errors.iter())
            .map(|e| pattern_label(e.expected, e.actual))
            .counts()
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(TOP_PATTERNS)
            .collect();

        let missed_chars = sessions
            .iter()
            .flat_map(|s| s.errors.iter())
            .map(|e| e.expected)
            .counts()
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .collect();

        Self {
            average_wpm: mean(&wpms).map_or(0, |m| m.round() as u32),
            average_accuracy: mean(&accuracies).map_or(0, |m| m.round() as u32),
            total_practice_minutes: (total_secs / 60.0).round() as u64,
            sessions_completed: sessions.iter().filter(|s| s.completed).count(),
            best_wpm: sessions.iter().map(|s| s.wpm).max().unwrap_or(0),
            wpm_std_dev: std_dev(&wpms).unwrap_or(0.0),
            common_errors,
            missed_chars,
        }
    }
}
