use chrono::{DateTime, Local};
use std::time::Duration;

use crate::util::percent;

/// Live WPM readings at or above this are treated as noise
pub const IMPLAUSIBLE_WPM: u32 = 400;

/// Live display only needs to repaint every this many characters
pub const REPAINT_EVERY_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub wpm: Option<u32>,
    pub accuracy: Option<u32>,
}

pub fn words_typed(input: &[char]) -> usize {
    let mut words = 0;
    let mut in_word = false;
    for c in input {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            words += 1;
        }
    }
    words
}

/// Shorter spans than this carry no usable rate
pub const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// `None` until at least `MIN_ELAPSED` has passed
pub fn words_per_minute(input: &[char], elapsed: Duration) -> Option<u32> {
    if elapsed < MIN_ELAPSED {
        return None;
    }
    let minutes = elapsed.as_secs_f64() / 60.0;
    Some((words_typed(input) as f64 / minutes).round() as u32)
}

pub fn correct_chars(input: &[char], reference: &[char]) -> usize {
    input
        .iter()
        .zip(reference.iter())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Percentage of typed characters matching the passage at the same position.
///
/// Characters typed past the end of the passage count towards the input
/// length but never as correct, so overrunning keeps lowering the score.
pub fn accuracy(input: &[char], reference: &[char]) -> Option<u32> {
    percent(correct_chars(input, reference), input.len())
}

pub fn elapsed_between(started_at: DateTime<Local>, now: DateTime<Local>) -> Duration {
    (now - started_at).to_std().unwrap_or(Duration::ZERO)
}

pub fn measure(
    input: &[char],
    reference: &[char],
    started_at: DateTime<Local>,
    now: DateTime<Local>,
) -> Measurement {
    Measurement {
        wpm: words_per_minute(input, elapsed_between(started_at, now)),
        accuracy: accuracy(input, reference),
    }
}

pub fn should_repaint(input_len: usize, reference_len: usize) -> bool {
    input_len % REPAINT_EVERY_CHARS == 0 || input_len == reference_len
}

/// Values currently shown to the typist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveMetrics {
    pub wpm: u32,
    pub accuracy: u32,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
        }
    }
}

impl LiveMetrics {
    /// Fold a fresh measurement in. Returns whether the wpm reading was
    /// accepted.
    pub fn apply(&mut self, m: Measurement) -> bool {
        if let Some(acc) = m.accuracy {
            self.accuracy = acc;
        }
        match m.wpm {
            Some(wpm) if wpm < IMPLAUSIBLE_WPM => {
                self.wpm = wpm;
                true
            }
            _ => false,
        }
    }
}
