//! Post-session heuristic turning a finished session into ratings and advice.
//!
//! Thresholds are hand-picked rather than statistically derived; the tests
//! pin their exact boundaries so any change is deliberate.

use itertools::Itertools;

use crate::diff::ErrorRecord;
use crate::session::SessionResult;

pub const MAX_PATTERNS: usize = 5;
pub const MAX_EXAMPLES: usize = 3;
/// Characters of passage shown on either side of an error
pub const CONTEXT_RADIUS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceRating {
    pub speed: u8,
    pub accuracy: u8,
    pub consistency: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPattern {
    pub pattern: String,
    pub expected: char,
    pub actual: char,
    pub count: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackReport {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub common_error_patterns: Vec<ErrorPattern>,
    pub rating: PerformanceRating,
}

pub fn pattern_label(expected: char, actual: char) -> String {
    format!("{expected} → {actual}")
}

fn clamp_rating(value: i64) -> u8 {
    value.clamp(1, 10) as u8
}

pub fn speed_rating(wpm: u32) -> u8 {
    clamp_rating(i64::from(wpm / 15))
}

pub fn accuracy_rating(accuracy: u32) -> u8 {
    clamp_rating(i64::from(accuracy / 10))
}

/// More distinct kinds of mistakes means a less consistent typist
pub fn consistency_rating(distinct_patterns: usize) -> u8 {
    clamp_rating(10 - (distinct_patterns / 2) as i64)
}

/// Passage text around `index`, `CONTEXT_RADIUS` chars back and up to (not
/// including) `CONTEXT_RADIUS` chars ahead, clamped to the passage.
pub fn context_snippet(content: &[char], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS).min(content.len());
    if start >= end {
        return String::new();
    }
    content[start..end].iter().collect()
}

/// Group errors by `(expected, actual)`, most frequent first. Ties keep the
/// order in which each pair was first seen.
pub fn error_patterns(errors: &[ErrorRecord], content: &str) -> Vec<ErrorPattern> {
    let content: Vec<char> = content.chars().collect();
    errors
        .iter()
        .enumerate()
        .into_group_map_by(|(_, err)| (err.expected, err.actual))
        .into_values()
        .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].0.cmp(&b[0].0)))
        .take(MAX_PATTERNS)
        .map(|group| {
            let (_, first) = group[0];
            ErrorPattern {
                pattern: pattern_label(first.expected, first.actual),
                expected: first.expected,
                actual: first.actual,
                count: group.len(),
                examples: group
                    .iter()
                    .take(MAX_EXAMPLES)
                    .map(|(_, err)| context_snippet(&content, err.index))
                    .collect(),
            }
        })
        .collect()
}

pub fn generate(session: &SessionResult, content: &str) -> FeedbackReport {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut suggestions = Vec::new();

    let speed = speed_rating(session.wpm);
    if session.wpm > 60 {
        strengths.push("Excellent typing speed".to_string());
    } else if session.wpm > 40 {
        strengths.push("Good typing speed".to_string());
    } else {
        weaknesses.push("Typing speed could be improved".to_string());
        suggestions.push("Practice regular typing exercises to build muscle memory".to_string());
    }

    let accuracy = accuracy_rating(session.accuracy);
    if session.accuracy > 95 {
        strengths.push("Exceptional typing accuracy".to_string());
    } else if session.accuracy > 85 {
        strengths.push("Good typing accuracy".to_string());
    } else {
        weaknesses.push("Accuracy needs improvement".to_string());
        suggestions.push("Focus on precision over speed in practice sessions".to_string());
    }

    let common_error_patterns = error_patterns(&session.errors, content);
    if let Some(top) = common_error_patterns.first() {
        weaknesses.push(format!("Frequent errors with: {}", top.pattern));
        suggestions
            .push("Practice words containing these problematic character combinations".to_string());
    }

    let consistency = consistency_rating(common_error_patterns.len());
    let overall =
        ((f64::from(speed) + f64::from(accuracy) + f64::from(consistency)) / 3.0).round() as u8;

    FeedbackReport {
        strengths,
        weaknesses,
        suggestions,
        common_error_patterns,
        rating: PerformanceRating {
            speed,
            accuracy,
            consistency,
            overall,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn result(wpm: u32, accuracy: u32, errors: Vec<ErrorRecord>) -> SessionResult {
        SessionResult {
            id: String::new(),
            passage_id: "p".to_string(),
            wpm,
            accuracy,
            errors,
            started_at: Local::now(),
            ended_at: Some(Local::now()),
            completed: true,
        }
    }

    #[test]
    fn test_speed_boundaries() {
        let good = generate(&result(60, 100, vec![]), "");
        assert!(good.strengths.contains(&"Good typing speed".to_string()));

        let excellent = generate(&result(61, 100, vec![]), "");
        assert!(excellent
            .strengths
            .contains(&"Excellent typing speed".to_string()));

        let slow = generate(&result(40, 100, vec![]), "");
        assert!(slow
            .weaknesses
            .contains(&"Typing speed could be improved".to_string()));
        assert_eq!(
            slow.suggestions[0],
            "Practice regular typing exercises to build muscle memory"
        );

        let good_low = generate(&result(41, 100, vec![]), "");
        assert!(good_low.strengths.contains(&"Good typing speed".to_string()));
    }

    #[test]
    fn test_accuracy_boundaries() {
        let good = generate(&result(50, 95, vec![]), "");
        assert!(good.strengths.contains(&"Good typing accuracy".to_string()));

        let exceptional = generate(&result(50, 96, vec![]), "");
        assert!(exceptional
            .strengths
            .contains(&"Exceptional typing accuracy".to_string()));

        let poor = generate(&result(50, 85, vec![]), "");
        assert!(poor
            .weaknesses
            .contains(&"Accuracy needs improvement".to_string()));
        assert!(poor
            .suggestions
            .contains(&"Focus on precision over speed in practice sessions".to_string()));
    }

    #[test]
    fn test_ratings_clamped() {
        assert_eq!(speed_rating(0), 1);
        assert_eq!(speed_rating(29), 1);
        assert_eq!(speed_rating(45), 3);
        assert_eq!(speed_rating(300), 10);
        assert_eq!(accuracy_rating(5), 1);
        assert_eq!(accuracy_rating(99), 9);
        assert_eq!(accuracy_rating(100), 10);
        assert_eq!(consistency_rating(0), 10);
        assert_eq!(consistency_rating(2), 9);
        assert_eq!(consistency_rating(5), 8);
        assert_eq!(consistency_rating(40), 1);
    }

    #[test]
    fn test_pattern_grouping_scenario() {
        let errors = vec![
            ErrorRecord::new(0, 'a', 'b'),
            ErrorRecord::new(5, 'e', 'r'),
            ErrorRecord::new(9, 'a', 'b'),
        ];
        let report = generate(&result(50, 90, errors), "abcdefghijklmnop");

        let patterns = &report.common_error_patterns;
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern, "a → b");
        assert_eq!(patterns[0].count, 2);
        assert_eq!(patterns[1].pattern, "e → r");
        assert_eq!(patterns[1].count, 1);
        assert_eq!(report.rating.consistency, 9);
        assert!(report
            .weaknesses
            .contains(&"Frequent errors with: a → b".to_string()));
    }

    #[test]
    fn test_overall_rating() {
        // speed 3, accuracy 9, consistency 10 -> 22 / 3 = 7.33
        let report = generate(&result(45, 90, vec![]), "");
        assert_eq!(report.rating.overall, 7);
        // speed 4, accuracy 9, consistency 10 -> 23 / 3 = 7.67
        let report = generate(&result(60, 90, vec![]), "");
        assert_eq!(report.rating.overall, 8);
    }

    #[test]
    fn test_examples_capped_and_patterns_truncated() {
        let content = "the quick brown fox jumps over the lazy dog";
        let mut errors: Vec<ErrorRecord> = (0..5).map(|i| ErrorRecord::new(i, 'x', 'y')).collect();
        for (i, c) in ['a', 'b', 'c', 'd', 'e', 'f'].into_iter().enumerate() {
            errors.push(ErrorRecord::new(10 + i, c, 'z'));
        }

        let patterns = error_patterns(&errors, content);
        assert_eq!(patterns.len(), MAX_PATTERNS);
        assert_eq!(patterns[0].count, 5);
        assert_eq!(patterns[0].examples.len(), MAX_EXAMPLES);
        // ties keep first-seen order
        assert_eq!(patterns[1].pattern, "a → z");
        assert_eq!(patterns[4].pattern, "d → z");
    }

    #[test]
    fn test_context_snippet_bounds() {
        let content: Vec<char> = "abcdefghijklmnopqrstuvwxyz".chars().collect();
        assert_eq!(context_snippet(&content, 0), "abcdefghij");
        assert_eq!(context_snippet(&content, 12), "cdefghijklmnopqrstuv");
        assert_eq!(context_snippet(&content, 25), "pqrstuvwxyz");
        assert_eq!(context_snippet(&content, 40), "");
    }

    #[test]
    fn test_no_errors_no_pattern_weakness() {
        let report = generate(&result(70, 99, vec![]), "abc");
        assert!(report.weaknesses.is_empty());
        assert!(report.suggestions.is_empty());
        assert!(report.common_error_patterns.is_empty());
        assert_eq!(report.rating.consistency, 10);
    }
}
