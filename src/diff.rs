use serde::{Deserialize, Serialize};

/// A single mismatched position between the typed input and the passage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub index: usize,
    pub expected: char,
    pub actual: char,
}

impl ErrorRecord {
    pub fn new(index: usize, expected: char, actual: char) -> Self {
        Self {
            index,
            expected,
            actual,
        }
    }
}

/// Incrementally derive the error list for `new_input`.
///
/// On shrinkage only the records still covered by the input survive and no
/// rescan happens. On growth only the indices from `previous_len` onwards are
/// compared; anything typed past the end of `reference` is never recorded.
pub fn update_errors(
    previous: &[ErrorRecord],
    previous_len: usize,
    new_input: &[char],
    reference: &[char],
) -> Vec<ErrorRecord> {
    if new_input.len() < previous_len {
        return previous
            .iter()
            .filter(|e| e.index < new_input.len())
            .copied()
            .collect();
    }

    let mut errors = previous.to_vec();
    let scan_end = new_input.len().min(reference.len());
    for idx in previous_len..scan_end {
        if new_input[idx] != reference[idx] {
            errors.push(ErrorRecord::new(idx, reference[idx], new_input[idx]));
        }
    }
    errors
}

/// Full comparison of `input` against `reference`, ignoring any overrun
pub fn compare_all(input: &[char], reference: &[char]) -> Vec<ErrorRecord> {
    update_errors(&[], 0, input, reference)
}

/// Holds the error list between keystrokes along with the input length it
/// was computed for.
#[derive(Debug, Clone, Default)]
pub struct ErrorTracker {
    errors: Vec<ErrorRecord>,
    last_len: usize,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, new_input: &[char], reference: &[char]) -> &[ErrorRecord] {
        self.errors = update_errors(&self.errors, self.last_len, new_input, reference);
        self.last_len = new_input.len();
        &self.errors
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records are appended in index order and truncation keeps that order,
    /// so a binary search is enough here.
    pub fn is_error_at(&self, index: usize) -> bool {
        self.errors
            .binary_search_by_key(&index, |e| e.index)
            .is_ok()
    }

    pub fn reset(&mut self) {
        self.errors.clear();
        self.last_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_single_substitution() {
        let errors = compare_all(&chars("cbt"), &chars("cat"));
        assert_eq!(errors, vec![ErrorRecord::new(1, 'a', 'b')]);
    }

    #[test]
    fn test_overrun_is_not_recorded() {
        let errors = compare_all(&chars("hello world!"), &chars("hello world"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_growth_only_scans_new_suffix() {
        let reference = chars("abcdef");
        // a stale record at index 0 must survive because index 0 is not rescanned
        let previous = vec![ErrorRecord::new(0, 'a', 'z')];
        let errors = update_errors(&previous, 2, &chars("abxd"), &reference);
        assert_eq!(
            errors,
            vec![ErrorRecord::new(0, 'a', 'z'), ErrorRecord::new(2, 'c', 'x')]
        );
    }

    #[test]
    fn test_backspace_truncates_without_rescan() {
        let reference = chars("abcdef");
        let previous = vec![ErrorRecord::new(1, 'b', 'x'), ErrorRecord::new(3, 'd', 'y')];
        let errors = update_errors(&previous, 5, &chars("axc"), &reference);
        assert_eq!(errors, vec![ErrorRecord::new(1, 'b', 'x')]);
    }

    #[test]
    fn test_tracker_retype_after_backspace() {
        let reference = chars("cat");
        let mut tracker = ErrorTracker::new();

        tracker.update(&chars("c"), &reference);
        tracker.update(&chars("cb"), &reference);
        assert_eq!(tracker.len(), 1);

        tracker.update(&chars("c"), &reference);
        assert!(tracker.is_empty());

        tracker.update(&chars("ca"), &reference);
        assert!(tracker.is_empty());

        tracker.update(&chars("cat"), &reference);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_tracker_regenerates_different_retype() {
        let reference = chars("cat");
        let mut tracker = ErrorTracker::new();

        tracker.update(&chars("cx"), &reference);
        tracker.update(&chars("c"), &reference);
        tracker.update(&chars("cy"), &reference);

        assert_eq!(tracker.errors(), &[ErrorRecord::new(1, 'a', 'y')]);
    }

    #[test]
    fn test_paste_checks_every_new_index() {
        let reference = chars("the quick fox");
        let mut tracker = ErrorTracker::new();
        tracker.update(&chars("th"), &reference);
        tracker.update(&chars("thx quack"), &reference);

        let indices: Vec<usize> = tracker.errors().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![2, 6]);
    }

    #[test]
    fn test_is_error_at() {
        let reference = chars("abcd");
        let mut tracker = ErrorTracker::new();
        tracker.update(&chars("xbyd"), &reference);

        assert!(tracker.is_error_at(0));
        assert!(!tracker.is_error_at(1));
        assert!(tracker.is_error_at(2));
        assert!(!tracker.is_error_at(3));
    }

    #[test]
    fn test_reset() {
        let reference = chars("ab");
        let mut tracker = ErrorTracker::new();
        tracker.update(&chars("xx"), &reference);
        tracker.reset();

        assert!(tracker.is_empty());
        tracker.update(&chars("x"), &reference);
        assert_eq!(tracker.len(), 1);
    }
}
