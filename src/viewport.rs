use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

use crate::diff::ErrorTracker;

/// Column budget used when the terminal gives us room for it
pub const DEFAULT_LINE_COLUMNS: usize = 100;

/// Number of wrapped lines rendered at once
pub const WINDOW_LINES: usize = 3;

/// Greedily pack space separated words into lines of at most `max_columns`.
///
/// Words are split on single spaces so that joining the lines back with one
/// space reproduces `text` exactly; every line boundary stands for exactly
/// one consumed space. A word wider than the budget gets a line of its own.
pub fn wrap_lines(text: &str, max_columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for word in text.split(' ') {
        current = Some(match current.take() {
            None => word.to_string(),
            Some(line) if line.width() + 1 + word.width() > max_columns => {
                lines.push(line);
                word.to_string()
            }
            Some(mut line) => {
                line.push(' ');
                line.push_str(word);
                line
            }
        });
    }

    if let Some(line) = current {
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

fn line_len(line: &str) -> usize {
    line.chars().count()
}

/// Indices of the wrapped lines currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub lines: [usize; WINDOW_LINES],
}

impl VisibleWindow {
    fn starting_at(first: usize, line_count: usize) -> Self {
        let last = line_count.saturating_sub(1);
        let first = first.min(last);
        Self {
            lines: [first, (first + 1).min(last), (first + 2).min(last)],
        }
    }

    pub fn first(&self) -> usize {
        self.lines[0]
    }

    /// The window's lines without the clamped duplicates
    pub fn distinct(&self) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::with_capacity(WINDOW_LINES);
        for &idx in &self.lines {
            if out.last() != Some(&idx) {
                out.push(idx);
            }
        }
        out
    }
}

pub fn initial_window(lines: &[String]) -> Rc<VisibleWindow> {
    Rc::new(VisibleWindow::starting_at(0, lines.len()))
}

/// Line holding `cursor`: the first line whose cumulative length (each line
/// plus its separator) reaches the cursor. Past the end it is the last line.
pub fn line_of(cursor: usize, lines: &[String]) -> usize {
    let mut total = 0;
    for (idx, line) in lines.iter().enumerate() {
        total += line_len(line) + 1;
        if cursor <= total {
            return idx;
        }
    }
    lines.len().saturating_sub(1)
}

/// Recompute the window for `cursor`, handing back `previous` itself when
/// the triple has not moved.
pub fn visible_window(
    cursor: usize,
    lines: &[String],
    previous: &Rc<VisibleWindow>,
) -> Rc<VisibleWindow> {
    let next = VisibleWindow::starting_at(line_of(cursor, lines), lines.len());
    if next == **previous {
        Rc::clone(previous)
    } else {
        Rc::new(next)
    }
}

/// Absolute char index of the first character shown in `window`
pub fn window_start(lines: &[String], window: &VisibleWindow) -> usize {
    lines
        .iter()
        .take(window.first())
        .map(|l| line_len(l) + 1)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Untyped,
    Correct,
    Incorrect,
    Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedChar {
    pub index: usize,
    pub ch: char,
    pub state: CharState,
}

/// Wrapped passage plus the window tracking the cursor
#[derive(Debug, Clone)]
pub struct Viewport {
    lines: Vec<String>,
    window: Rc<VisibleWindow>,
}

impl Viewport {
    pub fn new(text: &str, max_columns: usize) -> Self {
        let lines = wrap_lines(text, max_columns);
        let window = initial_window(&lines);
        Self { lines, window }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn window(&self) -> &Rc<VisibleWindow> {
        &self.window
    }

    /// Returns true when the window actually moved
    pub fn follow(&mut self, cursor: usize) -> bool {
        let next = visible_window(cursor, &self.lines, &self.window);
        if Rc::ptr_eq(&next, &self.window) {
            return false;
        }
        self.window = next;
        true
    }

    pub fn reset(&mut self) {
        self.window = initial_window(&self.lines);
    }

    /// Display state for every character of the visible lines, in order.
    /// Each inner vector is one rendered line, trailing separator included
    /// for all but the passage's last line.
    pub fn project(&self, input_len: usize, errors: &ErrorTracker) -> Vec<Vec<ProjectedChar>> {
        let mut offsets = Vec::with_capacity(self.lines.len());
        let mut acc = 0;
        for line in &self.lines {
            offsets.push(acc);
            acc += line_len(line) + 1;
        }

        self.window
            .distinct()
            .into_iter()
            .filter_map(|idx| self.lines.get(idx).map(|l| (idx, offsets[idx], l)))
            .map(|(idx, start, line)| {
                // the separator consumed by wrapping is typed too
                let separator = (idx + 1 < self.lines.len()).then_some(' ');
                line.chars()
                    .chain(separator)
                    .enumerate()
                    .map(|(rel, ch)| {
                        let index = start + rel;
                        ProjectedChar {
                            index,
                            ch,
                            state: char_state(index, input_len, errors),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

pub fn char_state(index: usize, input_len: usize, errors: &ErrorTracker) -> CharState {
    if index < input_len {
        if errors.is_error_at(index) {
            CharState::Incorrect
        } else {
            CharState::Correct
        }
    } else if index == input_len {
        CharState::Cursor
    } else {
        CharState::Untyped
    }
}
