use std::io::Write;

use serde::Serialize;

use crate::error::StoreResult;
use crate::feedback::pattern_label;
use crate::session::SessionResult;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    passage_id: &'a str,
    started_at: String,
    ended_at: String,
    wpm: u32,
    accuracy: u32,
    /// Error labels joined with `;`
    errors: String,
}

impl<'a> From<&'a SessionResult> for CsvRow<'a> {
    fn from(s: &'a SessionResult) -> Self {
        Self {
            id: &s.id,
            passage_id: &s.passage_id,
            started_at: s.started_at.to_rfc3339(),
            ended_at: s.ended_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            wpm: s.wpm,
            accuracy: s.accuracy,
            errors: s
                .errors
                .iter()
                .map(|e| format!("{}@{}", pattern_label(e.expected, e.actual), e.index))
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Write the session history as CSV, header first
pub fn write_csv<W: Write>(sessions: &[SessionResult], writer: W) -> StoreResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if sessions.is_empty() {
        wtr.write_record([
            "id",
            "passage_id",
            "started_at",
            "ended_at",
            "wpm",
            "accuracy",
            "errors",
        ])?;
    }
    for s in sessions {
        wtr.serialize(CsvRow::from(s))?;
    }
    wtr.flush()?;
    Ok(())
}
