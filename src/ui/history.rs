use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use essaytype::{session::SessionResult, stats::TypingStats};

use crate::App;

pub fn wpm_color(wpm: u32) -> Color {
    if wpm >= 60 {
        Color::Green
    } else if wpm >= 35 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn accuracy_color(accuracy: u32) -> Color {
    if accuracy >= 95 {
        Color::Green
    } else if accuracy >= 85 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn duration_label(session: &SessionResult) -> String {
    session
        .elapsed()
        .map(|d| format!("{}s", d.as_secs()))
        .unwrap_or_else(|| "-".to_string())
}

/// Pure presenter for one past session
pub fn present_row(session: &SessionResult) -> Row<'static> {
    Row::new(vec![
        Cell::from(session.started_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(session.wpm.to_string()).style(
            Style::default()
                .fg(wpm_color(session.wpm))
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from(format!("{}%", session.accuracy))
            .style(Style::default().fg(accuracy_color(session.accuracy))),
        Cell::from(session.errors.len().to_string()),
        Cell::from(duration_label(session)),
    ])
}

fn summary_lines(stats: &TypingStats) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", stats.sessions_completed), bold),
            Span::raw("sessions   "),
            Span::styled(format!("{} ", stats.average_wpm), bold),
            Span::raw("avg wpm   "),
            Span::styled(format!("{} ", stats.best_wpm), bold),
            Span::raw("best   "),
            Span::styled(format!("{:.1} ", stats.wpm_std_dev), bold),
            Span::raw("sd   "),
            Span::styled(format!("{}% ", stats.average_accuracy), bold),
            Span::raw("avg acc   "),
            Span::styled(format!("{} ", stats.total_practice_minutes), bold),
            Span::raw("min practised"),
        ]),
    ];

    if !stats.common_errors.is_empty() {
        let errors = stats
            .common_errors
            .iter()
            .map(|(label, count)| format!("{label} ×{count}"))
            .collect::<Vec<_>>()
            .join("   ");
        lines.push(Line::from(vec![
            Span::styled("common errors: ", Style::default().fg(Color::Yellow)),
            Span::raw(errors),
        ]));
    }

    if !stats.missed_chars.is_empty() {
        let missed = stats
            .missed_chars
            .iter()
            .take(10)
            .map(|(c, n)| match c {
                ' ' => format!("SPACE {n}"),
                c => format!("{c} {n}"),
            })
            .collect::<Vec<_>>()
            .join("   ");
        lines.push(Line::from(vec![
            Span::styled("most missed: ", Style::default().fg(Color::Yellow)),
            Span::raw(missed),
        ]));
    }

    lines
}

/// Render the History screen: all-time aggregates plus this passage's sessions
pub fn render_history(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(5), // Aggregates
            Constraint::Min(0),    // Sessions table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(app.passage.title.clone())
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let summary = Paragraph::new(summary_lines(&app.stats))
        .block(Block::default().borders(Borders::ALL).title("All passages"))
        .wrap(Wrap { trim: true });
    f.render_widget(summary, chunks[1]);

    if app.history.is_empty() {
        let no_data = Paragraph::new("No sessions recorded for this passage yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[2]);
    } else {
        let table_height = chunks[2].height.saturating_sub(3) as usize; // borders + header
        let rows: Vec<Row> = app
            .history
            .iter()
            .rev()
            .take(table_height)
            .map(present_row)
            .collect();

        let header = Row::new(vec!["Started", "WPM", "Accuracy", "Errors", "Time"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let widths = [
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("This passage ({} sessions)", app.history.len())),
            )
            .column_spacing(2);
        f.render_widget(table, chunks[2]);
    }

    let instructions = Paragraph::new("(b/backspace) back  (r)etry  (n)ew  (esc)ape")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::ITALIC));
    f.render_widget(instructions, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_app;
    use chrono::Local;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_colors() {
        assert_eq!(wpm_color(80), Color::Green);
        assert_eq!(wpm_color(40), Color::Yellow);
        assert_eq!(wpm_color(10), Color::Red);
        assert_eq!(accuracy_color(99), Color::Green);
        assert_eq!(accuracy_color(90), Color::Yellow);
        assert_eq!(accuracy_color(50), Color::Red);
    }

    #[test]
    fn test_duration_label() {
        let started_at = Local::now();
        let mut session = SessionResult {
            id: "s1".to_string(),
            passage_id: "1".to_string(),
            wpm: 40,
            accuracy: 90,
            errors: vec![],
            started_at,
            ended_at: Some(started_at + chrono::Duration::seconds(42)),
            completed: true,
        };
        assert_eq!(duration_label(&session), "42s");

        session.ended_at = None;
        assert_eq!(duration_label(&session), "-");
    }

    #[test]
    fn test_render_history_lists_sessions() {
        let (mut app, _dir) = test_app(&["-p", "1"]);
        for c in "the cxt sat".chars() {
            let outcome = app.practice.type_char(c, Local::now());
            app.settle(outcome);
        }
        app.show_history();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render_history(&app, f)).unwrap();

        let rendered = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(rendered.contains("This passage (1 sessions)"));
        assert!(rendered.contains("a → x"));
        assert!(rendered.contains("91%"));
    }

    #[test]
    fn test_render_history_empty() {
        let (mut app, _dir) = test_app(&["-p", "2"]);
        app.show_history();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render_history(&app, f)).unwrap();

        let rendered = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(rendered.contains("No sessions recorded"));
    }
}
