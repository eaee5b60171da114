pub mod charting;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use essaytype::{
    feedback::FeedbackReport,
    session::TypingSession,
    viewport::{CharState, ProjectedChar, WINDOW_LINES},
};

use crate::{
    ui::charting::{chart_data, compute_chart_params, format_label},
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Palette {
    correct: Style,
    incorrect: Style,
    untyped: Style,
    cursor: Style,
}

impl Palette {
    fn new(highlight_errors: bool) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let untyped = bold.add_modifier(Modifier::DIM);
        let correct = bold.fg(Color::Green);
        Self {
            correct,
            incorrect: if highlight_errors {
                bold.fg(Color::Red).add_modifier(Modifier::UNDERLINED)
            } else {
                correct
            },
            untyped,
            cursor: untyped.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED),
        }
    }

    fn span(&self, pc: &ProjectedChar) -> Span<'static> {
        match pc.state {
            // a missed space would be invisible otherwise
            CharState::Incorrect if pc.ch == ' ' => Span::styled("·", self.incorrect),
            CharState::Incorrect => Span::styled(pc.ch.to_string(), self.incorrect),
            CharState::Correct => Span::styled(pc.ch.to_string(), self.correct),
            CharState::Cursor => Span::styled(pc.ch.to_string(), self.cursor),
            CharState::Untyped => Span::styled(pc.ch.to_string(), self.untyped),
        }
    }
}

/// The visible window of the passage, one `Line` per wrapped line
pub fn passage_lines(session: &TypingSession, highlight_errors: bool) -> Vec<Line<'static>> {
    let palette = Palette::new(highlight_errors);
    session
        .viewport()
        .project(session.cursor_pos(), session.errors())
        .iter()
        .map(|line| Line::from(line.iter().map(|pc| palette.span(pc)).collect::<Vec<_>>()))
        .collect()
}

/// Status line above the passage; hidden metrics are left out entirely
pub fn metrics_line(app: &App) -> String {
    let session = app.practice.session();
    let mut parts = Vec::new();
    if app.settings.show_wpm {
        parts.push(format!("{} wpm", app.displayed.wpm));
    }
    if app.settings.show_accuracy {
        parts.push(format!("{}% acc", app.displayed.accuracy));
    }
    if let Some(secs) = session.seconds_remaining() {
        parts.push(format!("{secs}s left"));
    }
    parts.push(format!("{:.0}% done", session.progress() * 100.0));
    parts.join("   ")
}

fn feedback_block<'a>(title: &'a str, items: &[String], style: Style) -> Paragraph<'a> {
    let lines: Vec<Line> = if items.is_empty() {
        vec![Line::from(Span::styled("-", style.add_modifier(Modifier::DIM)))]
    } else {
        items
            .iter()
            .map(|item| Line::from(Span::styled(format!("• {item}"), style)))
            .collect()
    };
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true })
}

fn pattern_lines(report: &FeedbackReport) -> Vec<String> {
    report
        .common_error_patterns
        .iter()
        .map(|p| match p.examples.first() {
            Some(example) => format!("{} ×{}  \"{}\"", p.pattern, p.count, example),
            None => format!("{} ×{}", p.pattern, p.count),
        })
        .collect()
}

impl App {
    fn render_typing(&self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let session = self.practice.session();

        let content_height = WINDOW_LINES as u16 + 4;
        let padding = area.height.saturating_sub(content_height + 1) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(padding),
                    Constraint::Length(1), // title
                    Constraint::Length(1), // metrics
                    Constraint::Length(1),
                    Constraint::Length(WINDOW_LINES as u16),
                    Constraint::Min(0),
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let title = Paragraph::new(Span::styled(
            format!("{}  ·  {}", self.passage.title, self.passage.format),
            italic_style.add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center);
        title.render(chunks[1], buf);

        let metrics = Paragraph::new(Span::styled(metrics_line(self), bold_style))
            .alignment(Alignment::Center);
        metrics.render(chunks[2], buf);

        let passage = Paragraph::new(passage_lines(session, self.settings.highlight_errors))
            .wrap(Wrap { trim: false });
        passage.render(chunks[4], buf);

        let legend = Paragraph::new(Span::styled(
            if session.has_started() {
                "(←) retry / (→) new passage / (esc)ape"
            } else {
                "start typing to begin / (→) new passage / (esc)ape"
            },
            italic_style,
        ));
        legend.render(chunks[6], buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);
        let session = self.practice.session();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Min(6),    // chart
                    Constraint::Length(1), // stats
                    Constraint::Length(1), // ratings
                    Constraint::Length(1), // notice
                    Constraint::Min(7),    // feedback
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let (overall_duration, highest_wpm) =
            compute_chart_params(session.wpm_samples(), session.time_limit_secs());
        let data = chart_data(session.wpm_samples());
        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(magenta_style)
            .graph_type(GraphType::Line)
            .data(&data)];

        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([0.0, overall_duration])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(format_label(overall_duration), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("wpm")
                    .bounds([0.0, highest_wpm.max(1.0)])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(format_label(highest_wpm), bold_style),
                    ]),
            );
        chart.render(chunks[0], buf);

        let stats_text = match session.result() {
            Some(result) => format!(
                "{} wpm   {}% acc   {} errors   {}s",
                result.wpm,
                result.accuracy,
                result.errors.len(),
                result.elapsed().map_or(0, |d| d.as_secs())
            ),
            None => "time ran out before anything was typed".to_string(),
        };
        Paragraph::new(Span::styled(stats_text, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        if let Some(report) = &self.report {
            let r = report.rating;
            Paragraph::new(Span::styled(
                format!(
                    "speed {}/10   accuracy {}/10   consistency {}/10   overall {}/10",
                    r.speed, r.accuracy, r.consistency, r.overall
                ),
                Style::default().fg(Color::Cyan),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(
                    [
                        Constraint::Ratio(1, 4),
                        Constraint::Ratio(1, 4),
                        Constraint::Ratio(1, 4),
                        Constraint::Ratio(1, 4),
                    ]
                    .as_ref(),
                )
                .split(chunks[4]);

            feedback_block("Strengths", &report.strengths, Style::default().fg(Color::Green))
                .render(columns[0], buf);
            feedback_block("Weaknesses", &report.weaknesses, Style::default().fg(Color::Red))
                .render(columns[1], buf);
            feedback_block("Suggestions", &report.suggestions, Style::default())
                .render(columns[2], buf);
            feedback_block(
                "Error patterns",
                &pattern_lines(report),
                Style::default().fg(Color::Yellow),
            )
            .render(columns[3], buf);
        }

        if let Some(notice) = &self.notice {
            Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red)))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        Paragraph::new(Span::styled(
            "(r)etry / (n)ew / (h)istory / (esc)ape",
            italic_style,
        ))
        .render(chunks[5], buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.practice.session().is_completed() {
            self.render_results(area, buf);
        } else {
            self.render_typing(area, buf);
        }
    }
}
