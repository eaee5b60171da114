use ratatui::Frame;

use crate::{ui::history::render_history, App, AppState};

/// A UI Screen boundary
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing and results both draw through the `App` widget
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_history(app, f);
    }
}

pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing | AppState::Results => Box::new(SessionScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}
