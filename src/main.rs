pub mod ui;

use essaytype::{
    app_dirs::AppDirs,
    catalog::{Catalog, Difficulty, Domain, Passage, PassageFilter, PassageFormat},
    error::{CatalogError, CatalogResult, StoreResult},
    export,
    feedback::{self, FeedbackReport},
    metrics::{should_repaint, LiveMetrics},
    practice::Practice,
    runtime::{CrosstermEventSource, FixedTicker, Runner, Ticker, TypingEvent, TypingEventSource},
    session::{SessionResult, TypingSession},
    stats::TypingStats,
    store::{
        BlobSessionStore, BlobSettingsStore, FileBlobStore, SessionStore, Settings,
        SettingsPatch, SettingsStore,
    },
    viewport::DEFAULT_LINE_COLUMNS,
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::{mpsc::Sender, Mutex},
    time::Duration,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

pub type SessionRepo = BlobSessionStore<FileBlobStore>;

/// essay passage typing practice with live wpm, accuracy and feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type full essay passages in the terminal. Live WPM and accuracy while you type, then ratings, error patterns and suggestions once the passage is done."
)]
pub struct Cli {
    /// id of the passage to practise, random when omitted
    #[clap(short = 'p', long)]
    passage: Option<String>,

    /// passage format to pick from; remembered as the preferred format
    #[clap(short = 'f', long, value_enum)]
    format: Option<PassageFormat>,

    /// only pick passages of this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// only pick passages from this subject area
    #[clap(long, value_enum)]
    domain: Option<Domain>,

    /// number of seconds to run the session
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    secs: Option<u64>,

    /// column budget used to wrap the passage into lines
    #[clap(short = 'w', long, default_value_t = DEFAULT_LINE_COLUMNS as u16, value_parser = clap::value_parser!(u16).range(20..))]
    width: u16,

    /// list the available passages and exit
    #[clap(long)]
    list: bool,

    /// print statistics over all recorded sessions and exit
    #[clap(long)]
    stats: bool,

    /// write the session history as CSV to PATH ("-" for stdout) and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// delete all recorded sessions and exit
    #[clap(long)]
    clear_history: bool,

    /// restore default settings and exit
    #[clap(long)]
    reset_settings: bool,
}

impl Cli {
    /// True when the invocation only runs maintenance commands
    fn is_one_shot(&self) -> bool {
        self.list || self.stats || self.export.is_some() || self.clear_history || self.reset_settings
    }

    fn new_session(&self, passage: &Passage) -> TypingSession {
        TypingSession::new(
            passage.id.clone(),
            &passage.content,
            self.secs,
            usize::from(self.width),
        )
    }

    /// The pinned passage first, afterwards a random one that differs from `current`
    fn choose_passage(
        &self,
        catalog: &Catalog,
        settings: &Settings,
        current: Option<&str>,
    ) -> CatalogResult<Passage> {
        if current.is_none() {
            if let Some(id) = &self.passage {
                return catalog.get(id).cloned();
            }
        }
        let filter = PassageFilter {
            difficulty: self.difficulty,
            domain: self.domain,
            format: Some(self.format.unwrap_or(settings.preferred_format)),
            exclude_id: current.map(str::to_string),
            ..Default::default()
        };
        catalog.pick_where(&filter).cloned().ok_or(CatalogError::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
    History,
}

pub struct App {
    pub cli: Cli,
    pub catalog: Catalog,
    pub passage: Passage,
    pub practice: Practice<SessionRepo>,
    pub settings: Settings,
    pub state: AppState,
    /// Metrics as last painted; refreshed on repaint boundaries and ticks
    pub displayed: LiveMetrics,
    pub report: Option<FeedbackReport>,
    pub history: Vec<SessionResult>,
    pub stats: TypingStats,
    /// Shown on the results screen, e.g. when saving failed
    pub notice: Option<String>,
}

impl App {
    pub fn new(
        cli: Cli,
        catalog: Catalog,
        settings: Settings,
        sessions: SessionRepo,
        ticks: Option<Sender<TypingEvent>>,
    ) -> CatalogResult<Self> {
        let passage = cli.choose_passage(&catalog, &settings, None)?;
        let practice = Practice::new(cli.new_session(&passage), sessions, ticks);
        info!(passage = %passage.id, title = %passage.title, "passage selected");

        Ok(Self {
            cli,
            catalog,
            passage,
            practice,
            settings,
            state: AppState::Typing,
            displayed: LiveMetrics::default(),
            report: None,
            history: Vec::new(),
            stats: TypingStats::default(),
            notice: None,
        })
    }

    pub fn reset(&mut self, new_passage: bool) -> CatalogResult<()> {
        if new_passage {
            self.passage =
                self.cli
                    .choose_passage(&self.catalog, &self.settings, Some(&self.passage.id))?;
            info!(passage = %self.passage.id, title = %self.passage.title, "passage selected");
            self.practice.replace(self.cli.new_session(&self.passage));
        } else {
            self.practice.retry();
        }
        self.state = AppState::Typing;
        self.displayed = LiveMetrics::default();
        self.report = None;
        self.notice = None;
        Ok(())
    }

    pub fn refresh_display(&mut self, force: bool) {
        let session = self.practice.session();
        if force || should_repaint(session.cursor_pos(), session.reference().len()) {
            self.displayed = session.live();
        }
    }

    /// Move to the results screen once the session has ended
    pub fn settle(&mut self, outcome: StoreResult<Option<SessionResult>>) {
        match outcome {
            Ok(Some(result)) => self.show_results(&result),
            Ok(None) => {
                if self.practice.session().is_completed() && self.state == AppState::Typing {
                    self.state = AppState::Results;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to save session");
                self.notice = Some(format!("Session not saved: {e}"));
                if let Some(result) = self.practice.session().result().cloned() {
                    self.show_results(&result);
                }
            }
        }
    }

    fn show_results(&mut self, result: &SessionResult) {
        self.displayed = self.practice.session().live();
        self.report = Some(feedback::generate(result, &self.passage.content));
        self.state = AppState::Results;
    }

    pub fn show_history(&mut self) {
        let store = self.practice.store();
        self.history = store.list_by_passage(&self.passage.id);
        self.stats = TypingStats::from_sessions(&store.list_all());
        self.state = AppState::History;
    }

    pub fn leave_history(&mut self) {
        self.state = if self.practice.session().is_completed() {
            AppState::Results
        } else {
            AppState::Typing
        };
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let catalog = Catalog::builtin()?;
    let state_dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = AppDirs::config_dir().unwrap_or_else(|| state_dir.clone());
    let mut sessions = BlobSessionStore::new(FileBlobStore::with_dir(&state_dir));
    let mut settings_store = BlobSettingsStore::new(FileBlobStore::with_dir(&config_dir));

    if cli.is_one_shot() {
        return run_one_shot(&cli, &catalog, &mut sessions, &mut settings_store);
    }

    let settings = match cli.format {
        Some(format) => settings_store.set(SettingsPatch {
            preferred_format: Some(format),
            ..Default::default()
        })?,
        None => settings_store.get(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let events = CrosstermEventSource::new();
    let ticks = events.sender();
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = match App::new(cli, catalog, settings, sessions, Some(ticks)) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    outcome
}

/// Log to a file in the state directory; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("essaytype=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn run_one_shot<S: SessionStore, C: SettingsStore>(
    cli: &Cli,
    catalog: &Catalog,
    sessions: &mut S,
    settings: &mut C,
) -> Result<(), Box<dyn Error>> {
    if cli.reset_settings {
        settings.reset()?;
        println!("Settings restored to defaults");
    }
    if cli.clear_history {
        sessions.clear()?;
        println!("Session history cleared");
    }
    if cli.list {
        print_catalog(catalog);
    }
    if cli.stats {
        print_stats(&TypingStats::from_sessions(&sessions.list_all()));
    }
    if let Some(path) = &cli.export {
        export_history(&sessions.list_all(), path)?;
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!(
        "{:>4}  {:<16}  {:<12}  {:<11}  {:>5}  title",
        "id", "format", "difficulty", "domain", "words"
    );
    for p in catalog.all() {
        println!(
            "{:>4}  {:<16}  {:<12}  {:<11}  {:>5}  {}",
            p.id,
            p.format.to_string(),
            p.difficulty.to_string(),
            p.domain.to_string(),
            p.word_count,
            p.title
        );
    }
}

fn print_stats(stats: &TypingStats) {
    println!("sessions completed   {}", stats.sessions_completed);
    println!("average wpm          {}", stats.average_wpm);
    println!("best wpm             {}", stats.best_wpm);
    println!("wpm std dev          {:.2}", stats.wpm_std_dev);
    println!("average accuracy     {}%", stats.average_accuracy);
    println!("practice time        {} min", stats.total_practice_minutes);
    if !stats.common_errors.is_empty() {
        println!("common errors");
        for (label, count) in &stats.common_errors {
            println!("  {label}  x{count}");
        }
    }
}

fn export_history(sessions: &[SessionResult], path: &Path) -> Result<(), Box<dyn Error>> {
    if path == Path::new("-") {
        export::write_csv(sessions, io::stdout().lock())?;
    } else {
        export::write_csv(sessions, File::create(path)?)?;
        eprintln!("Exported {} sessions to {}", sessions.len(), path.display());
    }
    Ok(())
}

#[derive(Debug)]
enum ExitType {
    Restart,
    New,
    Quit,
}

fn start_tui<B: Backend, E: TypingEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let mut exit_type: ExitType = ExitType::Quit;
        terminal.draw(|f| ui(app, f))?;

        loop {
            match runner.step() {
                TypingEvent::Tick => {
                    // redraw while typing so the timer and metrics stay current
                    if app.state == AppState::Typing && app.practice.session().has_started() {
                        let outcome = app.practice.on_tick(Local::now());
                        app.settle(outcome);
                        app.refresh_display(true);
                        terminal.draw(|f| ui(app, f))?;
                    }
                }
                TypingEvent::Resize => {
                    terminal.draw(|f| ui(app, f))?;
                }
                TypingEvent::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Left => {
                            exit_type = ExitType::Restart;
                            break;
                        }
                        KeyCode::Right => {
                            exit_type = ExitType::New;
                            break;
                        }
                        KeyCode::Backspace => match app.state {
                            AppState::Typing => {
                                app.practice.backspace(Local::now());
                                app.refresh_display(false);
                            }
                            AppState::History => app.leave_history(),
                            AppState::Results => {}
                        },
                        KeyCode::Char(c) => {
                            // ctrl+c to quit
                            if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                                break;
                            }

                            match app.state {
                                AppState::Typing => {
                                    let outcome = app.practice.type_char(c, Local::now());
                                    app.settle(outcome);
                                    app.refresh_display(false);
                                }
                                AppState::Results | AppState::History => match c {
                                    'r' => {
                                        exit_type = ExitType::Restart;
                                        break;
                                    }
                                    'n' => {
                                        exit_type = ExitType::New;
                                        break;
                                    }
                                    'h' if app.state == AppState::Results => app.show_history(),
                                    'h' | 'b' => app.leave_history(),
                                    _ => {}
                                },
                            }
                        }
                        _ => {}
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::Restart => app.reset(false)?,
            ExitType::New => app.reset(true)?,
            ExitType::Quit => break,
        }
    }

    app.practice.teardown();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}
