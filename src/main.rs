use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, KeyCode,
        KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, SystemTime},
};
use webbrowser::Browser;

use plink::app::{App, AppState, SortBy};
use plink::config::{ConfigStore, FileConfigStore};
use plink::difficulty::Difficulty;
use plink::runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker};
use plink::session::{Mode, Phase, SessionConfig, SessionEvent};
use plink::stats::StatsDb;
use plink::trainer::Trainer;
use plink::ui;

const TICK_RATE_MS: u64 = 50;

/// terminal aim trainer with reaction analytics and local leaderboards
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal aim trainer: click targets on a canvas playfield before they fade. Tracks per-target reaction times, keeps a local top ten, and tunes spawn rate, target size and scoring per difficulty."
)]
pub struct Cli {
    /// difficulty level
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// session mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// countdown length in seconds for timed mode
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// pin target placement for reproducible runs
    #[clap(long)]
    seed: Option<u64>,

    /// dump the per-target stats database to CSV and exit
    #[clap(long, value_name = "PATH")]
    export_stats: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.export_stats {
        let db = StatsDb::new()?;
        db.export_csv(&path)?;
        println!("exported stats to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // persisted launch defaults, overridden by whatever was passed this run
    let store = FileConfigStore::new();
    let mut cfg = store.load();
    if let Some(difficulty) = cli.difficulty {
        cfg.difficulty = difficulty;
    }
    if let Some(mode) = cli.mode {
        cfg.mode = mode;
    }
    if let Some(seconds) = cli.seconds {
        cfg.seconds = seconds.max(1);
    }
    let _ = store.save(&cfg);

    let config = SessionConfig {
        difficulty: cfg.difficulty,
        mode: cfg.mode,
        seconds: cfg.seconds,
        ..SessionConfig::default()
    };
    let mut trainer = Trainer::new(config);
    if let Some(seed) = cli.seed {
        trainer = trainer.with_seed(seed);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(trainer);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let screen = ui::screen::current_screen(&app.state);
        terminal.draw(|f| screen.render(app, f))?;

        let size = terminal.size()?;
        let screen_area = Rect::new(0, 0, size.width, size.height);

        match runner.step() {
            AppEvent::Tick => {
                app.trainer.advance(SystemTime::now());
                app.celebration.update();
            }
            AppEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse, screen_area),
            AppEvent::Focus(visible) => app.trainer.set_visible(visible, SystemTime::now()),
            AppEvent::Resize => {}
        }

        process_engine_events(app, screen_area);
    }

    Ok(())
}

/// Route engine lifecycle events to screen switches and effects
fn process_engine_events(app: &mut App, screen_area: Rect) {
    for event in app.trainer.drain_events() {
        if let SessionEvent::Ended { .. } = event {
            app.state = AppState::Results;
            if app.trainer.last_rank() == Some(0) {
                app.celebration.start(screen_area.width, screen_area.height);
            }
        }
    }
}

/// Returns true when the app should quit
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return true;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    let now = SystemTime::now();
    match app.state {
        AppState::Aim => match key.code {
            KeyCode::Char('s') | KeyCode::Enter => app.trainer.start(now),
            KeyCode::Char(' ') => match app.trainer.session.phase {
                Phase::Running => app.trainer.pause(now),
                Phase::Paused => app.trainer.resume(now),
                _ => {}
            },
            KeyCode::Char('r') => app.reset_session(),
            KeyCode::Char('l') => app.state = AppState::Leaderboard,
            KeyCode::Char('a') => app.state = AppState::ReactionStats,
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Char('r') => app.reset_session(),
            KeyCode::Char('l') => app.state = AppState::Leaderboard,
            KeyCode::Char('a') => app.state = AppState::ReactionStats,
            KeyCode::Char('t') => {
                let session = &app.trainer.session;
                if Browser::is_available() {
                    webbrowser::open(&format!(
                        "https://twitter.com/intent/tweet?text={}%20pts%20%2F%20{:.0}%25%20acc%20on%20{}%20{}%20%E2%80%94%20plink",
                        session.final_score.unwrap_or(session.score),
                        session.accuracy,
                        app.trainer.config.difficulty,
                        app.trainer.config.mode,
                    ))
                    .unwrap_or_default();
                }
            }
            _ => {}
        },
        AppState::Leaderboard => {
            if matches!(key.code, KeyCode::Char('b') | KeyCode::Backspace) {
                app.state = back_target(app);
            }
        }
        AppState::ReactionStats => match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => app.state = back_target(app),
            KeyCode::Up => {
                app.stats_view.scroll_offset = app.stats_view.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                // clamped to the table length in the render function
                app.stats_view.scroll_offset += 1;
            }
            KeyCode::Home => app.stats_view.scroll_offset = 0,
            KeyCode::Char('1') => set_sort(app, SortBy::Difficulty),
            KeyCode::Char('2') => set_sort(app, SortBy::AvgReaction),
            KeyCode::Char('3') => set_sort(app, SortBy::HitRate),
            KeyCode::Char('4') => set_sort(app, SortBy::Attempts),
            KeyCode::Char(' ') => {
                app.stats_view.sort_ascending = !app.stats_view.sort_ascending;
                app.stats_view.scroll_offset = 0;
            }
            _ => {}
        },
    }
    false
}

fn set_sort(app: &mut App, sort_by: SortBy) {
    app.stats_view.sort_by = sort_by;
    app.stats_view.scroll_offset = 0;
}

fn back_target(app: &App) -> AppState {
    if app.trainer.session.phase == Phase::Ended {
        AppState::Results
    } else {
        AppState::Aim
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, screen_area: Rect) {
    if app.state != AppState::Aim {
        return;
    }
    let inner = ui::playfield_inner(screen_area);
    let field_w = app.trainer.config.width;
    let field_h = app.trainer.config.height;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some((x, y)) = ui::cell_to_field(mouse.column, mouse.row, inner, field_w, field_h)
            {
                app.trainer.resolve_click(x, y, SystemTime::now());
            }
        }
        MouseEventKind::Moved => {
            app.hovered = ui::cell_to_field(mouse.column, mouse.row, inner, field_w, field_h)
                .and_then(|(x, y)| app.trainer.resolve_hover(x, y));
        }
        _ => {}
    }
}
