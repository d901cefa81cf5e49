use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::leaderboard::render_leaderboard;
use crate::ui::reaction_stats::render_reaction_stats;

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Playfield screen - renders via the App widget
pub struct AimScreen;

impl Screen for AimScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Results screen - renders via the App widget
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Local top-ten screen - uses dedicated renderer
pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_leaderboard(app, f);
    }
}

/// Reaction analytics screen - uses dedicated renderer
pub struct ReactionStatsScreen;

impl Screen for ReactionStatsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_reaction_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Aim => Box::new(AimScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
        AppState::ReactionStats => Box::new(ReactionStatsScreen),
    }
}
