use crate::celebration::Celebration;
use crate::spawner::TargetId;
use crate::trainer::Trainer;

/// Top-level screen the TUI is showing
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Aim,
    Results,
    Leaderboard,
    ReactionStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortBy {
    Difficulty,
    AvgReaction,
    HitRate,
    Attempts,
}

/// View state for the reaction analytics table
#[derive(Debug)]
pub struct StatsViewState {
    pub scroll_offset: usize,
    pub sort_by: SortBy,
    pub sort_ascending: bool,
}

impl Default for StatsViewState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            sort_by: SortBy::Difficulty,
            sort_ascending: true,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub trainer: Trainer,
    pub state: AppState,
    pub stats_view: StatsViewState,
    pub celebration: Celebration,
    /// Target currently under the pointer, for hover highlighting
    pub hovered: Option<TargetId>,
}

impl App {
    pub fn new(trainer: Trainer) -> Self {
        Self {
            trainer,
            state: AppState::Aim,
            stats_view: StatsViewState::default(),
            celebration: Celebration::new(),
            hovered: None,
        }
    }

    /// Back to an idle playfield, dropping any results chrome
    pub fn reset_session(&mut self) {
        self.trainer.reset();
        self.celebration.stop();
        self.hovered = None;
        self.state = AppState::Aim;
        self.stats_view = StatsViewState::default();
    }
}
