use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::difficulty::Difficulty;
use crate::spawner::TargetId;
use crate::time_series::TimeSeriesPoint;

/// Session mode: countdown to zero, or count up until stopped
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Timed,
    Endless,
}

/// Lifecycle phase of a session
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Opaque generation token handed out by the trainer. A timer callback
/// scheduled under one token is inert once the trainer has moved on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionToken(pub(crate) u64);

/// Outbound lifecycle events, drained by the host each frame
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Paused,
    Resumed,
    Ended { final_score: u32 },
    TargetHit { id: TargetId, reaction_ms: u64 },
    TargetExpired { id: TargetId },
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub mode: Mode,
    /// Countdown length for [`Mode::Timed`]
    pub seconds: u32,
    /// Playfield extent in logical units
    pub width: f64,
    pub height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            mode: Mode::Timed,
            seconds: 30,
            width: 800.0,
            height: 450.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub score: u32,
    /// Seconds left in timed mode, seconds elapsed in endless mode
    pub clock_secs: u32,
    pub hits: u32,
    pub misses: u32,
    /// Running accuracy in [0, 100]; 100 before any attempt resolves
    pub accuracy: f64,
    /// Set exactly once, when the session ends
    pub final_score: Option<u32>,
    pub started_at: Option<SystemTime>,
    /// One point per hit: (seconds into the session, reaction ms)
    pub reaction_coords: Vec<TimeSeriesPoint>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            clock_secs: 0,
            hits: 0,
            misses: 0,
            accuracy: 100.0,
            final_score: None,
            started_at: None,
            reaction_coords: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.accuracy, 100.0);
        assert!(state.final_score.is_none());
        assert!(state.reaction_coords.is_empty());
    }

    #[test]
    fn test_default_config() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.difficulty, Difficulty::Normal);
        assert_eq!(cfg.mode, Mode::Timed);
        assert_eq!(cfg.seconds, 30);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Timed.to_string(), "timed");
        assert_eq!(Mode::Endless.to_string(), "endless");
    }

    #[test]
    fn test_tokens_compare_by_generation() {
        assert_eq!(SessionToken(3), SessionToken(3));
        assert_ne!(SessionToken(3), SessionToken(4));
    }
}
