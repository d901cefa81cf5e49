use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Difficulty level selecting one of the static tuning profiles
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

/// Immutable tuning parameters for one difficulty level.
/// Looked up via [`Difficulty::profile`], never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Time between spawner ticks while a session is running
    pub spawn_interval: Duration,
    /// Radius of every spawned target, in playfield units
    pub target_radius: f64,
    /// How long an unhit target survives before it counts as a miss
    pub target_lifetime: Duration,
    /// Applied per hit and again to the final score
    pub score_multiplier: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                spawn_interval: Duration::from_millis(1400),
                target_radius: 70.0,
                target_lifetime: Duration::from_millis(2800),
                score_multiplier: 1,
            },
            Difficulty::Normal => DifficultyProfile {
                spawn_interval: Duration::from_millis(1000),
                target_radius: 50.0,
                target_lifetime: Duration::from_millis(2000),
                score_multiplier: 2,
            },
            Difficulty::Hard => DifficultyProfile {
                spawn_interval: Duration::from_millis(700),
                target_radius: 35.0,
                target_lifetime: Duration::from_millis(1400),
                score_multiplier: 3,
            },
            Difficulty::Expert => DifficultyProfile {
                spawn_interval: Duration::from_millis(450),
                target_radius: 25.0,
                target_lifetime: Duration::from_millis(900),
                score_multiplier: 4,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_profile_values() {
        let p = Difficulty::Normal.profile();
        assert_eq!(p.spawn_interval, Duration::from_millis(1000));
        assert_eq!(p.target_radius, 50.0);
        assert_eq!(p.target_lifetime, Duration::from_millis(2000));
        assert_eq!(p.score_multiplier, 2);
    }

    #[test]
    fn test_profiles_get_harder() {
        for pair in Difficulty::ALL.windows(2) {
            let (a, b) = (pair[0].profile(), pair[1].profile());
            assert!(b.spawn_interval < a.spawn_interval);
            assert!(b.target_radius < a.target_radius);
            assert!(b.target_lifetime < a.target_lifetime);
            assert!(b.score_multiplier > a.score_multiplier);
        }
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert_eq!(Difficulty::Expert.to_string(), "expert");
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
        let back: Difficulty = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Difficulty::Hard);
    }
}
