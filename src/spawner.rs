use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, SystemTime};

use crate::difficulty::DifficultyProfile;

pub type TargetId = u64;

/// A transient clickable circle. Lives in the active set until it is hit or
/// its lifetime elapses, whichever comes first.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub spawned_at: SystemTime,
    pub lifetime: Duration,
}

impl Target {
    /// Whether the point lies within the target's hit circle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        now.duration_since(self.spawned_at)
            .map(|age| age >= self.lifetime)
            .unwrap_or(false)
    }

    /// Fraction of the lifetime already consumed, clamped to [0, 1].
    /// Drives the fade-out opacity hint in the render snapshot.
    pub fn age_fraction(&self, now: SystemTime) -> f64 {
        let age = now
            .duration_since(self.spawned_at)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        (age / self.lifetime.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Creates targets at uniformly random positions, inset from the playfield
/// edges by the target radius so a target never spawns partially off-field.
#[derive(Debug)]
pub struct TargetSpawner {
    next_id: TargetId,
    rng: StdRng,
}

impl TargetSpawner {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic placement for tests and `--seed` runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            next_id: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn spawn(
        &mut self,
        width: f64,
        height: f64,
        profile: &DifficultyProfile,
        now: SystemTime,
    ) -> Target {
        let r = profile.target_radius;
        // A field narrower than one diameter degenerates to the centerline
        let x = if width > 2.0 * r {
            self.rng.gen_range(r..=width - r)
        } else {
            width / 2.0
        };
        let y = if height > 2.0 * r {
            self.rng.gen_range(r..=height - r)
        } else {
            height / 2.0
        };

        let id = self.next_id;
        self.next_id += 1;

        Target {
            id,
            x,
            y,
            radius: r,
            spawned_at: now,
            lifetime: profile.target_lifetime,
        }
    }
}
