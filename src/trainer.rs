use chrono::Local;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::app_dirs::AppDirs;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::scoring;
use crate::session::{Mode, Phase, SessionConfig, SessionEvent, SessionState, SessionToken};
use crate::spawner::{Target, TargetId, TargetSpawner};
use crate::stats::{StatsDb, TargetOutcome, TargetStat};
use crate::time_series::TimeSeriesPoint;

/// Cadence of the session clock
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// One target as exposed to the renderer
#[derive(Debug, Clone)]
pub struct TargetView {
    pub id: TargetId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// 1.0 freshly spawned, fading to 0.0 at expiry
    pub opacity: f64,
}

/// Read-only state snapshot taken once per frame
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: Phase,
    pub score: u32,
    pub clock_secs: u32,
    pub hits: u32,
    pub misses: u32,
    pub accuracy: f64,
    pub final_score: Option<u32>,
    pub targets: Vec<TargetView>,
}

/// The aim-trainer engine: owns the session state machine, the active-target
/// set and all timer bookkeeping. The host forwards input and ticks; the
/// engine never touches a rendering surface.
///
/// Every timer entry point takes a [`SessionToken`]. `start`, `pause`,
/// `reset` and `end` advance the generation, so a callback scheduled against
/// an earlier session can never mutate its successor.
#[derive(Debug)]
pub struct Trainer {
    pub config: SessionConfig,
    pub session: SessionState,
    pub leaderboard: Leaderboard,
    pub stats_db: Option<StatsDb>,
    targets: Vec<Target>,
    spawner: TargetSpawner,
    generation: u64,
    next_clock: Option<SystemTime>,
    next_spawn: Option<SystemTime>,
    paused_at: Option<SystemTime>,
    events: Vec<SessionEvent>,
    last_rank: Option<usize>,
    log_path: Option<PathBuf>,
}

impl Trainer {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_stores(
            config,
            Leaderboard::new(),
            StatsDb::new().ok(),
            AppDirs::session_log_path(),
        )
    }

    pub fn with_stores(
        config: SessionConfig,
        leaderboard: Leaderboard,
        stats_db: Option<StatsDb>,
        log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            session: SessionState::default(),
            leaderboard,
            stats_db,
            targets: Vec::new(),
            spawner: TargetSpawner::new(),
            generation: 0,
            next_clock: None,
            next_spawn: None,
            paused_at: None,
            events: Vec::new(),
            last_rank: None,
            log_path,
        }
    }

    /// Pin target placement (tests, `--seed` runs)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.spawner = TargetSpawner::with_seed(seed);
        self
    }

    /// Token identifying the current session generation
    pub fn token(&self) -> SessionToken {
        SessionToken(self.generation)
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Drain queued lifecycle events (sound, announcements, screen switches)
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a fresh session. Valid from `Idle` or `Ended`; a no-op while
    /// `Running` or `Paused`.
    pub fn start(&mut self, now: SystemTime) {
        if matches!(self.session.phase, Phase::Running | Phase::Paused) {
            return;
        }
        self.generation += 1;
        self.targets.clear();
        self.last_rank = None;
        self.session = SessionState {
            phase: Phase::Running,
            clock_secs: match self.config.mode {
                Mode::Timed => self.config.seconds,
                Mode::Endless => 0,
            },
            started_at: Some(now),
            ..SessionState::default()
        };
        let profile = self.config.difficulty.profile();
        self.next_clock = Some(now + CLOCK_INTERVAL);
        self.next_spawn = Some(now + profile.spawn_interval);
        self.events.push(SessionEvent::Started);
    }

    /// Suspend a running session. Both interval timers are cancelled, not
    /// frozen mid-interval; they restart from a full interval on resume.
    pub fn pause(&mut self, now: SystemTime) {
        if self.session.phase != Phase::Running {
            return;
        }
        self.generation += 1;
        self.next_clock = None;
        self.next_spawn = None;
        self.paused_at = Some(now);
        self.session.phase = Phase::Paused;
        self.events.push(SessionEvent::Paused);
    }

    pub fn resume(&mut self, now: SystemTime) {
        if self.session.phase != Phase::Paused {
            return;
        }
        // Shift spawn times forward by the pause so target age (and reaction
        // times) exclude time spent paused.
        if let Some(paused_at) = self.paused_at.take() {
            if let Ok(pause_dur) = now.duration_since(paused_at) {
                for target in &mut self.targets {
                    target.spawned_at += pause_dur;
                }
                if let Some(started_at) = self.session.started_at {
                    self.session.started_at = Some(started_at + pause_dur);
                }
            }
        }
        let profile = self.config.difficulty.profile();
        self.session.phase = Phase::Running;
        self.next_clock = Some(now + CLOCK_INTERVAL);
        self.next_spawn = Some(now + profile.spawn_interval);
        self.events.push(SessionEvent::Resumed);
    }

    /// Clear the session back to `Idle`. Valid only when not `Running`.
    /// Leaves the leaderboard untouched.
    pub fn reset(&mut self) {
        if self.session.phase == Phase::Running {
            return;
        }
        self.generation += 1;
        self.targets.clear();
        self.next_clock = None;
        self.next_spawn = None;
        self.paused_at = None;
        self.last_rank = None;
        self.session = SessionState::default();
    }

    /// Finish a running session: freeze the counters, compute the final
    /// adjusted score exactly once, and record it.
    pub fn end(&mut self, now: SystemTime) {
        if self.session.phase != Phase::Running {
            return;
        }
        self.generation += 1;
        self.next_clock = None;
        self.next_spawn = None;

        let profile = self.config.difficulty.profile();
        let final_score = scoring::final_score(
            self.session.score,
            self.session.accuracy,
            profile.score_multiplier,
        );
        self.session.final_score = Some(final_score);
        self.session.phase = Phase::Ended;

        self.last_rank = self.leaderboard.record(LeaderboardEntry {
            score: final_score,
            accuracy: self.session.accuracy,
            difficulty: self.config.difficulty,
            mode: self.config.mode,
            date: Local::now(),
        });

        let elapsed_secs = self
            .session
            .started_at
            .and_then(|t| now.duration_since(t).ok())
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        let _ = self.append_session_log(final_score, elapsed_secs);

        self.events.push(SessionEvent::Ended { final_score });
    }

    /// Visibility hook: the host reports page/terminal visibility and a
    /// hidden playfield pauses the session. Becoming visible again does not
    /// auto-resume; that stays a deliberate player action.
    pub fn set_visible(&mut self, visible: bool, now: SystemTime) {
        if !visible {
            self.pause(now);
        }
    }

    /// Drive all due timers. Called once per host tick while running;
    /// harmless in any other phase.
    pub fn advance(&mut self, now: SystemTime) {
        if self.session.phase != Phase::Running {
            return;
        }
        self.sweep_expired(now);
        // Catch-up ticks fire at their deadline, not at the polling instant,
        // so a slow frame cannot compress several spawns onto one timestamp.
        while let Some(deadline) = self.next_clock {
            if deadline > now || self.session.phase != Phase::Running {
                break;
            }
            self.next_clock = Some(deadline + CLOCK_INTERVAL);
            self.clock_tick(self.token(), deadline);
        }
        while let Some(deadline) = self.next_spawn {
            if deadline > now || self.session.phase != Phase::Running {
                break;
            }
            let interval = self.config.difficulty.profile().spawn_interval;
            self.next_spawn = Some(deadline + interval);
            self.spawn_tick(self.token(), deadline);
        }
    }

    /// One tick of the session clock. In timed mode the countdown reaching
    /// zero ends the session; in endless mode the clock counts up forever.
    pub fn clock_tick(&mut self, token: SessionToken, now: SystemTime) {
        if token != self.token() || self.session.phase != Phase::Running {
            return;
        }
        match self.config.mode {
            Mode::Timed => {
                self.session.clock_secs = self.session.clock_secs.saturating_sub(1);
                if self.session.clock_secs == 0 {
                    self.end(now);
                }
            }
            Mode::Endless => {
                self.session.clock_secs += 1;
            }
        }
    }

    /// One tick of the spawner: place a new target on the field
    pub fn spawn_tick(&mut self, token: SessionToken, now: SystemTime) {
        if token != self.token() || self.session.phase != Phase::Running {
            return;
        }
        let profile = self.config.difficulty.profile();
        let target = self
            .spawner
            .spawn(self.config.width, self.config.height, &profile, now);
        self.targets.push(target);
    }

    /// Expire one target as a miss. Hit-removal and expiry are mutually
    /// exclusive: an id that already left the set is a no-op, so a target is
    /// never counted twice.
    pub fn expire_target(&mut self, token: SessionToken, id: TargetId) {
        if token != self.token() || self.session.phase != Phase::Running {
            return;
        }
        let Some(pos) = self.targets.iter().position(|t| t.id == id) else {
            return;
        };
        let target = self.targets.remove(pos);
        self.session.misses += 1;
        self.session.accuracy = scoring::accuracy(self.session.hits, self.session.misses);
        self.record_stat(TargetOutcome::Expired, None, target.radius);
        self.events.push(SessionEvent::TargetExpired { id });
    }

    /// Resolve a click at playfield coordinates. Only finite coordinates on
    /// a running session are considered.
    ///
    /// Overlap tie-break: targets are appended in spawn order and scanned in
    /// reverse, so when several targets cover the point the most recently
    /// spawned one is hit. This is a deliberate, documented choice.
    pub fn resolve_click(&mut self, x: f64, y: f64, now: SystemTime) {
        if self.session.phase != Phase::Running || !x.is_finite() || !y.is_finite() {
            return;
        }
        if let Some(pos) = self.targets.iter().rposition(|t| t.contains(x, y)) {
            let target = self.targets.remove(pos);
            let reaction_ms = now
                .duration_since(target.spawned_at)
                .unwrap_or(Duration::ZERO)
                .as_millis() as u64;
            let profile = self.config.difficulty.profile();
            self.session.hits += 1;
            self.session.score += scoring::hit_points(profile.score_multiplier);
            self.session.accuracy = scoring::accuracy(self.session.hits, self.session.misses);
            if let Some(started_at) = self.session.started_at {
                let t = now
                    .duration_since(started_at)
                    .unwrap_or(Duration::ZERO)
                    .as_secs_f64();
                self.session
                    .reaction_coords
                    .push(TimeSeriesPoint::new(t, reaction_ms as f64));
            }
            self.record_stat(TargetOutcome::Hit, Some(reaction_ms), target.radius);
            self.events.push(SessionEvent::TargetHit {
                id: target.id,
                reaction_ms,
            });
        } else {
            self.session.misses += 1;
            self.session.accuracy = scoring::accuracy(self.session.hits, self.session.misses);
            self.record_stat(TargetOutcome::Whiff, None, 0.0);
        }
    }

    /// Same selection rule as [`Trainer::resolve_click`], without touching
    /// any counter. Reports the target currently under the pointer.
    pub fn resolve_hover(&self, x: f64, y: f64) -> Option<TargetId> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains(x, y))
            .map(|t| t.id)
    }

    /// Read-only state for the renderer
    pub fn snapshot(&self, now: SystemTime) -> Snapshot {
        Snapshot {
            phase: self.session.phase,
            score: self.session.score,
            clock_secs: self.session.clock_secs,
            hits: self.session.hits,
            misses: self.session.misses,
            accuracy: self.session.accuracy,
            final_score: self.session.final_score,
            targets: self
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    x: t.x,
                    y: t.y,
                    radius: t.radius,
                    opacity: 1.0 - t.age_fraction(now),
                })
                .collect(),
        }
    }

    fn sweep_expired(&mut self, now: SystemTime) {
        let expired: Vec<TargetId> = self
            .targets
            .iter()
            .filter(|t| t.is_expired(now))
            .map(|t| t.id)
            .collect();
        let token = self.token();
        for id in expired {
            self.expire_target(token, id);
        }
    }

    fn record_stat(&self, outcome: TargetOutcome, reaction_ms: Option<u64>, radius: f64) {
        if let Some(ref db) = self.stats_db {
            let _ = db.record_target_stat(&TargetStat {
                difficulty: self.config.difficulty,
                outcome,
                reaction_ms,
                radius,
                timestamp: Local::now(),
            });
        }
    }

    fn append_session_log(&self, final_score: u32, elapsed_secs: f64) -> io::Result<()> {
        let Some(ref path) = self.log_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = !path.exists();
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        if needs_header {
            wtr.write_record([
                "date",
                "difficulty",
                "mode",
                "elapsed_secs",
                "score",
                "final_score",
                "accuracy",
                "hits",
                "misses",
            ])
            .map_err(io::Error::other)?;
        }
        wtr.write_record([
            Local::now().to_rfc3339(),
            self.config.difficulty.to_string(),
            self.config.mode.to_string(),
            format!("{:.2}", elapsed_secs),
            self.session.score.to_string(),
            final_score.to_string(),
            self.session.accuracy.to_string(),
            self.session.hits.to_string(),
            self.session.misses.to_string(),
        ])
        .map_err(io::Error::other)?;
        wtr.flush()
    }
}
