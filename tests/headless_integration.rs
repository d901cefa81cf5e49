use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use plink::leaderboard::{FileLeaderboardStore, Leaderboard};
use plink::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use plink::session::{Phase, SessionConfig};
use plink::stats::StatsDb;
use plink::trainer::Trainer;

// Headless integration using the internal runtime + Trainer without a TTY.
// Verifies that a minimal session flow completes via Runner/TestEventSource.

fn headless_trainer(config: SessionConfig, dir: &tempfile::TempDir) -> Trainer {
    let leaderboard = Leaderboard::with_store(Box::new(FileLeaderboardStore::with_path(
        dir.path().join("leaderboard.json"),
    )));
    Trainer::with_stores(
        config,
        leaderboard,
        StatsDb::in_memory().ok(),
        Some(dir.path().join("sessions.csv")),
    )
    .with_seed(99)
}

#[test]
fn headless_timed_session_finishes_by_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SessionConfig::default();
    config.seconds = 1;
    let mut trainer = headless_trainer(config, &dir);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(20));
    let runner = Runner::new(es, ticker);

    trainer.start(SystemTime::now());
    for _ in 0..200u32 {
        // up to ~4s of ticks for a 1s session
        if let AppEvent::Tick = runner.step() {
            trainer.advance(SystemTime::now());
        }
        if trainer.session.phase == Phase::Ended {
            break;
        }
    }

    assert_eq!(
        trainer.session.phase,
        Phase::Ended,
        "timed session should finish by timeout"
    );
    assert!(trainer.session.final_score.is_some());
    assert_eq!(trainer.leaderboard.entries().len(), 1);
}

#[test]
fn headless_spawn_and_hit_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = headless_trainer(SessionConfig::default(), &dir);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(20));
    let runner = Runner::new(es, ticker);

    trainer.start(SystemTime::now());

    // tick until the first target appears (normal spawns every second)
    let mut target = None;
    for _ in 0..200u32 {
        if let AppEvent::Tick = runner.step() {
            let now = SystemTime::now();
            trainer.advance(now);
            let snapshot = trainer.snapshot(now);
            if let Some(t) = snapshot.targets.first() {
                target = Some((t.x, t.y));
                break;
            }
        }
    }

    let (x, y) = target.expect("a target should spawn within the first seconds");
    trainer.resolve_click(x, y, SystemTime::now());

    assert_eq!(trainer.session.hits, 1);
    assert_eq!(trainer.session.score, 20);
    assert_eq!(trainer.session.accuracy, 100.0);
}

#[test]
fn headless_pause_blocks_engine_progress() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = headless_trainer(SessionConfig::default(), &dir);

    let t0 = SystemTime::now();
    trainer.start(t0);
    trainer.pause(t0);
    assert_eq!(trainer.session.phase, Phase::Paused);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    for _ in 0..20u32 {
        if let AppEvent::Tick = runner.step() {
            trainer.advance(SystemTime::now());
        }
    }

    // no spawns, no clock movement while paused
    assert_eq!(trainer.session.clock_secs, 30);
    assert!(trainer.snapshot(SystemTime::now()).targets.is_empty());
}
