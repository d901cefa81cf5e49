use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;
use plink::difficulty::Difficulty;
use plink::leaderboard::{FileLeaderboardStore, Leaderboard, MAX_ENTRIES};
use plink::session::{Mode, Phase, SessionConfig, SessionEvent};
use plink::stats::StatsDb;
use plink::trainer::Trainer;

/// End-to-end scenarios for the engine contract: deterministic clocks
/// (explicit timestamps), seeded spawns, isolated stores.

fn scenario_trainer(config: SessionConfig, dir: &tempfile::TempDir) -> Trainer {
    let leaderboard = Leaderboard::with_store(Box::new(FileLeaderboardStore::with_path(
        dir.path().join("leaderboard.json"),
    )));
    Trainer::with_stores(
        config,
        leaderboard,
        StatsDb::in_memory().ok(),
        Some(dir.path().join("sessions.csv")),
    )
    .with_seed(7)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn hit_inside_lifetime_scores_multiplied_points() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = scenario_trainer(SessionConfig::default(), &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(1000));
    let target = trainer.snapshot(t0 + ms(1000)).targets[0].clone();

    // click well inside the 2000ms lifetime
    trainer.resolve_click(target.x, target.y, t0 + ms(1400));

    assert_eq!(trainer.session.hits, 1);
    assert_eq!(trainer.session.score, 20);
    assert_eq!(trainer.session.accuracy, 100.0);
}

#[test]
fn unclicked_target_expires_to_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = scenario_trainer(SessionConfig::default(), &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(1000));
    trainer.advance(t0 + ms(3001)); // spawn at t0+1s, lifetime 2s

    assert_eq!(trainer.session.misses, 1);
    assert_eq!(trainer.session.score, 0);
    assert_eq!(trainer.session.accuracy, 0.0);
    assert!(trainer
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::TargetExpired { .. })));
}

#[test]
fn countdown_reaching_zero_finalizes_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SessionConfig::default();
    config.seconds = 3;
    let mut trainer = scenario_trainer(config, &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(1000));
    let target = trainer.snapshot(t0 + ms(1000)).targets[0].clone();
    trainer.resolve_click(target.x, target.y, t0 + ms(1200));

    trainer.advance(t0 + ms(3000));
    assert_eq!(trainer.session.phase, Phase::Ended);

    // one hit, no misses: (20 + 100*10) * 2
    assert_eq!(trainer.session.final_score, Some(2040));

    // later ticks neither recompute nor re-record
    trainer.advance(t0 + ms(10_000));
    assert_eq!(trainer.session.final_score, Some(2040));
    assert_eq!(trainer.leaderboard.entries().len(), 1);
}

#[test]
fn endless_mode_never_ends_on_its_own() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SessionConfig::default();
    config.mode = Mode::Endless;
    let mut trainer = scenario_trainer(config, &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(90_000));

    assert_eq!(trainer.session.phase, Phase::Running);
    assert_eq!(trainer.session.clock_secs, 90);

    trainer.end(t0 + ms(90_500));
    assert_eq!(trainer.session.phase, Phase::Ended);
}

#[test]
fn click_and_expiry_race_resolves_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = scenario_trainer(SessionConfig::default(), &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(1000));
    let target = trainer.snapshot(t0 + ms(1000)).targets[0].clone();

    // the click lands first; the queued expiry for the same target must lose
    trainer.resolve_click(target.x, target.y, t0 + ms(1999));
    trainer.expire_target(trainer.token(), target.id);

    assert_eq!(trainer.session.hits, 1);
    assert_eq!(trainer.session.misses, 0);
    assert_matches!(
        trainer.drain_events().last(),
        Some(SessionEvent::TargetHit { .. })
    );
}

#[test]
fn stale_timers_cannot_touch_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = scenario_trainer(SessionConfig::default(), &dir);
    let t0 = SystemTime::now();

    trainer.start(t0);
    trainer.advance(t0 + ms(1000));
    let stale_token = trainer.token();
    let stale_target = trainer.snapshot(t0 + ms(1000)).targets[0].clone();

    trainer.pause(t0 + ms(1100));
    trainer.reset();
    assert_eq!(trainer.session.phase, Phase::Idle);

    let t1 = t0 + ms(60_000);
    trainer.start(t1);
    trainer.advance(t1 + ms(1000));
    let hits = trainer.session.hits;
    let misses = trainer.session.misses;
    let clock = trainer.session.clock_secs;
    let targets = trainer.snapshot(t1 + ms(1000)).targets.len();

    // replay every timer the old session could have left behind
    trainer.clock_tick(stale_token, t1 + ms(1500));
    trainer.spawn_tick(stale_token, t1 + ms(1500));
    trainer.expire_target(stale_token, stale_target.id);

    assert_eq!(trainer.session.hits, hits);
    assert_eq!(trainer.session.misses, misses);
    assert_eq!(trainer.session.clock_secs, clock);
    assert_eq!(trainer.snapshot(t1 + ms(1000)).targets.len(), targets);
}

#[test]
fn eleven_sessions_keep_only_the_top_ten() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SessionConfig::default();
    config.mode = Mode::Endless;
    config.difficulty = Difficulty::Easy;
    let mut trainer = scenario_trainer(config, &dir);

    let mut t = SystemTime::now();
    for round in 0..11u64 {
        trainer.reset();
        trainer.start(t);
        // land one more hit each round for strictly increasing scores
        for _ in 0..=round {
            t += ms(1400);
            trainer.advance(t);
            if let Some(target) = trainer.snapshot(t).targets.last().cloned() {
                trainer.resolve_click(target.x, target.y, t);
            }
        }
        t += ms(10);
        trainer.end(t);
        t += ms(10);
    }

    let entries = trainer.leaderboard.entries();
    assert_eq!(entries.len(), MAX_ENTRIES);
    // descending, with the weakest round dropped
    for pair in entries.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let min_kept = entries.last().unwrap().score;
    assert!(entries.iter().all(|e| e.score >= min_kept));
    assert_eq!(entries[0].mode, Mode::Endless);
}

#[test]
fn leaderboard_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SessionConfig::default();
    config.seconds = 1;
    {
        let mut trainer = scenario_trainer(config.clone(), &dir);
        let t0 = SystemTime::now();
        trainer.start(t0);
        trainer.advance(t0 + ms(1000));
        assert_eq!(trainer.session.phase, Phase::Ended);
    }

    let trainer = scenario_trainer(config, &dir);
    assert_eq!(trainer.leaderboard.entries().len(), 1);
}
