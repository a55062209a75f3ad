use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    time::{Duration, Instant},
};

use glam::DVec2;
use polarity_arena_core::{
    ArenaConfig, ControlState, Entity, EntitySnapshot, Polarity, SimulationBridge, SnapshotError,
};
use polarity_arena_rendering::{DrawPlan, FrameRenderer, Palette, Surface};
use polarity_arena_system_loop_driver::{FixedTick, LoopDriver, TickDecision, TickOutcome};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Pull,
    Present(usize),
    Advance,
}

type CallLog = Rc<RefCell<Vec<Call>>>;

enum Scripted {
    Snapshot(EntitySnapshot),
    Garbage,
}

struct ScriptedBridge {
    script: VecDeque<Scripted>,
    log: CallLog,
}

impl ScriptedBridge {
    fn new(script: Vec<Scripted>, log: CallLog) -> Self {
        Self {
            script: script.into(),
            log,
        }
    }
}

impl SimulationBridge for ScriptedBridge {
    fn push(&mut self, _control: &ControlState) {}

    fn pull(&mut self) -> Result<EntitySnapshot, SnapshotError> {
        self.log.borrow_mut().push(Call::Pull);
        match self.script.pop_front() {
            Some(Scripted::Snapshot(snapshot)) => Ok(snapshot),
            Some(Scripted::Garbage) | None => {
                let error = serde_json::from_str::<serde_json::Value>("{")
                    .expect_err("truncated json");
                Err(SnapshotError::Malformed(error))
            }
        }
    }

    fn advance(&mut self) {
        self.log.borrow_mut().push(Call::Advance);
    }
}

struct RecordingSurface {
    log: CallLog,
}

impl Surface for RecordingSurface {
    fn present(&mut self, plan: &DrawPlan) {
        self.log
            .borrow_mut()
            .push(Call::Present(plan.primitives.len()));
    }
}

fn driver() -> LoopDriver {
    LoopDriver::new(FrameRenderer::new(
        &ArenaConfig::default(),
        Palette::default(),
    ))
}

fn with_player(x: f64, y: f64) -> EntitySnapshot {
    EntitySnapshot {
        player: Some(Entity {
            position: DVec2::new(x, y),
            radius: 0.25,
            polarity: Polarity::Positive,
        }),
        ..EntitySnapshot::default()
    }
}

fn harness(script: Vec<Scripted>) -> (ScriptedBridge, RecordingSurface, CallLog) {
    let log = CallLog::default();
    let bridge = ScriptedBridge::new(script, Rc::clone(&log));
    let surface = RecordingSurface {
        log: Rc::clone(&log),
    };
    (bridge, surface, log)
}

#[test]
fn missing_player_skips_render_and_advance() {
    let (mut bridge, mut surface, log) =
        harness(vec![Scripted::Snapshot(EntitySnapshot::default())]);
    let mut driver = driver();

    let outcome = driver.tick(&mut bridge, &mut surface);

    assert_eq!(outcome, TickOutcome::SkippedNoPlayer);
    assert_eq!(*log.borrow(), vec![Call::Pull]);
    assert_eq!(driver.stats().skipped_no_player, 1);
    assert_eq!(driver.player_position(), None);
}

#[test]
fn tick_pulls_then_presents_then_advances() {
    let (mut bridge, mut surface, log) = harness(vec![Scripted::Snapshot(with_player(5.0, 5.0))]);
    let mut driver = driver();

    let outcome = driver.tick(&mut bridge, &mut surface);

    assert_eq!(outcome, TickOutcome::Rendered);
    // player circle plus score label
    assert_eq!(
        *log.borrow(),
        vec![Call::Pull, Call::Present(2), Call::Advance]
    );
    assert_eq!(driver.player_position(), Some(DVec2::new(5.0, 5.0)));
}

#[test]
fn malformed_snapshot_skips_tick_and_keeps_last_player() {
    let (mut bridge, mut surface, log) = harness(vec![
        Scripted::Snapshot(with_player(3.0, 4.0)),
        Scripted::Garbage,
    ]);
    let mut driver = driver();

    let _ = driver.tick(&mut bridge, &mut surface);
    let outcome = driver.tick(&mut bridge, &mut surface);

    assert_eq!(outcome, TickOutcome::SkippedMalformed);
    let advances = log
        .borrow()
        .iter()
        .filter(|call| **call == Call::Advance)
        .count();
    assert_eq!(advances, 1);
    assert_eq!(driver.stats().skipped_malformed, 1);
    assert_eq!(driver.player_position(), Some(DVec2::new(3.0, 4.0)));
}

#[test]
fn round_over_freezes_the_simulation() {
    let (mut bridge, mut surface, log) = harness(vec![
        Scripted::Snapshot(with_player(1.0, 1.0)),
        Scripted::Snapshot(with_player(1.5, 1.0)),
        Scripted::Snapshot(EntitySnapshot::default()),
        Scripted::Snapshot(EntitySnapshot::default()),
    ]);
    let mut driver = driver();

    for _ in 0..4 {
        let _ = driver.tick(&mut bridge, &mut surface);
    }

    let stats = driver.stats();
    assert_eq!(stats.rendered, 2);
    assert_eq!(stats.skipped_no_player, 2);
    let advances = log
        .borrow()
        .iter()
        .filter(|call| **call == Call::Advance)
        .count();
    assert_eq!(advances, 2);
}

#[test]
fn scheduled_ticks_account_for_missed_intervals() {
    let script = (0..3)
        .map(|step| Scripted::Snapshot(with_player(f64::from(step), 0.0)))
        .collect();
    let (mut bridge, mut surface, log) = harness(script);
    let mut driver = driver();
    let mut schedule = FixedTick::new(Duration::from_millis(20));
    let start = Instant::now();

    let polls = [
        start,
        start + Duration::from_millis(10),
        start + Duration::from_millis(85),
        start + Duration::from_millis(100),
    ];
    let outcomes: Vec<_> = polls
        .into_iter()
        .filter_map(|now| driver.drive(schedule.poll(now), &mut bridge, &mut surface))
        .collect();

    assert_eq!(outcomes, vec![TickOutcome::Rendered, TickOutcome::Rendered, TickOutcome::Rendered]);
    assert_eq!(driver.stats().missed, 3);
    let pulls = log.borrow().iter().filter(|call| **call == Call::Pull).count();
    assert_eq!(pulls, 3);

    schedule.stop();
    assert_eq!(
        driver.drive(schedule.poll(start + Duration::from_secs(1)), &mut bridge, &mut surface),
        None
    );
    assert_eq!(
        driver.drive(TickDecision::Stopped, &mut bridge, &mut surface),
        None
    );
}
