use std::time::Duration;

use glam::DVec2;
use polarity_arena_bridge::EngineBridge;
use polarity_arena_core::{
    wire::ControlFrame, ArenaConfig, CellSize, ControlState, Engine, Polarity, SimulationBridge,
    SnapshotError,
};

#[derive(Debug, Default)]
struct ScriptedEngine {
    received: Vec<String>,
    state: String,
    steps: usize,
}

impl Engine for ScriptedEngine {
    fn receive_control(&mut self, payload: &str) {
        self.received.push(payload.to_owned());
    }

    fn state(&self) -> String {
        self.state.clone()
    }

    fn step(&mut self) {
        self.steps += 1;
    }
}

#[test]
fn push_forwards_one_serialized_frame_per_call() {
    let mut bridge = EngineBridge::new(ScriptedEngine::default(), &ArenaConfig::default());
    let control = ControlState {
        movement: DVec2::new(1.0, 0.0),
        aim: None,
        firing: false,
        polarity: Polarity::Positive,
    };

    bridge.push(&control);

    let engine = bridge.engine();
    assert_eq!(engine.received.len(), 1);
    let frame: ControlFrame = serde_json::from_str(&engine.received[0]).expect("valid frame");
    assert_eq!(frame.movement, [1.0, 0.0]);
    assert_eq!(frame.aim, None);
    assert_eq!(frame.polarity, 1);
    assert_eq!(bridge.pushes(), 1);
}

#[test]
fn advance_steps_engine_exactly_once() {
    let mut bridge = EngineBridge::new(ScriptedEngine::default(), &ArenaConfig::default());

    bridge.advance();
    bridge.advance();

    assert_eq!(bridge.advances(), 2);
    assert_eq!(bridge.into_engine().steps, 2);
}

#[test]
fn pull_applies_configured_radius_defaults() {
    let config = ArenaConfig::new(
        CellSize::new(16.0).expect("valid cell size"),
        40.0,
        Duration::from_millis(20),
        0.4,
        0.9,
    )
    .expect("valid config");
    let engine = ScriptedEngine {
        state: r#"{"player": {"x": 1.0, "y": 1.0}, "enemies": [{"x": 2.0, "y": 2.0}], "shots": []}"#
            .to_owned(),
        ..ScriptedEngine::default()
    };
    let mut bridge = EngineBridge::new(engine, &config);

    let snapshot = bridge.pull().expect("legacy snapshot decodes");

    assert_eq!(snapshot.player.expect("player").radius, 0.4);
    assert_eq!(snapshot.enemies[0].radius, 0.9);
}

#[test]
fn pull_reports_garbage_as_malformed() {
    let engine = ScriptedEngine {
        state: "not json".to_owned(),
        ..ScriptedEngine::default()
    };
    let mut bridge = EngineBridge::new(engine, &ArenaConfig::default());

    let error = bridge.pull().expect_err("garbage payload");

    assert!(matches!(error, SnapshotError::Malformed(_)));
}
