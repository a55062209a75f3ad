//! One play session: device events in, ticks out, over a single bridge.

use polarity_arena_core::{ArenaConfig, DeviceEvent, InputModality, SimulationBridge};
use polarity_arena_rendering::{FrameRenderer, Palette, Surface};
use polarity_arena_system_input::{InputAggregator, InputOutcome};
use polarity_arena_system_loop_driver::{LoopDriver, TickDecision, TickOutcome, TickStats};

/// Couples the input aggregator and the loop driver to one bridge.
#[derive(Debug)]
pub(crate) struct Session<B> {
    bridge: B,
    input: InputAggregator,
    driver: LoopDriver,
    pushes: u64,
}

impl<B> Session<B>
where
    B: SimulationBridge,
{
    pub(crate) fn new(
        bridge: B,
        modality: InputModality,
        config: &ArenaConfig,
        palette: Palette,
    ) -> Self {
        Self {
            bridge,
            input: InputAggregator::new(modality, config),
            driver: LoopDriver::new(FrameRenderer::new(config, palette)),
            pushes: 0,
        }
    }

    /// Folds device events into the control state, pushing on every change.
    pub(crate) fn handle_events<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = DeviceEvent>,
    {
        for event in events {
            let player = self.driver.player_position();
            if self.input.handle(event, player, &mut self.bridge) == InputOutcome::Pushed {
                self.pushes = self.pushes.saturating_add(1);
            }
        }
    }

    /// Runs a tick when the schedule says one is due.
    pub(crate) fn drive<S>(&mut self, decision: TickDecision, surface: &mut S) -> Option<TickOutcome>
    where
        S: Surface + ?Sized,
    {
        self.driver.drive(decision, &mut self.bridge, surface)
    }

    pub(crate) fn stats(&self) -> TickStats {
        self.driver.stats()
    }

    pub(crate) fn pushes(&self) -> u64 {
        self.pushes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use polarity_arena_bridge::EngineBridge;
    use polarity_arena_core::{JoystickId, Key};
    use polarity_arena_rendering::RetainedFrame;
    use polarity_arena_world::World;

    fn session(modality: InputModality) -> Session<EngineBridge<World>> {
        let config = ArenaConfig::default();
        Session::new(
            EngineBridge::new(World::new(11), &config),
            modality,
            &config,
            Palette::default(),
        )
    }

    #[test]
    fn desktop_session_renders_and_pushes() {
        let mut session = session(InputModality::Desktop);
        let mut frame = RetainedFrame::new(Palette::default());

        session.handle_events([DeviceEvent::KeyDown(Key::D), DeviceEvent::KeyUp(Key::A)]);
        let outcome = session.drive(TickDecision::Due { missed: 0 }, &mut frame);

        assert_eq!(outcome, Some(TickOutcome::Rendered));
        assert_eq!(session.pushes(), 1);
        assert_eq!(frame.generation(), 1);
        assert_eq!(session.stats().rendered, 1);
    }

    #[test]
    fn fire_joystick_waits_for_first_tick_to_know_the_player() {
        let mut session = session(InputModality::Touch);
        let mut frame = RetainedFrame::new(Palette::default());
        let aim = DeviceEvent::JoystickMoved {
            joystick: JoystickId::Fire,
            offset: DVec2::new(10.0, 0.0),
        };

        session.handle_events([aim]);
        assert_eq!(session.pushes(), 0);

        let _ = session.drive(TickDecision::Due { missed: 0 }, &mut frame);
        session.handle_events([aim]);
        assert_eq!(session.pushes(), 1);
    }
}
