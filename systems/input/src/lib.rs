#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that folds device events into the canonical control vector.
//!
//! Every event that changes the [`ControlState`] is forwarded through the
//! simulation bridge before [`InputAggregator::handle`] returns; events that
//! leave the state untouched produce no push.

use glam::DVec2;
use polarity_arena_core::{
    ArenaConfig, ControlState, DeviceEvent, InputModality, JoystickId, Key, SimulationBridge,
};
use polarity_arena_system_targeting::{AimSource, Targeting};
use tracing::trace;

/// Per-axis record of the last keyboard intent.
///
/// A key release clears an axis only when that key was the last one to set
/// it, so pressing the opposite key before releasing the first keeps moving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keystate {
    x: i8,
    y: i8,
}

impl Keystate {
    /// Records a key press.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::A => self.x = -1,
            Key::D => self.x = 1,
            Key::S => self.y = 1,
            Key::W => self.y = -1,
            Key::Space => {}
        }
    }

    /// Records a key release.
    pub fn release(&mut self, key: Key) {
        match key {
            Key::A if self.x == -1 => self.x = 0,
            Key::D if self.x == 1 => self.x = 0,
            Key::S if self.y == 1 => self.y = 0,
            Key::W if self.y == -1 => self.y = 0,
            _ => {}
        }
    }

    /// Horizontal intent in `{-1, 0, 1}`.
    #[must_use]
    pub const fn x(&self) -> i8 {
        self.x
    }

    /// Vertical intent in `{-1, 0, 1}`.
    #[must_use]
    pub const fn y(&self) -> i8 {
        self.y
    }

    /// Movement vector derived from the recorded intents.
    #[must_use]
    pub fn movement(&self) -> DVec2 {
        DVec2::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Result of handling a single device event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// The control state changed and was pushed to the bridge.
    Pushed,
    /// The event was accepted but left the control state as it was.
    Unchanged,
    /// The event came from a device that is not wired in this session.
    Ignored,
}

/// Owns the session's control state and the keyboard bookkeeping behind it.
#[derive(Clone, Debug)]
pub struct InputAggregator {
    modality: InputModality,
    joystick_radius: f64,
    targeting: Targeting,
    keystate: Keystate,
    control: ControlState,
}

impl InputAggregator {
    /// Creates an aggregator wired for a single input modality.
    #[must_use]
    pub fn new(modality: InputModality, config: &ArenaConfig) -> Self {
        Self {
            modality,
            joystick_radius: config.joystick_radius(),
            targeting: Targeting::new(config.cell_size()),
            keystate: Keystate::default(),
            control: ControlState::default(),
        }
    }

    /// Current control vector.
    #[must_use]
    pub const fn control(&self) -> &ControlState {
        &self.control
    }

    /// Applies a device event and pushes the control state if it changed.
    ///
    /// `player` is the player's world position from the most recent snapshot
    /// and is only consulted by joystick aiming.
    pub fn handle<B>(
        &mut self,
        event: DeviceEvent,
        player: Option<DVec2>,
        bridge: &mut B,
    ) -> InputOutcome
    where
        B: SimulationBridge + ?Sized,
    {
        if let Some(source) = event.source() {
            if !self.modality.accepts(source) {
                trace!(?event, modality = ?self.modality, "ignoring event from unwired device");
                return InputOutcome::Ignored;
            }
        }

        let before = self.control;
        self.apply(event, player);

        if self.control == before {
            return InputOutcome::Unchanged;
        }

        trace!(control = ?self.control, "pushing control state");
        bridge.push(&self.control);
        InputOutcome::Pushed
    }

    fn apply(&mut self, event: DeviceEvent, player: Option<DVec2>) {
        match event {
            DeviceEvent::KeyDown(Key::Space) | DeviceEvent::TogglePolarity => {
                self.control.polarity = self.control.polarity.flipped();
            }
            DeviceEvent::KeyDown(key) => {
                self.keystate.press(key);
                self.control.movement = self.keystate.movement();
            }
            DeviceEvent::KeyUp(key) => {
                self.keystate.release(key);
                self.control.movement = self.keystate.movement();
            }
            DeviceEvent::PointerMoved { pixel } => {
                self.control.aim = self.targeting.resolve(AimSource::Pointer { pixel }, None);
            }
            DeviceEvent::PointerDown => self.control.firing = true,
            DeviceEvent::PointerUp => self.control.firing = false,
            DeviceEvent::JoystickStart(JoystickId::Fire) => self.control.firing = true,
            DeviceEvent::JoystickEnd(JoystickId::Fire) => self.control.firing = false,
            DeviceEvent::JoystickStart(JoystickId::Move) => {}
            DeviceEvent::JoystickEnd(JoystickId::Move) => self.control.movement = DVec2::ZERO,
            DeviceEvent::JoystickMoved {
                joystick: JoystickId::Move,
                offset,
            } => {
                self.control.movement =
                    (offset / self.joystick_radius).clamp(DVec2::splat(-1.0), DVec2::splat(1.0));
            }
            DeviceEvent::JoystickMoved {
                joystick: JoystickId::Fire,
                offset,
            } => {
                let source = AimSource::Joystick {
                    front_offset: offset,
                };
                if let Some(aim) = self.targeting.resolve(source, player) {
                    self.control.aim = Some(aim);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_clears_the_axis_it_last_set() {
        let mut keystate = Keystate::default();

        keystate.press(Key::A);
        keystate.press(Key::D);
        keystate.release(Key::A);

        assert_eq!(keystate.x(), 1);

        keystate.release(Key::D);
        assert_eq!(keystate.x(), 0);
    }

    #[test]
    fn vertical_axis_tracks_w_and_s() {
        let mut keystate = Keystate::default();

        keystate.press(Key::W);
        assert_eq!(keystate.y(), -1);
        keystate.press(Key::S);
        keystate.release(Key::W);
        assert_eq!(keystate.y(), 1);
        assert_eq!(keystate.movement(), DVec2::new(0.0, 1.0));
    }

    #[test]
    fn space_does_not_touch_movement_axes() {
        let mut keystate = Keystate::default();

        keystate.press(Key::Space);
        keystate.release(Key::Space);

        assert_eq!(keystate, Keystate::default());
    }
}
