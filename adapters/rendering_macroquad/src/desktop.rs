//! Keyboard and mouse sampling for desktop sessions.

use glam::DVec2;
use polarity_arena_core::{DeviceEvent, Key};

/// Device activity observed during one display frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesktopObservation {
    /// Keys that transitioned to pressed.
    pub pressed: Vec<Key>,
    /// Keys that transitioned to released.
    pub released: Vec<Key>,
    /// Pointer position in viewport pixels.
    pub pointer: DVec2,
    /// Whether the primary button went down.
    pub button_pressed: bool,
    /// Whether the primary button went up.
    pub button_released: bool,
}

/// Converts per-frame observations into edge-triggered device events.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopSampler {
    pointer: Option<DVec2>,
}

impl DesktopSampler {
    /// Appends the events implied by `observation`.
    ///
    /// Pointer motion is reported before button transitions so a click
    /// always fires at the position it was made.
    pub fn sample(&mut self, observation: &DesktopObservation, out: &mut Vec<DeviceEvent>) {
        out.extend(observation.pressed.iter().copied().map(DeviceEvent::KeyDown));
        out.extend(observation.released.iter().copied().map(DeviceEvent::KeyUp));

        if self.pointer != Some(observation.pointer) {
            self.pointer = Some(observation.pointer);
            out.push(DeviceEvent::PointerMoved {
                pixel: observation.pointer,
            });
        }

        if observation.button_pressed {
            out.push(DeviceEvent::PointerDown);
        }
        if observation.button_released {
            out.push(DeviceEvent::PointerUp);
        }
    }
}
