//! Virtual dual-joystick layer for touch sessions.
//!
//! Touches are classified by the screen zone they start in. A touch starting
//! in the movement or fire zone grabs that joystick and anchors it at the
//! touch point; later moves report the knob offset from the anchor, clamped
//! to the joystick radius. Taps in the top band toggle polarity.

use glam::DVec2;
use polarity_arena_core::{DeviceEvent, JoystickId};

/// Share of the viewport height reserved for the polarity button.
const BUTTON_BAND: f64 = 0.15;

/// Phase of a single touch point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    /// The finger went down.
    Started,
    /// The finger moved.
    Moved,
    /// The finger is down and did not move.
    Stationary,
    /// The finger lifted.
    Ended,
    /// The platform cancelled the touch.
    Cancelled,
}

/// Platform touch translated into viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSample {
    /// Platform identifier, stable for the lifetime of the touch.
    pub id: u64,
    /// Current phase.
    pub phase: TouchPhase,
    /// Position in viewport pixels.
    pub position: DVec2,
}

/// Screen region a touch started in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchZone {
    /// Polarity button spanning the top band.
    PolarityButton,
    /// Lower-left movement joystick zone.
    Move,
    /// Lower-right fire joystick zone.
    Fire,
}

/// Splits a viewport into touch zones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchLayout {
    viewport: DVec2,
}

impl TouchLayout {
    /// Creates a layout for a viewport of the given pixel size.
    #[must_use]
    pub const fn new(viewport: DVec2) -> Self {
        Self { viewport }
    }

    /// Height of the polarity button band in pixels.
    #[must_use]
    pub fn button_height(&self) -> f64 {
        self.viewport.y * BUTTON_BAND
    }

    /// Zone containing `point`, or `None` outside the viewport.
    #[must_use]
    pub fn zone(&self, point: DVec2) -> Option<TouchZone> {
        let inside = point.cmpge(DVec2::ZERO).all() && point.cmplt(self.viewport).all();
        if !inside {
            return None;
        }

        if point.y < self.button_height() {
            Some(TouchZone::PolarityButton)
        } else if point.x < self.viewport.x / 2.0 {
            Some(TouchZone::Move)
        } else {
            Some(TouchZone::Fire)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    touch: u64,
    anchor: DVec2,
    knob: DVec2,
}

/// Tracks which touch drives each joystick.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualJoysticks {
    radius: f64,
    move_stick: Option<Grab>,
    fire_stick: Option<Grab>,
}

impl VirtualJoysticks {
    /// Creates idle joysticks with the given travel radius in pixels.
    #[must_use]
    pub const fn new(radius: f64) -> Self {
        Self {
            radius,
            move_stick: None,
            fire_stick: None,
        }
    }

    /// Travel radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Anchor and knob position of a grabbed joystick.
    #[must_use]
    pub fn grabbed(&self, joystick: JoystickId) -> Option<(DVec2, DVec2)> {
        self.slot(joystick).map(|grab| (grab.anchor, grab.anchor + grab.knob))
    }

    /// Translates one touch sample into device events.
    pub fn handle(&mut self, sample: TouchSample, layout: &TouchLayout, out: &mut Vec<DeviceEvent>) {
        match sample.phase {
            TouchPhase::Started => self.start(sample, layout, out),
            TouchPhase::Moved => {
                let radius = self.radius;
                if let Some((joystick, grab)) = self.owner_mut(sample.id) {
                    let offset = (sample.position - grab.anchor).clamp_length_max(radius);
                    if offset != grab.knob {
                        grab.knob = offset;
                        out.push(DeviceEvent::JoystickMoved { joystick, offset });
                    }
                }
            }
            TouchPhase::Stationary => {}
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let owner = self.owner_mut(sample.id).map(|(joystick, _)| joystick);
                if let Some(joystick) = owner {
                    *self.slot_mut(joystick) = None;
                    out.push(DeviceEvent::JoystickEnd(joystick));
                }
            }
        }
    }

    fn start(&mut self, sample: TouchSample, layout: &TouchLayout, out: &mut Vec<DeviceEvent>) {
        let joystick = match layout.zone(sample.position) {
            Some(TouchZone::PolarityButton) => {
                out.push(DeviceEvent::TogglePolarity);
                return;
            }
            Some(TouchZone::Move) => JoystickId::Move,
            Some(TouchZone::Fire) => JoystickId::Fire,
            None => return,
        };

        let slot = self.slot_mut(joystick);
        if slot.is_some() {
            return;
        }
        *slot = Some(Grab {
            touch: sample.id,
            anchor: sample.position,
            knob: DVec2::ZERO,
        });
        out.push(DeviceEvent::JoystickStart(joystick));
    }

    fn slot(&self, joystick: JoystickId) -> Option<&Grab> {
        match joystick {
            JoystickId::Move => self.move_stick.as_ref(),
            JoystickId::Fire => self.fire_stick.as_ref(),
        }
    }

    fn slot_mut(&mut self, joystick: JoystickId) -> &mut Option<Grab> {
        match joystick {
            JoystickId::Move => &mut self.move_stick,
            JoystickId::Fire => &mut self.fire_stick,
        }
    }

    fn owner_mut(&mut self, touch: u64) -> Option<(JoystickId, &mut Grab)> {
        if let Some(grab) = self.move_stick.as_mut().filter(|grab| grab.touch == touch) {
            return Some((JoystickId::Move, grab));
        }
        self.fire_stick
            .as_mut()
            .filter(|grab| grab.touch == touch)
            .map(|grab| (JoystickId::Fire, grab))
    }
}
