#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Polarity Arena control bridge.
//!
//! This crate defines the message surface that connects platform adapters,
//! pure systems, and the external simulation engine. Adapters translate raw
//! platform input into [`DeviceEvent`] values, the input system folds those
//! events into a single [`ControlState`], and a [`SimulationBridge`] forwards
//! that state to the engine. In the other direction the bridge decodes engine
//! state into an immutable [`EntitySnapshot`] that is rendered exactly once.

pub mod wire;

use std::time::Duration;

use glam::DVec2;
use thiserror::Error;

/// Canonical banner emitted when a session boots.
pub const WELCOME_BANNER: &str = "Welcome to Polarity Arena.";

/// Binary sign attribute carried by the player, enemies, and the weapon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// The `+1` polarity, drawn light.
    #[default]
    Positive,
    /// The `-1` polarity, drawn dark.
    Negative,
}

impl Polarity {
    /// Builds a polarity from its signed unit representation.
    ///
    /// Returns `None` for anything other than `1` or `-1`.
    #[must_use]
    pub const fn from_sign(sign: i64) -> Option<Self> {
        match sign {
            1 => Some(Self::Positive),
            -1 => Some(Self::Negative),
            _ => None,
        }
    }

    /// Signed unit representation used on the wire.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// Returns the opposite polarity.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Number of screen pixels covering one world unit.
///
/// A single value is shared by the renderer and the targeting resolver so the
/// two can never disagree about scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSize(f64);

impl CellSize {
    /// Creates a cell size, rejecting non-finite or non-positive values.
    pub fn new(pixels: f64) -> Result<Self, ConfigError> {
        if !pixels.is_finite() || pixels <= 0.0 {
            return Err(ConfigError::InvalidCellSize { pixels });
        }

        Ok(Self(pixels))
    }

    /// Pixels per world unit.
    #[must_use]
    pub const fn pixels(self) -> f64 {
        self.0
    }

    /// Converts a pixel-space position into world units.
    #[must_use]
    pub fn to_world(self, pixel: DVec2) -> DVec2 {
        pixel / self.0
    }

    /// Converts a world-space position into pixels.
    #[must_use]
    pub fn to_pixel(self, world: DVec2) -> DVec2 {
        world * self.0
    }

    /// Converts a world-space length into pixels.
    #[must_use]
    pub fn length_to_pixel(self, world: f64) -> f64 {
        world * self.0
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self(ArenaConfig::DEFAULT_CELL_SIZE)
    }
}

/// Immutable session configuration chosen once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaConfig {
    cell_size: CellSize,
    joystick_radius: f64,
    tick_interval: Duration,
    default_player_radius: f64,
    default_enemy_radius: f64,
}

impl ArenaConfig {
    /// Pixels per world unit used when nothing else is configured.
    pub const DEFAULT_CELL_SIZE: f64 = 20.0;
    /// Pixel distance at which a virtual joystick reports full deflection.
    pub const DEFAULT_JOYSTICK_RADIUS: f64 = 50.0;
    /// Fixed interval between render/advance ticks.
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);
    /// Player radius assumed when the engine omits it, in world units.
    pub const DEFAULT_PLAYER_RADIUS: f64 = 0.25;
    /// Enemy radius assumed when the engine omits it, in world units.
    pub const DEFAULT_ENEMY_RADIUS: f64 = 0.5;

    /// Creates a validated configuration.
    pub fn new(
        cell_size: CellSize,
        joystick_radius: f64,
        tick_interval: Duration,
        default_player_radius: f64,
        default_enemy_radius: f64,
    ) -> Result<Self, ConfigError> {
        if !joystick_radius.is_finite() || joystick_radius <= 0.0 {
            return Err(ConfigError::InvalidJoystickRadius {
                pixels: joystick_radius,
            });
        }
        if tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        for radius in [default_player_radius, default_enemy_radius] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ConfigError::InvalidEntityRadius { radius });
            }
        }

        Ok(Self {
            cell_size,
            joystick_radius,
            tick_interval,
            default_player_radius,
            default_enemy_radius,
        })
    }

    /// Pixels per world unit.
    #[must_use]
    pub const fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    /// Pixel radius of a virtual joystick's travel.
    #[must_use]
    pub const fn joystick_radius(&self) -> f64 {
        self.joystick_radius
    }

    /// Interval between loop ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Player radius substituted when a snapshot omits it.
    #[must_use]
    pub const fn default_player_radius(&self) -> f64 {
        self.default_player_radius
    }

    /// Enemy radius substituted when a snapshot omits it.
    #[must_use]
    pub const fn default_enemy_radius(&self) -> f64 {
        self.default_enemy_radius
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            cell_size: CellSize::default(),
            joystick_radius: Self::DEFAULT_JOYSTICK_RADIUS,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            default_player_radius: Self::DEFAULT_PLAYER_RADIUS,
            default_enemy_radius: Self::DEFAULT_ENEMY_RADIUS,
        }
    }
}

/// Errors reported while validating [`ArenaConfig`] values.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Cell size must be a positive, finite pixel count.
    #[error("cell size must be positive and finite (received {pixels})")]
    InvalidCellSize {
        /// Rejected value.
        pixels: f64,
    },
    /// Joystick radius must be a positive, finite pixel count.
    #[error("joystick radius must be positive and finite (received {pixels})")]
    InvalidJoystickRadius {
        /// Rejected value.
        pixels: f64,
    },
    /// The loop cannot tick at a zero interval.
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
    /// Default entity radii must be positive and finite.
    #[error("default entity radius must be positive and finite (received {radius})")]
    InvalidEntityRadius {
        /// Rejected value.
        radius: f64,
    },
}

/// Canonical control vector forwarded to the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlState {
    /// Desired movement direction; each axis lies in `[-1, 1]`.
    pub movement: DVec2,
    /// Absolute aim point in world units, if any input has aimed yet.
    pub aim: Option<DVec2>,
    /// Whether the weapon trigger is held.
    pub firing: bool,
    /// Polarity applied to fired shots.
    pub polarity: Polarity,
}

/// Keys the arena listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// `KeyA`, move left.
    A,
    /// `KeyD`, move right.
    D,
    /// `KeyS`, move down.
    S,
    /// `KeyW`, move up.
    W,
    /// Spacebar, toggles weapon polarity.
    Space,
}

/// Identifies one of the two on-screen joysticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoystickId {
    /// Left joystick controlling movement.
    Move,
    /// Right joystick controlling aim and trigger.
    Fire,
}

/// Physical origin of a device event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceSource {
    /// Hardware keyboard.
    Keyboard,
    /// Mouse or other desktop pointer.
    Mouse,
    /// Touch joystick controlling movement.
    TouchJoystickMove,
    /// Touch joystick controlling aim and trigger.
    TouchJoystickFire,
}

impl From<JoystickId> for DeviceSource {
    fn from(joystick: JoystickId) -> Self {
        match joystick {
            JoystickId::Move => Self::TouchJoystickMove,
            JoystickId::Fire => Self::TouchJoystickFire,
        }
    }
}

/// Platform input translated into the arena's vocabulary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceEvent {
    /// A key transitioned to pressed.
    KeyDown(Key),
    /// A key transitioned to released.
    KeyUp(Key),
    /// The pointer moved to the provided viewport position in pixels.
    PointerMoved {
        /// Pointer position in viewport pixels.
        pixel: DVec2,
    },
    /// The primary pointer button was pressed.
    PointerDown,
    /// The primary pointer button was released.
    PointerUp,
    /// A joystick was grabbed.
    JoystickStart(JoystickId),
    /// A grabbed joystick moved.
    JoystickMoved {
        /// Joystick that moved.
        joystick: JoystickId,
        /// Knob offset from the joystick anchor, in joystick-local pixels.
        offset: DVec2,
    },
    /// A joystick was released.
    JoystickEnd(JoystickId),
    /// Dedicated polarity toggle action, available in every modality.
    TogglePolarity,
}

impl DeviceEvent {
    /// Device that produced the event, or `None` for modality-neutral actions.
    #[must_use]
    pub const fn source(&self) -> Option<DeviceSource> {
        match self {
            Self::KeyDown(_) | Self::KeyUp(_) => Some(DeviceSource::Keyboard),
            Self::PointerMoved { .. } | Self::PointerDown | Self::PointerUp => {
                Some(DeviceSource::Mouse)
            }
            Self::JoystickStart(JoystickId::Move)
            | Self::JoystickEnd(JoystickId::Move)
            | Self::JoystickMoved {
                joystick: JoystickId::Move,
                ..
            } => Some(DeviceSource::TouchJoystickMove),
            Self::JoystickStart(JoystickId::Fire)
            | Self::JoystickEnd(JoystickId::Fire)
            | Self::JoystickMoved {
                joystick: JoystickId::Fire,
                ..
            } => Some(DeviceSource::TouchJoystickFire),
            Self::TogglePolarity => None,
        }
    }
}

/// Input modality that is live for the whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputModality {
    /// Keyboard movement with mouse aiming.
    Desktop,
    /// Dual on-screen joysticks.
    Touch,
}

impl InputModality {
    /// Resolves the modality from a one-time touch capability probe.
    #[must_use]
    pub const fn detect(touch_capable: bool) -> Self {
        if touch_capable {
            Self::Touch
        } else {
            Self::Desktop
        }
    }

    /// Whether events from `source` are wired in this modality.
    #[must_use]
    pub const fn accepts(self, source: DeviceSource) -> bool {
        matches!(
            (self, source),
            (Self::Desktop, DeviceSource::Keyboard)
                | (Self::Desktop, DeviceSource::Mouse)
                | (Self::Touch, DeviceSource::TouchJoystickMove)
                | (Self::Touch, DeviceSource::TouchJoystickFire)
        )
    }
}

/// Circular entity reported by the simulation, positioned in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    /// Centre of the entity in world units.
    pub position: DVec2,
    /// Radius in world units.
    pub radius: f64,
    /// Polarity that decides the entity's fill.
    pub polarity: Polarity,
}

/// Shot trace reported by the simulation, in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Start of the trace.
    pub from: DVec2,
    /// End of the trace.
    pub to: DVec2,
}

/// One decoded read of simulation state, rendered exactly once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySnapshot {
    /// The player, absent before spawn and after death.
    pub player: Option<Entity>,
    /// Enemies in engine order.
    pub enemies: Vec<Entity>,
    /// Shot traces visible this step.
    pub shots: Vec<Shot>,
    /// Enemies destroyed so far.
    pub score: u32,
    /// Most recent shot impact point, if any.
    pub heat: Option<DVec2>,
}

impl EntitySnapshot {
    /// Position of the player, if present.
    #[must_use]
    pub fn player_position(&self) -> Option<DVec2> {
        self.player.map(|player| player.position)
    }
}

/// Failures encountered while decoding a pulled snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload was not a well-formed snapshot document.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The payload declared a protocol version this bridge does not speak.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    /// An entity carried a polarity other than `1` or `-1`.
    #[error("entity polarity must be 1 or -1 (received {0})")]
    InvalidPolarity(i64),
    /// An entity radius was zero or negative.
    #[error("entity radius must be positive (received {0})")]
    InvalidRadius(f64),
    /// A coordinate or radius was NaN or infinite.
    #[error("snapshot field `{field}` is not finite")]
    NonFiniteCoordinate {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Narrow command/query contract between the control core and the simulation.
///
/// All three calls are synchronous and must not block for longer than the
/// engine's own step takes.
pub trait SimulationBridge {
    /// Forwards the latest control vector. Fire-and-forget.
    fn push(&mut self, control: &ControlState);

    /// Reads and decodes the current simulation state.
    fn pull(&mut self) -> Result<EntitySnapshot, SnapshotError>;

    /// Requests exactly one simulation step.
    fn advance(&mut self);
}

/// Opaque simulation engine speaking the serialized protocol.
pub trait Engine {
    /// Accepts a serialized [`wire::ControlFrame`].
    fn receive_control(&mut self, payload: &str);

    /// Serializes the current state as a [`wire::SnapshotDocument`].
    fn state(&self) -> String;

    /// Advances the simulation by one step.
    fn step(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_round_trips_pixels_through_world_units() {
        let cell_size = CellSize::new(20.0).expect("positive cell size");
        let samples = [
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 100.0),
            DVec2::new(-13.5, 7.25),
            DVec2::new(1919.0, 1079.0),
            DVec2::new(0.001, 123_456.789),
        ];

        for pixel in samples {
            let round_trip = cell_size.to_pixel(cell_size.to_world(pixel));
            assert!(
                (round_trip - pixel).length() < 1e-9,
                "{pixel:?} became {round_trip:?}"
            );
        }
    }

    #[test]
    fn cell_size_rejects_degenerate_values() {
        assert!(matches!(
            CellSize::new(0.0),
            Err(ConfigError::InvalidCellSize { .. })
        ));
        assert!(CellSize::new(-4.0).is_err());
        assert!(CellSize::new(f64::NAN).is_err());
        assert!(CellSize::new(f64::INFINITY).is_err());
    }

    #[test]
    fn config_rejects_zero_tick_interval() {
        let error = ArenaConfig::new(CellSize::default(), 50.0, Duration::ZERO, 0.25, 0.5)
            .expect_err("zero interval must be rejected");

        assert_eq!(error, ConfigError::ZeroTickInterval);
    }

    #[test]
    fn config_defaults_match_documented_constants() {
        let config = ArenaConfig::default();

        assert_eq!(config.cell_size().pixels(), 20.0);
        assert_eq!(config.joystick_radius(), 50.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn polarity_flips_and_maps_to_signs() {
        assert_eq!(Polarity::Positive.flipped(), Polarity::Negative);
        assert_eq!(Polarity::Negative.flipped(), Polarity::Positive);
        assert_eq!(Polarity::from_sign(-1), Some(Polarity::Negative));
        assert_eq!(Polarity::from_sign(0), None);
        assert_eq!(Polarity::Negative.sign(), -1);
    }

    #[test]
    fn modalities_wire_disjoint_sources() {
        let sources = [
            DeviceSource::Keyboard,
            DeviceSource::Mouse,
            DeviceSource::TouchJoystickMove,
            DeviceSource::TouchJoystickFire,
        ];

        for source in sources {
            assert_ne!(
                InputModality::Desktop.accepts(source),
                InputModality::Touch.accepts(source),
                "{source:?} must be live in exactly one modality"
            );
        }
    }

    #[test]
    fn joystick_events_report_their_joystick_source() {
        let event = DeviceEvent::JoystickMoved {
            joystick: JoystickId::Fire,
            offset: DVec2::new(3.0, 4.0),
        };

        assert_eq!(event.source(), Some(DeviceSource::TouchJoystickFire));
        assert_eq!(DeviceEvent::TogglePolarity.source(), None);
    }
}
