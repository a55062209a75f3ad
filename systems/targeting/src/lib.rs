#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns pointer or joystick input into an absolute aim point.

use glam::DVec2;
use polarity_arena_core::CellSize;

/// Input that can steer the aim point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AimSource {
    /// Pointer position in viewport pixels.
    Pointer {
        /// Pointer position in pixels.
        pixel: DVec2,
    },
    /// Fire joystick knob offset in joystick-local pixels.
    ///
    /// The offset is added to the player's on-screen position as-is; it is
    /// never rescaled by the joystick radius.
    Joystick {
        /// Knob offset from the joystick anchor.
        front_offset: DVec2,
    },
}

/// Targeting resolver bound to the session's cell size.
#[derive(Clone, Copy, Debug, Default)]
pub struct Targeting {
    cell_size: CellSize,
}

impl Targeting {
    /// Creates a resolver using the provided cell size.
    #[must_use]
    pub const fn new(cell_size: CellSize) -> Self {
        Self { cell_size }
    }

    /// Resolves the aim point in world units.
    ///
    /// Joystick aiming is relative to the player, so it yields `None` while no
    /// player is known.
    #[must_use]
    pub fn resolve(&self, source: AimSource, player: Option<DVec2>) -> Option<DVec2> {
        match source {
            AimSource::Pointer { pixel } => Some(self.cell_size.to_world(pixel)),
            AimSource::Joystick { front_offset } => {
                let player = player?;
                let aim_pixel = self.cell_size.to_pixel(player) + front_offset;
                Some(self.cell_size.to_world(aim_pixel))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targeting() -> Targeting {
        Targeting::new(CellSize::new(20.0).expect("valid cell size"))
    }

    #[test]
    fn pointer_aim_ignores_player_presence() {
        let source = AimSource::Pointer {
            pixel: DVec2::new(100.0, 40.0),
        };

        assert_eq!(
            targeting().resolve(source, None),
            Some(DVec2::new(5.0, 2.0))
        );
        assert_eq!(
            targeting().resolve(source, Some(DVec2::new(30.0, 30.0))),
            Some(DVec2::new(5.0, 2.0))
        );
    }

    #[test]
    fn joystick_aim_requires_a_player() {
        let source = AimSource::Joystick {
            front_offset: DVec2::new(25.0, 0.0),
        };

        assert_eq!(targeting().resolve(source, None), None);
    }

    #[test]
    fn joystick_offset_is_added_in_screen_pixels() {
        let source = AimSource::Joystick {
            front_offset: DVec2::new(40.0, -20.0),
        };

        let aim = targeting()
            .resolve(source, Some(DVec2::new(5.0, 5.0)))
            .expect("player present");

        assert!((aim - DVec2::new(7.0, 4.0)).length() < 1e-12);
    }
}
