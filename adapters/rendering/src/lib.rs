#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Polarity Arena adapters.
//!
//! [`FrameRenderer::render`] is a pure function from a decoded snapshot to an
//! ordered [`DrawPlan`] expressed in viewport pixels. Backends only rasterise
//! plans; they never look at simulation state themselves.

use anyhow::Result as AnyResult;
use glam::DVec2;
use polarity_arena_core::{ArenaConfig, CellSize, DeviceEvent, Entity, EntitySnapshot, Polarity};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Binary fill applied to circles according to polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fill {
    /// Fill used for the positive polarity.
    Light,
    /// Fill used for the negative polarity.
    Dark,
}

impl From<Polarity> for Fill {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => Self::Light,
            Polarity::Negative => Self::Dark,
        }
    }
}

/// Colors used to resolve abstract fills and strokes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color used to clear the frame.
    pub background: Color,
    /// Fill for [`Fill::Light`].
    pub light: Color,
    /// Fill for [`Fill::Dark`].
    pub dark: Color,
    /// Outline drawn around every circle.
    pub outline: Color,
    /// Stroke used for shot traces.
    pub shot: Color,
    /// Stroke used for the heat marker.
    pub marker: Color,
    /// Color used for labels.
    pub text: Color,
}

impl Palette {
    /// Resolves a fill to a concrete color.
    #[must_use]
    pub const fn fill(&self, fill: Fill) -> Color {
        match fill {
            Fill::Light => self.light,
            Fill::Dark => self.dark,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(128, 128, 128),
            light: Color::from_rgb_u8(245, 245, 245),
            dark: Color::from_rgb_u8(16, 16, 16),
            outline: Color::from_rgb_u8(0, 0, 0),
            shot: Color::from_rgb_u8(255, 221, 64),
            marker: Color::from_rgb_u8(220, 40, 40),
            text: Color::from_rgb_u8(255, 255, 255),
        }
    }
}

/// Single drawing instruction, positioned in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawPrimitive {
    /// Outlined circle filled by polarity.
    Circle {
        /// Centre in pixels.
        center: DVec2,
        /// Radius in pixels.
        radius: f64,
        /// Polarity fill.
        fill: Fill,
    },
    /// Plain stroke without fill.
    Line {
        /// Stroke start in pixels.
        from: DVec2,
        /// Stroke end in pixels.
        to: DVec2,
    },
    /// Diagonal cross centred on a point.
    Marker {
        /// Cross centre in pixels.
        center: DVec2,
        /// Distance from the centre to each arm's end along both axes.
        half_extent: f64,
    },
    /// Text anchored at its top-left corner.
    Label {
        /// Anchor in pixels.
        position: DVec2,
        /// Text to draw.
        text: String,
    },
}

/// Ordered list of primitives that fully describes one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawPlan {
    /// Color the frame is cleared to before any primitive is drawn.
    pub clear: Color,
    /// Colors used to resolve fills and strokes.
    pub palette: Palette,
    /// Primitives in painter's order.
    pub primitives: Vec<DrawPrimitive>,
}

impl DrawPlan {
    /// Plan that only clears the frame.
    #[must_use]
    pub fn empty(palette: Palette) -> Self {
        Self {
            clear: palette.background,
            palette,
            primitives: Vec::new(),
        }
    }

    /// Iterates over every circle as `(center, radius, fill)`.
    pub fn circles(&self) -> impl Iterator<Item = (DVec2, f64, Fill)> + '_ {
        self.primitives.iter().filter_map(|primitive| match primitive {
            DrawPrimitive::Circle {
                center,
                radius,
                fill,
            } => Some((*center, *radius, *fill)),
            _ => None,
        })
    }

    /// Iterates over every line segment as `(from, to)`.
    pub fn lines(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.primitives.iter().filter_map(|primitive| match primitive {
            DrawPrimitive::Line { from, to } => Some((*from, *to)),
            _ => None,
        })
    }
}

/// Pure snapshot-to-plan translator bound to the session's cell size.
#[derive(Clone, Copy, Debug)]
pub struct FrameRenderer {
    cell_size: CellSize,
    palette: Palette,
}

impl FrameRenderer {
    /// Offset of the score label from the viewport's top-left corner.
    pub const SCORE_ANCHOR: DVec2 = DVec2::new(12.0, 24.0);

    /// Creates a renderer using the configured cell size.
    #[must_use]
    pub fn new(config: &ArenaConfig, palette: Palette) -> Self {
        Self {
            cell_size: config.cell_size(),
            palette,
        }
    }

    /// Builds the draw plan for a snapshot.
    ///
    /// Enemies keep the snapshot's order, the player is drawn over them, and
    /// shots and the heat marker are drawn over every circle.
    #[must_use]
    pub fn render(&self, snapshot: &EntitySnapshot) -> DrawPlan {
        let mut primitives = Vec::with_capacity(snapshot.enemies.len() + snapshot.shots.len() + 3);

        primitives.extend(snapshot.enemies.iter().map(|enemy| self.circle(enemy)));
        if let Some(player) = &snapshot.player {
            primitives.push(self.circle(player));
        }

        primitives.extend(snapshot.shots.iter().map(|shot| DrawPrimitive::Line {
            from: self.cell_size.to_pixel(shot.from),
            to: self.cell_size.to_pixel(shot.to),
        }));

        if let Some(heat) = snapshot.heat {
            primitives.push(DrawPrimitive::Marker {
                center: self.cell_size.to_pixel(heat),
                half_extent: self.cell_size.pixels() / 8.0,
            });
        }

        primitives.push(DrawPrimitive::Label {
            position: Self::SCORE_ANCHOR,
            text: format!("Score: {}", snapshot.score),
        });

        DrawPlan {
            clear: self.palette.background,
            palette: self.palette,
            primitives,
        }
    }

    fn circle(&self, entity: &Entity) -> DrawPrimitive {
        DrawPrimitive::Circle {
            center: self.cell_size.to_pixel(entity.position),
            radius: self.cell_size.length_to_pixel(entity.radius),
            fill: Fill::from(entity.polarity),
        }
    }
}

/// Display target that receives finished plans.
pub trait Surface {
    /// Presents a plan. Called once per rendered tick.
    fn present(&mut self, plan: &DrawPlan);
}

/// Surface that keeps the latest plan so a backend can redraw it every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RetainedFrame {
    plan: DrawPlan,
    generation: u64,
}

impl RetainedFrame {
    /// Creates a retained frame holding an empty plan.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            plan: DrawPlan::empty(palette),
            generation: 0,
        }
    }

    /// Latest presented plan.
    #[must_use]
    pub const fn plan(&self) -> &DrawPlan {
        &self.plan
    }

    /// Number of plans presented so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl Surface for RetainedFrame {
    fn present(&mut self, plan: &DrawPlan) {
        self.plan.clone_from(plan);
        self.generation = self.generation.saturating_add(1);
    }
}

/// Input gathered by a backend during one display frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Time elapsed since the previous display frame.
    pub dt: Duration,
    /// Device events observed this frame, in arrival order.
    pub events: Vec<DeviceEvent>,
    /// Viewport size in pixels.
    pub viewport: DVec2,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Palette used until the first plan arrives.
    pub palette: Palette,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, palette: Palette) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            palette,
        }
    }
}

/// Rendering backend capable of presenting Polarity Arena frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the input gathered during
    /// the display frame and may present a new plan to the retained frame,
    /// which the backend then draws.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut RetainedFrame) + 'static;
}
