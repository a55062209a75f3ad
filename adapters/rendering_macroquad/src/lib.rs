#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Polarity Arena.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Only the devices of the session's [`InputModality`] are sampled; the other
//! modality's handlers are never consulted.

mod desktop;
mod joysticks;

pub use desktop::{DesktopObservation, DesktopSampler};
pub use joysticks::{TouchLayout, TouchPhase, TouchSample, TouchZone, VirtualJoysticks};

use anyhow::Result;
use glam::DVec2;
use macroquad::{
    input::{
        is_key_pressed, is_key_released, is_mouse_button_pressed, is_mouse_button_released,
        mouse_position, touches, KeyCode, MouseButton,
    },
    shapes::{draw_circle, draw_circle_lines, draw_line},
    text::draw_text,
};
use polarity_arena_core::{ArenaConfig, InputModality, JoystickId, Key};
use polarity_arena_rendering::{
    Color, DrawPlan, DrawPrimitive, FrameInput, Presentation, RenderingBackend, RetainedFrame,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::info;

const OUTLINE_THICKNESS: f32 = 1.5;
const STROKE_THICKNESS: f32 = 2.0;
const LABEL_FONT_SIZE: f32 = 24.0;

const TRACKED_KEYS: [(KeyCode, Key); 5] = [
    (KeyCode::A, Key::A),
    (KeyCode::D, Key::D),
    (KeyCode::S, Key::S),
    (KeyCode::W, Key::W),
    (KeyCode::Space, Key::Space),
];

/// Whether the running platform reports touch input as its primary device.
///
/// Evaluated once per session; the result selects the [`InputModality`].
#[must_use]
pub fn probe_touch_capability() -> bool {
    cfg!(any(target_os = "android", target_os = "ios"))
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    modality: InputModality,
    joystick_radius: f64,
    window_size: (i32, i32),
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            modality: InputModality::detect(probe_touch_capability()),
            joystick_radius: ArenaConfig::DEFAULT_JOYSTICK_RADIUS,
            window_size: (1000, 800),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Selects which devices are sampled for the whole session.
    #[must_use]
    pub fn with_modality(mut self, modality: InputModality) -> Self {
        self.modality = modality;
        self
    }

    /// Sets the virtual joystick travel radius in pixels.
    #[must_use]
    pub fn with_joystick_radius(mut self, radius: f64) -> Self {
        self.joystick_radius = radius;
        self
    }

    /// Sets the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width, height);
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut RetainedFrame) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            modality,
            joystick_radius,
            window_size: (window_width, window_height),
        } = self;

        let Presentation {
            window_title,
            palette,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(?modality, "opening arena window");
        macroquad::Window::from_config(config, async move {
            let mut frame = RetainedFrame::new(palette);
            let mut desktop = DesktopSampler::default();
            let mut joysticks = VirtualJoysticks::new(joystick_radius);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let viewport = DVec2::new(
                    f64::from(macroquad::window::screen_width()),
                    f64::from(macroquad::window::screen_height()),
                );
                let layout = TouchLayout::new(viewport);
                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));

                let mut events = Vec::new();
                match modality {
                    InputModality::Desktop => desktop.sample(&observe_desktop(), &mut events),
                    InputModality::Touch => {
                        for touch in touches() {
                            joysticks.handle(touch_sample(&touch), &layout, &mut events);
                        }
                    }
                }

                let update_start = Instant::now();
                update_frame(
                    FrameInput {
                        dt: frame_dt,
                        events,
                        viewport,
                    },
                    &mut frame,
                );
                let update = update_start.elapsed();

                let render_start = Instant::now();
                draw_plan(frame.plan());
                if modality == InputModality::Touch {
                    draw_touch_overlay(&joysticks, &layout, frame.plan().palette.outline);
                }
                let render = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update,
                    render,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        info!(
                            fps = metrics.per_second,
                            trailing_fps = metrics.trailing_ten_seconds,
                            update_ms = metrics.avg_update.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }

            info!(presented = frame.generation(), "arena window closed");
        });

        Ok(())
    }
}

fn observe_desktop() -> DesktopObservation {
    let (pointer_x, pointer_y) = mouse_position();
    DesktopObservation {
        pressed: TRACKED_KEYS
            .iter()
            .filter(|(code, _)| is_key_pressed(*code))
            .map(|(_, key)| *key)
            .collect(),
        released: TRACKED_KEYS
            .iter()
            .filter(|(code, _)| is_key_released(*code))
            .map(|(_, key)| *key)
            .collect(),
        pointer: DVec2::new(f64::from(pointer_x), f64::from(pointer_y)),
        button_pressed: is_mouse_button_pressed(MouseButton::Left),
        button_released: is_mouse_button_released(MouseButton::Left),
    }
}

fn touch_sample(touch: &macroquad::input::Touch) -> TouchSample {
    let phase = match touch.phase {
        macroquad::input::TouchPhase::Started => TouchPhase::Started,
        macroquad::input::TouchPhase::Moved => TouchPhase::Moved,
        macroquad::input::TouchPhase::Stationary => TouchPhase::Stationary,
        macroquad::input::TouchPhase::Ended => TouchPhase::Ended,
        macroquad::input::TouchPhase::Cancelled => TouchPhase::Cancelled,
    };
    TouchSample {
        id: touch.id,
        phase,
        position: DVec2::new(f64::from(touch.position.x), f64::from(touch.position.y)),
    }
}

fn draw_plan(plan: &DrawPlan) {
    let palette = &plan.palette;
    macroquad::window::clear_background(to_macroquad_color(plan.clear));

    for primitive in &plan.primitives {
        match primitive {
            DrawPrimitive::Circle {
                center,
                radius,
                fill,
            } => {
                let (x, y) = to_screen(*center);
                let radius = *radius as f32;
                draw_circle(x, y, radius, to_macroquad_color(palette.fill(*fill)));
                draw_circle_lines(
                    x,
                    y,
                    radius,
                    OUTLINE_THICKNESS,
                    to_macroquad_color(palette.outline),
                );
            }
            DrawPrimitive::Line { from, to } => {
                draw_segment(*from, *to, to_macroquad_color(palette.shot));
            }
            DrawPrimitive::Marker {
                center,
                half_extent,
            } => {
                let color = to_macroquad_color(palette.marker);
                for (a, b) in marker_segments(*center, *half_extent) {
                    draw_segment(a, b, color);
                }
            }
            DrawPrimitive::Label { position, text } => {
                let (x, y) = to_screen(*position);
                let _ = draw_text(text, x, y, LABEL_FONT_SIZE, to_macroquad_color(palette.text));
            }
        }
    }
}

fn draw_touch_overlay(joysticks: &VirtualJoysticks, layout: &TouchLayout, outline: Color) {
    let color = to_macroquad_color(outline.lighten(0.4));
    let radius = joysticks.radius() as f32;
    for joystick in [JoystickId::Move, JoystickId::Fire] {
        if let Some((anchor, knob)) = joysticks.grabbed(joystick) {
            let (x, y) = to_screen(anchor);
            draw_circle_lines(x, y, radius, OUTLINE_THICKNESS, color);
            let (x, y) = to_screen(knob);
            draw_circle(x, y, radius / 3.0, color);
        }
    }

    let band = layout.button_height() as f32;
    let _ = draw_text(
        "tap to switch polarity",
        12.0,
        band - 8.0,
        LABEL_FONT_SIZE,
        color,
    );
}

fn marker_segments(center: DVec2, half_extent: f64) -> [(DVec2, DVec2); 2] {
    let diagonal = DVec2::splat(half_extent);
    let anti_diagonal = DVec2::new(half_extent, -half_extent);
    [
        (center - diagonal, center + diagonal),
        (center - anti_diagonal, center + anti_diagonal),
    ]
}

fn draw_segment(from: DVec2, to: DVec2, color: macroquad::color::Color) {
    let (x1, y1) = to_screen(from);
    let (x2, y2) = to_screen(to);
    draw_line(x1, y1, x2, y2, STROKE_THICKNESS, color);
}

fn to_screen(point: DVec2) -> (f32, f32) {
    (point.x as f32, point.y as f32)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
