#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Polarity Arena session.

mod config;
mod headless;
mod session;

use std::{
    cell::RefCell,
    path::PathBuf,
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use polarity_arena_bridge::EngineBridge;
use polarity_arena_core::{ArenaConfig, InputModality, SimulationBridge, WELCOME_BANNER};
use polarity_arena_rendering::{FrameInput, Palette, Presentation, RenderingBackend, RetainedFrame};
use polarity_arena_rendering_macroquad::{probe_touch_capability, MacroquadBackend};
use polarity_arena_system_loop_driver::FixedTick;
use polarity_arena_world::{World, ARENA_HEIGHT, ARENA_WIDTH};
use tracing::{debug, info};

use crate::{
    config::{ConfigFile, Overrides},
    session::Session,
};

/// Input devices selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputChoice {
    /// Probe the platform once at startup.
    Auto,
    /// Keyboard and mouse.
    Desktop,
    /// On-screen joysticks.
    Touch,
}

impl InputChoice {
    fn resolve(self, touch_capable: bool) -> InputModality {
        match self {
            Self::Auto => InputModality::detect(touch_capable),
            Self::Desktop => InputModality::Desktop,
            Self::Touch => InputModality::Touch,
        }
    }
}

/// Top-down arena shooter with polarity-matched targets.
#[derive(Debug, Parser)]
#[command(name = "polarity-arena", version)]
struct Args {
    /// TOML file providing arena configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pixels per world unit.
    #[arg(long)]
    cell_size: Option<f64>,
    /// Milliseconds between loop ticks.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Virtual joystick travel radius in pixels.
    #[arg(long)]
    joystick_radius: Option<f64>,
    /// Input devices wired for this session.
    #[arg(long, value_enum, default_value_t = InputChoice::Auto)]
    input: InputChoice,
    /// Seed for the reference engine's enemy placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Run without a window.
    #[arg(long)]
    headless: bool,
    /// Number of scheduled ticks in a headless run.
    #[arg(long, default_value_t = 500)]
    ticks: u64,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            cell_size: self.cell_size,
            joystick_radius: self.joystick_radius,
            tick_ms: self.tick_ms,
            seed: self.seed,
        }
    }

    fn vsync_enabled(&self) -> bool {
        !self.no_vsync
    }
}

/// Entry point for the Polarity Arena command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let file = ConfigFile::load(args.config.as_deref())?.merge(args.overrides());
    let config = file
        .arena_config()
        .context("invalid arena configuration")?;
    let modality = args.input.resolve(probe_touch_capability());

    info!(
        cell_size = config.cell_size().pixels(),
        tick_ms = file.tick_ms,
        seed = file.seed,
        ?modality,
        "{WELCOME_BANNER}"
    );

    let bridge = EngineBridge::new(World::new(file.seed), &config);
    let mut session = Session::new(bridge, modality, &config, Palette::default());

    if args.headless {
        let summary = headless::run(&mut session, config.tick_interval(), args.ticks);
        let stats = session.stats();
        info!(
            plans = summary.plans,
            circles = summary.circles,
            lines = summary.lines,
            skipped_no_player = stats.skipped_no_player,
            skipped_malformed = stats.skipped_malformed,
            missed = stats.missed,
            "headless run finished"
        );
        return Ok(());
    }

    run_windowed(session, &config, modality, &args)
}

fn run_windowed(
    session: Session<EngineBridge<World>>,
    config: &ArenaConfig,
    modality: InputModality,
    args: &Args,
) -> Result<()> {
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync_enabled())
        .with_show_fps(args.show_fps)
        .with_modality(modality)
        .with_joystick_radius(config.joystick_radius());
    let (width, height) = window_size(config);
    let backend = backend.with_window_size(width, height);
    let presentation = Presentation::new("Polarity Arena", Palette::default());

    let schedule = Rc::new(RefCell::new(FixedTick::new(config.tick_interval())));
    let mut windowed = WindowedLoop::new(session, Rc::clone(&schedule));
    let result = backend.run(presentation, move |input, frame| windowed.frame(input, frame));
    schedule.borrow_mut().stop();
    result.context("rendering backend failed")?;

    info!("session closed");
    Ok(())
}

/// Per-frame work of a windowed session, sharing its schedule with teardown.
struct WindowedLoop<B> {
    session: Session<B>,
    schedule: Rc<RefCell<FixedTick>>,
    since_report: Duration,
}

impl<B> WindowedLoop<B>
where
    B: SimulationBridge,
{
    fn new(session: Session<B>, schedule: Rc<RefCell<FixedTick>>) -> Self {
        Self {
            session,
            schedule,
            since_report: Duration::ZERO,
        }
    }

    fn frame(&mut self, input: FrameInput, frame: &mut RetainedFrame) {
        self.session.handle_events(input.events);
        let decision = self.schedule.borrow_mut().poll(Instant::now());
        let _ = self.session.drive(decision, frame);

        self.since_report += input.dt;
        if self.since_report >= Duration::from_secs(1) {
            self.since_report = Duration::ZERO;
            let stats = self.session.stats();
            debug!(
                rendered = stats.rendered,
                skipped_no_player = stats.skipped_no_player,
                skipped_malformed = stats.skipped_malformed,
                missed = stats.missed,
                pushes = self.session.pushes(),
                "tick statistics"
            );
        }
    }
}

/// Window dimensions that show the whole arena at the configured cell size.
fn window_size(config: &ArenaConfig) -> (i32, i32) {
    let cell_size = config.cell_size();
    (
        cell_size.length_to_pixel(ARENA_WIDTH).round() as i32,
        cell_size.length_to_pixel(ARENA_HEIGHT).round() as i32,
    )
}
