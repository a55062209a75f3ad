#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Loop driver that paces the pull, render, present and advance cycle.
//!
//! Each tick runs strictly in order: [`SimulationBridge::pull`], then (only
//! when a player is present) [`FrameRenderer::render`], [`Surface::present`]
//! and finally [`SimulationBridge::advance`]. The presented frame therefore
//! always shows the state from before the step the tick requested.

mod schedule;

pub use schedule::{FixedTick, TickDecision};

use glam::DVec2;
use polarity_arena_core::SimulationBridge;
use polarity_arena_rendering::{FrameRenderer, Surface};
use tracing::{debug, warn};

/// Result of a single loop tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was presented and the simulation advanced one step.
    Rendered,
    /// The snapshot had no player; nothing was drawn or advanced.
    SkippedNoPlayer,
    /// The snapshot failed to decode; nothing was drawn or advanced.
    SkippedMalformed,
}

/// Counters accumulated across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks that rendered and advanced.
    pub rendered: u64,
    /// Ticks skipped because the player was absent.
    pub skipped_no_player: u64,
    /// Ticks skipped because the snapshot was malformed.
    pub skipped_malformed: u64,
    /// Scheduled ticks dropped because the loop fell behind.
    pub missed: u64,
}

/// Drives one session's render loop against a bridge and a surface.
#[derive(Debug)]
pub struct LoopDriver {
    renderer: FrameRenderer,
    stats: TickStats,
    player: Option<DVec2>,
}

impl LoopDriver {
    /// Creates a driver that renders with `renderer`.
    #[must_use]
    pub fn new(renderer: FrameRenderer) -> Self {
        Self {
            renderer,
            stats: TickStats::default(),
            player: None,
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> TickStats {
        self.stats
    }

    /// Player position from the most recent decodable snapshot.
    ///
    /// Joystick targeting resolves aim relative to this position.
    #[must_use]
    pub const fn player_position(&self) -> Option<DVec2> {
        self.player
    }

    /// Runs a tick when `decision` says one is due.
    pub fn drive<B, S>(
        &mut self,
        decision: TickDecision,
        bridge: &mut B,
        surface: &mut S,
    ) -> Option<TickOutcome>
    where
        B: SimulationBridge + ?Sized,
        S: Surface + ?Sized,
    {
        match decision {
            TickDecision::Due { missed } => {
                self.stats.missed = self.stats.missed.saturating_add(missed);
                Some(self.tick(bridge, surface))
            }
            TickDecision::Wait(_) | TickDecision::Stopped => None,
        }
    }

    /// Runs exactly one tick.
    pub fn tick<B, S>(&mut self, bridge: &mut B, surface: &mut S) -> TickOutcome
    where
        B: SimulationBridge + ?Sized,
        S: Surface + ?Sized,
    {
        let snapshot = match bridge.pull() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "skipping tick on undecodable snapshot");
                self.stats.skipped_malformed = self.stats.skipped_malformed.saturating_add(1);
                return TickOutcome::SkippedMalformed;
            }
        };

        self.player = snapshot.player_position();
        if self.player.is_none() {
            debug!("no player in snapshot, skipping tick");
            self.stats.skipped_no_player = self.stats.skipped_no_player.saturating_add(1);
            return TickOutcome::SkippedNoPlayer;
        }

        let plan = self.renderer.render(&snapshot);
        surface.present(&plan);
        bridge.advance();

        self.stats.rendered = self.stats.rendered.saturating_add(1);
        TickOutcome::Rendered
    }
}
