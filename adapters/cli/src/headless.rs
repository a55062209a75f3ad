//! Windowless run of the tick loop against a sleeping timer.

use std::{
    thread,
    time::{Duration, Instant},
};

use polarity_arena_core::SimulationBridge;
use polarity_arena_rendering::{DrawPlan, Surface};
use polarity_arena_system_loop_driver::{FixedTick, TickDecision, TickOutcome};
use tracing::info;

use crate::session::Session;

/// Surface that only tallies what it was asked to draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SummarySurface {
    pub(crate) plans: u64,
    pub(crate) circles: u64,
    pub(crate) lines: u64,
}

impl Surface for SummarySurface {
    fn present(&mut self, plan: &DrawPlan) {
        self.plans = self.plans.saturating_add(1);
        self.circles = self.circles.saturating_add(plan.circles().count() as u64);
        self.lines = self.lines.saturating_add(plan.lines().count() as u64);
    }
}

/// Runs up to `ticks` scheduled ticks, stopping early once the round is over.
pub(crate) fn run<B>(session: &mut Session<B>, interval: Duration, ticks: u64) -> SummarySurface
where
    B: SimulationBridge,
{
    let mut schedule = FixedTick::new(interval);
    let mut surface = SummarySurface::default();
    let mut due = 0_u64;

    while due < ticks {
        let decision = schedule.poll(Instant::now());
        match decision {
            TickDecision::Wait(delay) => thread::sleep(delay),
            TickDecision::Stopped => break,
            TickDecision::Due { .. } => {
                due += 1;
                let outcome = session.drive(decision, &mut surface);
                if outcome == Some(TickOutcome::SkippedNoPlayer) && session.stats().rendered > 0 {
                    info!(tick = due, "round over, stopping headless run");
                    schedule.stop();
                }
            }
        }
    }

    schedule.stop();
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarity_arena_bridge::EngineBridge;
    use polarity_arena_core::{ArenaConfig, InputModality};
    use polarity_arena_rendering::Palette;
    use polarity_arena_world::World;

    #[test]
    fn headless_run_presents_one_plan_per_tick() {
        let config = ArenaConfig::default();
        let mut session = Session::new(
            EngineBridge::new(World::new(5), &config),
            InputModality::Desktop,
            &config,
            Palette::default(),
        );

        let summary = run(&mut session, Duration::from_millis(1), 5);

        assert_eq!(summary.plans, 5);
        assert!(summary.circles >= 5 * 11, "player and enemies drawn every tick");
        assert_eq!(session.stats().rendered, 5);
    }
}
