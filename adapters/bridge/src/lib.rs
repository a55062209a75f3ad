#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation bridge that speaks the serialized engine protocol.
//!
//! [`EngineBridge`] can only be built around an engine value that already
//! exists, so there is no "bridge used before the engine is ready" state to
//! guard at runtime. Snapshots returned by [`SimulationBridge::pull`] are
//! owned by the caller and dropped at the end of the tick that used them.

mod decode;

pub use decode::{decode_document, decode_snapshot, DecodeDefaults};

use polarity_arena_core::{
    wire::ControlFrame, ArenaConfig, ControlState, Engine, EntitySnapshot, SimulationBridge,
    SnapshotError,
};
use tracing::{trace, warn};

/// Bridge over an in-process [`Engine`].
#[derive(Debug)]
pub struct EngineBridge<E> {
    engine: E,
    defaults: DecodeDefaults,
    pushes: u64,
    advances: u64,
}

impl<E> EngineBridge<E>
where
    E: Engine,
{
    /// Wraps an initialised engine, taking decode defaults from `config`.
    #[must_use]
    pub fn new(engine: E, config: &ArenaConfig) -> Self {
        Self {
            engine,
            defaults: DecodeDefaults::from(config),
            pushes: 0,
            advances: 0,
        }
    }

    /// Read-only access to the wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of control frames forwarded so far.
    #[must_use]
    pub const fn pushes(&self) -> u64 {
        self.pushes
    }

    /// Number of simulation steps requested so far.
    #[must_use]
    pub const fn advances(&self) -> u64 {
        self.advances
    }

    /// Releases the wrapped engine.
    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }
}

impl<E> SimulationBridge for EngineBridge<E>
where
    E: Engine,
{
    fn push(&mut self, control: &ControlState) {
        let frame = ControlFrame::from(control);
        match serde_json::to_string(&frame) {
            Ok(payload) => {
                trace!(%payload, "forwarding control frame");
                self.engine.receive_control(&payload);
                self.pushes = self.pushes.saturating_add(1);
            }
            // The next device event supersedes a dropped frame.
            Err(error) => warn!(%error, "dropping unserializable control frame"),
        }
    }

    fn pull(&mut self) -> Result<EntitySnapshot, SnapshotError> {
        let payload = self.engine.state();
        decode_snapshot(&payload, &self.defaults)
    }

    fn advance(&mut self) {
        self.engine.step();
        self.advances = self.advances.saturating_add(1);
    }
}
