//! TOML configuration file merged with command-line overrides.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use polarity_arena_core::{ArenaConfig, CellSize};
use serde::Deserialize;

/// On-disk configuration. Every field is optional in the file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub(crate) cell_size: f64,
    pub(crate) joystick_radius: f64,
    pub(crate) tick_ms: u64,
    pub(crate) player_radius: f64,
    pub(crate) enemy_radius: f64,
    pub(crate) seed: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cell_size: ArenaConfig::DEFAULT_CELL_SIZE,
            joystick_radius: ArenaConfig::DEFAULT_JOYSTICK_RADIUS,
            tick_ms: duration_millis(ArenaConfig::DEFAULT_TICK_INTERVAL),
            player_radius: ArenaConfig::DEFAULT_PLAYER_RADIUS,
            enemy_radius: ArenaConfig::DEFAULT_ENEMY_RADIUS,
            seed: 0,
        }
    }
}

/// Values supplied on the command line, taking precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) cell_size: Option<f64>,
    pub(crate) joystick_radius: Option<f64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) seed: Option<u64>,
}

impl ConfigFile {
    /// Reads the file at `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies command-line overrides on top of the file values.
    #[must_use]
    pub(crate) fn merge(self, overrides: Overrides) -> Self {
        Self {
            cell_size: overrides.cell_size.unwrap_or(self.cell_size),
            joystick_radius: overrides.joystick_radius.unwrap_or(self.joystick_radius),
            tick_ms: overrides.tick_ms.unwrap_or(self.tick_ms),
            seed: overrides.seed.unwrap_or(self.seed),
            ..self
        }
    }

    /// Validates the values into the session configuration.
    pub(crate) fn arena_config(&self) -> Result<ArenaConfig> {
        let config = ArenaConfig::new(
            CellSize::new(self.cell_size)?,
            self.joystick_radius,
            Duration::from_millis(self.tick_ms),
            self.player_radius,
            self.enemy_radius,
        )?;
        Ok(config)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
