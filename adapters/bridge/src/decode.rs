//! Versioned decoding of engine snapshots into [`EntitySnapshot`] values.

use glam::DVec2;
use polarity_arena_core::{
    wire::{EntityRecord, PointRecord, ShotRecord, SnapshotDocument, SNAPSHOT_VERSION},
    ArenaConfig, Entity, EntitySnapshot, Polarity, Shot, SnapshotError,
};

/// Oldest snapshot layout; carries no `version` field.
const LEGACY_VERSION: u32 = 1;

/// Values substituted for fields that older engines omit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeDefaults {
    /// Player radius in world units.
    pub player_radius: f64,
    /// Enemy radius in world units.
    pub enemy_radius: f64,
    /// Polarity assumed when an entity reports none.
    pub polarity: Polarity,
}

impl From<&ArenaConfig> for DecodeDefaults {
    fn from(config: &ArenaConfig) -> Self {
        Self {
            player_radius: config.default_player_radius(),
            enemy_radius: config.default_enemy_radius(),
            polarity: Polarity::Positive,
        }
    }
}

impl Default for DecodeDefaults {
    fn default() -> Self {
        Self::from(&ArenaConfig::default())
    }
}

/// Parses and decodes a serialized snapshot document.
pub fn decode_snapshot(
    payload: &str,
    defaults: &DecodeDefaults,
) -> Result<EntitySnapshot, SnapshotError> {
    let document: SnapshotDocument = serde_json::from_str(payload)?;
    decode_document(&document, defaults)
}

/// Decodes an already parsed snapshot document.
pub fn decode_document(
    document: &SnapshotDocument,
    defaults: &DecodeDefaults,
) -> Result<EntitySnapshot, SnapshotError> {
    let version = document.version.unwrap_or(LEGACY_VERSION);
    if !(LEGACY_VERSION..=SNAPSHOT_VERSION).contains(&version) {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let player = document
        .player
        .as_ref()
        .map(|record| decode_entity(record, defaults.player_radius, defaults))
        .transpose()?;
    let enemies = document
        .enemies
        .iter()
        .map(|record| decode_entity(record, defaults.enemy_radius, defaults))
        .collect::<Result<Vec<_>, _>>()?;
    let shots = document
        .shots
        .iter()
        .map(decode_shot)
        .collect::<Result<Vec<_>, _>>()?;
    let heat = document.heat.as_ref().map(decode_point).transpose()?;

    Ok(EntitySnapshot {
        player,
        enemies,
        shots,
        score: document.score.unwrap_or(0),
        heat,
    })
}

fn decode_entity(
    record: &EntityRecord,
    default_radius: f64,
    defaults: &DecodeDefaults,
) -> Result<Entity, SnapshotError> {
    let position = finite_point(record.x, record.y, "entity position")?;
    let radius = record.radius.unwrap_or(default_radius);
    if !radius.is_finite() {
        return Err(SnapshotError::NonFiniteCoordinate {
            field: "entity radius",
        });
    }
    if radius <= 0.0 {
        return Err(SnapshotError::InvalidRadius(radius));
    }

    let polarity = match (record.polarity, record.is_white) {
        (Some(sign), _) => Polarity::from_sign(sign).ok_or(SnapshotError::InvalidPolarity(sign))?,
        (None, Some(true)) => Polarity::Positive,
        (None, Some(false)) => Polarity::Negative,
        (None, None) => defaults.polarity,
    };

    Ok(Entity {
        position,
        radius,
        polarity,
    })
}

fn decode_shot(record: &ShotRecord) -> Result<Shot, SnapshotError> {
    Ok(Shot {
        from: finite_point(record.from_x, record.from_y, "shot start")?,
        to: finite_point(record.to_x, record.to_y, "shot end")?,
    })
}

fn decode_point(record: &PointRecord) -> Result<DVec2, SnapshotError> {
    finite_point(record.x, record.y, "heat point")
}

fn finite_point(x: f64, y: f64, field: &'static str) -> Result<DVec2, SnapshotError> {
    let point = DVec2::new(x, y);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(SnapshotError::NonFiniteCoordinate { field })
    }
}
