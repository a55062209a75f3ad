//! Serialized documents exchanged with the simulation engine.
//!
//! The documents are deliberately loose: every field that older engines may
//! omit is optional here, and the bridge applies explicit defaults when it
//! turns a [`SnapshotDocument`] into an [`EntitySnapshot`](crate::EntitySnapshot).

use serde::{Deserialize, Serialize};

use crate::ControlState;

/// Snapshot protocol version emitted by current engines.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Serialized control vector pushed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlFrame {
    /// Movement axes, each in `[-1, 1]`.
    pub movement: [f64; 2],
    /// Aim point in world units.
    pub aim: Option<[f64; 2]>,
    /// Whether the trigger is held.
    pub firing: bool,
    /// Weapon polarity as a signed unit.
    pub polarity: i8,
}

impl From<&ControlState> for ControlFrame {
    fn from(control: &ControlState) -> Self {
        Self {
            movement: control.movement.to_array(),
            aim: control.aim.map(|aim| aim.to_array()),
            firing: control.firing,
            polarity: control.polarity.sign(),
        }
    }
}

/// Snapshot document as produced by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Protocol version; absent in the legacy shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// The player, or `null` before spawn and after death.
    #[serde(default)]
    pub player: Option<EntityRecord>,
    /// Enemies in engine order.
    pub enemies: Vec<EntityRecord>,
    /// Visible shot traces.
    pub shots: Vec<ShotRecord>,
    /// Enemies destroyed so far. Legacy engines call this `scope`.
    #[serde(default, alias = "scope", skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// Most recent impact point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<PointRecord>,
}

/// Serialized circular entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Horizontal position in world units.
    pub x: f64,
    /// Vertical position in world units.
    pub y: f64,
    /// Radius in world units; absent in the legacy shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Signed polarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<i64>,
    /// Legacy colour flag; `true` maps to the positive polarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_white: Option<bool>,
}

/// Serialized shot trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    /// Trace start, horizontal.
    #[serde(rename = "fromX", alias = "from_x")]
    pub from_x: f64,
    /// Trace start, vertical.
    #[serde(rename = "fromY", alias = "from_y")]
    pub from_y: f64,
    /// Trace end, horizontal.
    #[serde(rename = "toX", alias = "to_x")]
    pub to_x: f64,
    /// Trace end, vertical.
    #[serde(rename = "toY", alias = "to_y")]
    pub to_y: f64,
}

/// Serialized point in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}
