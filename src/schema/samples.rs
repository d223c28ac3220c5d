use serde::{Deserialize, Serialize};

use super::PrefsPatch;

/// Cartesian triple (position, velocity, or yaw/pitch/roll).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Position sample of a platform.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformUpdate {
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec3>,
}

impl PlatformUpdate {
    /// Sample at `time` with only a position.
    #[must_use]
    pub fn at(time: f64, position: Vec3) -> Self {
        Self {
            time,
            position: Some(position),
            ..Self::default()
        }
    }
}

/// Pointing sample of a beam.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamUpdate {
    pub time: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

/// Extent sample of a gate.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateUpdate {
    pub time: f64,
    pub azimuth: f64,
    pub elevation: f64,
    /// Angular width; `<= 0` means "use the host beam's width".
    pub width: f64,
    /// Angular height; `<= 0` means "use the host beam's height".
    pub height: f64,
    pub min_range: f64,
    pub max_range: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<f64>,
}

/// Orientation sample of a laser.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserUpdate {
    pub time: f64,
    pub orientation: Vec3,
}

/// Field-of-view sample of a projector.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorUpdate {
    pub time: f64,
    /// Horizontal field of view in radians.
    pub fov: f64,
}

/// One line of bearing.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LobPoint {
    pub time: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

/// A batch of lines of bearing reported at one time.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LobGroupUpdate {
    pub time: f64,
    pub datapoints: Vec<LobPoint>,
}

/// Update type of entities that carry no time series of their own.
///
/// It has no values, so updates for such entities cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoUpdate {}

/// A discrete preference change taking effect at `time`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    pub time: f64,
    pub update_prefs: PrefsPatch,
}

impl Command {
    /// Command at `time` applying `patch`.
    #[must_use]
    pub const fn new(time: f64, update_prefs: PrefsPatch) -> Self {
        Self { time, update_prefs }
    }
}

/// Tag/value pair of generic data.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenericDataEntry {
    pub key: String,
    pub value: String,
}

/// Generic tag/value data reported at `time`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericData {
    pub time: f64,
    /// Seconds the values stay valid; negative means until replaced.
    pub duration: f64,
    pub entries: Vec<GenericDataEntry>,
}

impl GenericData {
    /// Creates generic data valid until replaced.
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self {
            time,
            duration: -1.0,
            entries: Vec::new(),
        }
    }

    /// Adds a tag/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(GenericDataEntry {
            key: key.into(),
            value: value.into(),
        });
    }
}

/// Category/value pair of category data.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub value: String,
}

/// Category values reported at `time`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryData {
    pub time: f64,
    pub entries: Vec<CategoryEntry>,
}

impl CategoryData {
    /// Creates empty category data at `time`.
    #[must_use]
    pub const fn new(time: f64) -> Self {
        Self {
            time,
            entries: Vec::new(),
        }
    }

    /// Adds a category/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(CategoryEntry {
            key: key.into(),
            value: value.into(),
        });
    }
}
