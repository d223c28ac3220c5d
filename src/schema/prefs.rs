use serde::{Deserialize, Serialize};

use crate::id::ObjectId;

use super::Preferences;

/// Point-count and time-span limits applied by data limiting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataLimits {
    /// Maximum number of samples kept; `0` keeps all.
    pub points: u32,
    /// Maximum span in seconds between the oldest and newest sample; `<= 0` keeps all.
    pub seconds: f64,
}

impl DataLimits {
    /// No limits.
    pub const NONE: Self = Self {
        points: 0,
        seconds: 0.0,
    };

    /// Creates limits from a point count and a time span.
    #[must_use]
    pub const fn new(points: u32, seconds: f64) -> Self {
        Self { points, seconds }
    }

    /// Returns the point limit, if any.
    #[must_use]
    pub fn max_points(&self) -> Option<usize> {
        (self.points > 0).then_some(self.points as usize)
    }

    /// Returns the time-span limit, if any.
    #[must_use]
    pub fn max_seconds(&self) -> Option<f64> {
        (self.seconds > 0.0).then_some(self.seconds)
    }

    /// Returns true if neither limit is active.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_points().is_none() && self.max_seconds().is_none()
    }
}

/// Preferences shared by every entity type.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonPrefs {
    pub name: String,
    pub alias: String,
    pub use_alias: bool,
    /// Draw the entity at all.
    pub draw: bool,
    /// Publish time-series data; when off the current sample is cleared.
    pub data_draw: bool,
    /// RGBA color.
    pub color: u32,
    /// Point limit for data limiting; `0` keeps all.
    pub data_limit_points: u32,
    /// Time-span limit for data limiting; `<= 0` keeps all.
    pub data_limit_time: f64,
}

impl Default for CommonPrefs {
    fn default() -> Self {
        Self {
            name: String::new(),
            alias: String::new(),
            use_alias: false,
            draw: true,
            data_draw: true,
            color: 0xFFFF_FFFF,
            data_limit_points: 0,
            data_limit_time: -1.0,
        }
    }
}

impl CommonPrefs {
    /// Name shown to users: the alias when aliasing is on, else the name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.use_alias {
            &self.alias
        } else {
            &self.name
        }
    }

    /// Data-limiting thresholds from these preferences.
    #[must_use]
    pub const fn limits(&self) -> DataLimits {
        DataLimits::new(self.data_limit_points, self.data_limit_time)
    }
}

macro_rules! impl_preferences {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Preferences for $ty {
                fn common(&self) -> &CommonPrefs {
                    &self.common
                }

                fn common_mut(&mut self) -> &mut CommonPrefs {
                    &mut self.common
                }
            }
        )*
    };
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformPrefs {
    pub common: CommonPrefs,
    /// Interpolate position between samples when interpolation is enabled.
    pub interpolate_pos: bool,
}

impl Default for PlatformPrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            interpolate_pos: true,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamPrefs {
    pub common: CommonPrefs,
    pub interpolate_beam_pos: bool,
    /// Target platform of a target beam.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<ObjectId>,
    /// Horizontal beamwidth in radians.
    pub horizontal_width: f64,
    /// Vertical beamwidth in radians.
    pub vertical_width: f64,
}

impl Default for BeamPrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            interpolate_beam_pos: true,
            target_id: None,
            horizontal_width: 3.0_f64.to_radians(),
            vertical_width: 3.0_f64.to_radians(),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePrefs {
    pub common: CommonPrefs,
    pub interpolate_gate_pos: bool,
}

impl Default for GatePrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            interpolate_gate_pos: true,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserPrefs {
    pub common: CommonPrefs,
    /// Drawn length in meters.
    pub max_range: f64,
}

impl Default for LaserPrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            max_range: 100.0,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorPrefs {
    pub common: CommonPrefs,
    pub interpolate_projector_fov: bool,
}

impl Default for ProjectorPrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            interpolate_projector_fov: true,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobGroupPrefs {
    pub common: CommonPrefs,
    /// Most updates composed into the current sample.
    pub max_data_points: u32,
    /// Oldest update age, in seconds, composed into the current sample.
    pub max_data_seconds: f64,
}

impl Default for LobGroupPrefs {
    fn default() -> Self {
        Self {
            common: CommonPrefs::default(),
            max_data_points: 10,
            max_data_seconds: 5.0,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRenderingPrefs {
    pub common: CommonPrefs,
}

impl_preferences!(
    PlatformPrefs,
    BeamPrefs,
    GatePrefs,
    LaserPrefs,
    ProjectorPrefs,
    LobGroupPrefs,
    CustomRenderingPrefs,
);

/// Store-wide defaults copied into each new entity's preferences.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPrefs {
    pub platform: PlatformPrefs,
    pub beam: BeamPrefs,
    pub gate: GatePrefs,
    pub laser: LaserPrefs,
    pub projector: ProjectorPrefs,
    pub lob_group: LobGroupPrefs,
    pub custom_rendering: CustomRenderingPrefs,
}
