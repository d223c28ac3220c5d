use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::schema::DataLimits;

use super::EntityProperties;

/// How a beam's samples are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamType {
    /// Azimuth/elevation in the world frame.
    #[default]
    AbsolutePosition,
    /// Azimuth/elevation relative to the host's body.
    BodyRelative,
    /// Pointed from the host at a target platform; samples are synthesized.
    Target,
}

/// How a gate's samples are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateType {
    /// Azimuth/elevation in the world frame.
    #[default]
    Absolute,
    /// Azimuth/elevation relative to the host's body.
    BodyRelative,
    /// Ranges relative to a target beam; samples are synthesized.
    Target,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    /// Icon or model hint for renderers.
    pub icon: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    pub host_id: ObjectId,
    pub beam_type: BeamType,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    pub host_id: ObjectId,
    pub gate_type: GateType,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    pub host_id: ObjectId,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    /// Platform or beam the projector is attached to.
    pub host_id: ObjectId,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LobGroupProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    pub host_id: ObjectId,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRenderingProperties {
    pub(crate) id: ObjectId,
    pub original_id: u64,
    pub host_id: ObjectId,
    /// Name of the renderer plug-in that draws this entity.
    pub renderer: String,
}

impl EntityProperties for PlatformProperties {
    fn for_id(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn original_id(&self) -> u64 {
        self.original_id
    }

    fn host_id(&self) -> Option<ObjectId> {
        None
    }
}

macro_rules! impl_hosted_properties {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EntityProperties for $ty {
                fn for_id(id: ObjectId) -> Self {
                    Self {
                        id,
                        ..Self::default()
                    }
                }

                fn id(&self) -> ObjectId {
                    self.id
                }

                fn original_id(&self) -> u64 {
                    self.original_id
                }

                fn host_id(&self) -> Option<ObjectId> {
                    (!self.host_id.is_scenario()).then_some(self.host_id)
                }
            }
        )*
    };
}

impl_hosted_properties!(
    BeamProperties,
    GateProperties,
    LaserProperties,
    ProjectorProperties,
    LobGroupProperties,
    CustomRenderingProperties,
);

/// Scenario-wide settings (conceptually the properties of id `0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioProperties {
    /// Year that scenario time `0.0` starts in.
    pub reference_year: i32,
    /// Free-form scenario description.
    pub description: String,
    /// Point limit for scenario-level generic data and tables.
    pub data_limit_points: u32,
    /// Time-span limit for scenario-level generic data and tables.
    pub data_limit_time: f64,
    /// Drop generic data values equal to the current value while limiting.
    pub ignore_duplicate_generic_data: bool,
}

impl Default for ScenarioProperties {
    fn default() -> Self {
        Self {
            reference_year: 1970,
            description: String::new(),
            data_limit_points: 0,
            data_limit_time: -1.0,
            ignore_duplicate_generic_data: false,
        }
    }
}

impl ScenarioProperties {
    /// Data-limiting thresholds for scenario-level data.
    #[must_use]
    pub const fn limits(&self) -> DataLimits {
        DataLimits::new(self.data_limit_points, self.data_limit_time)
    }
}
