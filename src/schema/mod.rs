//! Value types held by the store.
//!
//! Properties carry the identity of an entity; the store-assigned id never
//! changes. Preferences are the mutable configuration. Samples are the
//! time-stamped data held in slices.
//!
//! Equality for transaction commits is decided by serialized bytes, not by
//! `PartialEq`, so two values that serialize identically are "unchanged".

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::id::ObjectId;

/// Preference patches carried by commands.
pub mod patch;
/// Per-type preference structs.
pub mod prefs;
/// Per-type property structs.
pub mod properties;
/// Time-stamped samples.
pub mod samples;

pub use patch::PrefsPatch;
pub use prefs::{
    BeamPrefs, CommonPrefs, CustomRenderingPrefs, DataLimits, DefaultPrefs, GatePrefs, LaserPrefs,
    LobGroupPrefs, PlatformPrefs, ProjectorPrefs,
};
pub use properties::{
    BeamProperties, BeamType, CustomRenderingProperties, GateProperties, GateType,
    LaserProperties, LobGroupProperties, PlatformProperties, ProjectorProperties,
    ScenarioProperties,
};
pub use samples::{
    BeamUpdate, CategoryData, CategoryEntry, Command, GateUpdate, GenericData, GenericDataEntry,
    LaserUpdate, LobGroupUpdate, LobPoint, NoUpdate, PlatformUpdate, ProjectorUpdate, Vec3,
};

/// A settings object that can be copied and compared by serialized bytes.
pub trait Settings: Clone + Serialize + DeserializeOwned {
    /// Returns true if both values serialize to the same bytes.
    ///
    /// A value that fails to serialize never compares equal.
    fn serialized_eq(&self, other: &Self) -> bool {
        match (serde_json::to_vec(self), serde_json::to_vec(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> Settings for T where T: Clone + Serialize + DeserializeOwned {}

/// Preferences of one entity type.
pub trait Preferences: Settings + Default + std::fmt::Debug {
    /// Preferences shared by every entity type.
    fn common(&self) -> &CommonPrefs;

    /// Mutable access to the shared preferences.
    fn common_mut(&mut self) -> &mut CommonPrefs;
}

/// Properties of one entity type.
pub trait EntityProperties: Settings + std::fmt::Debug {
    /// Blank properties for a freshly allocated id.
    fn for_id(id: ObjectId) -> Self;

    /// Store-assigned id.
    fn id(&self) -> ObjectId;

    /// User-supplied id from the data source.
    fn original_id(&self) -> u64;

    /// Host entity, or `None` for roots and unset hosts.
    fn host_id(&self) -> Option<ObjectId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_eq_detects_change() {
        let a = PlatformPrefs::default();
        let mut b = a.clone();
        assert!(a.serialized_eq(&b));

        b.common.name = "ownship".to_string();
        assert!(!a.serialized_eq(&b));
    }

    #[test]
    fn test_properties_for_id() {
        let props = BeamProperties::for_id(ObjectId::new(4));
        assert_eq!(props.id(), ObjectId::new(4));
        assert_eq!(props.host_id(), None);
        assert_eq!(props.original_id(), 0);
    }
}
