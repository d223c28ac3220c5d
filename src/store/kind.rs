//! Entity kinds and their containers.
//!
//! Each entity type is an uninhabited marker implementing the sealed
//! [`EntityKind`] trait. The trait ties the marker to its properties,
//! preferences and update types and to its container inside the store, so
//! one generic code path serves every type.

use std::collections::BTreeMap;
use std::fmt;

use crate::id::{ObjectId, ObjectType};
use crate::schema::{
    BeamPrefs, BeamProperties, BeamUpdate, CustomRenderingPrefs, CustomRenderingProperties,
    DefaultPrefs, EntityProperties, GatePrefs, GateProperties, GateUpdate, LaserPrefs,
    LaserProperties, LaserUpdate, LobGroupPrefs, LobGroupProperties, LobGroupUpdate, NoUpdate,
    PlatformPrefs, PlatformProperties, PlatformUpdate, Preferences, ProjectorPrefs,
    ProjectorProperties, ProjectorUpdate,
};
use crate::slice::{CommandSlice, MemoryDataSlice, Sample};

mod sealed {
    pub trait Sealed {}
}

/// An entity type known to the store.
pub trait EntityKind: sealed::Sealed + Sized + 'static {
    /// Identity fields.
    type Properties: EntityProperties;
    /// Mutable configuration.
    type Prefs: Preferences;
    /// Time-series sample.
    type Update: Sample;

    /// Type bit of this kind.
    const TYPE: ObjectType;

    #[doc(hidden)]
    fn container(entities: &EntityContainers) -> &BTreeMap<ObjectId, Entry<Self>>;

    #[doc(hidden)]
    fn container_mut(entities: &mut EntityContainers) -> &mut BTreeMap<ObjectId, Entry<Self>>;

    #[doc(hidden)]
    fn default_prefs(defaults: &DefaultPrefs) -> &Self::Prefs;
}

/// Everything the store holds for one entity.
pub struct Entry<K: EntityKind> {
    pub(crate) properties: K::Properties,
    pub(crate) prefs: K::Prefs,
    pub(crate) updates: MemoryDataSlice<K::Update>,
    pub(crate) commands: CommandSlice,
}

impl<K: EntityKind> Entry<K> {
    pub(crate) fn new(properties: K::Properties, prefs: K::Prefs) -> Self {
        Self {
            properties,
            prefs,
            updates: MemoryDataSlice::new(),
            commands: CommandSlice::new(),
        }
    }

    /// Identity fields.
    #[must_use]
    pub const fn properties(&self) -> &K::Properties {
        &self.properties
    }

    /// Current preferences.
    #[must_use]
    pub const fn prefs(&self) -> &K::Prefs {
        &self.prefs
    }

    /// Update time series.
    #[must_use]
    pub const fn updates(&self) -> &MemoryDataSlice<K::Update> {
        &self.updates
    }

    /// Command time series.
    #[must_use]
    pub const fn commands(&self) -> &CommandSlice {
        &self.commands
    }
}

impl<K: EntityKind> fmt::Debug for Entry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("properties", &self.properties)
            .field("prefs", &self.prefs)
            .field("updates", &self.updates.num_items())
            .field("commands", &self.commands.num_items())
            .finish()
    }
}

/// Per-type entity maps, ordered by id.
#[derive(Default)]
pub struct EntityContainers {
    pub(crate) platforms: BTreeMap<ObjectId, Entry<Platform>>,
    pub(crate) beams: BTreeMap<ObjectId, Entry<Beam>>,
    pub(crate) gates: BTreeMap<ObjectId, Entry<Gate>>,
    pub(crate) lasers: BTreeMap<ObjectId, Entry<Laser>>,
    pub(crate) projectors: BTreeMap<ObjectId, Entry<Projector>>,
    pub(crate) lob_groups: BTreeMap<ObjectId, Entry<LobGroup>>,
    pub(crate) custom_renderings: BTreeMap<ObjectId, Entry<CustomRendering>>,
}

impl EntityContainers {
    /// Type of `id`, or [`ObjectType::NONE`].
    pub(crate) fn object_type(&self, id: ObjectId) -> ObjectType {
        if self.platforms.contains_key(&id) {
            ObjectType::PLATFORM
        } else if self.beams.contains_key(&id) {
            ObjectType::BEAM
        } else if self.gates.contains_key(&id) {
            ObjectType::GATE
        } else if self.lasers.contains_key(&id) {
            ObjectType::LASER
        } else if self.projectors.contains_key(&id) {
            ObjectType::PROJECTOR
        } else if self.lob_groups.contains_key(&id) {
            ObjectType::LOB_GROUP
        } else if self.custom_renderings.contains_key(&id) {
            ObjectType::CUSTOM_RENDERING
        } else {
            ObjectType::NONE
        }
    }

    /// Ids of `K` entities hosted by `host`.
    pub(crate) fn hosted_by<K: EntityKind>(&self, host: ObjectId) -> Vec<ObjectId> {
        K::container(self)
            .iter()
            .filter(|(_, entry)| entry.properties.host_id() == Some(host))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every entity directly hosted by `host`.
    pub(crate) fn children_of(&self, host: ObjectId) -> Vec<ObjectId> {
        let mut children = self.hosted_by::<Beam>(host);
        children.extend(self.hosted_by::<Gate>(host));
        children.extend(self.hosted_by::<Laser>(host));
        children.extend(self.hosted_by::<Projector>(host));
        children.extend(self.hosted_by::<LobGroup>(host));
        children.extend(self.hosted_by::<CustomRendering>(host));
        children
    }

    pub(crate) fn len(&self) -> usize {
        self.platforms.len()
            + self.beams.len()
            + self.gates.len()
            + self.lasers.len()
            + self.projectors.len()
            + self.lob_groups.len()
            + self.custom_renderings.len()
    }
}

/// Runs `$body` with `$kind` bound to the marker type matching `$object_type`.
///
/// Evaluates `$default` for [`ObjectType::NONE`] or a multi-bit mask.
macro_rules! with_kind {
    ($object_type:expr, $kind:ident => $body:expr, else $default:expr) => {{
        let object_type = $object_type;
        if object_type == $crate::id::ObjectType::PLATFORM {
            type $kind = $crate::store::Platform;
            $body
        } else if object_type == $crate::id::ObjectType::BEAM {
            type $kind = $crate::store::Beam;
            $body
        } else if object_type == $crate::id::ObjectType::GATE {
            type $kind = $crate::store::Gate;
            $body
        } else if object_type == $crate::id::ObjectType::LASER {
            type $kind = $crate::store::Laser;
            $body
        } else if object_type == $crate::id::ObjectType::PROJECTOR {
            type $kind = $crate::store::Projector;
            $body
        } else if object_type == $crate::id::ObjectType::LOB_GROUP {
            type $kind = $crate::store::LobGroup;
            $body
        } else if object_type == $crate::id::ObjectType::CUSTOM_RENDERING {
            type $kind = $crate::store::CustomRendering;
            $body
        } else {
            $default
        }
    }};
}

pub(crate) use with_kind;

macro_rules! entity_kind {
    (
        $(#[$meta:meta])*
        $marker:ident, $bit:ident, $field:ident, $default:ident,
        $props:ty, $prefs:ty, $update:ty
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $marker {}

        impl sealed::Sealed for $marker {}

        impl EntityKind for $marker {
            type Properties = $props;
            type Prefs = $prefs;
            type Update = $update;

            const TYPE: ObjectType = ObjectType::$bit;

            fn container(entities: &EntityContainers) -> &BTreeMap<ObjectId, Entry<Self>> {
                &entities.$field
            }

            fn container_mut(entities: &mut EntityContainers) -> &mut BTreeMap<ObjectId, Entry<Self>> {
                &mut entities.$field
            }

            fn default_prefs(defaults: &DefaultPrefs) -> &Self::Prefs {
                &defaults.$default
            }
        }
    };
}

entity_kind!(
    /// A platform: the root of every hosted subtree.
    Platform, PLATFORM, platforms, platform,
    PlatformProperties, PlatformPrefs, PlatformUpdate
);
entity_kind!(
    /// A beam hosted by a platform.
    Beam, BEAM, beams, beam,
    BeamProperties, BeamPrefs, BeamUpdate
);
entity_kind!(
    /// A gate hosted by a beam.
    Gate, GATE, gates, gate,
    GateProperties, GatePrefs, GateUpdate
);
entity_kind!(
    /// A laser hosted by a platform.
    Laser, LASER, lasers, laser,
    LaserProperties, LaserPrefs, LaserUpdate
);
entity_kind!(
    /// A projector hosted by a platform or a beam.
    Projector, PROJECTOR, projectors, projector,
    ProjectorProperties, ProjectorPrefs, ProjectorUpdate
);
entity_kind!(
    /// A line-of-bearing group hosted by a platform.
    LobGroup, LOB_GROUP, lob_groups, lob_group,
    LobGroupProperties, LobGroupPrefs, LobGroupUpdate
);
entity_kind!(
    /// A custom rendering; it has commands but no update time series.
    CustomRendering, CUSTOM_RENDERING, custom_renderings, custom_rendering,
    CustomRenderingProperties, CustomRenderingPrefs, NoUpdate
);
