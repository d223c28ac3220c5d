use std::ops::{Deref, DerefMut};

use log::trace;

use crate::error::StoreResult;
use crate::id::{ObjectId, ObjectType};
use crate::notify::StoreEvent;
use crate::schema::{CommonPrefs, Preferences, PrefsPatch, ScenarioProperties};
use crate::store::{with_kind, EntityKind, MemoryDataStore};

use super::{commit_preferences, commit_settings, PrefsEffects};

/// Scratch copy of an entity's properties.
pub struct PropertiesTransaction<'a, K: EntityKind> {
    store: &'a mut MemoryDataStore,
    id: ObjectId,
    scratch: K::Properties,
    changed: Option<bool>,
}

impl<'a, K: EntityKind> PropertiesTransaction<'a, K> {
    pub(crate) fn new(store: &'a mut MemoryDataStore, id: ObjectId) -> Option<Self> {
        let scratch = store.properties::<K>(id)?.clone();
        Some(Self {
            store,
            id,
            scratch,
            changed: None,
        })
    }

    /// Entity being edited.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Replaces the live properties if the scratch copy differs.
    pub fn commit(mut self) {
        let changed = self
            .store
            .entry_mut::<K>(self.id)
            .is_some_and(|entry| commit_settings(&mut entry.properties, &self.scratch));
        if changed {
            self.store.has_changed = true;
        }
        self.changed = Some(changed);
    }
}

impl<K: EntityKind> Deref for PropertiesTransaction<'_, K> {
    type Target = K::Properties;

    fn deref(&self) -> &Self::Target {
        &self.scratch
    }
}

impl<K: EntityKind> DerefMut for PropertiesTransaction<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scratch
    }
}

impl<K: EntityKind> Drop for PropertiesTransaction<'_, K> {
    fn drop(&mut self) {
        match self.changed {
            Some(true) => self.store.notify(&[StoreEvent::PropertiesChange { id: self.id }]),
            Some(false) => {}
            None => trace!("discarded properties transaction for {}", self.id),
        }
    }
}

/// Scratch copy of an entity's preferences.
pub struct PrefsTransaction<'a, K: EntityKind> {
    store: &'a mut MemoryDataStore,
    id: ObjectId,
    scratch: K::Prefs,
    effects: Option<PrefsEffects>,
}

impl<'a, K: EntityKind> PrefsTransaction<'a, K> {
    pub(crate) fn new(store: &'a mut MemoryDataStore, id: ObjectId) -> Option<Self> {
        let scratch = store.prefs::<K>(id)?.clone();
        Some(Self {
            store,
            id,
            scratch,
            effects: None,
        })
    }

    /// Entity being edited.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Applies a preference patch to the scratch copy.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPatch`](crate::StoreError::InvalidPatch)
    /// if the patch does not fit the preferences; the scratch copy is unchanged.
    pub fn apply_patch(&mut self, patch: &PrefsPatch) -> StoreResult<()> {
        patch.apply_to(&mut self.scratch)
    }

    /// Replaces the live preferences if the scratch copy differs.
    pub fn commit(mut self) {
        self.effects = Some(self.store.commit_prefs::<K>(self.id, &self.scratch));
    }
}

impl<K: EntityKind> Deref for PrefsTransaction<'_, K> {
    type Target = K::Prefs;

    fn deref(&self) -> &Self::Target {
        &self.scratch
    }
}

impl<K: EntityKind> DerefMut for PrefsTransaction<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scratch
    }
}

impl<K: EntityKind> Drop for PrefsTransaction<'_, K> {
    fn drop(&mut self) {
        match self.effects.take() {
            Some(effects) => self.store.release_prefs(self.id, effects),
            None => trace!("discarded prefs transaction for {}", self.id),
        }
    }
}

/// Scratch copy of the common preferences of an entity of any type.
pub struct CommonPrefsTransaction<'a> {
    store: &'a mut MemoryDataStore,
    id: ObjectId,
    kind: ObjectType,
    scratch: CommonPrefs,
    effects: Option<PrefsEffects>,
}

impl<'a> CommonPrefsTransaction<'a> {
    pub(crate) fn new(store: &'a mut MemoryDataStore, id: ObjectId) -> Option<Self> {
        let scratch = store.common_prefs(id)?.clone();
        let kind = store.object_type(id);
        Some(Self {
            store,
            id,
            kind,
            scratch,
            effects: None,
        })
    }

    /// Entity being edited.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Type of the entity being edited.
    #[must_use]
    pub const fn kind(&self) -> ObjectType {
        self.kind
    }

    /// Replaces the live common preferences if the scratch copy differs.
    pub fn commit(mut self) {
        let (id, store, scratch) = (self.id, &mut *self.store, &self.scratch);
        let effects = with_kind!(
            self.kind,
            K => store.commit_common_prefs::<K>(id, scratch),
            else PrefsEffects::default()
        );
        self.effects = Some(effects);
    }
}

impl Deref for CommonPrefsTransaction<'_> {
    type Target = CommonPrefs;

    fn deref(&self) -> &Self::Target {
        &self.scratch
    }
}

impl DerefMut for CommonPrefsTransaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scratch
    }
}

impl Drop for CommonPrefsTransaction<'_> {
    fn drop(&mut self) {
        match self.effects.take() {
            Some(effects) => self.store.release_prefs(self.id, effects),
            None => trace!("discarded common prefs transaction for {}", self.id),
        }
    }
}

/// Scratch copy of the scenario properties.
pub struct ScenarioPropertiesTransaction<'a> {
    store: &'a mut MemoryDataStore,
    scratch: ScenarioProperties,
    changed: Option<bool>,
}

impl<'a> ScenarioPropertiesTransaction<'a> {
    pub(crate) fn new(store: &'a mut MemoryDataStore) -> Self {
        let scratch = store.scenario.clone();
        Self {
            store,
            scratch,
            changed: None,
        }
    }

    /// Replaces the scenario properties if the scratch copy differs.
    pub fn commit(mut self) {
        let changed = commit_settings(&mut self.store.scenario, &self.scratch);
        if changed {
            self.store.has_changed = true;
        }
        self.changed = Some(changed);
    }
}

impl Deref for ScenarioPropertiesTransaction<'_> {
    type Target = ScenarioProperties;

    fn deref(&self) -> &Self::Target {
        &self.scratch
    }
}

impl DerefMut for ScenarioPropertiesTransaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scratch
    }
}

impl Drop for ScenarioPropertiesTransaction<'_> {
    fn drop(&mut self) {
        match self.changed {
            Some(true) => self.store.notify_scenario_listeners(),
            Some(false) => {}
            None => trace!("discarded scenario properties transaction"),
        }
    }
}

impl MemoryDataStore {
    /// Opens a properties transaction on a `K` entity.
    pub fn mutable_properties<K: EntityKind>(&mut self, id: ObjectId) -> Option<PropertiesTransaction<'_, K>> {
        PropertiesTransaction::new(self, id)
    }

    /// Opens a preferences transaction on a `K` entity.
    pub fn mutable_prefs<K: EntityKind>(&mut self, id: ObjectId) -> Option<PrefsTransaction<'_, K>> {
        PrefsTransaction::new(self, id)
    }

    /// Opens a transaction on the common preferences of any entity.
    pub fn mutable_common_prefs(&mut self, id: ObjectId) -> Option<CommonPrefsTransaction<'_>> {
        CommonPrefsTransaction::new(self, id)
    }

    /// Opens a transaction on the scenario properties.
    pub fn mutable_scenario_properties(&mut self) -> ScenarioPropertiesTransaction<'_> {
        ScenarioPropertiesTransaction::new(self)
    }

    pub(crate) fn commit_prefs<K: EntityKind>(&mut self, id: ObjectId, scratch: &K::Prefs) -> PrefsEffects {
        let Some(entry) = self.entry_mut::<K>(id) else {
            return PrefsEffects::default();
        };
        let effects = commit_preferences(&mut entry.prefs, scratch);
        if effects.changed {
            self.apply_data_limiting(id);
            self.has_changed = true;
        }
        effects
    }

    fn commit_common_prefs<K: EntityKind>(&mut self, id: ObjectId, common: &CommonPrefs) -> PrefsEffects {
        let Some(mut prefs) = self.prefs::<K>(id).cloned() else {
            return PrefsEffects::default();
        };
        prefs.common_mut().clone_from(common);
        self.commit_prefs::<K>(id, &prefs)
    }

    /// Updates the name index and notifies observers of a committed change.
    pub(crate) fn release_prefs(&mut self, id: ObjectId, effects: PrefsEffects) {
        if !effects.changed {
            return;
        }
        if effects.old_name != effects.new_name {
            self.name_cache.name_change(&effects.new_name, &effects.old_name, id);
        }
        if effects.name_changed {
            self.notify(&[StoreEvent::PrefsChange { id }, StoreEvent::NameChange { id }]);
        } else {
            self.notify(&[StoreEvent::PrefsChange { id }]);
        }
    }
}
