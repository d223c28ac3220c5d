use std::mem;
use std::ops::{Deref, DerefMut};

use log::{debug, trace};

use crate::id::ObjectId;
use crate::notify::StoreEvent;
use crate::schema::{EntityProperties, Preferences};
use crate::slice::{CategoryDataSlice, GenericDataSlice};
use crate::store::{EntityKind, Entry, MemoryDataStore};

/// A new entity awaiting commit.
///
/// Dereferences to the entity's properties. The id is allocated up front but
/// the entity only becomes visible on [`commit`](Self::commit); observers see
/// `on_add_entity` once the guard is dropped.
pub struct NewEntryTransaction<'a, K: EntityKind> {
    store: &'a mut MemoryDataStore,
    properties: K::Properties,
    committed: bool,
}

impl<'a, K: EntityKind> NewEntryTransaction<'a, K> {
    pub(crate) fn new(store: &'a mut MemoryDataStore) -> Self {
        let id = store.ids.next_id();
        Self {
            store,
            properties: K::Properties::for_id(id),
            committed: false,
        }
    }

    /// Id the entity will have.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.properties.id()
    }

    /// Inserts the entity with the store's default preferences.
    pub fn commit(mut self) -> ObjectId {
        let id = self.id();
        let properties = mem::replace(&mut self.properties, K::Properties::for_id(id));
        self.store.commit_new_entry::<K>(properties);
        self.committed = true;
        id
    }
}

impl<K: EntityKind> Deref for NewEntryTransaction<'_, K> {
    type Target = K::Properties;

    fn deref(&self) -> &Self::Target {
        &self.properties
    }
}

impl<K: EntityKind> DerefMut for NewEntryTransaction<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.properties
    }
}

impl<K: EntityKind> Drop for NewEntryTransaction<'_, K> {
    fn drop(&mut self) {
        let id = self.id();
        if self.committed {
            self.store.notify(&[StoreEvent::AddEntity { id, kind: K::TYPE }]);
        } else {
            trace!("discarded new {:?} {id}", K::TYPE);
        }
    }
}

impl MemoryDataStore {
    pub(crate) fn commit_new_entry<K: EntityKind>(&mut self, properties: K::Properties) {
        let id = properties.id();
        let prefs = K::default_prefs(&self.default_prefs).clone();
        let name = prefs.common().name.clone();
        if let Some(old) = K::container_mut(&mut self.entities).insert(id, Entry::new(properties, prefs)) {
            debug!("replaced existing {:?} {id}", K::TYPE);
            self.name_cache.remove_entity(&old.prefs.common().name, id);
        }
        self.generic_data.insert(id, GenericDataSlice::new());
        self.category_data.insert(id, CategoryDataSlice::new());
        self.name_cache.add_entity(&name, id, K::TYPE);
        self.has_changed = true;
        debug!("added {:?} {id}", K::TYPE);
    }
}
