use std::ops::{Deref, DerefMut};

use crate::id::ObjectId;
use crate::schema::{CategoryData, Command, GenericData, Preferences};
use crate::slice::Sample;
use crate::store::{EntityKind, MemoryDataStore};

/// Stores a committed item into the store.
type Sink<T> = fn(&mut MemoryDataStore, ObjectId, T);

/// One new sample, command, or generic/category datum awaiting commit.
///
/// Dereferences to the item. Dropping the guard without committing discards it.
pub struct NewUpdateTransaction<'a, T> {
    store: &'a mut MemoryDataStore,
    id: ObjectId,
    item: T,
    sink: Sink<T>,
}

impl<'a, T> NewUpdateTransaction<'a, T> {
    fn new(store: &'a mut MemoryDataStore, id: ObjectId, item: T, sink: Sink<T>) -> Self {
        Self {
            store,
            id,
            item,
            sink,
        }
    }

    /// Owner of the item.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Inserts the item in time order.
    pub fn commit(self) {
        let Self { store, id, item, sink } = self;
        sink(store, id, item);
    }
}

impl<T> Deref for NewUpdateTransaction<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> DerefMut for NewUpdateTransaction<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

fn insert_update<K: EntityKind>(store: &mut MemoryDataStore, id: ObjectId, update: K::Update) {
    let limiting = store.data_limiting;
    let Some(entry) = store.entry_mut::<K>(id) else {
        return;
    };
    let time = update.time();
    entry.updates.insert(update);
    if limiting {
        let limits = entry.prefs.common().limits();
        entry.updates.limit(&limits);
    }
    store.has_changed = true;
    store.notify_entity_update(id, time);
}

fn insert_command<K: EntityKind>(store: &mut MemoryDataStore, id: ObjectId, command: Command) {
    let limiting = store.data_limiting;
    let Some(entry) = store.entry_mut::<K>(id) else {
        return;
    };
    entry.commands.insert(command);
    if limiting {
        let limits = entry.prefs.common().limits();
        entry.commands.limit(&limits);
    }
    store.has_changed = true;
}

fn insert_generic_data(store: &mut MemoryDataStore, id: ObjectId, data: GenericData) {
    let ignore_duplicates = store.data_limiting && store.scenario.ignore_duplicate_generic_data;
    let limits = store.limits_for(id);
    let Some(slice) = store.generic_data.get_mut(&id) else {
        return;
    };
    slice.insert(data, ignore_duplicates);
    if let Some(limits) = limits {
        slice.limit(&limits);
    }
    store.has_changed = true;
}

fn insert_category_data(store: &mut MemoryDataStore, id: ObjectId, data: CategoryData) {
    let limits = store.limits_for(id);
    let Some(slice) = store.category_data.get_mut(&id) else {
        return;
    };
    slice.insert(&data, &mut store.category_names);
    if let Some(limits) = limits {
        slice.limit(&limits);
    }
    store.has_changed = true;
}

impl MemoryDataStore {
    /// Opens a new update of a `K` entity.
    ///
    /// Entities without an update time series (custom renderings) do not
    /// satisfy the `Default` bound.
    pub fn add_update<K>(&mut self, id: ObjectId) -> Option<NewUpdateTransaction<'_, K::Update>>
    where
        K: EntityKind,
        K::Update: Default,
    {
        self.entry::<K>(id)?;
        Some(NewUpdateTransaction::new(self, id, K::Update::default(), insert_update::<K>))
    }

    /// Opens a new command of a `K` entity.
    pub fn add_command<K: EntityKind>(&mut self, id: ObjectId) -> Option<NewUpdateTransaction<'_, Command>> {
        self.entry::<K>(id)?;
        Some(NewUpdateTransaction::new(self, id, Command::default(), insert_command::<K>))
    }

    /// Opens new generic data for an entity, or for the scenario with id `0`.
    pub fn add_generic_data(&mut self, id: ObjectId) -> Option<NewUpdateTransaction<'_, GenericData>> {
        self.generic_data.get(&id)?;
        Some(NewUpdateTransaction::new(self, id, GenericData::new(0.0), insert_generic_data))
    }

    /// Opens new category data for an entity.
    pub fn add_category_data(&mut self, id: ObjectId) -> Option<NewUpdateTransaction<'_, CategoryData>> {
        self.category_data.get(&id)?;
        Some(NewUpdateTransaction::new(self, id, CategoryData::new(0.0), insert_category_data))
    }
}
