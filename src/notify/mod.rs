//! Observer protocol of the store.
//!
//! Observers are registered as `Rc<dyn …>` and held weakly. Every dispatch
//! works on a snapshot taken before the first callback, so callbacks may add
//! or remove entities and observers (including themselves) while the store is
//! notifying. An observer removed mid-dispatch receives no further callbacks
//! from that dispatch.

mod list;

pub(crate) use list::ListenerList;

use crate::id::{ObjectId, ObjectType};
use crate::store::MemoryDataStore;

/// Receives entity lifecycle and change notifications.
///
/// Every method has an empty default, so implementors only override what they
/// care about. All callbacks receive the store mutably and may modify it.
#[allow(unused_variables)]
pub trait DataStoreListener {
    /// An entity was committed.
    fn on_add_entity(&self, store: &mut MemoryDataStore, id: ObjectId, kind: ObjectType) {}

    /// An entity is about to be removed; it is still readable.
    fn on_remove_entity(&self, store: &mut MemoryDataStore, id: ObjectId, kind: ObjectType) {}

    /// An entity and its hosted subtree are gone.
    fn on_post_remove_entity(&self, store: &mut MemoryDataStore, id: ObjectId, kind: ObjectType) {}

    /// Preferences of `id` changed.
    fn on_prefs_change(&self, store: &mut MemoryDataStore, id: ObjectId) {}

    /// Properties of `id` changed.
    fn on_properties_change(&self, store: &mut MemoryDataStore, id: ObjectId) {}

    /// Name, alias, or the aliasing toggle of `id` changed.
    fn on_name_change(&self, store: &mut MemoryDataStore, id: ObjectId) {}

    /// Current category data of `id` changed during an update.
    fn on_category_data_change(&self, store: &mut MemoryDataStore, id: ObjectId, kind: ObjectType) {}

    /// Data of `id` was flushed (`0` for a scenario-wide flush).
    fn on_flush(&self, store: &mut MemoryDataStore, id: ObjectId) {}

    /// An update pass finished.
    fn on_change(&self, store: &mut MemoryDataStore) {}

    /// The scenario is being cleared.
    fn on_scenario_delete(&self, store: &mut MemoryDataStore) {}
}

/// Receives scenario property changes.
pub trait ScenarioListener {
    /// Scenario properties changed.
    fn on_scenario_properties_change(&self, store: &mut MemoryDataStore);
}

/// Receives every new data point as it is committed.
#[allow(unused_variables)]
pub trait NewUpdatesListener {
    /// An update (not a command) was committed for `id`.
    fn on_entity_update(&self, store: &mut MemoryDataStore, id: ObjectId, time: f64) {}

    /// Data of `id` was flushed.
    fn on_flush(&self, store: &mut MemoryDataStore, id: ObjectId) {}

    /// A row was added to table `table` of `owner`.
    fn on_new_row_data(&self, store: &mut MemoryDataStore, owner: ObjectId, table: &str, time: f64) {}
}

/// A notification delivered to [`DataStoreListener`]s.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    AddEntity { id: ObjectId, kind: ObjectType },
    RemoveEntity { id: ObjectId, kind: ObjectType },
    PostRemoveEntity { id: ObjectId, kind: ObjectType },
    PrefsChange { id: ObjectId },
    PropertiesChange { id: ObjectId },
    NameChange { id: ObjectId },
    CategoryDataChange { id: ObjectId, kind: ObjectType },
    Flush { id: ObjectId },
    Change,
    ScenarioDelete,
}

impl StoreEvent {
    /// Invokes the matching callback of `listener`.
    pub fn deliver(self, listener: &dyn DataStoreListener, store: &mut MemoryDataStore) {
        match self {
            Self::AddEntity { id, kind } => listener.on_add_entity(store, id, kind),
            Self::RemoveEntity { id, kind } => listener.on_remove_entity(store, id, kind),
            Self::PostRemoveEntity { id, kind } => listener.on_post_remove_entity(store, id, kind),
            Self::PrefsChange { id } => listener.on_prefs_change(store, id),
            Self::PropertiesChange { id } => listener.on_properties_change(store, id),
            Self::NameChange { id } => listener.on_name_change(store, id),
            Self::CategoryDataChange { id, kind } => listener.on_category_data_change(store, id, kind),
            Self::Flush { id } => listener.on_flush(store, id),
            Self::Change => listener.on_change(store),
            Self::ScenarioDelete => listener.on_scenario_delete(store),
        }
    }
}

impl MemoryDataStore {
    /// Delivers `events`, in order, to each registered listener.
    ///
    /// All events go to one listener before the next listener is called.
    pub(crate) fn notify(&mut self, events: &[StoreEvent]) {
        if events.is_empty() {
            return;
        }
        let mut snapshot = self.listeners.begin_dispatch();
        for slot in 0..snapshot.len() {
            for event in events {
                let Some(listener) = snapshot[slot].clone() else {
                    break;
                };
                event.deliver(&*listener, self);
                self.listeners.check_for_removal(&mut snapshot);
            }
        }
        self.listeners.end_dispatch();
    }

    pub(crate) fn notify_scenario_listeners(&mut self) {
        let mut snapshot = self.scenario_listeners.begin_dispatch();
        for slot in 0..snapshot.len() {
            if let Some(listener) = snapshot[slot].clone() {
                listener.on_scenario_properties_change(self);
                self.scenario_listeners.check_for_removal(&mut snapshot);
            }
        }
        self.scenario_listeners.end_dispatch();
    }

    pub(crate) fn notify_entity_update(&mut self, id: ObjectId, time: f64) {
        if let Some(listener) = self.new_updates_listener.clone() {
            listener.on_entity_update(self, id, time);
        }
    }

    pub(crate) fn notify_new_updates_flush(&mut self, id: ObjectId) {
        if let Some(listener) = self.new_updates_listener.clone() {
            listener.on_flush(self, id);
        }
    }

    pub(crate) fn notify_new_row(&mut self, owner: ObjectId, table: &str, time: f64) {
        if let Some(listener) = self.new_updates_listener.clone() {
            listener.on_new_row_data(self, owner, table, time);
        }
    }
}
