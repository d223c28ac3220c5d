//! Entity creation, removal and scenario clear.

use log::{debug, trace};

use crate::id::{ObjectId, ObjectType};
use crate::notify::StoreEvent;
use crate::slice::GenericDataSlice;
use crate::transaction::NewEntryTransaction;

use super::{with_kind, EntityKind, MemoryDataStore};

impl MemoryDataStore {
    /// Allocates a new `K` entity and opens its transaction.
    ///
    /// The entity becomes visible when the transaction commits.
    pub fn add_entity<K: EntityKind>(&mut self) -> NewEntryTransaction<'_, K> {
        NewEntryTransaction::new(self)
    }

    /// Removes `id` and, first, everything it hosts. Unknown ids are ignored.
    ///
    /// Observers see `on_remove_entity` while the entity is still present and
    /// `on_post_remove_entity` once it and its subtree are gone.
    pub fn remove_entity(&mut self, id: ObjectId) {
        let kind = self.object_type(id);
        if kind.is_none() {
            return;
        }
        self.has_changed = true;
        self.notify(&[StoreEvent::RemoveEntity { id, kind }]);

        // an observer may already have removed it
        if self.object_type(id).is_none() {
            trace!("{id} removed during its own removal notice");
            return;
        }

        if let Some(name) = self.common_prefs(id).map(|common| common.name.clone()) {
            self.name_cache.remove_entity(&name, id);
        }
        self.generic_data.remove(&id);
        self.category_data.remove(&id);
        let tables = self.tables.delete_tables_by_owner(id);
        if tables > 0 {
            trace!("dropped {tables} data tables of {id}");
        }

        for child in self.entities.children_of(id) {
            self.remove_entity(child);
        }

        with_kind!(kind, K => self.erase_entry::<K>(id), else {});
        debug!("removed {kind:?} {id}");
        self.notify(&[StoreEvent::PostRemoveEntity { id, kind }]);
    }

    fn erase_entry<K: EntityKind>(&mut self, id: ObjectId) {
        K::container_mut(&mut self.entities).remove(&id);
    }

    /// Removes every entity and all scenario-level data.
    ///
    /// With `invoke_callback`, observers first receive `on_scenario_delete`.
    /// Entities are removed through [`remove_entity`](Self::remove_entity),
    /// so per-entity notifications still fire.
    pub fn clear(&mut self, invoke_callback: bool) {
        debug!("clearing scenario with {} entities", self.entity_count());
        if invoke_callback {
            self.notify(&[StoreEvent::ScenarioDelete]);
        }

        for mask in [
            ObjectType::PLATFORM,
            ObjectType::BEAM,
            ObjectType::GATE,
            ObjectType::LASER,
            ObjectType::PROJECTOR,
            ObjectType::LOB_GROUP,
            ObjectType::CUSTOM_RENDERING,
        ] {
            for id in self.id_list(mask) {
                self.remove_entity(id);
            }
        }

        self.generic_data.clear();
        self.generic_data.insert(ObjectId::SCENARIO, GenericDataSlice::new());
        self.category_data.clear();
        self.category_names.clear();
        self.tables.clear();
        self.name_cache.clear();
        self.has_changed = true;
    }
}
