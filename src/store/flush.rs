//! Flushing and data limiting.

use bitflags::bitflags;
use log::debug;

use crate::error::{StoreError, StoreResult};
use crate::id::{ObjectId, ObjectType};
use crate::notify::StoreEvent;
use crate::schema::{CommonPrefs, DataLimits};
use crate::table::DataTable;
use crate::time::FlushRange;

use super::{with_kind, EntityKind, MemoryDataStore};

bitflags! {
    /// Which data a flush removes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlushFields: u32 {
        /// Keep static (`-1`) data when flushing everything.
        const EXCLUDE_MINUS_ONE = 0x01;
        const UPDATES = 0x02;
        const COMMANDS = 0x04;
        const CATEGORY_DATA = 0x08;
        const GENERIC_DATA = 0x10;
        const DATA_TABLES = 0x20;
        const ALL = Self::UPDATES.bits()
            | Self::COMMANDS.bits()
            | Self::CATEGORY_DATA.bits()
            | Self::GENERIC_DATA.bits()
            | Self::DATA_TABLES.bits();
    }
}

/// Whether a flush reaches hosted entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushScope {
    /// Only the named entity.
    NonRecursive,
    /// The named entity and everything it hosts.
    Recursive,
}

/// Predefined scope/field combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushType {
    /// Everything but data tables, keeping static data.
    NonRecursive,
    /// Everything but data tables, static data included.
    NonRecursiveTspiStatic,
    /// Everything, recursively, keeping static data.
    Recursive,
    /// Updates only, static data included.
    NonRecursiveTspiOnly,
    /// Updates and commands, static data included.
    NonRecursiveData,
}

impl FlushType {
    /// Scope and fields of this flush type.
    #[must_use]
    pub fn scope_and_fields(self) -> (FlushScope, FlushFields) {
        match self {
            Self::NonRecursive => (
                FlushScope::NonRecursive,
                FlushFields::EXCLUDE_MINUS_ONE | (FlushFields::ALL - FlushFields::DATA_TABLES),
            ),
            Self::NonRecursiveTspiStatic => (
                FlushScope::NonRecursive,
                FlushFields::ALL - FlushFields::DATA_TABLES,
            ),
            Self::Recursive => (
                FlushScope::Recursive,
                FlushFields::EXCLUDE_MINUS_ONE | FlushFields::ALL,
            ),
            Self::NonRecursiveTspiOnly => (FlushScope::NonRecursive, FlushFields::UPDATES),
            Self::NonRecursiveData => (
                FlushScope::NonRecursive,
                FlushFields::UPDATES | FlushFields::COMMANDS,
            ),
        }
    }
}

impl MemoryDataStore {
    /// Removes the data of `id` inside `range`, keeping the entity itself.
    ///
    /// Id `0` flushes the scenario-level generic data and tables, and with
    /// [`FlushScope::Recursive`] every platform and custom rendering subtree.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown nonzero id.
    pub fn flush(&mut self, id: ObjectId, scope: FlushScope, fields: FlushFields, range: FlushRange) -> StoreResult<()> {
        debug!("flush {id} {scope:?} {fields:?} in {range}");
        if id.is_scenario() {
            if scope == FlushScope::Recursive {
                let roots = self.id_list(ObjectType::PLATFORM | ObjectType::CUSTOM_RENDERING);
                for root in roots {
                    self.flush_entity(root, scope, fields, range);
                }
            }
            if fields.contains(FlushFields::DATA_TABLES) {
                self.flush_tables(ObjectId::SCENARIO, range);
            }
            if fields.contains(FlushFields::GENERIC_DATA) {
                self.flush_generic(ObjectId::SCENARIO, range);
            }
        } else {
            if self.object_type(id).is_none() {
                return Err(StoreError::not_found(id));
            }
            self.flush_entity(id, scope, fields, range);
        }

        self.has_changed = true;
        self.notify(&[StoreEvent::Flush { id }]);
        self.notify_new_updates_flush(id);
        Ok(())
    }

    /// Flushes all data of the selected fields.
    ///
    /// Static data is kept when `fields` has [`FlushFields::EXCLUDE_MINUS_ONE`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown nonzero id.
    pub fn flush_all_fields(&mut self, id: ObjectId, scope: FlushScope, fields: FlushFields) -> StoreResult<()> {
        let range = if fields.contains(FlushFields::EXCLUDE_MINUS_ONE) {
            FlushRange::all()
        } else {
            FlushRange::including_static()
        };
        self.flush(id, scope, fields, range)
    }

    /// Flushes with one of the predefined combinations; id `0` is always recursive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown nonzero id.
    pub fn flush_by_type(&mut self, id: ObjectId, flush_type: FlushType) -> StoreResult<()> {
        let flush_type = if id.is_scenario() {
            FlushType::Recursive
        } else {
            flush_type
        };
        let (scope, fields) = flush_type.scope_and_fields();
        self.flush_all_fields(id, scope, fields)
    }

    fn flush_entity(&mut self, id: ObjectId, scope: FlushScope, fields: FlushFields, range: FlushRange) {
        let kind = self.object_type(id);
        with_kind!(kind, K => self.flush_slices::<K>(id, fields, range), else return);

        if fields.contains(FlushFields::CATEGORY_DATA) {
            if let Some(slice) = self.category_data.get_mut(&id) {
                if range.start == 0.0 && range.is_open_ended() && fields.contains(FlushFields::EXCLUDE_MINUS_ONE) {
                    slice.flush();
                } else {
                    slice.flush_range(range);
                }
            }
        }
        if fields.contains(FlushFields::GENERIC_DATA) {
            self.flush_generic(id, range);
        }
        if fields.contains(FlushFields::DATA_TABLES) {
            self.flush_tables(id, range);
        }

        if scope == FlushScope::Recursive {
            for child in self.entities.children_of(id) {
                self.flush_entity(child, scope, fields, range);
            }
        }
    }

    fn flush_slices<K: EntityKind>(&mut self, id: ObjectId, fields: FlushFields, range: FlushRange) {
        let Some(entry) = self.entry_mut::<K>(id) else {
            return;
        };
        if fields.contains(FlushFields::UPDATES) {
            entry.updates.flush(range);
        }
        if fields.contains(FlushFields::COMMANDS) {
            entry.commands.flush(range);
        }
    }

    fn flush_generic(&mut self, id: ObjectId, range: FlushRange) {
        if let Some(slice) = self.generic_data.get_mut(&id) {
            if range.is_full() {
                slice.flush();
            } else {
                slice.flush_range(range);
            }
        }
    }

    fn flush_tables(&mut self, owner: ObjectId, range: FlushRange) {
        if let Some(tables) = self.tables.tables_for_owner_mut(owner) {
            let full = range.is_full();
            tables.accept(&mut |table: &mut DataTable| {
                if full {
                    table.flush();
                } else {
                    table.flush_range(range);
                }
            });
        }
    }

    /// Limits that apply to new data of `id`, or `None` with limiting off.
    ///
    /// The scenario (`0`) uses the scenario limits; entities use their
    /// common preferences.
    pub(crate) fn limits_for(&self, id: ObjectId) -> Option<DataLimits> {
        if !self.data_limiting {
            None
        } else if id.is_scenario() {
            Some(self.scenario.limits())
        } else {
            self.common_prefs(id).map(CommonPrefs::limits)
        }
    }

    /// Trims every slice of `id` to its preference limits, if limiting is on.
    pub(crate) fn apply_data_limiting(&mut self, id: ObjectId) {
        let Some(limits) = self.limits_for(id) else {
            return;
        };
        with_kind!(self.object_type(id), K => self.limit_slices::<K>(id, &limits), else return);
        if let Some(slice) = self.generic_data.get_mut(&id) {
            slice.limit(&limits);
        }
        if let Some(slice) = self.category_data.get_mut(&id) {
            slice.limit(&limits);
        }
    }

    fn limit_slices<K: EntityKind>(&mut self, id: ObjectId, limits: &DataLimits) {
        if let Some(entry) = self.entry_mut::<K>(id) {
            entry.updates.limit(limits);
            entry.commands.limit(limits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_type_mapping() {
        let (scope, fields) = FlushType::NonRecursive.scope_and_fields();
        assert_eq!(scope, FlushScope::NonRecursive);
        assert!(fields.contains(FlushFields::EXCLUDE_MINUS_ONE));
        assert!(!fields.contains(FlushFields::DATA_TABLES));
        assert!(fields.contains(FlushFields::GENERIC_DATA));

        let (scope, fields) = FlushType::Recursive.scope_and_fields();
        assert_eq!(scope, FlushScope::Recursive);
        assert!(fields.contains(FlushFields::ALL | FlushFields::EXCLUDE_MINUS_ONE));

        let (_, fields) = FlushType::NonRecursiveTspiStatic.scope_and_fields();
        assert!(!fields.contains(FlushFields::EXCLUDE_MINUS_ONE));

        let (_, fields) = FlushType::NonRecursiveTspiOnly.scope_and_fields();
        assert_eq!(fields, FlushFields::UPDATES);

        let (_, fields) = FlushType::NonRecursiveData.scope_and_fields();
        assert_eq!(fields, FlushFields::UPDATES | FlushFields::COMMANDS);
    }

    #[test]
    fn test_flush_unknown_id() {
        let mut store = MemoryDataStore::new();
        let err = store
            .flush_all_fields(ObjectId::new(9), FlushScope::Recursive, FlushFields::ALL)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.has_changed());
    }

    #[test]
    fn test_flush_scenario_generic_data() {
        let mut store = MemoryDataStore::new();
        let mut data = store.add_generic_data(ObjectId::SCENARIO).unwrap();
        data.time = 2.0;
        data.push("phase", "ingress");
        data.commit();

        store
            .flush_by_type(ObjectId::SCENARIO, FlushType::NonRecursiveTspiOnly)
            .unwrap();
        assert_eq!(store.generic_data_slice(ObjectId::SCENARIO).unwrap().num_items(), 0);
        assert!(store.has_changed());
    }
}
