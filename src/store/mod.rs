//! The in-memory data store.
//!
//! [`MemoryDataStore`] owns every entity, the shared generic/category data,
//! the data tables and the observer lists. Mutation goes through the
//! transaction guards in [`crate::transaction`]; reads go through the
//! accessors here. `update(time)` advances every entity to a point in time.

mod flush;
mod kind;
mod lifecycle;
mod update;

pub use flush::{FlushFields, FlushScope, FlushType};
pub use kind::{
    Beam, CustomRendering, EntityContainers, EntityKind, Entry, Gate, Laser, LobGroup, Platform,
    Projector,
};
pub(crate) use kind::with_kind;

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, warn};

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::id::{IdGenerator, ObjectId, ObjectType};
use crate::interpolate::{Interpolator, LinearInterpolator};
use crate::name_cache::EntityNameCache;
use crate::notify::{DataStoreListener, ListenerList, NewUpdatesListener, ScenarioListener};
use crate::schema::{
    Command, CommonPrefs, DefaultPrefs, EntityProperties, PlatformPrefs, Preferences,
    ScenarioProperties,
};
use crate::slice::{CategoryDataSlice, CategoryNameManager, CommandSlice, GenericDataSlice, MemoryDataSlice};
use crate::table::{DataTableManager, TableId, TableRow};
use crate::time::TimeBounds;

/// In-memory, time-indexed store of every entity in a scenario.
///
/// Single-threaded by construction (`Rc` observers, `&mut self` mutation).
/// Observers may freely call back into the store from their callbacks.
pub struct MemoryDataStore {
    pub(crate) entities: EntityContainers,
    pub(crate) generic_data: BTreeMap<ObjectId, GenericDataSlice>,
    pub(crate) category_data: BTreeMap<ObjectId, CategoryDataSlice>,
    pub(crate) category_names: CategoryNameManager,
    pub(crate) tables: DataTableManager,
    pub(crate) name_cache: EntityNameCache,
    pub(crate) scenario: ScenarioProperties,
    pub(crate) default_prefs: DefaultPrefs,
    pub(crate) ids: IdGenerator,
    pub(crate) last_update_time: f64,
    pub(crate) has_changed: bool,
    pub(crate) data_limiting: bool,
    pub(crate) interpolation_enabled: bool,
    pub(crate) interpolator: Option<Rc<dyn Interpolator>>,
    pub(crate) clock: Option<Rc<dyn Clock>>,
    pub(crate) listeners: ListenerList<dyn DataStoreListener>,
    pub(crate) scenario_listeners: ListenerList<dyn ScenarioListener>,
    pub(crate) new_updates_listener: Option<Rc<dyn NewUpdatesListener>>,
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataStore {
    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        let mut generic_data = BTreeMap::new();
        generic_data.insert(ObjectId::SCENARIO, GenericDataSlice::new());
        Self {
            entities: EntityContainers::default(),
            generic_data,
            category_data: BTreeMap::new(),
            category_names: CategoryNameManager::new(),
            tables: DataTableManager::new(),
            name_cache: EntityNameCache::new(),
            scenario: ScenarioProperties::default(),
            default_prefs: DefaultPrefs::default(),
            ids: IdGenerator::default(),
            last_update_time: 0.0,
            has_changed: false,
            data_limiting: false,
            interpolation_enabled: false,
            interpolator: None,
            clock: None,
            listeners: ListenerList::default(),
            scenario_listeners: ListenerList::default(),
            new_updates_listener: None,
        }
    }

    /// Creates an empty store from `config`.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let mut store = Self::new();
        store.data_limiting = config.data_limiting;
        store.scenario = config.scenario;
        store.default_prefs = config.default_prefs;
        if config.interpolation {
            store.set_interpolator(Some(Rc::new(LinearInterpolator::new())));
            store.enable_interpolation(true);
        }
        store
    }

    /// Returns true if something changed since the last [`update`](Self::update).
    #[must_use]
    pub const fn has_changed(&self) -> bool {
        self.has_changed
    }

    /// Time passed to the last [`update`](Self::update).
    #[must_use]
    pub const fn update_time(&self) -> f64 {
        self.last_update_time
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Turns data limiting on or off.
    pub fn set_data_limiting(&mut self, enabled: bool) {
        self.data_limiting = enabled;
    }

    /// Returns true if data limiting is on.
    #[must_use]
    pub const fn data_limiting(&self) -> bool {
        self.data_limiting
    }

    /// Installs (or removes) the interpolator. Removing it disables interpolation.
    pub fn set_interpolator(&mut self, interpolator: Option<Rc<dyn Interpolator>>) {
        if interpolator.is_none() {
            self.interpolation_enabled = false;
        }
        self.interpolator = interpolator;
        self.has_changed = true;
    }

    /// The installed interpolator.
    #[must_use]
    pub fn interpolator(&self) -> Option<&Rc<dyn Interpolator>> {
        self.interpolator.as_ref()
    }

    /// Requests interpolation on or off; returns the resulting state.
    ///
    /// Interpolation cannot be enabled without an interpolator.
    pub fn enable_interpolation(&mut self, enable: bool) -> bool {
        self.interpolation_enabled = enable && self.interpolator.is_some();
        self.has_changed = true;
        self.interpolation_enabled
    }

    /// Returns true if interpolation is on.
    #[must_use]
    pub const fn is_interpolation_enabled(&self) -> bool {
        self.interpolation_enabled
    }

    /// Returns true if an interpolator is installed.
    #[must_use]
    pub fn can_interpolate(&self) -> bool {
        self.interpolator.is_some()
    }

    /// Interpolator to use this tick, if interpolation is on.
    pub(crate) fn active_interpolator(&self) -> Option<Rc<dyn Interpolator>> {
        self.interpolator.clone().filter(|_| self.interpolation_enabled)
    }

    /// Binds the playback clock that selects live or file mode.
    pub fn bind_to_clock(&mut self, clock: Option<Rc<dyn Clock>>) {
        self.clock = clock;
    }

    /// The bound playback clock.
    #[must_use]
    pub fn bound_clock(&self) -> Option<&Rc<dyn Clock>> {
        self.clock.as_ref()
    }

    /// Returns true unless a bound clock reports live mode.
    pub(crate) fn is_file_mode(&self) -> bool {
        self.clock.as_ref().map_or(true, |clock| !clock.is_live_mode())
    }

    /// Replaces every per-type default.
    pub fn set_default_prefs(&mut self, defaults: DefaultPrefs) {
        self.default_prefs = defaults;
    }

    /// Replaces the platform defaults only.
    pub fn set_default_platform_prefs(&mut self, prefs: PlatformPrefs) {
        self.default_prefs.platform = prefs;
    }

    /// Preferences copied into each new entity.
    #[must_use]
    pub const fn default_prefs(&self) -> &DefaultPrefs {
        &self.default_prefs
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Registers an observer. The store only keeps a weak reference.
    pub fn add_listener(&mut self, listener: Rc<dyn DataStoreListener>) {
        self.listeners.add(&listener);
    }

    /// Unregisters an observer; safe to call from inside a callback.
    pub fn remove_listener(&mut self, listener: Rc<dyn DataStoreListener>) {
        self.listeners.remove(&listener);
    }

    /// Number of live registered observers.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Registers a scenario observer. The store only keeps a weak reference.
    pub fn add_scenario_listener(&mut self, listener: Rc<dyn ScenarioListener>) {
        self.scenario_listeners.add(&listener);
    }

    /// Unregisters a scenario observer.
    pub fn remove_scenario_listener(&mut self, listener: Rc<dyn ScenarioListener>) {
        self.scenario_listeners.remove(&listener);
    }

    /// Installs the per-sample observer; the store holds it strongly.
    pub fn set_new_updates_listener(&mut self, listener: Option<Rc<dyn NewUpdatesListener>>) {
        self.new_updates_listener = listener;
    }

    /// The per-sample observer, if installed.
    #[must_use]
    pub fn new_updates_listener(&self) -> Option<&Rc<dyn NewUpdatesListener>> {
        self.new_updates_listener.as_ref()
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Entry of a `K` entity.
    #[must_use]
    pub fn entry<K: EntityKind>(&self, id: ObjectId) -> Option<&Entry<K>> {
        K::container(&self.entities).get(&id)
    }

    pub(crate) fn entry_mut<K: EntityKind>(&mut self, id: ObjectId) -> Option<&mut Entry<K>> {
        K::container_mut(&mut self.entities).get_mut(&id)
    }

    /// Properties of a `K` entity.
    #[must_use]
    pub fn properties<K: EntityKind>(&self, id: ObjectId) -> Option<&K::Properties> {
        self.entry::<K>(id).map(|e| &e.properties)
    }

    /// Preferences of a `K` entity.
    #[must_use]
    pub fn prefs<K: EntityKind>(&self, id: ObjectId) -> Option<&K::Prefs> {
        self.entry::<K>(id).map(|e| &e.prefs)
    }

    /// Common preferences of any entity.
    #[must_use]
    pub fn common_prefs(&self, id: ObjectId) -> Option<&CommonPrefs> {
        with_kind!(self.object_type(id), K => self.prefs::<K>(id).map(Preferences::common), else None)
    }

    /// Update samples of a `K` entity.
    #[must_use]
    pub fn update_slice<K: EntityKind>(&self, id: ObjectId) -> Option<&MemoryDataSlice<K::Update>> {
        self.entry::<K>(id).map(|e| &e.updates)
    }

    /// Commands of a `K` entity.
    #[must_use]
    pub fn command_slice<K: EntityKind>(&self, id: ObjectId) -> Option<&CommandSlice> {
        self.entry::<K>(id).map(|e| &e.commands)
    }

    /// Generic data of an entity, or of the scenario for id `0`.
    #[must_use]
    pub fn generic_data_slice(&self, id: ObjectId) -> Option<&GenericDataSlice> {
        self.generic_data.get(&id)
    }

    /// Category data of an entity.
    #[must_use]
    pub fn category_data_slice(&self, id: ObjectId) -> Option<&CategoryDataSlice> {
        self.category_data.get(&id)
    }

    /// Interned category and value names.
    #[must_use]
    pub const fn category_name_manager(&self) -> &CategoryNameManager {
        &self.category_names
    }

    /// Scenario-wide properties.
    #[must_use]
    pub const fn scenario_properties(&self) -> &ScenarioProperties {
        &self.scenario
    }

    /// Year that scenario time `0.0` starts in.
    #[must_use]
    pub const fn reference_year(&self) -> i32 {
        self.scenario.reference_year
    }

    /// Data tables of every owner.
    #[must_use]
    pub const fn data_table_manager(&self) -> &DataTableManager {
        &self.tables
    }

    /// Mutable access to the data tables.
    pub fn data_table_manager_mut(&mut self) -> &mut DataTableManager {
        &mut self.tables
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Type of `id`, or [`ObjectType::NONE`] if unknown.
    #[must_use]
    pub fn object_type(&self, id: ObjectId) -> ObjectType {
        self.entities.object_type(id)
    }

    /// Number of entities of every type.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Ids of every entity whose type is in `mask`, grouped by type.
    #[must_use]
    pub fn id_list(&self, mask: ObjectType) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        self.collect_ids::<Platform>(mask, &mut ids);
        self.collect_ids::<Beam>(mask, &mut ids);
        self.collect_ids::<Gate>(mask, &mut ids);
        self.collect_ids::<Laser>(mask, &mut ids);
        self.collect_ids::<Projector>(mask, &mut ids);
        self.collect_ids::<LobGroup>(mask, &mut ids);
        self.collect_ids::<CustomRendering>(mask, &mut ids);
        ids
    }

    fn collect_ids<K: EntityKind>(&self, mask: ObjectType, ids: &mut Vec<ObjectId>) {
        if mask.intersects(K::TYPE) {
            ids.extend(K::container(&self.entities).keys().copied());
        }
    }

    /// Ids of entities named `name` (the name preference, not the alias).
    #[must_use]
    pub fn id_list_by_name(&self, name: &str, mask: ObjectType) -> Vec<ObjectId> {
        self.name_cache.entries(name, mask)
    }

    /// Ids of entities with the given data-source id.
    #[must_use]
    pub fn id_list_by_original_id(&self, original_id: u64, mask: ObjectType) -> Vec<ObjectId> {
        self.id_list(mask)
            .into_iter()
            .filter(|&id| {
                with_kind!(
                    self.object_type(id),
                    K => self.properties::<K>(id).map(EntityProperties::original_id) == Some(original_id),
                    else false
                )
            })
            .collect()
    }

    /// Ids of `K` entities hosted by `host`.
    #[must_use]
    pub fn ids_for_host<K: EntityKind>(&self, host: ObjectId) -> Vec<ObjectId> {
        self.entities.hosted_by::<K>(host)
    }

    /// Host of `id`; `0` for platforms, unhosted entities and unknown ids.
    #[must_use]
    pub fn entity_host_id(&self, id: ObjectId) -> ObjectId {
        with_kind!(
            self.object_type(id),
            K => self.properties::<K>(id).and_then(EntityProperties::host_id),
            else None
        )
        .unwrap_or(ObjectId::SCENARIO)
    }

    /// Time span of the data of `id`; id `0` yields the scenario bounds.
    #[must_use]
    pub fn time_bounds(&self, id: ObjectId) -> TimeBounds {
        if id.is_scenario() {
            return self.scenario_time_bounds();
        }
        with_kind!(
            self.object_type(id),
            K => self.entry::<K>(id).map_or_else(TimeBounds::empty, |entry| {
                let mut bounds = TimeBounds::empty();
                bounds.include(entry.updates.first_time(), entry.updates.last_time());
                bounds.include(entry.commands.first_time(), entry.commands.last_time());
                bounds
            }),
            else TimeBounds::empty()
        )
    }

    /// Time span of all platform data, ignoring static platforms.
    #[must_use]
    pub fn scenario_time_bounds(&self) -> TimeBounds {
        let mut bounds = TimeBounds::empty();
        for entry in self.entities.platforms.values() {
            let first = entry.updates.first_time();
            if entry.updates.is_empty() || first < 0.0 {
                continue;
            }
            bounds.include(first, entry.updates.last_time());
        }
        bounds
    }

    // ---------------------------------------------------------------------
    // Data editing outside transactions
    // ---------------------------------------------------------------------

    /// Edits the commands of a `K` entity in place.
    ///
    /// Commands for which `modifier` returns false are removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::WrongType`] if `id` is not a `K` entity.
    pub fn modify_command_slice<K, F>(&mut self, id: ObjectId, modifier: F) -> StoreResult<()>
    where
        K: EntityKind,
        F: FnMut(&mut Command) -> bool,
    {
        let Some(entry) = self.entry_mut::<K>(id) else {
            return Err(self.lookup_error::<K>(id));
        };
        entry.commands.modify(modifier);
        self.has_changed = true;
        Ok(())
    }

    fn lookup_error<K: EntityKind>(&self, id: ObjectId) -> StoreError {
        match self.object_type(id) {
            actual if actual.is_none() => StoreError::not_found(id),
            actual => StoreError::WrongType {
                id,
                expected: K::TYPE,
                actual,
            },
        }
    }

    /// Removes every value of `tag` from the generic data of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` has no generic data.
    pub fn remove_generic_data_tag(&mut self, id: ObjectId, tag: &str) -> StoreResult<usize> {
        let slice = self.generic_data.get_mut(&id).ok_or(StoreError::not_found(id))?;
        let removed = slice.remove_tag(tag);
        self.has_changed = true;
        Ok(removed)
    }

    /// Removes one category point; returns false if no such point exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` has no category data.
    pub fn remove_category_data_point(
        &mut self,
        id: ObjectId,
        time: f64,
        category: &str,
        value: &str,
    ) -> StoreResult<bool> {
        let slice = self.category_data.get_mut(&id).ok_or(StoreError::not_found(id))?;
        let Some(category) = self.category_names.name_int(category) else {
            return Ok(false);
        };
        let Some(value) = self.category_names.value_int(category, value) else {
            return Ok(false);
        };
        let removed = slice.remove_point(time, category, value);
        self.has_changed = true;
        Ok(removed)
    }

    /// Creates a data table for `owner` (`0` for the scenario).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown owner and
    /// [`StoreError::DuplicateTable`] if the owner already has such a table.
    pub fn add_data_table(&mut self, owner: ObjectId, name: &str) -> StoreResult<TableId> {
        if !owner.is_scenario() && self.object_type(owner).is_none() {
            return Err(StoreError::not_found(owner));
        }
        let id = self.tables.add_table(owner, name)?;
        debug!("added data table '{name}' ({id}) for {owner}");
        Ok(id)
    }

    /// Adds a row to table `table` of `owner`.
    ///
    /// With data limiting on, the table is trimmed to the owner's limits
    /// (the scenario's limits for owner `0`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the owner has no such table.
    pub fn add_table_row(&mut self, owner: ObjectId, table: &str, row: TableRow) -> StoreResult<()> {
        let limits = self.limits_for(owner);
        if self.data_limiting && limits.is_none() {
            warn!("no preferences for table owner {owner}; rows are not limited");
        }
        let time = row.time;
        let data_table = self
            .tables
            .tables_for_owner_mut(owner)
            .and_then(|list| list.find_mut(table))
            .ok_or_else(|| StoreError::TableNotFound {
                owner,
                name: table.to_string(),
            })?;
        data_table.add_row(row);
        if let Some(limits) = limits {
            data_table.limit(&limits);
        }
        self.has_changed = true;
        self.notify_new_row(owner, table, time);
        Ok(())
    }
}

impl Drop for MemoryDataStore {
    fn drop(&mut self) {
        self.clear(true);
    }
}
