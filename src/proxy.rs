//! Store replacement that keeps the application's wiring.
//!
//! Loading a new scenario builds a fresh [`MemoryDataStore`]. The proxy moves
//! the interpolator, observers, default preferences and clock binding from the
//! old store onto the new one before the old store is dropped.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use log::debug;

use crate::clock::Clock;
use crate::interpolate::Interpolator;
use crate::notify::{DataStoreListener, NewUpdatesListener, ScenarioListener};
use crate::schema::DefaultPrefs;
use crate::store::MemoryDataStore;

/// Snapshot of a store's configuration and observers.
///
/// Holds strong references, so observers stay alive until the memento is
/// applied and dropped.
pub struct InternalsMemento {
    interpolator: Option<Rc<dyn Interpolator>>,
    interpolation_enabled: bool,
    listeners: Vec<Rc<dyn DataStoreListener>>,
    scenario_listeners: Vec<Rc<dyn ScenarioListener>>,
    new_updates_listener: Option<Rc<dyn NewUpdatesListener>>,
    default_prefs: DefaultPrefs,
    clock: Option<Rc<dyn Clock>>,
}

impl InternalsMemento {
    /// Installs the captured configuration and observers on `store`.
    pub fn apply(&self, store: &mut MemoryDataStore) {
        store.set_interpolator(self.interpolator.clone());
        store.enable_interpolation(self.interpolation_enabled);
        for listener in &self.listeners {
            store.add_listener(Rc::clone(listener));
        }
        for listener in &self.scenario_listeners {
            store.add_scenario_listener(Rc::clone(listener));
        }
        store.set_new_updates_listener(self.new_updates_listener.clone());
        store.set_default_prefs(self.default_prefs.clone());
        store.bind_to_clock(self.clock.clone());
    }

    /// Number of captured data store observers.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl MemoryDataStore {
    /// Captures the configuration and observers for transfer to another store.
    #[must_use]
    pub fn create_internals_memento(&self) -> InternalsMemento {
        InternalsMemento {
            interpolator: self.interpolator.clone(),
            interpolation_enabled: self.interpolation_enabled,
            listeners: self.listeners.live(),
            scenario_listeners: self.scenario_listeners.live(),
            new_updates_listener: self.new_updates_listener.clone(),
            default_prefs: self.default_prefs.clone(),
            clock: self.clock.clone(),
        }
    }
}

/// Owns the active store and swaps it out on [`reset`](Self::reset).
pub struct DataStoreProxy {
    store: MemoryDataStore,
}

impl DataStoreProxy {
    /// Wraps `store`.
    #[must_use]
    pub const fn new(store: MemoryDataStore) -> Self {
        Self { store }
    }

    /// Replaces the active store with `store`, carrying over its internals.
    ///
    /// The old store is cleared (observers see `on_scenario_delete`) and
    /// dropped after the new one is installed.
    pub fn reset(&mut self, mut store: MemoryDataStore) {
        let memento = self.store.create_internals_memento();
        memento.apply(&mut store);
        let old = std::mem::replace(&mut self.store, store);
        debug!(
            "data store replaced; {} listeners carried over, {} entities dropped",
            memento.listener_count(),
            old.entity_count()
        );
        drop(old);
    }

    /// The active store.
    #[must_use]
    pub const fn data_store(&self) -> &MemoryDataStore {
        &self.store
    }

    /// Mutable access to the active store.
    pub fn data_store_mut(&mut self) -> &mut MemoryDataStore {
        &mut self.store
    }
}

impl Deref for DataStoreProxy {
    type Target = MemoryDataStore;

    fn deref(&self) -> &MemoryDataStore {
        &self.store
    }
}

impl DerefMut for DataStoreProxy {
    fn deref_mut(&mut self) -> &mut MemoryDataStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::clock::PlaybackClock;
    use crate::interpolate::LinearInterpolator;
    use crate::store::Platform;

    #[derive(Default)]
    struct Deletes(Cell<usize>);

    impl DataStoreListener for Deletes {
        fn on_scenario_delete(&self, _store: &mut MemoryDataStore) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_reset_carries_internals() {
        let mut store = MemoryDataStore::new();
        store.set_interpolator(Some(Rc::new(LinearInterpolator::new())));
        store.enable_interpolation(true);
        store.bind_to_clock(Some(Rc::new(PlaybackClock::live())));
        let listener = Rc::new(Deletes::default());
        store.add_listener(listener.clone());
        store.add_entity::<Platform>().commit();

        let mut proxy = DataStoreProxy::new(store);
        proxy.reset(MemoryDataStore::new());

        assert_eq!(proxy.entity_count(), 0);
        assert!(proxy.is_interpolation_enabled());
        assert!(proxy.bound_clock().is_some());
        assert_eq!(proxy.listener_count(), 1);
        // the old store's teardown reached the carried listener
        assert_eq!(listener.0.get(), 1);
    }

    #[test]
    fn test_memento_keeps_listeners_alive() {
        let mut store = MemoryDataStore::new();
        store.add_listener(Rc::new(Deletes::default()));
        // registered only weakly, so nothing keeps it alive
        assert_eq!(store.listener_count(), 0);

        let listener: Rc<dyn DataStoreListener> = Rc::new(Deletes::default());
        store.add_listener(Rc::clone(&listener));
        let memento = store.create_internals_memento();
        drop(listener);

        let mut other = MemoryDataStore::new();
        memento.apply(&mut other);
        assert_eq!(other.listener_count(), 1);
        drop(memento);
        assert_eq!(other.listener_count(), 0);
    }
}
