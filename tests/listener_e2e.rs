use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use simstore::{
    Beam, DataStoreListener, MemoryDataStore, NewUpdatesListener, ObjectId, ObjectType, Platform,
    PlatformUpdate, ScenarioListener, TableRow, Vec3,
};

/// Records every callback as a short string.
#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        self.events.take()
    }

    fn push(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl DataStoreListener for Recorder {
    fn on_add_entity(&self, _store: &mut MemoryDataStore, id: ObjectId, kind: ObjectType) {
        self.push(format!("add {id} {kind:?}"));
    }

    fn on_remove_entity(&self, store: &mut MemoryDataStore, id: ObjectId, _kind: ObjectType) {
        // still readable
        assert!(!store.object_type(id).is_none());
        self.push(format!("remove {id}"));
    }

    fn on_post_remove_entity(&self, store: &mut MemoryDataStore, id: ObjectId, _kind: ObjectType) {
        assert!(store.object_type(id).is_none());
        self.push(format!("post-remove {id}"));
    }

    fn on_prefs_change(&self, _store: &mut MemoryDataStore, id: ObjectId) {
        self.push(format!("prefs {id}"));
    }

    fn on_name_change(&self, _store: &mut MemoryDataStore, id: ObjectId) {
        self.push(format!("name {id}"));
    }

    fn on_flush(&self, _store: &mut MemoryDataStore, id: ObjectId) {
        self.push(format!("flush {id}"));
    }

    fn on_change(&self, _store: &mut MemoryDataStore) {
        self.push("change".to_string());
    }

    fn on_scenario_delete(&self, _store: &mut MemoryDataStore) {
        self.push("scenario-delete".to_string());
    }
}

/// Removes itself from the store on its first callback.
struct OneShot {
    me: Weak<OneShot>,
    calls: Cell<usize>,
}

impl DataStoreListener for OneShot {
    fn on_add_entity(&self, store: &mut MemoryDataStore, _id: ObjectId, _kind: ObjectType) {
        self.calls.set(self.calls.get() + 1);
        if let Some(me) = self.me.upgrade() {
            store.remove_listener(me);
        }
    }
}

/// Removes every entity it is told about being added.
struct Deleter;

impl DataStoreListener for Deleter {
    fn on_add_entity(&self, store: &mut MemoryDataStore, id: ObjectId, _kind: ObjectType) {
        store.remove_entity(id);
    }
}

#[test]
fn lifecycle_notifications_in_order() {
    let mut store = MemoryDataStore::new();
    let recorder = Rc::new(Recorder::default());
    store.add_listener(recorder.clone());

    let platform = store.add_entity::<Platform>().commit();
    let mut txn = store.add_entity::<Beam>();
    txn.host_id = platform;
    let beam = txn.commit();
    store.remove_entity(platform);

    assert_eq!(
        recorder.take(),
        vec![
            format!("add {platform} {:?}", ObjectType::PLATFORM),
            format!("add {beam} {:?}", ObjectType::BEAM),
            format!("remove {platform}"),
            format!("remove {beam}"),
            format!("post-remove {beam}"),
            format!("post-remove {platform}"),
        ]
    );
}

#[test]
fn identical_prefs_commit_is_silent() {
    let mut store = MemoryDataStore::new();
    let id = store.add_entity::<Platform>().commit();
    store.update(0.0);
    let recorder = Rc::new(Recorder::default());
    store.add_listener(recorder.clone());

    let prefs = store.mutable_prefs::<Platform>(id).unwrap();
    prefs.commit();
    assert!(recorder.take().is_empty());
    assert!(!store.has_changed());

    let mut prefs = store.mutable_prefs::<Platform>(id).unwrap();
    prefs.common.name = "ownship".to_string();
    prefs.commit();
    assert_eq!(recorder.take(), vec![format!("prefs {id}"), format!("name {id}")]);
    assert!(store.has_changed());

    let mut prefs = store.mutable_prefs::<Platform>(id).unwrap();
    prefs.interpolate_pos = false;
    prefs.commit();
    assert_eq!(recorder.take(), vec![format!("prefs {id}")]);
}

#[test]
fn listener_removing_itself_mid_dispatch() {
    let mut store = MemoryDataStore::new();
    let one_shot = Rc::new_cyclic(|me| OneShot {
        me: me.clone(),
        calls: Cell::new(0),
    });
    let recorder = Rc::new(Recorder::default());
    store.add_listener(one_shot.clone());
    store.add_listener(recorder.clone());

    store.add_entity::<Platform>().commit();
    store.add_entity::<Platform>().commit();

    assert_eq!(one_shot.calls.get(), 1);
    // the listener after it still saw both
    assert_eq!(recorder.take().len(), 2);
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn listener_may_remove_the_entity_being_added() {
    let mut store = MemoryDataStore::new();
    let recorder = Rc::new(Recorder::default());
    let deleter: Rc<dyn DataStoreListener> = Rc::new(Deleter);
    store.add_listener(deleter.clone());
    store.add_listener(recorder.clone());

    let id = store.add_entity::<Platform>().commit();

    assert!(store.object_type(id).is_none());
    let events = recorder.take();
    assert!(events.contains(&format!("post-remove {id}")));
    assert_eq!(events.last(), Some(&format!("add {id} {:?}", ObjectType::PLATFORM)));
}

#[test]
fn dropped_listener_is_not_called() {
    let mut store = MemoryDataStore::new();
    let recorder = Rc::new(Recorder::default());
    store.add_listener(recorder.clone());
    drop(recorder);

    store.add_entity::<Platform>().commit();
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn update_and_flush_notifications() {
    let mut store = MemoryDataStore::new();
    let id = store.add_entity::<Platform>().commit();
    let recorder = Rc::new(Recorder::default());
    store.add_listener(recorder.clone());

    store.update(1.0);
    store.update(1.0);
    store
        .flush_by_type(id, simstore::FlushType::NonRecursive)
        .unwrap();
    store.clear(true);

    assert_eq!(
        recorder.take(),
        vec![
            "change".to_string(),
            format!("flush {id}"),
            "scenario-delete".to_string(),
            format!("remove {id}"),
            format!("post-remove {id}"),
        ]
    );
}

#[derive(Default)]
struct Feed {
    updates: RefCell<Vec<(ObjectId, f64)>>,
    rows: RefCell<Vec<(ObjectId, String, f64)>>,
    flushes: Cell<usize>,
}

impl NewUpdatesListener for Feed {
    fn on_entity_update(&self, _store: &mut MemoryDataStore, id: ObjectId, time: f64) {
        self.updates.borrow_mut().push((id, time));
    }

    fn on_flush(&self, _store: &mut MemoryDataStore, _id: ObjectId) {
        self.flushes.set(self.flushes.get() + 1);
    }

    fn on_new_row_data(&self, _store: &mut MemoryDataStore, owner: ObjectId, table: &str, time: f64) {
        self.rows.borrow_mut().push((owner, table.to_string(), time));
    }
}

#[test]
fn new_updates_listener_sees_every_point() {
    let mut store = MemoryDataStore::new();
    let feed = Rc::new(Feed::default());
    store.set_new_updates_listener(Some(feed.clone()));
    let id = store.add_entity::<Platform>().commit();

    for time in [1.0, 2.0] {
        let mut update = store.add_update::<Platform>(id).unwrap();
        *update = PlatformUpdate::at(time, Vec3::default());
        update.commit();
    }
    // discarded updates are never reported
    drop(store.add_update::<Platform>(id).unwrap());

    store.add_data_table(id, "fuel").unwrap();
    store.add_table_row(id, "fuel", TableRow::new(3.0).with("kg", 1.0)).unwrap();
    store.flush_by_type(id, simstore::FlushType::NonRecursiveData).unwrap();

    assert_eq!(*feed.updates.borrow(), vec![(id, 1.0), (id, 2.0)]);
    assert_eq!(*feed.rows.borrow(), vec![(id, "fuel".to_string(), 3.0)]);
    assert_eq!(feed.flushes.get(), 1);
}

struct ScenarioWatch(Cell<usize>);

impl ScenarioListener for ScenarioWatch {
    fn on_scenario_properties_change(&self, store: &mut MemoryDataStore) {
        assert_eq!(store.reference_year(), 2001);
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn scenario_listener_fires_on_real_change_only() {
    let mut store = MemoryDataStore::new();
    let watch = Rc::new(ScenarioWatch(Cell::new(0)));
    store.add_scenario_listener(watch.clone());

    let mut props = store.mutable_scenario_properties();
    props.reference_year = 2001;
    props.commit();
    store.mutable_scenario_properties().commit();

    assert_eq!(watch.0.get(), 1);
}

/// Records, per category callback, whether a watched entity's category data is current yet.
struct CategoryWatch {
    watched: ObjectId,
    seen: RefCell<Vec<(ObjectId, bool)>>,
}

impl DataStoreListener for CategoryWatch {
    fn on_category_data_change(&self, store: &mut MemoryDataStore, id: ObjectId, _kind: ObjectType) {
        let ready = store
            .category_data_slice(self.watched)
            .is_some_and(|slice| !slice.current_strings(store.category_name_manager()).is_empty());
        self.seen.borrow_mut().push((id, ready));
    }
}

#[test]
fn category_changes_are_reported_as_each_slice_updates() {
    let mut store = MemoryDataStore::new();
    let first = store.add_entity::<Platform>().commit();
    let second = store.add_entity::<Platform>().commit();
    for id in [first, second] {
        let mut data = store.add_category_data(id).unwrap();
        data.time = 1.0;
        data.push("affiliation", "friendly");
        data.commit();
    }
    let watch = Rc::new(CategoryWatch {
        watched: second,
        seen: RefCell::new(Vec::new()),
    });
    store.add_listener(watch.clone());

    store.update(2.0);

    assert_eq!(*watch.seen.borrow(), vec![(first, false), (second, true)]);
}
