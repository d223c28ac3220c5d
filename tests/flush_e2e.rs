use simstore::{
    Beam, FlushFields, FlushRange, FlushScope, FlushType, MemoryDataStore, ObjectId, Platform,
    PlatformUpdate, TableRow, Vec3, STATIC_TIME,
};

fn populated() -> (MemoryDataStore, ObjectId, ObjectId) {
    let mut store = MemoryDataStore::new();
    let platform = store.add_entity::<Platform>().commit();
    let mut txn = store.add_entity::<Beam>();
    txn.host_id = platform;
    let beam = txn.commit();

    for time in [STATIC_TIME, 1.0, 2.0, 3.0] {
        let mut update = store.add_update::<Platform>(platform).unwrap();
        *update = PlatformUpdate::at(time, Vec3::new(time, 0.0, 0.0));
        update.commit();

        let mut update = store.add_update::<Beam>(beam).unwrap();
        update.time = time;
        update.range = 1000.0;
        update.commit();
    }

    store.add_data_table(platform, "fuel").unwrap();
    store
        .add_table_row(platform, "fuel", TableRow::new(2.0).with("kg", 500.0))
        .unwrap();
    (store, platform, beam)
}

fn num_updates(store: &MemoryDataStore, platform: ObjectId, beam: ObjectId) -> (usize, usize) {
    (
        store.update_slice::<Platform>(platform).unwrap().num_items(),
        store.update_slice::<Beam>(beam).unwrap().num_items(),
    )
}

#[test]
fn recursive_flush_keeps_entities_and_static_data() {
    let (mut store, platform, beam) = populated();

    store.flush_by_type(platform, FlushType::Recursive).unwrap();

    assert!(store.properties::<Platform>(platform).is_some());
    assert!(store.properties::<Beam>(beam).is_some());
    // only the static samples remain
    assert_eq!(num_updates(&store, platform, beam), (1, 1));
    let fuel = store.data_table_manager().find_table(platform, "fuel").unwrap();
    assert!(fuel.rows().is_empty());
}

#[test]
fn non_recursive_flush_leaves_hosted_entities() {
    let (mut store, platform, beam) = populated();

    store
        .flush_all_fields(platform, FlushScope::NonRecursive, FlushFields::UPDATES)
        .unwrap();

    assert_eq!(num_updates(&store, platform, beam), (0, 4));
    let fuel = store.data_table_manager().find_table(platform, "fuel").unwrap();
    assert_eq!(fuel.rows().len(), 1);
}

#[test]
fn range_flush_is_half_open() {
    let (mut store, platform, beam) = populated();

    store
        .flush(
            platform,
            FlushScope::Recursive,
            FlushFields::UPDATES,
            FlushRange::new(1.0, 3.0),
        )
        .unwrap();

    assert_eq!(num_updates(&store, platform, beam), (2, 2));
    let times: Vec<f64> = store
        .update_slice::<Platform>(platform)
        .unwrap()
        .iter()
        .map(|u| u.time)
        .collect();
    assert_eq!(times, vec![STATIC_TIME, 3.0]);
}

#[test]
fn scenario_flush_reaches_every_platform() {
    let (mut store, platform, beam) = populated();

    store.flush_by_type(ObjectId::SCENARIO, FlushType::NonRecursiveTspiOnly).unwrap();

    assert_eq!(num_updates(&store, platform, beam), (1, 1));
    assert_eq!(store.entity_count(), 2);
}

#[test]
fn data_limiting_trims_on_insert_and_on_prefs_change() {
    let (mut store, platform, _) = populated();
    store.set_data_limiting(true);

    let mut prefs = store.mutable_prefs::<Platform>(platform).unwrap();
    prefs.common.data_limit_points = 2;
    prefs.commit();
    assert_eq!(store.update_slice::<Platform>(platform).unwrap().num_items(), 2);

    let mut update = store.add_update::<Platform>(platform).unwrap();
    *update = PlatformUpdate::at(4.0, Vec3::default());
    update.commit();
    let times: Vec<f64> = store
        .update_slice::<Platform>(platform)
        .unwrap()
        .iter()
        .map(|u| u.time)
        .collect();
    assert_eq!(times, vec![3.0, 4.0]);
}

#[test]
fn flush_of_unknown_entity_fails() {
    let (mut store, _, _) = populated();
    let err = store.flush_by_type(ObjectId::new(4242), FlushType::Recursive).unwrap_err();
    assert!(err.is_not_found());
}
