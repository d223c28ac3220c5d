use std::hint::black_box;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use simstore::{
    Beam, LinearInterpolator, MemoryDataStore, ObjectId, Platform, PlatformUpdate, Vec3,
};

const PLATFORMS: usize = 100;
const SAMPLES: usize = 600;

fn make_store() -> (MemoryDataStore, Vec<ObjectId>) {
    let mut store = MemoryDataStore::new();
    store.set_interpolator(Some(Rc::new(LinearInterpolator::new())));
    store.enable_interpolation(true);

    let mut ids = Vec::with_capacity(PLATFORMS);
    for p in 0..PLATFORMS {
        let id = store.add_entity::<Platform>().commit();
        for s in 0..SAMPLES {
            let t = s as f64;
            let mut update = store.add_update::<Platform>(id).unwrap();
            *update = PlatformUpdate::at(t, Vec3::new(t, p as f64, 0.0));
            update.commit();
        }
        let mut beam = store.add_entity::<Beam>();
        beam.host_id = id;
        beam.commit();
        ids.push(id);
    }
    (store, ids)
}

fn bench_update_sweep(c: &mut Criterion) {
    let (mut store, _) = make_store();
    let mut group = c.benchmark_group("update");
    group.throughput(Throughput::Elements(PLATFORMS as u64));

    let mut time = 0.0;
    group.bench_function("sweep_interpolated", |b| {
        b.iter(|| {
            time = (time + 0.37) % SAMPLES as f64;
            store.update(black_box(time));
        });
    });
    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    c.bench_function("ingest/platform_updates", |b| {
        b.iter_batched(
            || {
                let mut store = MemoryDataStore::new();
                let id = store.add_entity::<Platform>().commit();
                (store, id)
            },
            |(mut store, id)| {
                for s in 0..SAMPLES {
                    let mut update = store.add_update::<Platform>(id).unwrap();
                    *update = PlatformUpdate::at(s as f64, Vec3::default());
                    update.commit();
                }
                store
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("remove/platform_subtrees", |b| {
        b.iter_batched(
            make_store,
            |(mut store, ids)| {
                for id in ids {
                    store.remove_entity(id);
                }
                store
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_update_sweep, bench_ingest, bench_remove);
criterion_main!(benches);
