use criterion::{Criterion, criterion_group, criterion_main};
use serenwalk::{
    monitor::GeofenceMonitor,
    route::polyline,
    session::PositionSample,
    shared::{Coordinate, Distance},
    zones::{Category, Zone, ZoneRegistry},
};
use std::{hint::black_box, sync::Arc, time::Duration};

const ORIGIN: (f64, f64) = (14.5995, 120.9842);

fn registry(count: usize) -> Arc<ZoneRegistry> {
    let zones = (0..count)
        .map(|i| {
            let offset = (i as f64) * 0.0005;
            let category = match i % 3 {
                0 => Category::Safe,
                1 => Category::Danger,
                _ => Category::Police,
            };
            Zone::new(
                format!("zone-{i}"),
                format!("Zone {i}"),
                Coordinate::from((ORIGIN.0 + offset, ORIGIN.1 - offset)),
                Distance::from_meters(150.0),
                category,
            )
            .expect("Generated zone is valid")
        })
        .collect();
    Arc::new(ZoneRegistry::new(zones).expect("Generated ids are unique"))
}

fn walk(steps: usize) -> Vec<PositionSample> {
    (0..steps)
        .map(|i| {
            let offset = (i as f64) * 0.0001;
            PositionSample::new(Coordinate::from((ORIGIN.0 + offset, ORIGIN.1 - offset)))
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let small = registry(50);
    let large = registry(5_000);
    let samples = walk(200);
    let path: Vec<Coordinate> = samples.iter().map(|sample| sample.coordinate).collect();
    let encoded = polyline::encode(&path);

    let mut group = c.benchmark_group("Geofence");

    group.warm_up_time(Duration::from_secs(3));

    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Walk 50 zones", |b| {
        b.iter(|| {
            let mut monitor = GeofenceMonitor::new(small.clone());
            for sample in samples.iter() {
                let _ = black_box(monitor.process(sample));
            }
        })
    });

    group.bench_function("Walk 5000 zones", |b| {
        b.iter(|| {
            let mut monitor = GeofenceMonitor::new(large.clone());
            for sample in samples.iter() {
                let _ = black_box(monitor.process(sample));
            }
        })
    });

    group.bench_function("Zones near", |b| {
        b.iter(|| {
            black_box(large.near(&Coordinate::from(ORIGIN), Distance::from_kilometers(1.0)))
        })
    });

    group.bench_function("Decode polyline", |b| {
        b.iter(|| black_box(polyline::decode(&encoded)))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
