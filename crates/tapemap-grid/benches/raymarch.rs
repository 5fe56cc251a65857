//! Ray-march scan and accumulator throughput.
//!
//! Run with: cargo bench -p tapemap-grid

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::GrayImage;
use nalgebra::Point2;
use tapemap_core::DetectedRegion;
use tapemap_grid::{
    AccumulateParams, OccupancyAccumulator, OccupancyMap, OccupancyPolarity, RayMarchScanner,
    ScanParams,
};

/// 640x480 map with a ring of occupied disks around the center.
fn ring_map() -> OccupancyMap {
    let acc = OccupancyAccumulator::new(AccumulateParams {
        region_value: 255,
        ..AccumulateParams::default()
    })
    .unwrap();
    let regions: Vec<_> = (0..24)
        .map(|i| {
            let a = i as f32 * std::f32::consts::TAU / 24.0;
            DetectedRegion::disk(Point2::new(320.0 + 150.0 * a.cos(), 240.0 + 150.0 * a.sin()), 6.5)
        })
        .collect();
    let mask = GrayImage::new(640, 480);
    let mut map = OccupancyMap::neutral(640, 480);
    for _ in 0..8 {
        acc.merge(&mut map, &mask, &regions).unwrap();
    }
    map
}

fn bench_scan(c: &mut Criterion) {
    let map = ring_map();
    let origin = Some(Point2::new(320.0, 240.0));

    let mut group = c.benchmark_group("scan");
    for count in [6usize, 90, 360] {
        let scanner = RayMarchScanner::new(ScanParams {
            count,
            range_max: 400.0,
            occupied_when: OccupancyPolarity::Above,
            ..ScanParams::default()
        })
        .unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| scanner.scan(black_box(&map), origin).unwrap())
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let acc = OccupancyAccumulator::new(AccumulateParams::default()).unwrap();
    let regions = [
        DetectedRegion::disk(Point2::new(100.0, 100.0), 5.0),
        DetectedRegion::disk(Point2::new(400.0, 300.0), 8.0),
    ];
    let mask = GrayImage::new(640, 480);
    let mut map = OccupancyMap::neutral(640, 480);

    c.bench_function("merge_640x480", |b| {
        b.iter(|| acc.merge(black_box(&mut map), black_box(&mask), black_box(&regions)))
    });
}

criterion_group!(benches, bench_scan, bench_merge);
criterion_main!(benches);
