// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use prism_bounds::{Aabb, Backend, Bvh, FlatVec, IndexGeneric, Ray};

/// `n x n x layers` panels of `cell` meters, like stacked pages of a spatial grid.
fn gen_panel_boxes(n: usize, layers: usize, cell: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n * layers);
    for z in 0..layers {
        for y in 0..n {
            for x in 0..n {
                let min = DVec3::new(x as f64 * cell, y as f64 * cell, -(z as f64) * cell);
                out.push(Aabb::new(min, min + DVec3::new(cell, cell, 0.0)));
            }
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Boxes scattered through a room-sized volume.
fn gen_random_boxes(count: usize, extent: f64, size: f64) -> Vec<Aabb> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let c = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * extent;
            Aabb::from_center_size(c, DVec3::splat(size))
        })
        .collect()
}

fn fill<B: Backend>(idx: &mut IndexGeneric<u32, B>, boxes: &[Aabb]) {
    for (i, b) in boxes.iter().copied().enumerate() {
        let _ = idx.insert(b, i as u32);
    }
    let _ = idx.commit();
}

fn bench_backend<B: Backend + Default>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(name);
    for &n in &[16usize, 32, 64] {
        let boxes = gen_panel_boxes(n, 4, 0.05);
        group.throughput(Throughput::Elements(boxes.len() as u64));
        group.bench_function(format!("insert_commit_query_box_n{n}"), |b| {
            b.iter_batched(
                || IndexGeneric::<u32, B>::with_backend(B::default()),
                |mut idx| {
                    fill(&mut idx, &boxes);
                    let view = Aabb::new(DVec3::new(0.2, 0.2, -1.0), DVec3::new(0.6, 0.6, 1.0));
                    let hits = idx.query_box(view).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            );
        });
    }

    let boxes = gen_random_boxes(4096, 4.0, 0.1);
    let mut idx = IndexGeneric::<u32, B>::with_backend(B::default());
    fill(&mut idx, &boxes);
    group.bench_function("ray_pick_random", |b| {
        let mut rng = Rng::new(0x1234_5678_9ABC_DEF0);
        b.iter(|| {
            let origin = DVec3::new(rng.next_f64() * 4.0, rng.next_f64() * 4.0, 10.0);
            let ray = Ray::new(origin, DVec3::NEG_Z);
            black_box(idx.query_ray(ray).next());
        });
    });

    group.bench_function("update_move_then_commit", |b| {
        b.iter_batched(
            || {
                let mut idx = IndexGeneric::<u32, B>::with_backend(B::default());
                let keys: Vec<_> = boxes
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| idx.insert(r, i as u32))
                    .collect();
                let _ = idx.commit();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for (k, r) in keys.iter().zip(&boxes) {
                    idx.update(*k, r.translated(DVec3::new(0.01, 0.0, 0.0)));
                }
                black_box(idx.commit());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_flatvec(c: &mut Criterion) {
    bench_backend::<FlatVec>(c, "flatvec");
}

fn bench_bvh(c: &mut Criterion) {
    bench_backend::<Bvh>(c, "bvh");
}

criterion_group!(benches, bench_flatvec, bench_bvh);
criterion_main!(benches);
