// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nutri_tracker::services::{portion, FoodCatalog};

fn benchmark_catalog(c: &mut Criterion) {
    let catalog = FoodCatalog::builtin().expect("Failed to load catalog");

    let mut group = c.benchmark_group("catalog");

    // Accent-folded match against names and categories
    group.bench_function("search_folded", |b| {
        b.iter(|| catalog.search(black_box("MACA")))
    });

    group.bench_function("search_category", |b| {
        b.iter(|| catalog.search(black_box("carbs")))
    });

    group.bench_function("search_miss", |b| {
        b.iter(|| catalog.search(black_box("zzzz")))
    });

    let food = catalog.find("Maçã").expect("Maçã should be in the catalog");
    group.bench_function("portion_compute", |b| {
        b.iter(|| portion::compute(black_box(food), black_box(Some(150.0))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_catalog);
criterion_main!(benches);
