//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Fast-path tick benchmarks
//!
//! Run with: cargo bench --bench tick

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use driftmind_core::{
    Directive, FastProxy, ProxyConfig, ProxyRegistry, Strategy, WorldEntity, WorldView,
};
use std::hint::black_box;
use std::time::Duration;
use uuid::Uuid;

fn populated_view(per_kind: usize) -> WorldView {
    let entities = |offset: f64| {
        (0..per_kind)
            .map(|i| WorldEntity::new(Uuid::new_v4(), offset + i as f64 * 0.7))
            .collect::<Vec<_>>()
    };
    WorldView {
        obstacles: entities(3.0),
        enemies: entities(4.0),
        interactables: entities(2.5),
        social_areas: entities(6.0),
    }
}

/// Benchmark one idle tick against an empty world
fn bench_tick_empty(c: &mut Criterion) {
    let proxy = FastProxy::new(Uuid::new_v4(), ProxyConfig::default());
    let budget = ProxyConfig::default().tick_budget;
    let view = WorldView::empty();

    c.bench_function("tick_empty", |b| {
        b.iter(|| proxy.update(black_box(budget), black_box(&view)))
    });
}

/// Benchmark a combat tick with increasingly crowded surroundings
fn bench_tick_populated(c: &mut Criterion) {
    let budget = ProxyConfig::default().tick_budget;
    let mut group = c.benchmark_group("tick_populated");

    for per_kind in [1usize, 10, 50] {
        let proxy = FastProxy::new(Uuid::new_v4(), ProxyConfig::default());
        proxy
            .receive_directive(Directive::new(Strategy::Aggressive))
            .unwrap();
        let view = populated_view(per_kind);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(per_kind),
            &view,
            |b, view| b.iter(|| proxy.update(black_box(budget), black_box(view))),
        );
    }
    group.finish();
}

/// Benchmark ticking many entities through the registry in one frame
fn bench_registry_frame(c: &mut Criterion) {
    let budget = ProxyConfig::default().tick_budget;
    let mut group = c.benchmark_group("registry_frame");
    group.measurement_time(Duration::from_secs(10));

    for entity_count in [100usize, 1000] {
        let registry = ProxyRegistry::new(ProxyConfig::default());
        let entities: Vec<Uuid> = (0..entity_count).map(|_| Uuid::new_v4()).collect();
        let view = populated_view(5);
        // Warm the registry so creation cost stays out of the loop.
        for entity in &entities {
            registry.update(*entity, budget, &view);
        }

        group.throughput(Throughput::Elements(entity_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            &entities,
            |b, entities| {
                b.iter(|| {
                    for entity in entities {
                        black_box(registry.update(*entity, budget, &view));
                    }
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tick_empty,
    bench_tick_populated,
    bench_registry_frame
);
criterion_main!(benches);
