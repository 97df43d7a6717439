// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_binding`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::rc::Rc;
use std::sync::Once;
use std::{string::String, vec::Vec};

use understory_binding::{
    Class, ErasedValue, ObservableExt, Priority, PriorityStore, PropertyMetadataBuilder,
    PropertyObject, PropertyRegistry, StyledProperty, Subject,
};

static PANEL: Class = Class::new("Panel");

struct Props {
    registry: Rc<PropertyRegistry>,
    width: StyledProperty<f64>,
    font_size: StyledProperty<f64>,
    text: StyledProperty<String>,
}

fn props() -> Props {
    let mut registry = PropertyRegistry::new();
    let width = registry.register_styled(&PANEL, "Width", PropertyMetadataBuilder::new(0.0_f64).build());
    let font_size = registry.register_styled(
        &PANEL,
        "FontSize",
        PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
    );
    let text = registry.register_styled(&PANEL, "Text", PropertyMetadataBuilder::new(String::new()).build());
    Props {
        registry: Rc::new(registry),
        width,
        font_size,
        text,
    }
}

fn bench_resolve(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: PriorityStore={} PropertyObject={} ErasedValue={}",
            core::mem::size_of::<PriorityStore>(),
            core::mem::size_of::<PropertyObject>(),
            core::mem::size_of::<ErasedValue>(),
        );
    });

    let p = props();
    let mut group = c.benchmark_group("binding/resolve");

    group.bench_function("local", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        object.set_value(p.width, 100.0, Priority::LocalValue);
        b.iter(|| black_box(object.get_value(p.width)))
    });

    group.bench_function("animation_over_style", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        let _style = object.set_value(p.width, 50.0, Priority::Style);
        let _animation = object.set_value(p.width, 200.0, Priority::Animation);
        b.iter(|| black_box(object.get_value(p.width)))
    });

    group.bench_function("default", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        b.iter(|| black_box(object.get_value(p.width)))
    });

    // A small inheritance chain: 0 <- 1 <- ... <- N-1
    let chain_len: u32 = 16;
    let chain: Vec<PropertyObject> = (0..chain_len)
        .map(|_| PropertyObject::new(&PANEL, Rc::clone(&p.registry)))
        .collect();
    for pair in chain.windows(2) {
        pair[1].set_parent(Some(&pair[0]));
    }
    chain[0].set_value(p.font_size, 16.0, Priority::LocalValue);
    let leaf = &chain[(chain_len - 1) as usize];
    group.bench_function(BenchmarkId::new("inherited", chain_len), |b| {
        b.iter(|| black_box(leaf.get_value(p.font_size)))
    });

    group.bench_function("string_clone", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        object.set_value(
            p.text,
            "hello world hello world hello world".to_string(),
            Priority::LocalValue,
        );
        b.iter(|| black_box(object.get_value(p.text).len()))
    });

    group.finish();
}

fn bench_mutate(c: &mut Criterion) {
    let p = props();
    let mut group = c.benchmark_group("binding/mutate");

    group.bench_function("set_local/no_observers", |b| {
        b.iter_batched(
            || PropertyObject::new(&PANEL, Rc::clone(&p.registry)),
            |object| {
                object.set_value(p.width, 123.0, Priority::LocalValue);
                black_box(object);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("set_local/value_observer", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        let _observer = object
            .get_observable(p.width)
            .subscribe_fn(|v: f64| {
                black_box(v);
            });
        let mut next = 0.0;
        b.iter(|| {
            next += 1.0;
            object.set_value(p.width, next, Priority::LocalValue);
        })
    });

    group.bench_function("set_style/shadowed", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        object.set_value(p.width, 100.0, Priority::LocalValue);
        let mut next = 0.0;
        b.iter(|| {
            next += 1.0;
            black_box(object.set_value(p.width, next, Priority::Style))
        })
    });

    let chain_len: u32 = 16;
    group.bench_function(BenchmarkId::new("inherited_fanout", chain_len), |b| {
        let root = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        let children: Vec<PropertyObject> = (0..chain_len)
            .map(|_| {
                let child = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
                child.set_parent(Some(&root));
                child
            })
            .collect();
        let mut next = 12.0;
        b.iter(|| {
            next += 1.0;
            root.set_value(p.font_size, next, Priority::LocalValue);
        });
        black_box(children);
    });

    group.bench_function("bind/push", |b| {
        let object = PropertyObject::new(&PANEL, Rc::clone(&p.registry));
        let source: Subject<f64> = Subject::new();
        let _binding = object.bind(p.width, source.clone(), Priority::LocalValue);
        let mut next = 0.0;
        b.iter(|| {
            next += 1.0;
            source.next(next);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_mutate);
criterion_main!(benches);
