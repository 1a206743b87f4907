mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use perception_core::parameter::{CategoricalParameter, CategoricalSpec};
use perception_core::tags::{ObjectId, RandomizerTag, TagManager, TagType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_weighted(count: usize, seed: u64) -> CategoricalSpec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    CategoricalSpec::weighted((0..count).map(|i| (format!("S{i}"), 0.01 + rng.random::<f32>())))
}

fn build(spec: &CategoricalSpec<String>) -> CategoricalParameter<String> {
    spec.validate().expect("bench option set is valid")
}

fn selection_weighted_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/weighted");

    for &n in &[8usize, 64, 256, 1024, 4096] {
        let parameter = build(&make_weighted(n, 0xC0FFEE));
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
            b.iter(|| {
                let sel = parameter.sample(&mut rng).map(String::len);
                black_box(sel.ok());
            });
        });
    }

    group.finish();
}

fn selection_uniform_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/uniform");

    for &n in &[8usize, 1024, 16384] {
        let parameter = build(&CategoricalSpec::uniform((0..n).map(|i| format!("S{i}"))));
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xBADC0DE);
            b.iter(|| {
                let sel = parameter.sample(&mut rng).map(String::len);
                black_box(sel.ok());
            });
        });
    }

    group.finish();
}

fn selection_setup_overhead_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/setup_overhead");
    let n = 4096usize;
    group.throughput(common::elements_throughput(n));

    group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
        b.iter_batched(
            || make_weighted(n, 0xCAFEBABE),
            |spec| black_box(spec.validate().map(|p| p.len()).ok()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

struct Prop;
impl RandomizerTag for Prop {}

struct Crate;
impl RandomizerTag for Crate {
    fn base() -> Option<TagType> {
        Some(TagType::of::<Prop>())
    }
}

struct Barrel;
impl RandomizerTag for Barrel {
    fn base() -> Option<TagType> {
        Some(TagType::of::<Prop>())
    }
}

fn tag_query_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/tag_query");

    for &n in &[64u64, 1024, 8192] {
        let mut tags = TagManager::new();
        for i in 0..n {
            if i % 2 == 0 {
                tags.add_tag(ObjectId(i), Crate);
            } else {
                tags.add_tag(ObjectId(i), Barrel);
            }
        }
        group.throughput(common::elements_throughput(n as usize));

        group.bench_with_input(BenchmarkId::new("with_subclasses", n), &n, |b, _| {
            b.iter(|| black_box(tags.query::<Prop>(true).len()));
        });
        group.bench_with_input(BenchmarkId::new("exact", n), &n, |b, _| {
            b.iter(|| black_box(tags.query_exact::<Crate>().count()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::selection_criterion();
    targets = selection_weighted_benches,
              selection_uniform_benches,
              selection_setup_overhead_benches,
              tag_query_benches
}
criterion_main!(benches);
