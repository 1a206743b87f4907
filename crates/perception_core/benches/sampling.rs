mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use perception_core::rng::RandomState;
use perception_core::sampler::{AnimationCurve, SamplerSpec};
use perception_core::sampling::PoissonDiskSampling;
use rand::rngs::StdRng;
use rand::SeedableRng;

const RADII: [f32; 5] = [32.0, 16.0, 8.0, 4.0, 2.0];
const RESOLUTIONS: [u32; 3] = [8, 30, 64];
const BATCH: usize = 4096;

fn sampling_poisson_benches(c: &mut Criterion) {
    let (width, height) = (512.0, 512.0);

    let mut group = c.benchmark_group("sampling/poisson_disk");

    for &radius in &RADII {
        let strategy = PoissonDiskSampling::new(radius);
        let expected = strategy
            .generate(width, height, 0xBEEF ^ radius as u32)
            .map(|pts| pts.len())
            .unwrap_or(0);
        group.throughput(common::elements_throughput(expected));

        let mut rng = StdRng::seed_from_u64(0xC0FFEEu64 ^ (radius as u64));

        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| {
                let pts = strategy.generate_with(width, height, &mut rng);
                black_box(pts.map(|p| p.len()).unwrap_or(0));
            });
        });
    }

    group.finish();
}

fn sampling_poisson_resolution_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/poisson_disk/resolution");

    for &resolution in &RESOLUTIONS {
        let strategy = PoissonDiskSampling::new(4.0)
            .with_sampling_resolution(resolution)
            .with_pad_edges(true);
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &resolution,
            |b, _| {
                let mut seed = 1u32;
                b.iter(|| {
                    seed = seed.wrapping_add(1).max(1);
                    let pts = strategy.generate(256.0, 256.0, seed);
                    black_box(pts.map(|p| p.len()).unwrap_or(0));
                });
            },
        );
    }

    group.finish();
}

fn sampler_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/samplers");
    group.throughput(common::elements_throughput(BATCH));

    let specs = [
        ("constant", SamplerSpec::constant(1.0)),
        ("uniform", SamplerSpec::uniform(-10.0, 10.0)),
        ("normal", SamplerSpec::normal(-1.0, 1.0, 0.0, 0.3)),
        ("normal_narrow", SamplerSpec::normal(0.9, 1.0, 0.0, 0.1)),
        ("curve", SamplerSpec::curve(AnimationCurve::triangle())),
    ];

    for (name, spec) in specs {
        let Ok(sampler) = spec.validate() else {
            continue;
        };
        group.bench_function(name, |b| {
            let mut rng = RandomState::new(0x5EED).unwrap();
            b.iter(|| {
                let values = sampler.samples(&mut rng, BATCH);
                black_box(values.len());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::sampling_criterion();
    targets = sampling_poisson_benches,
              sampling_poisson_resolution_benches,
              sampler_benches
}
criterion_main!(benches);
