use std::hint::black_box;

use criterion::*;

mod common;
use common::{Position, Velocity, ENTITIES_MED};

fn iterate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    group.throughput(Throughput::Elements(ENTITIES_MED as u64));

    let mut world = common::setup_world(ENTITIES_MED);

    group.bench_function("read_100k_position_velocity", |b| {
        let view = world.view::<(Position, Velocity)>().expect("view");
        b.iter(|| {
            let mut sum = 0.0f32;
            view.for_each(|_, position, velocity| {
                sum += position.x + velocity.x;
            });
            black_box(sum)
        })
    });

    group.bench_function("write_100k_integrate", |b| {
        b.iter(|| {
            let mut view = world.view_mut::<(Position, Velocity)>().expect("view");
            view.for_each(|_, position, velocity| {
                position.x += velocity.x;
            });
        })
    });

    group.bench_function("par_read_100k", |b| {
        let view = world.view::<(Position, Velocity)>().expect("view");
        b.iter(|| {
            view.par_for_each(|_, position, velocity| {
                black_box(position.x + velocity.x);
            });
        })
    });

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
