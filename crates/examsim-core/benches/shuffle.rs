use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use examsim_core::shuffle::shuffle;

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");
    let mut rng = StdRng::seed_from_u64(42);

    for n in [60usize, 1_000, 100_000] {
        let mut items: Vec<usize> = (0..n).collect();
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| shuffle(black_box(&mut items), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shuffle);
criterion_main!(benches);
