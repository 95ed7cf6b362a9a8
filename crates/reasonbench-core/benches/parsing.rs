use criterion::{black_box, criterion_group, criterion_main, Criterion};

use reasonbench_core::score_report::parse_score_report;

fn bench_parse_score_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_score_report");

    let full = "\
step_level_validity_scores: [0.9, 0.8, 0.75, 0.6]
step_level_redundancy_scores: [0.1, 0.2, 0.05, 0.3]
solution_level_validity_scores: 0.6
solution_level_redundancy_scores: 0.3
";

    let noisy = {
        let mut s = String::new();
        for i in 0..200 {
            s.push_str(&format!("Loading checkpoint shard {i}/200 ...\n"));
        }
        s.push_str(full);
        s
    };

    let long_sequence = {
        let scores: Vec<String> = (0..500).map(|i| format!("{:.3}", i as f64 / 500.0)).collect();
        format!("step_level_validity_scores: [{}]\n", scores.join(", "))
    };

    let empty = "model loaded, nothing reported\n";

    group.bench_function("full", |b| b.iter(|| parse_score_report(black_box(full))));

    group.bench_function("noisy", |b| {
        b.iter(|| parse_score_report(black_box(&noisy)))
    });

    group.bench_function("long_sequence", |b| {
        b.iter(|| parse_score_report(black_box(&long_sequence)))
    });

    group.bench_function("empty", |b| b.iter(|| parse_score_report(black_box(empty))));

    group.finish();
}

criterion_group!(benches, bench_parse_score_report);
criterion_main!(benches);
