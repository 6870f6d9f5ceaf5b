use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lson::parse;
use lson_runtime::{EvalOptions, Evaluator, Session};
use std::time::Duration;

const FIB: &str = r#"["defun", "fib", ["n"], ["if", ["<", "n", 2], "n", ["+", ["fib", ["-", "n", 1]], ["fib", ["-", "n", 2]]]]]"#;

// ============================================================================
// Codec Benchmarks
// ============================================================================

fn bench_parse_small(c: &mut Criterion) {
    c.bench_function("parse small expr", |b| {
        b.iter(|| black_box(parse(r#"["cons", 1, ["list", 2]]"#).unwrap()))
    });
}

fn bench_parse_large_list(c: &mut Criterion) {
    let elements: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    let expr = format!(r#"["list", {}]"#, elements.join(", "));

    c.bench_function("parse large list (1000 elements)", |b| {
        b.iter(|| black_box(parse(&expr).unwrap()))
    });
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn bench_construction(c: &mut Criterion) {
    c.bench_function("evaluator construction", |b| {
        b.iter(|| black_box(Evaluator::new().unwrap()))
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut evaluator = Evaluator::new().unwrap();
    let expr = parse(r#"["+", 1, 2, 3, 4, 5, ["*", 6, 7], ["-", 8, 9], ["/", 10, 3]]"#).unwrap();
    c.bench_function("eval arithmetic", |b| {
        b.iter(|| black_box(evaluator.eval_toplevel(&expr).unwrap()))
    });
}

fn bench_let(c: &mut Criterion) {
    let mut evaluator = Evaluator::new().unwrap();
    let expr = parse(r#"["let", ["a", 1, "b", 2, "c", 3], ["+", "a", "b", "c"]]"#).unwrap();
    c.bench_function("eval let expansion", |b| {
        b.iter(|| black_box(evaluator.eval_toplevel(&expr).unwrap()))
    });
}

fn bench_recursive_fib(c: &mut Criterion) {
    let mut session = Session::new(EvalOptions::default()).unwrap();
    session.eval_line(FIB).unwrap();
    let expr = parse(r#"["fib", 15]"#).unwrap();
    c.bench_function("recursive fib 15", |b| {
        b.iter(|| black_box(session.eval_value(&expr).unwrap()))
    });
}

criterion_group!(codec_benches, bench_parse_small, bench_parse_large_list);

criterion_group! {
    name = eval_benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5));
    targets =
        bench_construction,
        bench_arithmetic,
        bench_let,
        bench_recursive_fib
}

criterion_main!(codec_benches, eval_benches);
