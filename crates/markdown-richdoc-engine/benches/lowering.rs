use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markdown_richdoc_engine::{ConversionOptions, lex, lowering};
mod common;

fn bench_lex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    group.bench_function("token_tree", |b| {
        b.iter(|| std::hint::black_box(lex(std::hint::black_box(&content))));
    });

    group.finish();
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("lowering");
    group.sample_size(10);

    let options = ConversionOptions::default();
    let documents = [
        ("flat", common::generate_markdown_content(100)),
        ("nested", common::generate_complex_markdown(20, 5)),
        ("long_paragraph", common::generate_long_paragraph(50_000)),
    ];

    for (name, content) in &documents {
        let tokens = lex(content);
        group.bench_with_input(BenchmarkId::new("google_docs", name), &tokens, |b, t| {
            b.iter(|| std::hint::black_box(lowering::google_docs::lower(t, &options)));
        });
        group.bench_with_input(BenchmarkId::new("notion", name), &tokens, |b, t| {
            b.iter(|| std::hint::black_box(lowering::notion::lower(t, &options)));
        });
        group.bench_with_input(BenchmarkId::new("slack", name), &tokens, |b, t| {
            b.iter(|| std::hint::black_box(lowering::slack::lower(t, &options)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lex, bench_backends);
criterion_main!(benches);
