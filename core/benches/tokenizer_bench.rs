use criterion::{criterion_group, criterion_main, Criterion};
use fts_core::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let sentence = "Go is a statically typed, compiled programming language designed at Google. ";
    let text = sentence.repeat(200);
    c.bench_function("tokenize_paragraphs", |b| b.iter(|| tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
