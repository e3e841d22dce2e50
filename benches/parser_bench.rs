use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vercodec::{ByteParser, Parser, TryIntoParser};

const INPUT: &[u8] = b"This is a sample buffer we wish to parse out, byte by byte and word by word.";

fn byte_bench(c: &mut Criterion) {
    c.bench_function("byteparser_bytes", |b| {
        b.iter(|| {
            let mut p: ByteParser = INPUT.try_into_parser().unwrap();
            while let Ok(x) = p.take_u8() {
                black_box(x);
            }
        })
    });
}

fn word_bench(c: &mut Criterion) {
    c.bench_function("byteparser_words", |b| {
        b.iter(|| {
            let mut p: ByteParser = INPUT.try_into_parser().unwrap();
            while let Ok(x) = p.take_u32() {
                black_box(x);
            }
        })
    });
}

criterion_group! {
    name = parser_benches;
    config = Criterion::default();
    targets = byte_bench, word_bench
}

criterion_main!(parser_benches);
