//! Benchmarks for OutputParser.
//!
//! Run:
//! - cargo bench --bench parse_output

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sketchsweep::parser::{OutputParser, ParseLevel};

fn report(noise_lines: usize) -> String {
    let mut text = String::from("Sketch Type: Count Sketch\n");
    for i in 0..noise_lines {
        text.push_str(&format!("debug: bucket {i} rebalanced\n"));
    }
    text.push_str(
        "Time to generate 100000000 items: 1.21 secs\n\
         Time to count 100000000 items: 2.48 secs\n\
         Real K value: 37\n\
         Time to stream items into sketch: 0.93 secs\n\
         True Positives: 35.000000\t False Positives: 2.000000\tFalse Negatives: 2.000000\n\
         Size of Sketch in Bytes: 16384\n\
         precision: 94.59 percent\n\
         recall: 94.59 percent\n",
    );
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_output");
    for level in [ParseLevel::Baseline, ParseLevel::Timing] {
        let parser = OutputParser::new(level);
        for noise in [0usize, 1_000] {
            let text = report(noise);
            group.bench_with_input(
                BenchmarkId::new(format!("{level:?}"), noise),
                &text,
                |b, text| b.iter(|| parser.parse(black_box(text)).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
