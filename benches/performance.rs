use criterion::{black_box, criterion_group, criterion_main, Criterion};

use neuro_core::hash::hash_file_content;
use neuro_parsers::python::PyExtractor;
use std::path::Path;

const SMALL_MODULE: &str = r#"
import os

class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return f"hello {self.name}"


def main():
    g = Greeter("world")
    print(g.greet())


if __name__ == "__main__":
    main()
"#;

fn bench_hash_file_content(c: &mut Criterion) {
    let bytes = SMALL_MODULE.as_bytes();
    c.bench_function("hash_small_module", |b| {
        b.iter(|| hash_file_content(black_box(bytes)))
    });

    let large = SMALL_MODULE.repeat(50);
    let large_bytes = large.as_bytes();
    c.bench_function("hash_large_module", |b| {
        b.iter(|| hash_file_content(black_box(large_bytes)))
    });
}

fn bench_extract_python(c: &mut Criterion) {
    c.bench_function("extract_small_module", |b| {
        b.iter(|| {
            let mut extractor = PyExtractor::new();
            extractor
                .extract(0, Path::new("pkg/mod.py"), "pkg.mod", black_box(SMALL_MODULE))
                .unwrap()
        })
    });

    let large = SMALL_MODULE.repeat(50);
    c.bench_function("extract_large_module", |b| {
        b.iter(|| {
            let mut extractor = PyExtractor::new();
            extractor
                .extract(0, Path::new("pkg/mod.py"), "pkg.mod", black_box(&large))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_hash_file_content, bench_extract_python);
criterion_main!(benches);
