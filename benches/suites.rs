use criterion::{criterion_group, criterion_main, Criterion};
use fvm::assembler;
use fvm::frontend::{
    assemble,
    run::execute::{self, Config},
};
use fvm::vm::Io;
use std::io::Cursor;
use std::path::Path;

const COUNT_UNIT: &str = "asm/test/count.fa";

fn suite_test_count(c: &mut Criterion) {
    let image = match assemble::assemble_path(Path::new(COUNT_UNIT)) {
        Ok(image) => image,
        Err(err) => panic!("could not assemble '{}': {:#}", COUNT_UNIT, err),
    };
    let cfg = Config::default();

    c.bench_function("count", |b| {
        b.iter(|| {
            let mut input: &[u8] = &[];
            let mut output: Vec<u8> = Vec::new();
            let mut disk = Cursor::new(Vec::<u8>::new());
            execute::execute(&cfg, &image, Io::new(&mut input, &mut output, &mut disk))
        })
    });
}

fn assemble_count(c: &mut Criterion) {
    let source = match assemble::read_source(Path::new(COUNT_UNIT)) {
        Ok(source) => source,
        Err(err) => panic!("{:#}", err),
    };

    c.bench_function("assemble", |b| b.iter(|| assembler::assemble_raw(&source)));
}

criterion_group!(benches, suite_test_count, assemble_count);
criterion_main!(benches);
