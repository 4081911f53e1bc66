use criterion::{black_box, criterion_group, criterion_main, Criterion};
use npcscript_scripting::{Dispatch, ExecutionContext, FnDelegate, NativeCall, ParsedScript};
use std::sync::Arc;

const GUARD: &str = "\
#data
name \"Guard\"
level 20
set base = 40
for-each i in 1..10
    add base i
    if i % 3 == 0
        continue
    hp base * 2
while base > 10
    divide base 2
attack \"12-18\"
";

fn parse(c: &mut Criterion) {
    c.bench_function("parse guard", |b| {
        b.iter(|| ParsedScript::parse("guard", black_box(GUARD)).unwrap())
    });
}

fn execute(c: &mut Criterion) {
    let script = Arc::new(ParsedScript::parse("guard", GUARD).unwrap());
    c.bench_function("run data block", |b| {
        b.iter(|| {
            let mut calls = 0usize;
            let mut delegate = FnDelegate::new(|_: &NativeCall<'_>| {
                calls += 1;
                Ok(Dispatch::Handled)
            });
            let mut ctx = ExecutionContext::new().with_delegate(&mut delegate);
            ctx.run_block(&script, "data").unwrap();
            drop(ctx);
            drop(delegate);
            black_box(calls)
        })
    });
}

criterion_group!(benches, parse, execute);
criterion_main!(benches);
