// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use warnjuicer_generate::gen_lines;
use warnjuicer_rules::classify;

pub fn rules_classify(c: &mut Criterion) {
    let input = gen_lines().take(202).map(|l| l.line).collect::<Vec<String>>();
    c.bench_function("rules::classify", |b| {
        b.iter(|| {
            for line in &input {
                black_box(classify(black_box(line)));
            }
        })
    });
}

criterion_group!(benches, rules_classify);
criterion_main!(benches);
