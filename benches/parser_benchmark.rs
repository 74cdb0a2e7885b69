use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gong_parser::lexer::Lexer;
use gong_parser::{parse_source, Mode};
use std::hint::black_box as bb;

// =============================================================================
// Corpus — gong sources of different sizes
// =============================================================================

const SMALL_HELLO: &str = r#"
package main

fun main() {
    println("Hello, World!")
}
"#;

const MEDIUM_GEOMETRY: &str = r#"
package geometry

type Float = float64

fun (p Point) Abs() Float {
    return sqrt(p.X*p.X + p.Y*p.Y)
}

fun (p *Point) Scale(f Float) {
    p.X = p.X * f
    p.Y = p.Y * f
}

fun Dot(a, b Point) Float {
    return a.X*b.X + a.Y*b.Y
}

fun Clamp(x, lo, hi Float) Float {
    if x < lo {
        return lo
    }
    if x > hi {
        return hi
    }
    return x
}
"#;

const LARGE_INTERP: &str = r#"
package interp

import (
    "fmt"
    "strings"
)

const (
    OpHalt = 0
    OpPush
    OpAdd
    OpMul
)

type Value = int
type Stack = *Frame

fun NewMachine[T any](prog T) *Machine {
    m := Machine{prog: prog, pc: 0}
    return &m
}

fun (m *Machine) Step() int {
    op := m.fetch()
    if op == OpHalt {
        return 0
    }
    if op == OpPush {
        m.push(m.operand())
    } else if op == OpAdd {
        a := m.pop()
        b := m.pop()
        m.push(a + b)
    } else if op == OpMul {
        a := m.pop()
        b := m.pop()
        m.push(a * b)
    }
    m.pc++
    return 1
}

fun (m *Machine) Run() int {
    n := 0
loop:
    if m.Step() == 0 {
        return n
    }
    n++
    goto loop
}

fun Render(vals ...Value) string {
    out := builder()
    _ = strings.Join
    _ = fmt.Sprint
    return out.String()
}
"#;

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    for (name, input) in [
        ("small", SMALL_HELLO),
        ("medium", MEDIUM_GEOMETRY),
        ("large", LARGE_INTERP),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("iterate_bytes", name), &input, |b, &input| {
            b.iter(|| {
                let mut acc: u64 = 0;
                for (l, _t, r) in Lexer::new(bb(input)) {
                    acc = acc.wrapping_add(l as u64);
                    acc = acc.wrapping_add(r as u64);
                }
                bb(acc);
            });
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, input) in [
        ("small", SMALL_HELLO),
        ("medium", MEDIUM_GEOMETRY),
        ("large", LARGE_INTERP),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("full", name), &input, |b, &input| {
            b.iter(|| {
                let p = parse_source(bb(input), Mode::NONE);
                debug_assert!(p.errors.is_empty());
                bb(p);
            });
        });

        group.bench_with_input(
            BenchmarkId::new("no_resolution", name),
            &input,
            |b, &input| {
                b.iter(|| {
                    let p = parse_source(bb(input), Mode::SKIP_OBJECT_RESOLUTION);
                    bb(p);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("with_comments", name),
            &input,
            |b, &input| {
                b.iter(|| {
                    let p = parse_source(bb(input), Mode::PARSE_COMMENTS);
                    bb(p);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parse);
criterion_main!(benches);
