//! Criterion benchmarks for the clicker simulation engine.
//!
//! Three benchmark groups:
//! - `tick`: one step of a late-game classic engine with every worker owned
//! - `click`: a click with critical hits and the streak unlocked
//! - `snapshot`: building the full read-only view

use criterion::{Criterion, criterion_group, criterion_main};
use clicker_core::content::{SMITH, WIZARD};
use clicker_core::engine::Engine;
use clicker_core::id::WorkerId;
use clicker_core::test_utils::*;

// ===========================================================================
// Engine builders
// ===========================================================================

/// Every worker at level 30, streak and powers unlocked.
fn build_late_game() -> Engine {
    let (mut engine, clock) = classic_engine();
    for i in 0..engine.ladder().len() {
        level_up(&mut engine, &clock, WorkerId(i as u32), 30);
    }
    level_up(&mut engine, &clock, SMITH, 20);
    level_up(&mut engine, &clock, WIZARD, 20);
    engine
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_tick(c: &mut Criterion) {
    let mut engine = build_late_game();
    c.bench_function("tick/late_game", |b| {
        b.iter(|| {
            engine.step();
        })
    });
}

fn bench_click(c: &mut Criterion) {
    let mut engine = build_late_game();
    c.bench_function("click/late_game", |b| {
        b.iter(|| engine.click())
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let engine = build_late_game();
    c.bench_function("snapshot/late_game", |b| {
        b.iter(|| engine.snapshot())
    });
}

criterion_group!(benches, bench_tick, bench_click, bench_snapshot);
criterion_main!(benches);
