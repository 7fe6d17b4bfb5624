//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::sync::Arc;

use crate::clock::ManualClock;
use crate::config::GameConfig;
use crate::content;
use crate::definition::GameDefinition;
use crate::engine::Engine;
use crate::id::{PowerId, UnlockKind, WorkerId};
use crate::power::PowerDef;
use crate::shop::{ShopItemDef, ShopTarget};
use crate::unlock::{PowerTier, UnlockDef, UnlockParam};
use crate::worker::WorkerDef;

// ===========================================================================
// Engines
// ===========================================================================

/// Engine over `definition` with a manual clock starting at 1s.
pub fn engine_with(definition: GameDefinition, config: GameConfig) -> (Engine, ManualClock) {
    let clock = ManualClock::new(1_000);
    let engine = Engine::new(definition, config, Arc::new(clock.clone()))
        .expect("test definition should validate");
    (engine, clock)
}

/// The classic game with default tuning.
pub fn classic_engine() -> (Engine, ManualClock) {
    engine_with(content::classic(), GameConfig::default())
}

/// The classic game with `currency` already in the ledger.
pub fn funded_classic_engine(currency: f64) -> (Engine, ManualClock) {
    let (mut engine, clock) = classic_engine();
    grant_currency(&mut engine, currency);
    (engine, clock)
}

// ===========================================================================
// Resources
// ===========================================================================

pub fn grant_currency(engine: &mut Engine, amount: f64) {
    engine.grant(amount, 0.0);
}

pub fn grant_mana(engine: &mut Engine, amount: f64) {
    engine.grant(0.0, amount);
}

// ===========================================================================
// Worker levels
// ===========================================================================

/// Buy `levels` levels of `worker`, funding each purchase and stepping the
/// clock past the debounce window between them.
pub fn level_up(engine: &mut Engine, clock: &ManualClock, worker: WorkerId, levels: u32) {
    for _ in 0..levels {
        let price = engine.ladder().workers()[worker.index()].price();
        grant_currency(engine, price);
        clock.advance(engine.config().upgrade_debounce_ms);
        assert!(engine.upgrade_worker(worker), "upgrade of {worker:?} refused");
    }
}

/// Click `n` times, returning the total credited.
pub fn click_n(engine: &mut Engine, n: usize) -> f64 {
    (0..n).map(|_| engine.click()).sum()
}

// ===========================================================================
// Tiny definitions
// ===========================================================================

/// One click worker, one producer and one power gated at producer level 1.
pub fn tiny_definition() -> GameDefinition {
    GameDefinition {
        workers: vec![
            WorkerDef::click_bonus("tap", 1.0, 1.1, 10.0, 1.5),
            WorkerDef::production("mill", 1.0, 1.1, 10.0, 1.5),
        ],
        unlocks: vec![
            UnlockDef::new(UnlockKind::Power, WorkerId(1), 1)
                .with_base(UnlockParam::ManaCapacity, 0.0),
        ],
        power_tiers: vec![PowerTier {
            power: PowerId(0),
            level_required: 1,
        }],
        shop: vec![ShopItemDef::new("gear", 100.0, 2.0, ShopTarget::Worker(WorkerId(1)))],
        powers: vec![PowerDef::new("surge", 10.0, 5.0)],
    }
}
