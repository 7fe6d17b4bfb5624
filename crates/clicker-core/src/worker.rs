//! The worker ladder: purchasable production and click-bonus units.
//!
//! # Curves
//!
//! - price: `floor(base_price * price_curve^level)`
//! - raw output: `round2(base_value * value_curve^level)`
//! - production throughput: raw output times the level tier step
//!
//! The tier step doubles production at fixed level breakpoints:
//!
//! | level   | step |
//! |---------|------|
//! | 0..=9   | x1   |
//! | 10..=24 | x2   |
//! | 25..=49 | x4   |
//! | 50..=74 | x8   |
//!
//! and keeps doubling every 25 levels after that. Click-bonus workers never
//! use the tier step and never contribute to per-second throughput.

use crate::command::CommandError;
use crate::id::WorkerId;
use crate::ledger::ResourceLedger;
use crate::numeric::{Millis, geometric, round2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// The role of a worker. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Contributes currency per second on every tick.
    Production,
    /// Adds to the value of each manual click.
    ClickBonus,
}

/// Static description of a worker slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerDef {
    pub name: String,
    pub kind: WorkerKind,
    pub base_price: f64,
    pub price_curve: f64,
    pub base_value: f64,
    pub value_curve: f64,
}

impl WorkerDef {
    pub fn production(
        name: &str,
        base_value: f64,
        value_curve: f64,
        base_price: f64,
        price_curve: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: WorkerKind::Production,
            base_price,
            price_curve,
            base_value,
            value_curve,
        }
    }

    pub fn click_bonus(
        name: &str,
        base_value: f64,
        value_curve: f64,
        base_price: f64,
        price_curve: f64,
    ) -> Self {
        Self {
            kind: WorkerKind::ClickBonus,
            ..Self::production(name, base_value, value_curve, base_price, price_curve)
        }
    }
}

// ---------------------------------------------------------------------------
// Worker record
// ---------------------------------------------------------------------------

/// A worker slot: its definition plus the mutable progression state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub def: WorkerDef,
    level: u32,
    visible: bool,
    owned: bool,
    /// Clock time of the last accepted upgrade, for the double-submit guard.
    last_upgraded_at: Option<Millis>,
}

impl Worker {
    pub fn new(def: WorkerDef) -> Self {
        Self {
            def,
            level: 0,
            visible: false,
            owned: false,
            last_upgraded_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn kind(&self) -> WorkerKind {
        self.def.kind
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Current purchase price of the next level.
    pub fn price(&self) -> f64 {
        price_at(&self.def, self.level)
    }

    /// Output before tier step and shop multipliers.
    pub fn raw_value(&self) -> f64 {
        round2(geometric(self.def.base_value, self.def.value_curve, self.level))
    }

    /// Per-second output before shop multipliers. Zero for click workers.
    pub fn base_throughput(&self) -> f64 {
        match self.def.kind {
            WorkerKind::Production => self.raw_value() * tier_step(self.level),
            WorkerKind::ClickBonus => 0.0,
        }
    }

    /// Per-click bonus before shop multipliers. Zero for production workers.
    pub fn base_click_bonus(&self) -> f64 {
        match self.def.kind {
            WorkerKind::ClickBonus => self.raw_value(),
            WorkerKind::Production => 0.0,
        }
    }

    pub fn can_afford(&self, currency: f64) -> bool {
        currency >= self.price()
    }

    /// The visibility rule before latching: owned, or half the base price
    /// has been reached.
    pub fn visibility_rule(&self, currency: f64) -> bool {
        self.owned || currency >= (self.def.base_price / 2.0).floor()
    }
}

/// Price of a worker definition at an arbitrary level.
pub fn price_at(def: &WorkerDef, level: u32) -> f64 {
    geometric(def.base_price, def.price_curve, level).floor()
}

/// Production multiplier for the level band a worker is in.
pub fn tier_step(level: u32) -> f64 {
    match level {
        0..=9 => 1.0,
        10..=24 => 2.0,
        _ => 2f64.powi(2 + ((level - 25) / 25) as i32),
    }
}

// ---------------------------------------------------------------------------
// Ladder
// ---------------------------------------------------------------------------

/// All worker slots plus the ordered list of owned slots.
///
/// `owned` holds ids into `workers`; a worker appears there at most once,
/// from its first purchase onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerLadder {
    workers: Vec<Worker>,
    owned: Vec<WorkerId>,
}

impl WorkerLadder {
    pub fn new(defs: Vec<WorkerDef>) -> Self {
        Self {
            workers: defs.into_iter().map(Worker::new).collect(),
            owned: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id.index())
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Owned workers in purchase order.
    pub fn owned_ids(&self) -> &[WorkerId] {
        &self.owned
    }

    pub fn owned(&self) -> impl Iterator<Item = (WorkerId, &Worker)> {
        self.owned.iter().map(|&id| (id, &self.workers[id.index()]))
    }

    /// Level of a worker if it is owned, `None` otherwise.
    pub fn level_if_owned(&self, id: WorkerId) -> Option<u32> {
        self.get(id).filter(|w| w.owned).map(|w| w.level)
    }

    /// Throughput of one worker including its shop multiplier.
    pub fn effective_throughput(&self, id: WorkerId, shop_multiplier: f64) -> f64 {
        self.get(id)
            .map(|w| w.base_throughput() * shop_multiplier)
            .unwrap_or(0.0)
    }

    /// Click bonus of one worker including its shop multiplier.
    pub fn effective_click_bonus(&self, id: WorkerId, shop_multiplier: f64) -> f64 {
        self.get(id)
            .map(|w| w.base_click_bonus() * shop_multiplier)
            .unwrap_or(0.0)
    }

    /// Sum of owned production, each scaled by its shop multiplier.
    pub fn production_rate<F>(&self, shop_multiplier: F) -> f64
    where
        F: Fn(WorkerId) -> f64,
    {
        self.owned
            .iter()
            .map(|&id| self.effective_throughput(id, shop_multiplier(id)))
            .sum()
    }

    /// Sum of owned click bonuses, each scaled by its shop multiplier.
    pub fn click_bonus_sum<F>(&self, shop_multiplier: F) -> f64
    where
        F: Fn(WorkerId) -> f64,
    {
        self.owned
            .iter()
            .map(|&id| self.effective_click_bonus(id, shop_multiplier(id)))
            .sum()
    }

    /// Latch the sticky `visible` flag on every worker whose rule now holds.
    pub fn latch_visibility(&mut self, currency: f64) {
        for worker in &mut self.workers {
            if !worker.visible && worker.visibility_rule(currency) {
                worker.visible = true;
            }
        }
    }

    /// Buy one level of worker `id`.
    ///
    /// Rejects an invalid id, a repeat of the same id within `debounce_ms`
    /// of its last accepted upgrade, or insufficient currency. Returns the new
    /// level on success.
    pub fn upgrade(
        &mut self,
        id: WorkerId,
        ledger: &mut ResourceLedger,
        now: Millis,
        debounce_ms: Millis,
        epsilon: f64,
    ) -> Result<u32, CommandError> {
        let worker = self
            .workers
            .get_mut(id.index())
            .ok_or(CommandError::InvalidIndex(id.index()))?;

        if let Some(last) = worker.last_upgraded_at
            && now.saturating_sub(last) < debounce_ms
        {
            return Err(CommandError::Debounced);
        }

        let price = worker.price();
        if !ledger.try_spend_currency(price, epsilon) {
            return Err(CommandError::InsufficientCurrency {
                required: price,
                available: ledger.currency(),
            });
        }

        worker.level += 1;
        worker.owned = true;
        worker.visible = true;
        worker.last_upgraded_at = Some(now);
        let level = worker.level;

        if !self.owned.contains(&id) {
            self.owned.push(id);
        }

        Ok(level)
    }
}
