//! Read-only snapshot types handed to presentation layers.
//!
//! Every type here is an owned copy built fresh by `Engine::snapshot()`.
//! Nothing is cached between snapshots, so a snapshot always agrees with
//! the records at the moment it was taken.

use crate::id::{PowerId, ShopItemId, WorkerId};
use crate::numeric::Ticks;
use crate::shop::ShopTarget;
use crate::streak::StreakPhase;
use crate::worker::WorkerKind;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub tick: Ticks,
    pub currency: f64,
    pub mana: f64,
    pub max_mana: f64,
    /// Value of one plain click before critical and streak rolls.
    pub click_value: f64,
    /// Composed automatic production per second.
    pub production_per_second: f64,
    /// Every worker slot in ladder order.
    pub workers: Vec<WorkerView>,
    /// Owned workers in purchase order.
    pub owned_workers: Vec<WorkerView>,
    pub shop: Vec<ShopItemView>,
    pub powers: Vec<PowerView>,
    pub unlocks: UnlockFlags,
    pub streak: StreakView,
    pub buffs: BuffView,
    /// Powers the power worker has not reached yet, lowest level first.
    pub upcoming_power_tiers: Vec<PowerTierView>,
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerView {
    pub id: WorkerId,
    pub name: String,
    pub kind: WorkerKind,
    pub level: u32,
    pub price: f64,
    pub visible: bool,
    pub owned: bool,
    pub can_buy: bool,
    /// Per-second output including the tier step and shop multiplier.
    pub effective_rate: f64,
    pub effective_click_bonus: f64,
    pub tier_step: f64,
    pub shop_multiplier: f64,
    /// Lowest level above the current one that unlocks or upgrades a feature.
    pub next_unlock_level: Option<u32>,
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopItemView {
    pub id: ShopItemId,
    pub name: String,
    pub price: f64,
    pub value: f64,
    pub target: ShopTarget,
    pub visible: bool,
    pub bought: bool,
    pub can_buy: bool,
}

// ---------------------------------------------------------------------------
// Powers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerView {
    pub id: PowerId,
    pub name: String,
    pub visible: bool,
    pub base_mana_cost: f64,
    /// Cost after shop factors.
    pub mana_cost: f64,
    pub has_effect: bool,
    pub can_cast: bool,
    pub on_cooldown: bool,
    /// Whole seconds, rounded up.
    pub cooldown_remaining_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerTierView {
    pub power: PowerId,
    pub name: String,
    pub level_required: u32,
}

// ---------------------------------------------------------------------------
// Unlocks, streak, buffs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnlockFlags {
    pub critical_hit: bool,
    pub sun: bool,
    pub streak: bool,
    pub power: bool,
    /// Chance including shop bonuses; meaningful once `critical_hit` is set.
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    pub sun_multiplier: f64,
}

/// Bar values read as zero while the streak is locked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreakView {
    pub unlocked: bool,
    pub phase: StreakPhase,
    pub current: f64,
    pub max: f64,
    pub active: bool,
    /// Multiplier granted while active; `None` while locked.
    pub damage_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuffView {
    pub damage_active: bool,
    pub damage_multiplier: f64,
    pub damage_remaining_seconds: u64,
    /// Share of the window left, in `[0, 1]`.
    pub damage_remaining_fraction: f64,
    pub weakness_active: bool,
    pub combo_multiplier: f64,
    pub speed_multiplier: f64,
    pub weakness_remaining_seconds: u64,
    pub weakness_remaining_fraction: f64,
}
