//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for workers, unlocks, powers and
//! shop items. Cross-references are written as names; the loader resolves
//! them into the index ids the engine uses.

use clicker_core::power::BuffCommand;
use clicker_core::id::UnlockKind;
use clicker_core::unlock::{ParamTable, UnlockParam, UnlockUpgrade};
use clicker_core::worker::WorkerKind;
use serde::Deserialize;

// ===========================================================================
// Workers
// ===========================================================================

/// A worker slot. File order is ladder order.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerData {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: WorkerKind,
    pub base_price: f64,
    pub price_curve: f64,
    pub base_value: f64,
    pub value_curve: f64,
}

fn default_kind() -> WorkerKind {
    WorkerKind::Production
}

// ===========================================================================
// Unlocks
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UnlockData {
    pub kind: UnlockKind,
    /// Name of the bound worker.
    pub worker: String,
    pub level_required: u32,
    #[serde(default)]
    pub base: ParamTable,
    #[serde(default)]
    pub upgrades: Vec<UnlockUpgrade>,
}

// ===========================================================================
// Powers
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PowerData {
    pub name: String,
    pub mana_cost: f64,
    pub cooldown_seconds: f64,
    /// Level of the power-unlock worker at which the power appears.
    #[serde(default)]
    pub level_required: Option<u32>,
    #[serde(default)]
    pub effect: Vec<BuffCommand>,
    #[serde(default)]
    pub initially_visible: bool,
}

// ===========================================================================
// Shop
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ShopItemData {
    pub name: String,
    pub price: f64,
    pub value: f64,
    pub target: TargetData,
    #[serde(default)]
    pub condition: Option<ConditionData>,
    #[serde(default)]
    pub initially_visible: bool,
}

/// What a shop item modifies, by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetData {
    Worker(String),
    PowerCost(String),
    UnlockParam(UnlockParam),
    ManaCapacity,
    ManaRegen,
}

/// A shop visibility condition, by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionData {
    MinCurrency(f64),
    WorkerLevel { worker: String, level: u32 },
    Bought(String),
    PowerOwned(String),
    All(Vec<ConditionData>),
    Any(Vec<ConditionData>),
}
