//! Worker-bound feature gates and their parameter resolution.
//!
//! An [`UnlockDef`] binds one [`UnlockKind`] to a worker slot and a level
//! threshold. Its parameters start from `base` and fold in every upgrade the
//! bound worker has reached, in ascending `level_required` order. Additive
//! parameters sum their deltas; multiplier parameters compound them.
//!
//! The power unlock additionally carries a (power -> required level) table
//! that gates individual power visibility independently of the unlock itself.

use crate::id::{PowerId, UnlockKind, WorkerId};
use crate::worker::WorkerLadder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A tunable number owned by one unlock kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockParam {
    CriticalChance,
    CriticalMultiplier,
    SunMultiplier,
    StreakMax,
    StreakDrain,
    StreakDamage,
    ManaCapacity,
    ManaRegen,
}

impl UnlockParam {
    /// The unlock this parameter belongs to.
    pub fn kind(self) -> UnlockKind {
        match self {
            UnlockParam::CriticalChance | UnlockParam::CriticalMultiplier => {
                UnlockKind::CriticalHit
            }
            UnlockParam::SunMultiplier => UnlockKind::Sun,
            UnlockParam::StreakMax | UnlockParam::StreakDrain | UnlockParam::StreakDamage => {
                UnlockKind::Streak
            }
            UnlockParam::ManaCapacity | UnlockParam::ManaRegen => UnlockKind::Power,
        }
    }

    /// Whether upgrade deltas compound (`*=`) rather than sum (`+=`).
    pub fn is_multiplier(self) -> bool {
        matches!(
            self,
            UnlockParam::CriticalMultiplier | UnlockParam::SunMultiplier | UnlockParam::StreakDamage
        )
    }

    /// Value used when the definition's base omits this parameter.
    pub fn neutral(self) -> f64 {
        if self.is_multiplier() { 1.0 } else { 0.0 }
    }
}

/// Parameter deltas keyed by parameter.
pub type ParamTable = BTreeMap<UnlockParam, f64>;

/// A stronger version of an unlock reached at a higher level of the same worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockUpgrade {
    pub level_required: u32,
    pub deltas: ParamTable,
}

/// One worker-bound feature gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockDef {
    pub kind: UnlockKind,
    pub worker: WorkerId,
    pub level_required: u32,
    #[serde(default)]
    pub base: ParamTable,
    #[serde(default)]
    pub upgrades: Vec<UnlockUpgrade>,
}

impl UnlockDef {
    pub fn new(kind: UnlockKind, worker: WorkerId, level_required: u32) -> Self {
        Self {
            kind,
            worker,
            level_required,
            base: ParamTable::new(),
            upgrades: Vec::new(),
        }
    }

    pub fn with_base(mut self, param: UnlockParam, value: f64) -> Self {
        self.base.insert(param, value);
        self
    }

    pub fn with_upgrade(mut self, level_required: u32, deltas: &[(UnlockParam, f64)]) -> Self {
        self.upgrades.push(UnlockUpgrade {
            level_required,
            deltas: deltas.iter().copied().collect(),
        });
        self
    }

    /// Fold `base` and every upgrade reached at `level` into one value.
    pub fn resolve(&self, param: UnlockParam, level: u32) -> f64 {
        let mut value = self.base.get(&param).copied().unwrap_or(param.neutral());
        let mut reached: Vec<&UnlockUpgrade> = self
            .upgrades
            .iter()
            .filter(|u| u.level_required <= level)
            .collect();
        reached.sort_by_key(|u| u.level_required);
        for upgrade in reached {
            if let Some(&delta) = upgrade.deltas.get(&param) {
                if param.is_multiplier() {
                    value *= delta;
                } else {
                    value += delta;
                }
            }
        }
        value
    }

    /// Every level at which this gate or one of its upgrades triggers.
    fn milestones(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.level_required).chain(self.upgrades.iter().map(|u| u.level_required))
    }
}

/// Level of the bound worker at which a power becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerTier {
    pub power: PowerId,
    pub level_required: u32,
}

// ---------------------------------------------------------------------------
// Resolved parameter sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalParams {
    pub chance: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunParams {
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreakParams {
    pub max: f64,
    pub drain_per_second: f64,
    pub damage_multiplier: f64,
}

impl StreakParams {
    /// Apply weakness-buff scaling and the floors that keep the bar usable.
    pub fn scaled(self, combo_multiplier: f64, speed_multiplier: f64) -> Self {
        Self {
            max: (self.max * combo_multiplier).max(1.0),
            drain_per_second: (self.drain_per_second * speed_multiplier).max(0.0),
            damage_multiplier: self.damage_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManaParams {
    pub capacity_bonus: f64,
    /// Mana per second.
    pub regen_bonus: f64,
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// All unlock definitions of a game, at most one per kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnlockRules {
    defs: Vec<UnlockDef>,
    power_tiers: Vec<PowerTier>,
}

impl UnlockRules {
    pub fn new(defs: Vec<UnlockDef>, mut power_tiers: Vec<PowerTier>) -> Self {
        power_tiers.sort_by_key(|t| (t.level_required, t.power));
        Self { defs, power_tiers }
    }

    pub fn def(&self, kind: UnlockKind) -> Option<&UnlockDef> {
        self.defs.iter().find(|d| d.kind == kind)
    }

    pub fn defs(&self) -> &[UnlockDef] {
        &self.defs
    }

    pub fn power_tiers(&self) -> &[PowerTier] {
        &self.power_tiers
    }

    /// Level of the worker bound to `kind`, or 0 when it is not owned.
    pub fn bound_level(&self, kind: UnlockKind, ladder: &WorkerLadder) -> u32 {
        self.def(kind)
            .and_then(|d| ladder.level_if_owned(d.worker))
            .unwrap_or(0)
    }

    /// The bound worker is owned and has reached the threshold.
    pub fn is_unlocked(&self, kind: UnlockKind, ladder: &WorkerLadder) -> bool {
        self.def(kind).is_some_and(|d| {
            ladder
                .level_if_owned(d.worker)
                .is_some_and(|level| level >= d.level_required)
        })
    }

    /// Resolve one parameter at the bound worker's current level, plus any
    /// flat bonus supplied by the caller (shop items).
    pub fn param<B>(&self, param: UnlockParam, ladder: &WorkerLadder, bonus: &B) -> f64
    where
        B: Fn(UnlockParam) -> f64,
    {
        let kind = param.kind();
        let base = match self.def(kind) {
            Some(def) => def.resolve(param, self.bound_level(kind, ladder)),
            None => param.neutral(),
        };
        base + bonus(param)
    }

    pub fn critical<B>(&self, ladder: &WorkerLadder, bonus: &B) -> CriticalParams
    where
        B: Fn(UnlockParam) -> f64,
    {
        CriticalParams {
            chance: self.param(UnlockParam::CriticalChance, ladder, bonus),
            multiplier: self.param(UnlockParam::CriticalMultiplier, ladder, bonus),
        }
    }

    pub fn sun<B>(&self, ladder: &WorkerLadder, bonus: &B) -> SunParams
    where
        B: Fn(UnlockParam) -> f64,
    {
        SunParams {
            multiplier: self.param(UnlockParam::SunMultiplier, ladder, bonus),
        }
    }

    /// Streak parameters before any weakness scaling. `max` is floored at 1
    /// and drain at 0.
    pub fn streak<B>(&self, ladder: &WorkerLadder, bonus: &B) -> StreakParams
    where
        B: Fn(UnlockParam) -> f64,
    {
        StreakParams {
            max: self.param(UnlockParam::StreakMax, ladder, bonus).max(1.0),
            drain_per_second: self.param(UnlockParam::StreakDrain, ladder, bonus).max(0.0),
            damage_multiplier: self.param(UnlockParam::StreakDamage, ladder, bonus),
        }
    }

    pub fn mana<B>(&self, ladder: &WorkerLadder, bonus: &B) -> ManaParams
    where
        B: Fn(UnlockParam) -> f64,
    {
        ManaParams {
            capacity_bonus: self.param(UnlockParam::ManaCapacity, ladder, bonus),
            regen_bonus: self.param(UnlockParam::ManaRegen, ladder, bonus),
        }
    }

    /// Required bound-worker level for `power`, if the table lists it.
    pub fn power_level_required(&self, power: PowerId) -> Option<u32> {
        self.power_tiers
            .iter()
            .find(|t| t.power == power)
            .map(|t| t.level_required)
    }

    /// Power tiers not yet reached by the power worker, lowest first.
    pub fn upcoming_power_tiers(&self, ladder: &WorkerLadder) -> Vec<PowerTier> {
        let level = self.bound_level(UnlockKind::Power, ladder);
        self.power_tiers
            .iter()
            .filter(|t| t.level_required > level)
            .copied()
            .collect()
    }

    /// The lowest gate, upgrade or power tier above `level` bound to `worker`.
    pub fn next_milestone(&self, worker: WorkerId, level: u32) -> Option<u32> {
        let gates = self
            .defs
            .iter()
            .filter(|d| d.worker == worker)
            .flat_map(|d| d.milestones());
        let tiers = self
            .def(UnlockKind::Power)
            .filter(|d| d.worker == worker)
            .into_iter()
            .flat_map(|_| self.power_tiers.iter().map(|t| t.level_required));
        gates.chain(tiers).filter(|&l| l > level).min()
    }
}
