//! A complete static game description and its construction-time checks.
//!
//! Structural mistakes (a gate bound to a missing worker, a shop item aimed
//! at a missing power, a ladder without its click worker) are programming
//! errors. They are rejected here, before an engine exists, instead of
//! surfacing as silent no-ops during play.

use crate::config::GameConfig;
use crate::id::{PowerId, ShopItemId, UnlockKind, WorkerId};
use crate::power::{BuffCommand, PowerDef};
use crate::shop::{ShopItemDef, ShopTarget, UnlockCondition};
use crate::unlock::{PowerTier, UnlockDef, UnlockParam};
use crate::worker::{WorkerDef, WorkerKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameDefinition {
    pub workers: Vec<WorkerDef>,
    #[serde(default)]
    pub unlocks: Vec<UnlockDef>,
    /// Level of the power-unlock worker at which each power appears.
    #[serde(default)]
    pub power_tiers: Vec<PowerTier>,
    #[serde(default)]
    pub shop: Vec<ShopItemDef>,
    #[serde(default)]
    pub powers: Vec<PowerDef>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("expected exactly one click-bonus worker, found {0}")]
    ClickBonusCount(usize),
    #[error("worker {worker:?} has a non-positive or non-finite {field}")]
    InvalidWorker { worker: String, field: &'static str },
    #[error("{context} refers to worker {index}, but only {count} exist")]
    UnknownWorker {
        context: String,
        index: usize,
        count: usize,
    },
    #[error("{context} refers to power {index}, but only {count} exist")]
    UnknownPower {
        context: String,
        index: usize,
        count: usize,
    },
    #[error("{context} refers to shop item {index}, but only {count} exist")]
    UnknownShopItem {
        context: String,
        index: usize,
        count: usize,
    },
    #[error("unlock {0:?} is defined more than once")]
    DuplicateUnlock(UnlockKind),
    #[error("unlock {kind:?} sets parameter {param:?}, which belongs to another unlock")]
    ForeignParam { kind: UnlockKind, param: UnlockParam },
    #[error("unlock {kind:?} has an upgrade at level {upgrade} below its base level {base}")]
    UpgradeBelowBase {
        kind: UnlockKind,
        upgrade: u32,
        base: u32,
    },
    #[error("power tiers are listed but no power unlock is defined")]
    PowerTiersWithoutUnlock,
    #[error("power {0:?} appears in the tier table more than once")]
    DuplicatePowerTier(PowerId),
    #[error("duplicate power id {0:?}")]
    DuplicatePower(String),
    #[error("power {power:?} has an invalid {field}")]
    InvalidPower { power: String, field: &'static str },
    #[error("shop item {item:?} has an invalid {field}")]
    InvalidShopItem { item: String, field: &'static str },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

impl GameDefinition {
    /// Check every cross-reference and numeric domain.
    pub fn validate(&self, config: &GameConfig) -> Result<(), DefinitionError> {
        validate_config(config)?;
        self.validate_workers()?;
        self.validate_unlocks()?;
        self.validate_powers()?;
        self.validate_shop()?;
        Ok(())
    }

    fn check_worker(&self, context: impl Fn() -> String, id: WorkerId) -> Result<(), DefinitionError> {
        if id.index() >= self.workers.len() {
            return Err(DefinitionError::UnknownWorker {
                context: context(),
                index: id.index(),
                count: self.workers.len(),
            });
        }
        Ok(())
    }

    fn check_power(&self, context: impl Fn() -> String, id: PowerId) -> Result<(), DefinitionError> {
        if id.index() >= self.powers.len() {
            return Err(DefinitionError::UnknownPower {
                context: context(),
                index: id.index(),
                count: self.powers.len(),
            });
        }
        Ok(())
    }

    fn validate_workers(&self) -> Result<(), DefinitionError> {
        let clickers = self
            .workers
            .iter()
            .filter(|w| w.kind == WorkerKind::ClickBonus)
            .count();
        if clickers != 1 {
            return Err(DefinitionError::ClickBonusCount(clickers));
        }
        for w in &self.workers {
            let fields = [
                ("base_price", w.base_price),
                ("price_curve", w.price_curve),
                ("base_value", w.base_value),
                ("value_curve", w.value_curve),
            ];
            if let Some(&(field, _)) = fields.iter().find(|(_, v)| !positive(*v)) {
                return Err(DefinitionError::InvalidWorker {
                    worker: w.name.clone(),
                    field,
                });
            }
        }
        Ok(())
    }

    fn validate_unlocks(&self) -> Result<(), DefinitionError> {
        let mut kinds = HashSet::new();
        for def in &self.unlocks {
            if !kinds.insert(def.kind) {
                return Err(DefinitionError::DuplicateUnlock(def.kind));
            }
            self.check_worker(|| format!("unlock {:?}", def.kind), def.worker)?;

            let params = def
                .base
                .keys()
                .chain(def.upgrades.iter().flat_map(|u| u.deltas.keys()));
            for &param in params {
                if param.kind() != def.kind {
                    return Err(DefinitionError::ForeignParam {
                        kind: def.kind,
                        param,
                    });
                }
            }
            if let Some(upgrade) = def.upgrades.iter().find(|u| u.level_required < def.level_required) {
                return Err(DefinitionError::UpgradeBelowBase {
                    kind: def.kind,
                    upgrade: upgrade.level_required,
                    base: def.level_required,
                });
            }
        }

        if !self.power_tiers.is_empty() && !kinds.contains(&UnlockKind::Power) {
            return Err(DefinitionError::PowerTiersWithoutUnlock);
        }
        let mut tiered = HashSet::new();
        for tier in &self.power_tiers {
            self.check_power(|| "power tier".to_string(), tier.power)?;
            if !tiered.insert(tier.power) {
                return Err(DefinitionError::DuplicatePowerTier(tier.power));
            }
        }
        Ok(())
    }

    fn validate_powers(&self) -> Result<(), DefinitionError> {
        let mut names = HashSet::new();
        for p in &self.powers {
            if !names.insert(p.name.as_str()) {
                return Err(DefinitionError::DuplicatePower(p.name.clone()));
            }
            let invalid = |field| DefinitionError::InvalidPower {
                power: p.name.clone(),
                field,
            };
            if !non_negative(p.mana_cost) {
                return Err(invalid("mana_cost"));
            }
            if !non_negative(p.cooldown_seconds) {
                return Err(invalid("cooldown_seconds"));
            }
            for command in &p.effect {
                let (multiplier, seconds) = match *command {
                    BuffCommand::SetDamageBuff { multiplier, seconds }
                    | BuffCommand::SetComboMultiplier { multiplier, seconds }
                    | BuffCommand::SetSpeedDecrease { multiplier, seconds } => (multiplier, seconds),
                };
                if !non_negative(multiplier) || !non_negative(seconds) {
                    return Err(invalid("effect"));
                }
            }
        }
        Ok(())
    }

    fn validate_shop(&self) -> Result<(), DefinitionError> {
        for item in &self.shop {
            let context = || format!("shop item {:?}", item.name);
            if !non_negative(item.price) {
                return Err(DefinitionError::InvalidShopItem {
                    item: item.name.clone(),
                    field: "price",
                });
            }
            if !item.value.is_finite() {
                return Err(DefinitionError::InvalidShopItem {
                    item: item.name.clone(),
                    field: "value",
                });
            }
            match item.target {
                ShopTarget::Worker(w) => self.check_worker(context, w)?,
                ShopTarget::PowerCost(p) => self.check_power(context, p)?,
                ShopTarget::UnlockParam(_) | ShopTarget::ManaCapacity | ShopTarget::ManaRegen => {}
            }
            if let Some(condition) = &item.condition {
                let mut result = Ok(());
                condition.walk(&mut |c| {
                    if result.is_err() {
                        return;
                    }
                    result = match *c {
                        UnlockCondition::WorkerLevel { worker, .. } => self.check_worker(context, worker),
                        UnlockCondition::PowerOwned(power) => self.check_power(context, power),
                        UnlockCondition::Bought(other) => self.check_shop_item(context, other),
                        UnlockCondition::MinCurrency(_)
                        | UnlockCondition::All(_)
                        | UnlockCondition::Any(_) => Ok(()),
                    };
                });
                result?;
            }
        }
        Ok(())
    }

    fn check_shop_item(&self, context: impl Fn() -> String, id: ShopItemId) -> Result<(), DefinitionError> {
        if id.index() >= self.shop.len() {
            return Err(DefinitionError::UnknownShopItem {
                context: context(),
                index: id.index(),
                count: self.shop.len(),
            });
        }
        Ok(())
    }
}

fn validate_config(config: &GameConfig) -> Result<(), DefinitionError> {
    if config.ticks_per_second == 0 {
        return Err(DefinitionError::InvalidConfig("ticks_per_second must be at least 1"));
    }
    let non_negatives = [
        (config.currency_epsilon, "currency_epsilon must be non-negative"),
        (config.mana_epsilon, "mana_epsilon must be non-negative"),
        (config.base_click_value, "base_click_value must be non-negative"),
        (config.mana_per_click, "mana_per_click must be non-negative"),
        (config.base_max_mana, "base_max_mana must be non-negative"),
        (
            config.base_mana_regen_per_second,
            "base_mana_regen_per_second must be non-negative",
        ),
    ];
    if let Some(&(_, msg)) = non_negatives.iter().find(|(v, _)| !non_negative(*v)) {
        return Err(DefinitionError::InvalidConfig(msg));
    }
    Ok(())
}
