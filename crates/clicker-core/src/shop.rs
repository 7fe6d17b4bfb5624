//! One-time shop purchases that permanently scale a single target.
//!
//! Worker and power-cost items compose multiplicatively; mana and unlock
//! parameter items compose additively. An item becomes visible (sticky) once
//! currency reaches half its price and its optional extra condition holds.

use crate::command::CommandError;
use crate::id::{PowerId, ShopItemId, WorkerId};
use crate::ledger::ResourceLedger;
use crate::unlock::UnlockParam;
use crate::worker::WorkerLadder;
use serde::{Deserialize, Serialize};

/// What a bought item modifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopTarget {
    /// Multiply one worker's production or click bonus.
    Worker(WorkerId),
    /// Multiply one power's mana cost.
    PowerCost(PowerId),
    /// Add to a resolved unlock parameter.
    UnlockParam(UnlockParam),
    /// Add to the mana cap.
    ManaCapacity,
    /// Add to mana regeneration, in mana per second.
    ManaRegen,
}

/// Extra gate on shop visibility, on top of the half-price rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockCondition {
    MinCurrency(f64),
    /// The worker is owned at `level` or above.
    WorkerLevel { worker: WorkerId, level: u32 },
    Bought(ShopItemId),
    PowerOwned(PowerId),
    All(Vec<UnlockCondition>),
    Any(Vec<UnlockCondition>),
}

/// Everything a condition may look at.
pub struct ConditionContext<'a> {
    pub currency: f64,
    pub ladder: &'a WorkerLadder,
    pub bought: &'a dyn Fn(ShopItemId) -> bool,
    pub power_owned: &'a dyn Fn(PowerId) -> bool,
}

impl UnlockCondition {
    pub fn holds(&self, ctx: &ConditionContext<'_>) -> bool {
        match self {
            UnlockCondition::MinCurrency(min) => ctx.currency >= *min,
            UnlockCondition::WorkerLevel { worker, level } => {
                ctx.ladder.level_if_owned(*worker).unwrap_or(0) >= *level
            }
            UnlockCondition::Bought(item) => (ctx.bought)(*item),
            UnlockCondition::PowerOwned(power) => (ctx.power_owned)(*power),
            UnlockCondition::All(all) => all.iter().all(|c| c.holds(ctx)),
            UnlockCondition::Any(any) => any.iter().any(|c| c.holds(ctx)),
        }
    }

    /// Visit this condition and every nested one.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a UnlockCondition)) {
        visit(self);
        if let UnlockCondition::All(inner) | UnlockCondition::Any(inner) = self {
            for c in inner {
                c.walk(visit);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItemDef {
    pub name: String,
    pub price: f64,
    pub value: f64,
    pub target: ShopTarget,
    #[serde(default)]
    pub condition: Option<UnlockCondition>,
    /// Shown from the start regardless of currency.
    #[serde(default)]
    pub initially_visible: bool,
}

impl ShopItemDef {
    pub fn new(name: &str, price: f64, value: f64, target: ShopTarget) -> Self {
        Self {
            name: name.to_string(),
            price,
            value,
            target,
            condition: None,
            initially_visible: false,
        }
    }

    pub fn with_condition(mut self, condition: UnlockCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn visible_from_start(mut self) -> Self {
        self.initially_visible = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub def: ShopItemDef,
    bought: bool,
    visible: bool,
}

impl ShopItem {
    fn new(def: ShopItemDef) -> Self {
        let visible = def.initially_visible;
        Self {
            def,
            bought: false,
            visible,
        }
    }

    pub fn is_bought(&self) -> bool {
        self.bought
    }

    /// The sticky flag only; see [`ShopStore::is_visible`] for the live answer.
    pub fn is_latched_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopStore {
    items: Vec<ShopItem>,
}

impl ShopStore {
    pub fn new(defs: Vec<ShopItemDef>) -> Self {
        Self {
            items: defs.into_iter().map(ShopItem::new).collect(),
        }
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn get(&self, id: ShopItemId) -> Option<&ShopItem> {
        self.items.get(id.index())
    }

    pub fn is_bought(&self, id: ShopItemId) -> bool {
        self.get(id).is_some_and(|i| i.bought)
    }

    fn bought_targets(&self) -> impl Iterator<Item = &ShopItemDef> {
        self.items.iter().filter(|i| i.bought).map(|i| &i.def)
    }

    /// Product of bought item values targeting `worker`; 1 when none.
    pub fn multiplier_for_worker(&self, worker: WorkerId) -> f64 {
        self.bought_targets()
            .filter(|d| d.target == ShopTarget::Worker(worker))
            .map(|d| d.value)
            .product()
    }

    /// Product of bought cost factors for `power`, or 1 if that product is
    /// not positive.
    pub fn power_mana_factor(&self, power: PowerId) -> f64 {
        let factor: f64 = self
            .bought_targets()
            .filter(|d| d.target == ShopTarget::PowerCost(power))
            .map(|d| d.value)
            .product();
        if factor > 0.0 { factor } else { 1.0 }
    }

    pub fn unlock_bonus(&self, param: UnlockParam) -> f64 {
        self.bought_targets()
            .filter(|d| d.target == ShopTarget::UnlockParam(param))
            .map(|d| d.value)
            .sum()
    }

    pub fn mana_capacity_bonus(&self) -> f64 {
        self.bought_targets()
            .filter(|d| d.target == ShopTarget::ManaCapacity)
            .map(|d| d.value)
            .sum()
    }

    /// Mana per second.
    pub fn mana_regen_bonus(&self) -> f64 {
        self.bought_targets()
            .filter(|d| d.target == ShopTarget::ManaRegen)
            .map(|d| d.value)
            .sum()
    }

    /// Latched flag, or the visibility rule evaluated against `currency`.
    pub fn is_visible(
        &self,
        id: ShopItemId,
        currency: f64,
        ladder: &WorkerLadder,
        power_owned: &dyn Fn(PowerId) -> bool,
    ) -> bool {
        let Some(item) = self.get(id) else {
            return false;
        };
        item.visible || item.bought || self.rule_holds(item, currency, ladder, power_owned)
    }

    fn rule_holds(
        &self,
        item: &ShopItem,
        currency: f64,
        ladder: &WorkerLadder,
        power_owned: &dyn Fn(PowerId) -> bool,
    ) -> bool {
        if currency < (item.def.price / 2.0).floor() {
            return false;
        }
        let bought = |id: ShopItemId| self.is_bought(id);
        let ctx = ConditionContext {
            currency,
            ladder,
            bought: &bought,
            power_owned,
        };
        item.def.condition.as_ref().is_none_or(|c| c.holds(&ctx))
    }

    /// Latch the sticky flag on every item whose rule now holds. Conditions
    /// are no longer evaluated for items already visible.
    pub fn latch_visibility(
        &mut self,
        currency: f64,
        ladder: &WorkerLadder,
        power_owned: &dyn Fn(PowerId) -> bool,
    ) {
        let newly: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                !item.visible && (item.bought || self.rule_holds(item, currency, ladder, power_owned))
            })
            .map(|(i, _)| i)
            .collect();
        for i in newly {
            self.items[i].visible = true;
        }
    }

    /// Buy item `id` at its exact price.
    pub fn buy(&mut self, id: ShopItemId, ledger: &mut ResourceLedger) -> Result<(), CommandError> {
        let item = self
            .items
            .get_mut(id.index())
            .ok_or(CommandError::InvalidIndex(id.index()))?;
        if item.bought {
            return Err(CommandError::AlreadyBought);
        }
        let price = item.def.price;
        if !ledger.can_afford(price) || !ledger.try_spend_currency(price, 0.0) {
            return Err(CommandError::InsufficientCurrency {
                required: price,
                available: ledger.currency(),
            });
        }
        item.bought = true;
        item.visible = true;
        Ok(())
    }
}
