use std::sync::Arc;

use crate::clock::TimeSource;
use crate::command::{Command, CommandError};
use crate::config::GameConfig;
use crate::definition::{DefinitionError, GameDefinition};
use crate::event::{Event, EventBus, EventKind};
use crate::id::{PowerId, ShopItemId, UnlockKind, WorkerId};
use crate::ledger::ResourceLedger;
use crate::numeric::{Millis, Ticks, remaining_seconds_ceil};
use crate::power::{PowerEffect, PowerEngine};
use crate::query::{
    BuffView, GameState, PowerTierView, PowerView, ShopItemView, StreakView, UnlockFlags,
    WorkerView,
};
use crate::rng::SimRng;
use crate::shop::ShopStore;
use crate::sim::{AdvanceResult, SimState, StateHash};
use crate::streak::{StreakBar, StreakTransition};
use crate::unlock::{StreakParams, UnlockParam, UnlockRules};
use crate::worker::{WorkerLadder, tier_step};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The game aggregate. Owns every mutable record; all commands take
/// `&mut self` and all queries `&self`.
#[derive(Debug)]
pub struct Engine {
    config: GameConfig,
    clock: Arc<dyn TimeSource>,

    ledger: ResourceLedger,
    ladder: WorkerLadder,
    shop: ShopStore,
    unlocks: UnlockRules,
    streak: StreakBar,
    powers: PowerEngine,

    rng: SimRng,
    sim_state: SimState,
    events: EventBus,
    last_state_hash: u64,
}

impl Engine {
    /// Validate `definition` against `config` and build a fresh game.
    pub fn new(
        definition: GameDefinition,
        config: GameConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, DefinitionError> {
        definition.validate(&config)?;
        let GameDefinition {
            workers,
            unlocks,
            power_tiers,
            shop,
            powers,
        } = definition;

        let mut engine = Self {
            ledger: ResourceLedger::new(config.base_max_mana),
            ladder: WorkerLadder::new(workers),
            shop: ShopStore::new(shop),
            unlocks: UnlockRules::new(unlocks, power_tiers),
            streak: StreakBar::new(),
            powers: PowerEngine::new(powers),
            rng: SimRng::new(config.rng_seed),
            sim_state: SimState::new(),
            events: EventBus::new(config.event_capacity),
            last_state_hash: 0,
            config,
            clock,
        };
        engine.settle();
        engine.last_state_hash = engine.compute_state_hash();
        Ok(engine)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn ladder(&self) -> &WorkerLadder {
        &self.ladder
    }

    pub fn shop(&self) -> &ShopStore {
        &self.shop
    }

    pub fn unlock_rules(&self) -> &UnlockRules {
        &self.unlocks
    }

    pub fn streak(&self) -> &StreakBar {
        &self.streak
    }

    pub fn powers(&self) -> &PowerEngine {
        &self.powers
    }

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn now(&self) -> Millis {
        self.clock.now_millis()
    }

    /// Most recently computed state hash.
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    /// Register or replace the effect of a power defined in code.
    pub fn register_effect(
        &mut self,
        power: PowerId,
        effect: Box<dyn PowerEffect>,
    ) -> Result<(), CommandError> {
        if self.powers.get(power).is_none() {
            return Err(CommandError::InvalidIndex(power.index()));
        }
        self.powers.effects_mut().register(power, effect);
        Ok(())
    }

    /// Credit resources directly, bypassing clicks and production.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn grant(&mut self, currency: f64, mana: f64) {
        self.ledger.add_currency(currency);
        self.ledger.add_mana(mana);
        self.settle();
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.events.suppress(kind);
    }

    /// Take every event recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // -----------------------------------------------------------------------
    // Derived values
    // -----------------------------------------------------------------------

    fn unlock_bonus(&self) -> impl Fn(UnlockParam) -> f64 + '_ {
        |param| self.shop.unlock_bonus(param)
    }

    pub fn is_unlocked(&self, kind: UnlockKind) -> bool {
        self.unlocks.is_unlocked(kind, &self.ladder)
    }

    /// Base click value plus every owned click bonus.
    pub fn click_value(&self) -> f64 {
        self.config.base_click_value
            + self
                .ladder
                .click_bonus_sum(|id| self.shop.multiplier_for_worker(id))
    }

    /// Streak parameters at `now`, weakness buff applied.
    fn streak_params(&self, now: Millis) -> StreakParams {
        let weakness = &self.powers.buffs().weakness;
        self.unlocks
            .streak(&self.ladder, &self.unlock_bonus())
            .scaled(weakness.combo_multiplier(now), weakness.speed_multiplier(now))
    }

    fn streak_multiplier(&self, now: Millis) -> f64 {
        let unlocked = self.is_unlocked(UnlockKind::Streak);
        self.streak
            .damage_multiplier(unlocked, &self.streak_params(now))
    }

    /// Owned production, scaled by shop, streak and damage buff.
    pub fn production_rate(&self) -> f64 {
        self.production_rate_at(self.now())
    }

    fn production_rate_at(&self, now: Millis) -> f64 {
        let base = self
            .ladder
            .production_rate(|id| self.shop.multiplier_for_worker(id));
        base * self.streak_multiplier(now) * self.powers.buffs().damage.value(now)
    }

    /// `(max_mana, regen_per_tick)` from config, power unlock and shop.
    fn mana_limits(&self) -> (f64, f64) {
        let mana = self.unlocks.mana(&self.ladder, &self.unlock_bonus());
        let max = self.config.base_max_mana + mana.capacity_bonus + self.shop.mana_capacity_bonus();
        let per_second = self.config.base_mana_regen_per_second
            + mana.regen_bonus
            + self.shop.mana_regen_bonus();
        (max, per_second.max(0.0) * self.config.seconds_per_tick())
    }

    fn power_level(&self) -> u32 {
        self.unlocks.bound_level(UnlockKind::Power, &self.ladder)
    }

    pub fn is_power_visible(&self, power: PowerId) -> bool {
        self.powers.is_visible(
            power,
            self.unlocks.power_level_required(power),
            self.power_level(),
        )
    }

    // -----------------------------------------------------------------------
    // Bookkeeping
    // -----------------------------------------------------------------------

    /// Re-derive the mana cap and latch every sticky visibility flag.
    fn settle(&mut self) {
        let (max_mana, _) = self.mana_limits();
        self.ledger.set_max_mana(max_mana);

        let currency = self.ledger.currency();
        self.ladder.latch_visibility(currency);

        let power_level = self.power_level();
        let unlocks = &self.unlocks;
        self.powers
            .latch_visibility(|id| unlocks.power_level_required(id), power_level);

        let powers = &self.powers;
        let power_owned = |id: PowerId| {
            powers.is_visible(id, unlocks.power_level_required(id), power_level)
        };
        self.shop
            .latch_visibility(currency, &self.ladder, &power_owned);
    }

    fn emit_streak(&mut self, transition: Option<StreakTransition>) {
        let tick = self.sim_state.tick;
        match transition {
            Some(StreakTransition::Activated) => self.events.emit(Event::StreakActivated { tick }),
            Some(StreakTransition::Depleted) => self.events.emit(Event::StreakDepleted { tick }),
            None => {}
        }
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run exactly one tick.
    pub fn step(&mut self) -> AdvanceResult {
        self.step_internal();
        AdvanceResult { steps_run: 1 }
    }

    /// Turn `elapsed` wall time into as many whole ticks as fit, carrying
    /// the remainder to the next call.
    pub fn advance(&mut self, elapsed: Millis) -> AdvanceResult {
        let due = self
            .sim_state
            .accumulate(elapsed, self.config.ticks_per_second);
        for _ in 0..due {
            self.step_internal();
        }
        AdvanceResult { steps_run: due }
    }

    fn step_internal(&mut self) {
        let now = self.now();
        self.powers.buffs_mut().expire(now);

        // Production.
        let rate = self.production_rate_at(now);
        let credited = rate * self.config.seconds_per_tick();
        self.ledger.add_currency(credited);
        tracing::trace!(target: "clicker.sim", tick = self.sim_state.tick, rate, credited, "tick");

        // Mana regeneration.
        let (_, regen) = self.mana_limits();
        self.ledger.add_mana(regen);

        // Streak drain.
        let params = self.streak_params(now);
        let transition = self.streak.on_tick(self.config.ticks_per_second, &params);
        self.emit_streak(transition);

        self.settle();

        self.sim_state.tick += 1;
        self.last_state_hash = self.compute_state_hash();
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply a command, reporting only whether it took effect.
    pub fn execute(&mut self, command: Command) -> bool {
        let result = match command {
            Command::Click => {
                self.click();
                Ok(())
            }
            Command::ClickWith { multiplier } => {
                self.click_with(multiplier);
                Ok(())
            }
            Command::ClickSun => self.try_click_sun().map(drop),
            Command::UpgradeWorker(id) => self.try_upgrade_worker(id).map(drop),
            Command::BuyShopItem(id) => self.try_buy_shop_item(id),
            Command::BuyPower(id) => self.try_buy_power(id),
            Command::CastPower(id) => self.try_cast_power(id),
        };
        accepted(command, result)
    }

    /// Manual click. Returns the credited value.
    pub fn click(&mut self) -> f64 {
        self.click_with(1.0)
    }

    /// Manual click scaled by `multiplier`. Negative or non-finite factors
    /// credit nothing, though the click still counts toward the streak.
    pub fn click_with(&mut self, multiplier: f64) -> f64 {
        let now = self.now();
        let multiplier = if multiplier.is_finite() {
            multiplier.max(0.0)
        } else {
            0.0
        };

        let damage = self.powers.buffs_mut().damage_multiplier(now);
        let mut value = self.click_value() * multiplier * damage * self.streak_multiplier(now);

        if self.is_unlocked(UnlockKind::CriticalHit) {
            let critical = self.unlocks.critical(&self.ladder, &self.unlock_bonus());
            if self.rng.chance(critical.chance) {
                value *= critical.multiplier;
                self.events.emit(Event::CriticalHit {
                    value,
                    tick: self.sim_state.tick,
                });
            }
        }

        self.ledger.add_currency(value);

        let unlocked = self.is_unlocked(UnlockKind::Streak);
        let params = self.streak_params(now);
        let transition = self.streak.on_click(unlocked, &params);
        self.emit_streak(transition);

        self.ledger.add_mana(self.config.mana_per_click);
        self.settle();
        value
    }

    /// Click the sun. Refused until the sun is unlocked.
    pub fn try_click_sun(&mut self) -> Result<f64, CommandError> {
        if !self.is_unlocked(UnlockKind::Sun) {
            return Err(CommandError::Locked);
        }
        let sun = self.unlocks.sun(&self.ladder, &self.unlock_bonus());
        Ok(self.click_with(sun.multiplier))
    }

    pub fn click_sun(&mut self) -> bool {
        self.execute(Command::ClickSun)
    }

    /// Buy one level of a worker. Returns its new level.
    pub fn try_upgrade_worker(&mut self, id: WorkerId) -> Result<u32, CommandError> {
        let now = self.now();
        let price = self.ladder.get(id).map(|w| w.price()).unwrap_or(0.0);
        let level = self.ladder.upgrade(
            id,
            &mut self.ledger,
            now,
            self.config.upgrade_debounce_ms,
            self.config.currency_epsilon,
        )?;
        tracing::info!(target: "clicker.ladder", worker = id.0, level, price, "worker upgraded");
        self.events.emit(Event::WorkerUpgraded {
            worker: id,
            level,
            price,
            tick: self.sim_state.tick,
        });
        self.settle();
        Ok(level)
    }

    pub fn upgrade_worker(&mut self, id: WorkerId) -> bool {
        self.execute(Command::UpgradeWorker(id))
    }

    pub fn try_buy_shop_item(&mut self, id: ShopItemId) -> Result<(), CommandError> {
        self.shop.buy(id, &mut self.ledger)?;
        let price = self.shop.get(id).map(|i| i.def.price).unwrap_or(0.0);
        tracing::info!(target: "clicker.shop", item = id.0, price, "shop item bought");
        self.events.emit(Event::ShopItemBought {
            item: id,
            price,
            tick: self.sim_state.tick,
        });
        self.settle();
        Ok(())
    }

    pub fn buy_shop_item(&mut self, id: ShopItemId) -> bool {
        self.execute(Command::BuyShopItem(id))
    }

    /// Powers come from worker levels only; there is nothing to buy.
    pub fn try_buy_power(&mut self, id: PowerId) -> Result<(), CommandError> {
        if self.powers.get(id).is_none() {
            return Err(CommandError::InvalidIndex(id.index()));
        }
        Err(CommandError::NotPurchasable)
    }

    pub fn buy_power(&mut self, id: PowerId) -> bool {
        self.execute(Command::BuyPower(id))
    }

    pub fn try_cast_power(&mut self, id: PowerId) -> Result<(), CommandError> {
        let now = self.now();
        let factor = self.shop.power_mana_factor(id);
        let before = self.ledger.mana();
        self.powers.cast(
            id,
            &mut self.ledger,
            factor,
            now,
            self.config.mana_epsilon,
        )?;
        self.events.emit(Event::PowerCast {
            power: id,
            mana_spent: before - self.ledger.mana(),
            tick: self.sim_state.tick,
        });
        self.settle();
        Ok(())
    }

    pub fn cast_power(&mut self, id: PowerId) -> bool {
        self.execute(Command::CastPower(id))
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Build every derived view from the current records.
    pub fn snapshot(&self) -> GameState {
        let now = self.now();
        let currency = self.ledger.currency();
        let bonus = self.unlock_bonus();

        let workers: Vec<WorkerView> = (0..self.ladder.len())
            .map(|i| self.worker_view(WorkerId(i as u32), currency))
            .collect();
        let owned_workers = self
            .ladder
            .owned_ids()
            .iter()
            .map(|id| workers[id.index()].clone())
            .collect();

        let power_level = self.power_level();
        let power_owned = |id: PowerId| self.is_power_visible(id);
        let shop = self
            .shop
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let id = ShopItemId(i as u32);
                ShopItemView {
                    id,
                    name: item.def.name.clone(),
                    price: item.def.price,
                    value: item.def.value,
                    target: item.def.target,
                    visible: self
                        .shop
                        .is_visible(id, currency, &self.ladder, &power_owned),
                    bought: item.is_bought(),
                    can_buy: !item.is_bought() && currency >= item.def.price,
                }
            })
            .collect();

        let powers = self
            .powers
            .defs()
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let id = PowerId(i as u32);
                let factor = self.shop.power_mana_factor(id);
                let until = self.powers.cooldown_until(id);
                PowerView {
                    id,
                    name: def.name.clone(),
                    visible: self.powers.is_visible(
                        id,
                        self.unlocks.power_level_required(id),
                        power_level,
                    ),
                    base_mana_cost: def.mana_cost,
                    mana_cost: crate::power::effective_cost(def.mana_cost, factor),
                    has_effect: self.powers.has_effect(id),
                    can_cast: self.powers.can_cast(id, self.ledger.mana(), factor, now),
                    on_cooldown: self.powers.is_on_cooldown(id, now),
                    cooldown_remaining_seconds: remaining_seconds_ceil(now, until),
                }
            })
            .collect();

        let critical = self.unlocks.critical(&self.ladder, &bonus);
        let unlocks = UnlockFlags {
            critical_hit: self.is_unlocked(UnlockKind::CriticalHit),
            sun: self.is_unlocked(UnlockKind::Sun),
            streak: self.is_unlocked(UnlockKind::Streak),
            power: self.is_unlocked(UnlockKind::Power),
            critical_chance: critical.chance,
            critical_multiplier: critical.multiplier,
            sun_multiplier: self.unlocks.sun(&self.ladder, &bonus).multiplier,
        };

        let params = self.streak_params(now);
        let streak = if unlocks.streak {
            StreakView {
                unlocked: true,
                phase: self.streak.phase(),
                current: self.streak.current(params.max),
                max: params.max,
                active: self.streak.is_active(),
                damage_multiplier: Some(params.damage_multiplier),
            }
        } else {
            StreakView {
                unlocked: false,
                phase: self.streak.phase(),
                current: 0.0,
                max: 0.0,
                active: false,
                damage_multiplier: None,
            }
        };

        let buffs = self.powers.buffs();
        let buffs = BuffView {
            damage_active: buffs.damage.is_open(now),
            damage_multiplier: buffs.damage.value(now),
            damage_remaining_seconds: remaining_seconds_ceil(now, buffs.damage.until()),
            damage_remaining_fraction: buffs.damage.remaining_fraction(now),
            weakness_active: buffs.weakness.is_open(now),
            combo_multiplier: buffs.weakness.combo_multiplier(now),
            speed_multiplier: buffs.weakness.speed_multiplier(now),
            weakness_remaining_seconds: remaining_seconds_ceil(now, buffs.weakness.until()),
            weakness_remaining_fraction: buffs.weakness.remaining_fraction(now),
        };

        let upcoming_power_tiers = self
            .unlocks
            .upcoming_power_tiers(&self.ladder)
            .into_iter()
            .map(|tier| PowerTierView {
                power: tier.power,
                name: self
                    .powers
                    .get(tier.power)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                level_required: tier.level_required,
            })
            .collect();

        GameState {
            tick: self.sim_state.tick,
            currency,
            mana: self.ledger.mana(),
            max_mana: self.ledger.max_mana(),
            click_value: self.click_value(),
            production_per_second: self.production_rate_at(now),
            workers,
            owned_workers,
            shop,
            powers,
            unlocks,
            streak,
            buffs,
            upcoming_power_tiers,
        }
    }

    fn worker_view(&self, id: WorkerId, currency: f64) -> WorkerView {
        let worker = &self.ladder.workers()[id.index()];
        let multiplier = self.shop.multiplier_for_worker(id);
        WorkerView {
            id,
            name: worker.name().to_string(),
            kind: worker.kind(),
            level: worker.level(),
            price: worker.price(),
            visible: worker.is_visible() || worker.visibility_rule(currency),
            owned: worker.is_owned(),
            can_buy: worker.can_afford(currency),
            effective_rate: self.ladder.effective_throughput(id, multiplier),
            effective_click_bonus: self.ladder.effective_click_bonus(id, multiplier),
            tier_step: tier_step(worker.level()),
            shop_multiplier: multiplier,
            next_unlock_level: self.unlocks.next_milestone(id, worker.level()),
        }
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    fn compute_state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim_state.tick);
        h.write_f64(self.ledger.currency());
        h.write_f64(self.ledger.mana());
        h.write_f64(self.ledger.max_mana());
        for w in self.ladder.workers() {
            h.write_u32(w.level());
            h.write_bool(w.is_visible());
            h.write_bool(w.is_owned());
        }
        for id in self.ladder.owned_ids() {
            h.write_u32(id.0);
        }
        for item in self.shop.items() {
            h.write_bool(item.is_bought());
            h.write_bool(item.is_latched_visible());
        }
        h.write_f64(self.streak.current(f64::INFINITY));
        h.write_bool(self.streak.is_active());
        for i in 0..self.powers.len() {
            h.write_u64(self.powers.cooldown_until(PowerId(i as u32)));
        }
        let buffs = self.powers.buffs();
        h.write_u64(buffs.damage.until());
        h.write_u64(buffs.weakness.until());
        h.write_u64(self.rng.state());
        h.finish()
    }
}

/// Log a refusal at debug level and collapse the result to a flag.
fn accepted(command: Command, result: Result<(), CommandError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(target: "clicker.runtime", ?command, %err, "command rejected");
            false
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
