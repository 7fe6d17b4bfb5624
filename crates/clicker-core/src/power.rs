//! Castable powers, their effects and the timed buff windows they open.
//!
//! Effects are pure: a [`PowerEffect`] looks at a [`CastContext`] and returns
//! a list of [`BuffCommand`]s. The engine applies them to the two buff
//! windows it owns:
//!
//! - the damage window, holding one damage multiplier
//! - the weakness window, holding a streak combo multiplier and a streak
//!   drain multiplier that share one expiry
//!
//! Casting never stacks. A command overwrites the value of its kind. Expiry
//! is lazy: a window whose end time has passed reads as neutral and is reset
//! the next time it is touched through `&mut self`.

use crate::command::CommandError;
use crate::id::PowerId;
use crate::ledger::ResourceLedger;
use crate::numeric::{Millis, seconds_to_millis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerDef {
    /// Stable identifier, unique within a game.
    pub name: String,
    /// Mana cost before shop factors.
    pub mana_cost: f64,
    pub cooldown_seconds: f64,
    /// Buff commands issued on every cast. Empty means no effect is
    /// registered from data; one may still be registered in code.
    #[serde(default)]
    pub effect: Vec<BuffCommand>,
    /// Visible from the start when no level tier gates this power.
    #[serde(default)]
    pub initially_visible: bool,
}

impl PowerDef {
    pub fn new(name: &str, mana_cost: f64, cooldown_seconds: f64) -> Self {
        Self {
            name: name.to_string(),
            mana_cost,
            cooldown_seconds,
            effect: Vec::new(),
            initially_visible: false,
        }
    }

    pub fn with_effect(mut self, effect: Vec<BuffCommand>) -> Self {
        self.effect = effect;
        self
    }
}

/// A mutation of the buff windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffCommand {
    /// Multiply all damage for `seconds`.
    SetDamageBuff { multiplier: f64, seconds: f64 },
    /// Scale the streak bar's max for `seconds`.
    SetComboMultiplier { multiplier: f64, seconds: f64 },
    /// Scale the streak bar's drain rate for `seconds`.
    SetSpeedDecrease { multiplier: f64, seconds: f64 },
}

/// What an effect can see when its power is cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastContext {
    pub power: PowerId,
    pub now: Millis,
    pub mana_spent: f64,
}

/// Turns a cast into buff commands.
pub trait PowerEffect: Debug + Send + Sync {
    fn evaluate(&self, ctx: &CastContext) -> Vec<BuffCommand>;
}

/// An effect that always issues the same commands.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedEffect(pub Vec<BuffCommand>);

impl PowerEffect for ScriptedEffect {
    fn evaluate(&self, _ctx: &CastContext) -> Vec<BuffCommand> {
        self.0.clone()
    }
}

/// Effects keyed by power.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    effects: BTreeMap<PowerId, Box<dyn PowerEffect>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the effect for `power`.
    pub fn register(&mut self, power: PowerId, effect: Box<dyn PowerEffect>) {
        self.effects.insert(power, effect);
    }

    pub fn get(&self, power: PowerId) -> Option<&dyn PowerEffect> {
        self.effects.get(&power).map(|e| e.as_ref())
    }

    pub fn contains(&self, power: PowerId) -> bool {
        self.effects.contains_key(&power)
    }
}

/// Mana actually charged for a cast: `floor(max(1, base * factor))`.
pub fn effective_cost(base_cost: f64, factor: f64) -> f64 {
    (base_cost * factor).max(1.0).floor()
}

// ---------------------------------------------------------------------------
// Buff windows
// ---------------------------------------------------------------------------

/// A time-boxed multiplier. Closed windows hold the neutral value 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffWindow {
    value: f64,
    opened_at: Millis,
    until: Millis,
}

impl Default for BuffWindow {
    fn default() -> Self {
        Self {
            value: 1.0,
            opened_at: 0,
            until: 0,
        }
    }
}

impl BuffWindow {
    pub fn is_open(&self, now: Millis) -> bool {
        now < self.until
    }

    /// The multiplier, or 1 once expired.
    pub fn value(&self, now: Millis) -> f64 {
        if self.is_open(now) { self.value } else { 1.0 }
    }

    pub fn until(&self) -> Millis {
        self.until
    }

    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.until.saturating_sub(now)
    }

    /// Share of the window still to run, in `[0, 1]`.
    pub fn remaining_fraction(&self, now: Millis) -> f64 {
        let span = self.until.saturating_sub(self.opened_at);
        if span == 0 || !self.is_open(now) {
            return 0.0;
        }
        (self.remaining_ms(now) as f64 / span as f64).clamp(0.0, 1.0)
    }

    fn expire(&mut self, now: Millis) {
        if !self.is_open(now) {
            *self = Self::default();
        }
    }
}

/// The weakness window: two multipliers with one shared expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaknessWindow {
    combo: f64,
    speed: f64,
    opened_at: Millis,
    until: Millis,
}

impl Default for WeaknessWindow {
    fn default() -> Self {
        Self {
            combo: 1.0,
            speed: 1.0,
            opened_at: 0,
            until: 0,
        }
    }
}

impl WeaknessWindow {
    pub fn is_open(&self, now: Millis) -> bool {
        now < self.until
    }

    pub fn combo_multiplier(&self, now: Millis) -> f64 {
        if self.is_open(now) { self.combo } else { 1.0 }
    }

    pub fn speed_multiplier(&self, now: Millis) -> f64 {
        if self.is_open(now) { self.speed } else { 1.0 }
    }

    pub fn until(&self) -> Millis {
        self.until
    }

    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.until.saturating_sub(now)
    }

    pub fn remaining_fraction(&self, now: Millis) -> f64 {
        let span = self.until.saturating_sub(self.opened_at);
        if span == 0 || !self.is_open(now) {
            return 0.0;
        }
        (self.remaining_ms(now) as f64 / span as f64).clamp(0.0, 1.0)
    }

    fn expire(&mut self, now: Millis) {
        if !self.is_open(now) {
            *self = Self::default();
        }
    }
}

/// Both buff windows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Buffs {
    pub damage: BuffWindow,
    pub weakness: WeaknessWindow,
}

impl Buffs {
    /// Reset every window whose end time has passed.
    pub fn expire(&mut self, now: Millis) {
        self.damage.expire(now);
        self.weakness.expire(now);
    }

    pub fn damage_multiplier(&mut self, now: Millis) -> f64 {
        self.damage.expire(now);
        self.damage.value
    }

    pub fn combo_multiplier(&mut self, now: Millis) -> f64 {
        self.weakness.expire(now);
        self.weakness.combo
    }

    pub fn speed_multiplier(&mut self, now: Millis) -> f64 {
        self.weakness.expire(now);
        self.weakness.speed
    }

    /// Apply one command at `now`. Expired windows are reset first so a
    /// stale value can't ride along on a fresh expiry.
    pub fn apply(&mut self, command: BuffCommand, now: Millis) {
        self.expire(now);
        match command {
            BuffCommand::SetDamageBuff {
                multiplier,
                seconds,
            } => {
                self.damage = BuffWindow {
                    value: multiplier,
                    opened_at: now,
                    until: now.saturating_add(seconds_to_millis(seconds)),
                };
            }
            BuffCommand::SetComboMultiplier {
                multiplier,
                seconds,
            } => {
                self.weakness.combo = multiplier;
                self.weakness.opened_at = now;
                self.weakness.until = now.saturating_add(seconds_to_millis(seconds));
            }
            BuffCommand::SetSpeedDecrease {
                multiplier,
                seconds,
            } => {
                if !self.weakness.is_open(now) {
                    self.weakness.opened_at = now;
                }
                self.weakness.speed = multiplier;
                let until = now.saturating_add(seconds_to_millis(seconds));
                self.weakness.until = self.weakness.until.max(until);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Power engine
// ---------------------------------------------------------------------------

/// Power records, cooldowns, registered effects and the buff windows.
#[derive(Debug)]
pub struct PowerEngine {
    defs: Vec<PowerDef>,
    cooldown_until: Vec<Millis>,
    visible: Vec<bool>,
    effects: EffectRegistry,
    buffs: Buffs,
}

impl PowerEngine {
    /// Build the engine and register a [`ScriptedEffect`] for every power
    /// whose definition carries commands.
    pub fn new(defs: Vec<PowerDef>) -> Self {
        let mut effects = EffectRegistry::new();
        for (i, def) in defs.iter().enumerate() {
            if !def.effect.is_empty() {
                effects.register(PowerId(i as u32), Box::new(ScriptedEffect(def.effect.clone())));
            }
        }
        Self {
            cooldown_until: vec![0; defs.len()],
            visible: defs.iter().map(|d| d.initially_visible).collect(),
            defs,
            effects,
            buffs: Buffs::default(),
        }
    }

    pub fn defs(&self) -> &[PowerDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn get(&self, id: PowerId) -> Option<&PowerDef> {
        self.defs.get(id.index())
    }

    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    pub fn has_effect(&self, id: PowerId) -> bool {
        self.effects.contains(id)
    }

    pub fn buffs(&self) -> &Buffs {
        &self.buffs
    }

    pub fn buffs_mut(&mut self) -> &mut Buffs {
        &mut self.buffs
    }

    pub fn cooldown_until(&self, id: PowerId) -> Millis {
        self.cooldown_until.get(id.index()).copied().unwrap_or(0)
    }

    pub fn is_on_cooldown(&self, id: PowerId, now: Millis) -> bool {
        now < self.cooldown_until(id)
    }

    pub fn effective_cost(&self, id: PowerId, factor: f64) -> Option<f64> {
        self.get(id).map(|d| effective_cost(d.mana_cost, factor))
    }

    /// Effect registered, off cooldown and affordable.
    pub fn can_cast(&self, id: PowerId, mana: f64, factor: f64, now: Millis) -> bool {
        self.effective_cost(id, factor).is_some_and(|cost| {
            self.has_effect(id) && !self.is_on_cooldown(id, now) && mana >= cost
        })
    }

    /// Level-table rule when the power has a tier, its sticky flag otherwise.
    pub fn is_visible(&self, id: PowerId, tier: Option<u32>, power_level: u32) -> bool {
        let latched = self.visible.get(id.index()).copied().unwrap_or(false);
        latched || tier.is_some_and(|required| power_level >= required)
    }

    pub fn latch_visibility(&mut self, tier_of: impl Fn(PowerId) -> Option<u32>, power_level: u32) {
        for (i, flag) in self.visible.iter_mut().enumerate() {
            if !*flag && tier_of(PowerId(i as u32)).is_some_and(|required| power_level >= required) {
                *flag = true;
            }
        }
    }

    /// Cast power `id`, paying its effective cost from `ledger`. Returns the
    /// buff commands that were applied.
    pub fn cast(
        &mut self,
        id: PowerId,
        ledger: &mut ResourceLedger,
        factor: f64,
        now: Millis,
        epsilon: f64,
    ) -> Result<Vec<BuffCommand>, CommandError> {
        let def = self
            .defs
            .get(id.index())
            .ok_or(CommandError::InvalidIndex(id.index()))?;
        let effect = self.effects.get(id).ok_or(CommandError::MissingEffect(id))?;

        let until = self.cooldown_until[id.index()];
        if now < until {
            return Err(CommandError::OnCooldown {
                remaining_ms: until - now,
            });
        }

        let cost = effective_cost(def.mana_cost, factor);
        if ledger.mana() < cost || !ledger.try_spend_mana(cost, epsilon) {
            return Err(CommandError::InsufficientMana {
                required: cost,
                available: ledger.mana(),
            });
        }

        let commands = effect.evaluate(&CastContext {
            power: id,
            now,
            mana_spent: cost,
        });
        let cooldown = seconds_to_millis(def.cooldown_seconds);
        tracing::info!(
            target: "clicker.power",
            power = %def.name,
            cost,
            commands = commands.len(),
            "power cast"
        );

        for &command in &commands {
            self.buffs.apply(command, now);
        }
        self.cooldown_until[id.index()] = now.saturating_add(cooldown);
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage(multiplier: f64, seconds: f64) -> BuffCommand {
        BuffCommand::SetDamageBuff {
            multiplier,
            seconds,
        }
    }

    fn engine() -> PowerEngine {
        PowerEngine::new(vec![
            PowerDef::new("power", 60.0, 120.0).with_effect(vec![damage(2.0, 60.0)]),
            PowerDef::new("weakness", 200.0, 300.0).with_effect(vec![
                BuffCommand::SetComboMultiplier {
                    multiplier: 0.5,
                    seconds: 60.0,
                },
                BuffCommand::SetSpeedDecrease {
                    multiplier: 0.5,
                    seconds: 60.0,
                },
            ]),
            PowerDef::new("inert", 10.0, 1.0),
        ])
    }

    fn mana(amount: f64) -> ResourceLedger {
        let mut ledger = ResourceLedger::new(1_000.0);
        ledger.add_mana(amount);
        ledger
    }

    #[test]
    fn effective_cost_floors_and_keeps_one() {
        assert_eq!(effective_cost(60.0, 1.0), 60.0);
        assert_eq!(effective_cost(60.0, 0.9), 54.0);
        assert_eq!(effective_cost(10.0, 0.05), 1.0);
        assert_eq!(effective_cost(65.0, 0.5), 32.0);
    }

    #[test]
    fn cast_spends_mana_and_opens_damage_window() {
        let mut p = engine();
        let mut ledger = mana(100.0);
        p.cast(PowerId(0), &mut ledger, 1.0, 1_000, 0.001).unwrap();
        assert_eq!(ledger.mana(), 40.0);
        assert_eq!(p.buffs_mut().damage_multiplier(1_000), 2.0);
        assert_eq!(p.buffs_mut().damage_multiplier(60_999), 2.0);
        assert_eq!(p.buffs_mut().damage_multiplier(61_000), 1.0);
        assert_eq!(p.buffs().damage.until(), 0);
    }

    #[test]
    fn cast_rejections() {
        let mut p = engine();
        let mut ledger = mana(100.0);
        assert!(matches!(
            p.cast(PowerId(9), &mut ledger, 1.0, 0, 0.001),
            Err(CommandError::InvalidIndex(9))
        ));
        assert!(matches!(
            p.cast(PowerId(2), &mut ledger, 1.0, 0, 0.001),
            Err(CommandError::MissingEffect(PowerId(2)))
        ));
        assert!(matches!(
            p.cast(PowerId(1), &mut ledger, 1.0, 0, 0.001),
            Err(CommandError::InsufficientMana { .. })
        ));
        p.cast(PowerId(0), &mut ledger, 1.0, 0, 0.001).unwrap();
        ledger.add_mana(100.0);
        assert!(matches!(
            p.cast(PowerId(0), &mut ledger, 1.0, 119_999, 0.001),
            Err(CommandError::OnCooldown { remaining_ms: 1 })
        ));
        assert!(p.cast(PowerId(0), &mut ledger, 1.0, 120_000, 0.001).is_ok());
    }

    #[test]
    fn shop_factor_reduces_cost() {
        let mut p = engine();
        let mut ledger = mana(100.0);
        p.cast(PowerId(0), &mut ledger, 0.5, 0, 0.001).unwrap();
        assert_eq!(ledger.mana(), 70.0);
    }

    #[test]
    fn huge_durations_saturate_instead_of_wrapping() {
        let mut p = PowerEngine::new(vec![
            PowerDef::new("surge", 10.0, 1e18).with_effect(vec![
                damage(2.0, 1e18),
                BuffCommand::SetComboMultiplier {
                    multiplier: 0.5,
                    seconds: 1e18,
                },
                BuffCommand::SetSpeedDecrease {
                    multiplier: 0.5,
                    seconds: 1e18,
                },
            ]),
        ]);
        let mut ledger = mana(100.0);
        let now = 5_000;
        p.cast(PowerId(0), &mut ledger, 1.0, now, 0.001).unwrap();

        assert_eq!(p.buffs().damage.until(), Millis::MAX);
        assert_eq!(p.buffs().weakness.until(), Millis::MAX);
        assert_eq!(p.cooldown_until(PowerId(0)), Millis::MAX);
        assert_eq!(p.buffs_mut().damage_multiplier(now + 1), 2.0);
        assert!(p.is_on_cooldown(PowerId(0), now + 1));
    }

    #[test]
    fn recast_replaces_damage_window() {
        let mut buffs = Buffs::default();
        buffs.apply(damage(2.0, 60.0), 0);
        buffs.apply(damage(3.0, 10.0), 5_000);
        assert_eq!(buffs.damage.value(5_000), 3.0);
        assert_eq!(buffs.damage.until(), 15_000);
    }

    #[test]
    fn speed_extends_weakness_to_later_end() {
        let mut buffs = Buffs::default();
        buffs.apply(
            BuffCommand::SetComboMultiplier {
                multiplier: 0.5,
                seconds: 60.0,
            },
            0,
        );
        buffs.apply(
            BuffCommand::SetSpeedDecrease {
                multiplier: 0.25,
                seconds: 10.0,
            },
            1_000,
        );
        assert_eq!(buffs.weakness.until(), 60_000);
        buffs.apply(
            BuffCommand::SetSpeedDecrease {
                multiplier: 0.5,
                seconds: 90.0,
            },
            2_000,
        );
        assert_eq!(buffs.weakness.until(), 92_000);
        assert_eq!(buffs.combo_multiplier(50_000), 0.5);
        assert_eq!(buffs.speed_multiplier(50_000), 0.5);
        // Damage window is independent.
        assert!(!buffs.damage.is_open(2_000));
    }

    #[test]
    fn weakness_expiry_resets_both_multipliers() {
        let mut p = engine();
        let mut ledger = mana(500.0);
        p.cast(PowerId(1), &mut ledger, 1.0, 0, 0.001).unwrap();
        assert_eq!(p.buffs_mut().combo_multiplier(59_999), 0.5);
        assert_eq!(p.buffs_mut().speed_multiplier(60_000), 1.0);
        assert_eq!(p.buffs_mut().combo_multiplier(60_000), 1.0);
    }

    #[test]
    fn stale_combo_does_not_revive() {
        let mut buffs = Buffs::default();
        buffs.apply(
            BuffCommand::SetComboMultiplier {
                multiplier: 0.5,
                seconds: 1.0,
            },
            0,
        );
        buffs.apply(
            BuffCommand::SetSpeedDecrease {
                multiplier: 0.5,
                seconds: 10.0,
            },
            5_000,
        );
        assert_eq!(buffs.weakness.combo_multiplier(5_000), 1.0);
        assert_eq!(buffs.weakness.speed_multiplier(5_000), 0.5);
    }

    #[test]
    fn remaining_fraction_counts_down() {
        let mut buffs = Buffs::default();
        buffs.apply(damage(2.0, 60.0), 0);
        assert_eq!(buffs.damage.remaining_fraction(0), 1.0);
        assert_eq!(buffs.damage.remaining_fraction(30_000), 0.5);
        assert_eq!(buffs.damage.remaining_fraction(60_000), 0.0);
    }

    #[test]
    fn visibility_from_tier_or_flag() {
        let mut p = engine();
        assert!(!p.is_visible(PowerId(1), Some(9), 8));
        assert!(p.is_visible(PowerId(1), Some(9), 9));
        assert!(!p.is_visible(PowerId(2), None, 100));
        p.latch_visibility(|id| if id == PowerId(1) { Some(9) } else { None }, 9);
        assert!(p.is_visible(PowerId(1), Some(9), 0));
    }

    #[test]
    fn can_cast_checks_effect_cooldown_and_mana() {
        let mut p = engine();
        assert!(p.can_cast(PowerId(0), 60.0, 1.0, 0));
        assert!(!p.can_cast(PowerId(0), 59.0, 1.0, 0));
        assert!(!p.can_cast(PowerId(2), 1_000.0, 1.0, 0));
        let mut ledger = mana(100.0);
        p.cast(PowerId(0), &mut ledger, 1.0, 0, 0.001).unwrap();
        assert!(!p.can_cast(PowerId(0), 1_000.0, 1.0, 1));
    }

    #[derive(Debug)]
    struct ScaledByMana;

    impl PowerEffect for ScaledByMana {
        fn evaluate(&self, ctx: &CastContext) -> Vec<BuffCommand> {
            vec![damage(ctx.mana_spent / 10.0, 1.0)]
        }
    }

    #[test]
    fn custom_effect_sees_context() {
        let mut p = engine();
        p.effects_mut().register(PowerId(2), Box::new(ScaledByMana));
        let mut ledger = mana(100.0);
        let applied = p.cast(PowerId(2), &mut ledger, 1.0, 0, 0.001).unwrap();
        assert_eq!(applied, vec![damage(1.0, 1.0)]);
    }
}
