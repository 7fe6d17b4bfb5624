//! The streak bar: clicks fill it, a full bar turns on a damage multiplier
//! that lasts until the bar drains back to zero.
//!
//! ```text
//!            click reaches max
//!   Filling ───────────────────▶ Active
//!      ▲                           │
//!      └───────────────────────────┘
//!           tick drains to 0
//! ```
//!
//! The bar holds only `current` and the phase. Its parameters are resolved
//! by the caller on every call because they move with the bound worker's
//! level and with the weakness buff.

use crate::unlock::StreakParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPhase {
    #[default]
    Filling,
    Active,
}

/// A phase change caused by a click or a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    Activated,
    Depleted,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreakBar {
    current: f64,
    phase: StreakPhase,
}

impl StreakBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StreakPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == StreakPhase::Active
    }

    /// Fill level as seen under `max`. Never above it.
    pub fn current(&self, max: f64) -> f64 {
        self.current.min(max)
    }

    /// Pull `current` down to `max`. The phase is left alone.
    fn clamp(&mut self, max: f64) {
        if self.current > max {
            self.current = max;
        }
    }

    /// Register one click. Ignored while the streak is locked.
    pub fn on_click(&mut self, unlocked: bool, params: &StreakParams) -> Option<StreakTransition> {
        if !unlocked {
            return None;
        }
        self.clamp(params.max);
        self.current = (self.current + 1.0).min(params.max);
        if self.current >= params.max && self.phase == StreakPhase::Filling {
            self.phase = StreakPhase::Active;
            tracing::info!(target: "clicker.streak", max = params.max, "streak activated");
            return Some(StreakTransition::Activated);
        }
        None
    }

    /// Drain one tick's worth. Only moves while active.
    pub fn on_tick(&mut self, ticks_per_second: u32, params: &StreakParams) -> Option<StreakTransition> {
        self.clamp(params.max);
        if self.phase != StreakPhase::Active {
            return None;
        }
        let per_tick = params.drain_per_second / f64::from(ticks_per_second.max(1));
        self.current = (self.current - per_tick).max(0.0);
        if self.current <= 0.0 {
            self.current = 0.0;
            self.phase = StreakPhase::Filling;
            tracing::info!(target: "clicker.streak", "streak depleted");
            return Some(StreakTransition::Depleted);
        }
        None
    }

    /// The resolved damage multiplier while active and unlocked, else 1.
    pub fn damage_multiplier(&self, unlocked: bool, params: &StreakParams) -> f64 {
        if unlocked && self.is_active() {
            params.damage_multiplier
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max: f64, drain: f64) -> StreakParams {
        StreakParams {
            max,
            drain_per_second: drain,
            damage_multiplier: 2.0,
        }
    }

    #[test]
    fn starts_empty_and_filling() {
        let bar = StreakBar::new();
        assert_eq!(bar.phase(), StreakPhase::Filling);
        assert_eq!(bar.current(10.0), 0.0);
    }

    #[test]
    fn locked_clicks_do_nothing() {
        let mut bar = StreakBar::new();
        assert_eq!(bar.on_click(false, &params(1.0, 1.0)), None);
        assert_eq!(bar.current(1.0), 0.0);
        assert_eq!(bar.damage_multiplier(false, &params(1.0, 1.0)), 1.0);
    }

    #[test]
    fn filling_to_max_activates() {
        let p = params(3.0, 10.0);
        let mut bar = StreakBar::new();
        assert_eq!(bar.on_click(true, &p), None);
        assert_eq!(bar.on_click(true, &p), None);
        assert_eq!(bar.on_click(true, &p), Some(StreakTransition::Activated));
        assert!(bar.is_active());
        assert_eq!(bar.damage_multiplier(true, &p), 2.0);
        // Further clicks stay capped and don't re-trigger.
        assert_eq!(bar.on_click(true, &p), None);
        assert_eq!(bar.current(3.0), 3.0);
    }

    #[test]
    fn ticks_drain_then_deplete() {
        let p = params(2.0, 10.0);
        let mut bar = StreakBar::new();
        bar.on_click(true, &p);
        bar.on_click(true, &p);
        assert!(bar.is_active());
        assert_eq!(bar.on_tick(10, &p), None);
        assert!((bar.current(2.0) - 1.0).abs() < 1e-12);
        assert_eq!(bar.on_tick(10, &p), Some(StreakTransition::Depleted));
        assert_eq!(bar.phase(), StreakPhase::Filling);
        assert_eq!(bar.current(2.0), 0.0);
    }

    #[test]
    fn ticks_never_activate() {
        let p = params(1.0, 10.0);
        let mut bar = StreakBar::new();
        for _ in 0..20 {
            assert_eq!(bar.on_tick(10, &p), None);
        }
        assert_eq!(bar.phase(), StreakPhase::Filling);
    }

    #[test]
    fn shrinking_max_clamps_without_phase_change() {
        let mut bar = StreakBar::new();
        let wide = params(10.0, 0.0);
        for _ in 0..6 {
            bar.on_click(true, &wide);
        }
        assert_eq!(bar.phase(), StreakPhase::Filling);

        let narrow = params(4.0, 0.0);
        assert_eq!(bar.current(4.0), 4.0);
        assert_eq!(bar.on_tick(10, &narrow), None);
        assert_eq!(bar.phase(), StreakPhase::Filling);
        // The next click at the smaller max completes the bar.
        assert_eq!(bar.on_click(true, &narrow), Some(StreakTransition::Activated));
    }

    #[test]
    fn zero_drain_keeps_bar_active() {
        let p = params(1.0, 0.0);
        let mut bar = StreakBar::new();
        bar.on_click(true, &p);
        for _ in 0..100 {
            bar.on_tick(10, &p);
        }
        assert!(bar.is_active());
    }
}
