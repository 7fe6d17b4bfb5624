//! Engine tuning knobs. Every field has a default, so data files only list
//! what they change.

use crate::numeric::Millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub ticks_per_second: u32,
    /// Same-worker repeat purchases closer than this are dropped.
    pub upgrade_debounce_ms: Millis,
    /// Slack for float drift when paying worker prices.
    pub currency_epsilon: f64,
    pub mana_epsilon: f64,
    /// Click value before any worker bonus.
    pub base_click_value: f64,
    pub mana_per_click: f64,
    pub base_max_mana: f64,
    /// Mana per second; divided by the tick rate each tick.
    pub base_mana_regen_per_second: f64,
    pub rng_seed: u64,
    /// Events kept between drains.
    pub event_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 10,
            upgrade_debounce_ms: 80,
            currency_epsilon: 0.001,
            mana_epsilon: 0.001,
            base_click_value: 1.0,
            mana_per_click: 0.5,
            base_max_mana: 100.0,
            base_mana_regen_per_second: 0.5,
            rng_seed: 0x5EED,
            event_capacity: 256,
        }
    }
}

impl GameConfig {
    /// Length of one tick in seconds.
    pub fn seconds_per_tick(&self) -> f64 {
        1.0 / f64::from(self.ticks_per_second.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.ticks_per_second, 10);
        assert_eq!(config.upgrade_debounce_ms, 80);
        assert_eq!(config.base_max_mana, 100.0);
        assert!((config.base_mana_regen_per_second * config.seconds_per_tick() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"ticks_per_second": 20}"#).unwrap();
        assert_eq!(config.ticks_per_second, 20);
        assert_eq!(config.mana_per_click, 0.5);
        assert_eq!(config.event_capacity, 256);
    }
}
