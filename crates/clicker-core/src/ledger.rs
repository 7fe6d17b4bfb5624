//! The resource ledger: currency and mana.
//!
//! Every mutator clamps its result so that `currency >= 0` and
//! `0 <= mana <= max_mana` hold after the call, whatever the input.

use serde::{Deserialize, Serialize};

/// Holds the two spendable quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    currency: f64,
    mana: f64,
    max_mana: f64,
}

impl ResourceLedger {
    /// Empty ledger with the given mana capacity.
    pub fn new(max_mana: f64) -> Self {
        Self {
            currency: 0.0,
            mana: 0.0,
            max_mana: sanitize(max_mana),
        }
    }

    pub fn currency(&self) -> f64 {
        self.currency
    }

    pub fn mana(&self) -> f64 {
        self.mana
    }

    pub fn max_mana(&self) -> f64 {
        self.max_mana
    }

    pub fn can_afford(&self, price: f64) -> bool {
        self.currency >= price
    }

    /// Credit (or debit, for negative amounts) currency, floored at zero.
    pub fn add_currency(&mut self, amount: f64) {
        if amount.is_nan() {
            return;
        }
        self.currency = (self.currency + amount).max(0.0);
    }

    /// Pay `price` if `currency >= price - epsilon`. The epsilon only absorbs
    /// float drift from fractional per-tick credits.
    pub fn try_spend_currency(&mut self, price: f64, epsilon: f64) -> bool {
        if price.is_nan() || self.currency < price - epsilon {
            return false;
        }
        self.currency = (self.currency - price).max(0.0);
        true
    }

    /// Change the mana cap, pulling current mana down if it now exceeds it.
    pub fn set_max_mana(&mut self, value: f64) {
        self.max_mana = sanitize(value);
        self.mana = self.mana.min(self.max_mana);
    }

    pub fn add_mana(&mut self, amount: f64) {
        if amount.is_nan() {
            return;
        }
        self.mana = (self.mana + amount).clamp(0.0, self.max_mana);
    }

    pub fn try_spend_mana(&mut self, cost: f64, epsilon: f64) -> bool {
        if cost.is_nan() || self.mana < cost - epsilon {
            return false;
        }
        self.mana = (self.mana - cost).clamp(0.0, self.max_mana);
        true
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_currency_never_goes_negative() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_currency(5.0);
        ledger.add_currency(-50.0);
        assert_eq!(ledger.currency(), 0.0);
    }

    #[test]
    fn spend_requires_price_within_epsilon() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_currency(9.9995);
        assert!(ledger.try_spend_currency(10.0, 0.001));
        assert_eq!(ledger.currency(), 0.0);
    }

    #[test]
    fn spend_rejects_real_underpayment() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_currency(9.5);
        assert!(!ledger.try_spend_currency(10.0, 0.001));
        assert_eq!(ledger.currency(), 9.5);
    }

    #[test]
    fn shrinking_cap_clamps_mana() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_mana(80.0);
        ledger.set_max_mana(50.0);
        assert_eq!(ledger.mana(), 50.0);
        ledger.set_max_mana(-10.0);
        assert_eq!(ledger.max_mana(), 0.0);
        assert_eq!(ledger.mana(), 0.0);
    }

    #[test]
    fn add_mana_respects_cap() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_mana(250.0);
        assert_eq!(ledger.mana(), 100.0);
        ledger.add_mana(-400.0);
        assert_eq!(ledger.mana(), 0.0);
    }

    #[test]
    fn spend_mana() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_mana(100.0);
        assert!(ledger.try_spend_mana(60.0, 0.001));
        assert_eq!(ledger.mana(), 40.0);
        assert!(!ledger.try_spend_mana(60.0, 0.001));
        assert_eq!(ledger.mana(), 40.0);
    }

    #[test]
    fn nan_inputs_are_ignored() {
        let mut ledger = ResourceLedger::new(100.0);
        ledger.add_currency(f64::NAN);
        ledger.add_mana(f64::NAN);
        assert_eq!(ledger.currency(), 0.0);
        assert_eq!(ledger.mana(), 0.0);
        assert!(!ledger.try_spend_currency(f64::NAN, 0.0));
    }
}
