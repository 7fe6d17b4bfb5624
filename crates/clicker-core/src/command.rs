//! Player intents and the reasons they can be refused.
//!
//! Commands apply immediately and completely, or not at all. A refusal is a
//! normal game outcome, so the facade reports it as `false` and the `try_*`
//! forms expose the reason.

use crate::id::{PowerId, ShopItemId, WorkerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single player intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Manual click at the base multiplier.
    Click,
    /// Manual click scaled by an extra factor.
    ClickWith { multiplier: f64 },
    /// Click the sun; only accepted once the sun is unlocked.
    ClickSun,
    UpgradeWorker(WorkerId),
    BuyShopItem(ShopItemId),
    /// Powers cannot be bought; always refused.
    BuyPower(PowerId),
    CastPower(PowerId),
}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

/// Why a command left the state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("index {0} is out of range")]
    InvalidIndex(usize),
    #[error("insufficient currency: need {required}, have {available}")]
    InsufficientCurrency { required: f64, available: f64 },
    #[error("insufficient mana: need {required}, have {available}")]
    InsufficientMana { required: f64, available: f64 },
    #[error("already bought")]
    AlreadyBought,
    #[error("on cooldown for another {remaining_ms} ms")]
    OnCooldown { remaining_ms: u64 },
    #[error("repeated within the debounce window")]
    Debounced,
    #[error("power {0:?} has no registered effect")]
    MissingEffect(PowerId),
    #[error("feature is locked")]
    Locked,
    #[error("not purchasable")]
    NotPurchasable,
}
