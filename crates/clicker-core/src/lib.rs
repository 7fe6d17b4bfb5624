//! Clicker Core -- the progression and economy engine for incremental games.
//!
//! The crate owns every rule of a clicker game: a ladder of upgradable
//! workers, a currency and mana ledger, level-gated unlocks, a shop of
//! permanent upgrades, castable powers with timed buffs, and a click streak.
//! Presentation layers drive it through commands and read it through
//! snapshots; nothing here draws, plays sound or persists.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] runs one tick:
//!
//! 1. **Expire** -- Close buff windows whose end has passed.
//! 2. **Produce** -- Credit owned production, scaled by shop, streak and
//!    damage buff, divided by the tick rate.
//! 3. **Regenerate** -- Add mana up to the current cap.
//! 4. **Drain** -- Lower an active streak bar.
//! 5. **Settle** -- Re-derive the mana cap and latch visibility flags.
//! 6. **Bookkeeping** -- Increment the tick counter and compute the state hash.
//!
//! [`engine::Engine::advance`] converts wall time into whole ticks and keeps
//! the remainder for the next call.
//!
//! # Commands
//!
//! Every player action has a `try_*` form returning
//! `Result<_, command::CommandError>` and a plain form returning `bool`:
//!
//! ```rust,ignore
//! let (mut engine, _clock) = clicker_core::test_utils::funded_classic_engine(10.0);
//! assert!(engine.upgrade_worker(content::SWORD));
//! assert_eq!(engine.click(), 2.05);
//! ```
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- The game aggregate and command surface.
//! - [`worker::WorkerLadder`] -- Worker slots, prices and tier steps.
//! - [`unlock::UnlockRules`] -- Worker-bound feature gates and their upgrades.
//! - [`shop::ShopStore`] -- One-time upgrades with visibility conditions.
//! - [`power::PowerEngine`] -- Mana costs, cooldowns, effects and buffs.
//! - [`streak::StreakBar`] -- The fill/active click combo.
//! - [`query::GameState`] -- The read-only snapshot handed to UIs.
//! - [`clock::TimeSource`] -- Injected wall clock for cooldowns and buffs.

pub mod clock;
pub mod command;
pub mod config;
pub mod content;
pub mod definition;
pub mod engine;
pub mod event;
pub mod id;
pub mod ledger;
pub mod numeric;
pub mod power;
pub mod query;
pub mod rng;
pub mod shop;
pub mod sim;
pub mod streak;
pub mod unlock;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
