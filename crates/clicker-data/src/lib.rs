//! Data-driven game definitions for the clicker engine.
//!
//! A game directory holds `workers`, `unlocks`, `powers`, `shop` and
//! `config` files in RON, TOML or JSON. Names are resolved to engine ids
//! and the result is validated before an engine is ever built from it.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};

use std::path::PathBuf;

/// Directory of the bundled classic game.
pub fn classic_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("classic")
}
