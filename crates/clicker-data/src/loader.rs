//! Resolution pipeline: reads data files, resolves names, builds a
//! validated game definition.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by [`load_game_data`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clicker_core::clock::TimeSource;
use clicker_core::config::GameConfig;
use clicker_core::definition::{DefinitionError, GameDefinition};
use clicker_core::engine::Engine;
use clicker_core::id::{PowerId, ShopItemId, WorkerId};
use clicker_core::power::PowerDef;
use clicker_core::shop::{ShopItemDef, ShopTarget, UnlockCondition};
use clicker_core::unlock::{PowerTier, UnlockDef};
use clicker_core::worker::WorkerDef;
use serde::de::DeserializeOwned;

use crate::schema::{ConditionData, PowerData, ShopItemData, TargetData, UnlockData, WorkerData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The resolved definition failed engine validation.
    #[error("invalid game definition: {0}")]
    Definition(#[from] DefinitionError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

/// Load an optional list file; a missing file yields an empty list.
fn load_optional_list<T: DeserializeOwned>(
    dir: &Path,
    base_name: &str,
) -> Result<(Vec<T>, PathBuf), DataLoadError> {
    match find_data_file(dir, base_name)? {
        Some(path) => Ok((deserialize_list(&path, base_name)?, path)),
        None => Ok((Vec::new(), dir.join(base_name))),
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Map every name to its position, rejecting duplicates.
fn index_names<'a, I>(
    names: impl IntoIterator<Item = &'a String>,
    file: &Path,
    make_id: impl Fn(u32) -> I,
) -> Result<HashMap<String, I>, DataLoadError> {
    let mut map = HashMap::new();
    for (i, name) in names.into_iter().enumerate() {
        check_duplicate(&map, name, file)?;
        map.insert(name.clone(), make_id(i as u32));
    }
    Ok(map)
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// A validated definition plus the tuning it was loaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub definition: GameDefinition,
    pub config: GameConfig,
}

impl GameData {
    /// Build an engine from the loaded data.
    pub fn into_engine(self, clock: Arc<dyn TimeSource>) -> Result<Engine, DefinitionError> {
        Engine::new(self.definition, self.config, clock)
    }
}

/// Name-to-id tables shared by the resolution passes.
struct Names {
    workers: HashMap<String, WorkerId>,
    powers: HashMap<String, PowerId>,
    shop: HashMap<String, ShopItemId>,
}

/// Load a game from `dir`.
///
/// `workers` is required. `unlocks`, `powers`, `shop` and `config` are
/// optional; a missing `config` uses the defaults. Each may be RON, TOML
/// or JSON, but only one format per base name.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let workers_path = require_data_file(dir, "workers")?;
    let workers: Vec<WorkerData> = deserialize_list(&workers_path, "workers")?;
    let (unlocks, unlocks_path) = load_optional_list::<UnlockData>(dir, "unlocks")?;
    let (powers, powers_path) = load_optional_list::<PowerData>(dir, "powers")?;
    let (shop, shop_path) = load_optional_list::<ShopItemData>(dir, "shop")?;

    let config = match find_data_file(dir, "config")? {
        Some(path) => deserialize_file::<GameConfig>(&path)?,
        None => GameConfig::default(),
    };

    let names = Names {
        workers: index_names(workers.iter().map(|w| &w.name), &workers_path, WorkerId)?,
        powers: index_names(powers.iter().map(|p| &p.name), &powers_path, PowerId)?,
        shop: index_names(shop.iter().map(|s| &s.name), &shop_path, ShopItemId)?,
    };

    let definition = GameDefinition {
        workers: workers.into_iter().map(resolve_worker).collect(),
        unlocks: unlocks
            .into_iter()
            .map(|u| resolve_unlock(u, &names, &unlocks_path))
            .collect::<Result<_, _>>()?,
        power_tiers: power_tiers(&powers),
        powers: powers.into_iter().map(resolve_power).collect(),
        shop: shop
            .into_iter()
            .map(|s| resolve_shop_item(s, &names, &shop_path))
            .collect::<Result<_, _>>()?,
    };
    definition.validate(&config)?;

    tracing::info!(
        target: "clicker.data",
        dir = %dir.display(),
        workers = definition.workers.len(),
        unlocks = definition.unlocks.len(),
        powers = definition.powers.len(),
        shop = definition.shop.len(),
        "game data loaded"
    );
    Ok(GameData { definition, config })
}

fn resolve_worker(data: WorkerData) -> WorkerDef {
    WorkerDef {
        name: data.name,
        kind: data.kind,
        base_price: data.base_price,
        price_curve: data.price_curve,
        base_value: data.base_value,
        value_curve: data.value_curve,
    }
}

fn resolve_unlock(data: UnlockData, names: &Names, file: &Path) -> Result<UnlockDef, DataLoadError> {
    let worker = *resolve_name(&names.workers, &data.worker, file, "worker")?;
    Ok(UnlockDef {
        kind: data.kind,
        worker,
        level_required: data.level_required,
        base: data.base,
        upgrades: data.upgrades,
    })
}

fn power_tiers(powers: &[PowerData]) -> Vec<PowerTier> {
    powers
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            p.level_required.map(|level_required| PowerTier {
                power: PowerId(i as u32),
                level_required,
            })
        })
        .collect()
}

fn resolve_power(data: PowerData) -> PowerDef {
    PowerDef {
        name: data.name,
        mana_cost: data.mana_cost,
        cooldown_seconds: data.cooldown_seconds,
        effect: data.effect,
        initially_visible: data.initially_visible,
    }
}

fn resolve_shop_item(
    data: ShopItemData,
    names: &Names,
    file: &Path,
) -> Result<ShopItemDef, DataLoadError> {
    let target = match data.target {
        TargetData::Worker(name) => {
            ShopTarget::Worker(*resolve_name(&names.workers, &name, file, "worker")?)
        }
        TargetData::PowerCost(name) => {
            ShopTarget::PowerCost(*resolve_name(&names.powers, &name, file, "power")?)
        }
        TargetData::UnlockParam(param) => ShopTarget::UnlockParam(param),
        TargetData::ManaCapacity => ShopTarget::ManaCapacity,
        TargetData::ManaRegen => ShopTarget::ManaRegen,
    };
    let condition = data
        .condition
        .map(|c| resolve_condition(c, names, file))
        .transpose()?;
    Ok(ShopItemDef {
        name: data.name,
        price: data.price,
        value: data.value,
        target,
        condition,
        initially_visible: data.initially_visible,
    })
}

fn resolve_condition(
    data: ConditionData,
    names: &Names,
    file: &Path,
) -> Result<UnlockCondition, DataLoadError> {
    let resolve_all = |list: Vec<ConditionData>| {
        list.into_iter()
            .map(|c| resolve_condition(c, names, file))
            .collect::<Result<Vec<_>, _>>()
    };
    Ok(match data {
        ConditionData::MinCurrency(amount) => UnlockCondition::MinCurrency(amount),
        ConditionData::WorkerLevel { worker, level } => UnlockCondition::WorkerLevel {
            worker: *resolve_name(&names.workers, &worker, file, "worker")?,
            level,
        },
        ConditionData::Bought(name) => {
            UnlockCondition::Bought(*resolve_name(&names.shop, &name, file, "shop item")?)
        }
        ConditionData::PowerOwned(name) => {
            UnlockCondition::PowerOwned(*resolve_name(&names.powers, &name, file, "power")?)
        }
        ConditionData::All(list) => UnlockCondition::All(resolve_all(list)?),
        ConditionData::Any(list) => UnlockCondition::Any(resolve_all(list)?),
    })
}

// ===========================================================================
// Tests
// ===========================================================================
