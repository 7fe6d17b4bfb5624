//! The built-in "classic" game: nine workers, four unlocks, two powers and
//! a shop of permanent upgrades.

use crate::definition::GameDefinition;
use crate::id::{PowerId, ShopItemId, UnlockKind, WorkerId};
use crate::power::{BuffCommand, PowerDef};
use crate::shop::{ShopItemDef, ShopTarget, UnlockCondition};
use crate::unlock::{PowerTier, UnlockDef, UnlockParam};
use crate::worker::WorkerDef;

pub const SWORD: WorkerId = WorkerId(0);
pub const FARMER: WorkerId = WorkerId(1);
pub const MINER: WorkerId = WorkerId(2);
pub const SMITH: WorkerId = WorkerId(3);
pub const ASTROLOGER: WorkerId = WorkerId(4);
pub const WIZARD: WorkerId = WorkerId(5);

pub const POWER: PowerId = PowerId(0);
pub const WEAKNESS: PowerId = PowerId(1);

fn workers() -> Vec<WorkerDef> {
    vec![
        WorkerDef::click_bonus("sword", 1.0, 1.05, 10.0, 1.25),
        WorkerDef::production("farmer", 2.0, 1.3, 50.0, 1.5),
        WorkerDef::production("miner", 4.0, 1.4, 150.0, 1.5),
        WorkerDef::production("smith", 16.0, 1.5, 500.0, 1.6),
        WorkerDef::production("astrologer", 32.0, 1.6, 2_000.0, 1.85),
        WorkerDef::production("wizard", 64.0, 1.7, 5_000.0, 2.0),
        WorkerDef::production("alchemist", 128.0, 1.8, 20_000.0, 2.5),
        WorkerDef::production("surveyor", 256.0, 1.9, 75_000.0, 3.0),
        WorkerDef::production("architect", 512.0, 2.0, 150_000.0, 4.0),
    ]
}

fn unlocks() -> Vec<UnlockDef> {
    use UnlockParam::*;
    vec![
        // Demo upgrade curve.
        UnlockDef::new(UnlockKind::CriticalHit, MINER, 1)
            .with_base(CriticalChance, 0.01)
            .with_base(CriticalMultiplier, 2.0)
            .with_upgrade(10, &[(CriticalChance, 0.01)])
            .with_upgrade(25, &[(CriticalMultiplier, 1.5)])
            .with_upgrade(50, &[(CriticalChance, 0.02)])
            .with_upgrade(100, &[(CriticalMultiplier, 2.0)]),
        UnlockDef::new(UnlockKind::Streak, SMITH, 10)
            .with_base(StreakMax, 800.0)
            .with_base(StreakDrain, 40.0)
            .with_base(StreakDamage, 2.0)
            .with_upgrade(20, &[(StreakMax, -100.0)])
            .with_upgrade(25, &[(StreakDamage, 2.0)])
            .with_upgrade(40, &[(StreakDrain, -5.0), (StreakMax, -100.0)])
            .with_upgrade(50, &[(StreakDamage, 2.0)])
            .with_upgrade(60, &[(StreakDrain, -10.0)])
            .with_upgrade(100, &[(StreakMax, -200.0)]),
        UnlockDef::new(UnlockKind::Sun, ASTROLOGER, 1).with_base(SunMultiplier, 2.0),
        UnlockDef::new(UnlockKind::Power, WIZARD, 1)
            .with_base(ManaCapacity, 0.0)
            .with_base(ManaRegen, 0.0)
            .with_upgrade(5, &[(ManaCapacity, 50.0)])
            .with_upgrade(15, &[(ManaRegen, 0.02)])
            .with_upgrade(30, &[(ManaCapacity, 100.0)])
            .with_upgrade(50, &[(ManaRegen, 0.05)])
            .with_upgrade(100, &[(ManaCapacity, 200.0)])
            .with_upgrade(150, &[(ManaRegen, 0.1)]),
    ]
}

fn powers() -> Vec<PowerDef> {
    vec![
        PowerDef::new("power", 60.0, 120.0).with_effect(vec![BuffCommand::SetDamageBuff {
            multiplier: 2.0,
            seconds: 60.0,
        }]),
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
    ]
}

fn shop() -> Vec<ShopItemDef> {
    let doubling = [
        "training sword",
        "pitchfork",
        "pickaxe",
        "wooden hammer",
        "wooden star",
        "baker's wand",
        "wooden potion",
        "wooden machine",
        "wooden house",
    ];
    let mut items: Vec<ShopItemDef> = doubling
        .iter()
        .enumerate()
        .map(|(i, name)| {
            ShopItemDef::new(name, 10f64.powi(i as i32 + 1), 2.0, ShopTarget::Worker(WorkerId(i as u32)))
        })
        .collect();

    // Demo items for the non-worker targets and compound conditions.
    // Indices 9.. follow the doubling items.
    let mana_flask = ShopItemId(items.len() as u32);
    items.extend([
        ShopItemDef::new("mana flask", 20_000.0, 50.0, ShopTarget::ManaCapacity)
            .with_condition(UnlockCondition::WorkerLevel { worker: WIZARD, level: 5 }),
        ShopItemDef::new("mana spring", 50_000.0, 0.1, ShopTarget::ManaRegen).with_condition(
            UnlockCondition::All(vec![
                UnlockCondition::WorkerLevel { worker: WIZARD, level: 10 },
                UnlockCondition::Bought(mana_flask),
            ]),
        ),
        ShopItemDef::new(
            "lucky charm",
            5_000.0,
            0.02,
            ShopTarget::UnlockParam(UnlockParam::CriticalChance),
        )
        .with_condition(UnlockCondition::WorkerLevel { worker: MINER, level: 10 }),
        ShopItemDef::new("focus crystal", 100_000.0, 0.8, ShopTarget::PowerCost(POWER))
            .with_condition(UnlockCondition::PowerOwned(POWER)),
        ShopItemDef::new("weak point map", 500_000.0, 0.75, ShopTarget::PowerCost(WEAKNESS))
            .with_condition(UnlockCondition::Any(vec![
                UnlockCondition::PowerOwned(WEAKNESS),
                UnlockCondition::MinCurrency(1_000_000.0),
            ])),
    ]);
    items
}

/// The classic game definition.
pub fn classic() -> GameDefinition {
    GameDefinition {
        workers: workers(),
        unlocks: unlocks(),
        power_tiers: vec![
            PowerTier {
                power: POWER,
                level_required: 1,
            },
            PowerTier {
                power: WEAKNESS,
                level_required: 9,
            },
        ],
        shop: shop(),
        powers: powers(),
    }
}
