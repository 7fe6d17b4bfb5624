use serde::{Deserialize, Serialize};

/// Identifies a worker slot in the ladder. Slots are fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

/// Identifies a shop item by its position in the shop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShopItemId(pub u32);

/// Identifies a power by its position in the power list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PowerId(pub u32);

impl WorkerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ShopItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PowerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four worker-bound feature gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockKind {
    CriticalHit,
    Sun,
    Streak,
    Power,
}

impl UnlockKind {
    pub const ALL: [UnlockKind; 4] = [
        UnlockKind::CriticalHit,
        UnlockKind::Sun,
        UnlockKind::Streak,
        UnlockKind::Power,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnlockKind::CriticalHit => "critical_hit",
            UnlockKind::Sun => "sun",
            UnlockKind::Streak => "streak",
            UnlockKind::Power => "power",
        }
    }
}
