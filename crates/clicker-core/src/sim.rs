//! Simulation bookkeeping: tick counter, time accumulator and state hash.
//!
//! A step is one fixed tick worth `1 / ticks_per_second` seconds. Callers
//! either call `Engine::step()` from their own fixed-rate scheduler or feed
//! elapsed wall time to `Engine::advance()`, which runs as many whole steps
//! as fit and carries the remainder forward.

use crate::numeric::{MILLIS_PER_SECOND, Millis, Ticks};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Incremented by 1 for each simulation step.
    pub tick: Ticks,

    /// Elapsed time not yet turned into steps, in millisecond-ticks
    /// (milliseconds multiplied by the tick rate) so no rate drifts.
    pub accumulator: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elapsed` wall time and return how many whole steps are now due.
    pub fn accumulate(&mut self, elapsed: Millis, ticks_per_second: u32) -> u64 {
        self.accumulator = self
            .accumulator
            .saturating_add(elapsed.saturating_mul(u64::from(ticks_per_second)));
        let steps = self.accumulator / MILLIS_PER_SECOND;
        self.accumulator %= MILLIS_PER_SECOND;
        steps
    }
}

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// Result of an `Engine::advance()` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    pub steps_run: u64,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of game state for determinism checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Hashes the bit pattern, so `0.0` and `-0.0` differ.
    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
