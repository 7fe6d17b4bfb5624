//! Numeric helpers shared by every subsystem.
//!
//! Currency in an incremental game outgrows any fixed-point range within a
//! few dozen purchases, so all quantities are `f64`. Rounding and flooring
//! rules live here so every price and rate is computed the same way.

/// Milliseconds on the engine's injected clock.
pub type Millis = u64;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: Millis = 1_000;

/// Round to two decimal places (half away from zero).
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `base * curve^level`, the growth law used by prices and outputs.
#[inline]
pub fn geometric(base: f64, curve: f64, level: u32) -> f64 {
    base * curve.powi(level as i32)
}

/// Convert a duration in (possibly fractional) seconds to milliseconds.
#[inline]
pub fn seconds_to_millis(seconds: f64) -> Millis {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * MILLIS_PER_SECOND as f64).round() as Millis
}

/// Whole seconds remaining until `until`, rounded up. Zero once elapsed.
#[inline]
pub fn remaining_seconds_ceil(now: Millis, until: Millis) -> u64 {
    if now >= until {
        return 0;
    }
    (until - now).div_ceil(MILLIS_PER_SECOND)
}
