//! Simulation configuration, per-year summaries, and the state hash.

use crate::growth::DEFAULT_LEVEL_UP_GUARD;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables fixed at construction. Missing fields take their defaults when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Width and height of the square grid.
    pub grid_size: u32,
    /// Last year that advances. Years run `1..=max_year`.
    pub max_year: u32,
    /// Seed for template decay coefficients.
    pub seed: u64,
    /// Year summaries kept in the log, newest first.
    pub log_capacity: usize,
    /// Maximum level-ups per building per year.
    pub level_up_guard: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            max_year: 50,
            seed: 42,
            log_capacity: 100,
            level_up_guard: DEFAULT_LEVEL_UP_GUARD,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size must be at least 1")]
    ZeroGrid,
    #[error("log capacity must be at least 1")]
    ZeroLogCapacity,
    #[error("level-up guard must be at least 1")]
    ZeroGuard,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGrid);
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::ZeroLogCapacity);
        }
        if self.level_up_guard == 0 {
            return Err(ConfigError::ZeroGuard);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Year summary
// ---------------------------------------------------------------------------

/// One log entry, recorded at the end of every advanced year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub cluster_count: usize,
    /// Sum of every cluster's production this year.
    pub total_supply: f64,
    /// Highest building level, 0 on an empty board.
    pub top_level: u32,
}

impl fmt::Display for YearSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year {}: clusters={}, supply={:.2}, topLv={}",
            self.year, self.cluster_count, self.total_supply, self.top_level
        )
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// Deterministic FNV-1a (64-bit) hash of simulation state, for checking that
/// two runs ended in the same place. Not cryptographic.
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

    /// Hashes the exact bit pattern, so `0.0` and `-0.0` differ.
    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
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
