//! Construction-time sizing for the order book.
//!
//! All reservations happen once, up front: the arena holds the peak number
//! of simultaneously live orders, each side book holds the expected
//! distinct-price working set, and the order index is reserved to arena
//! capacity so steady-state insertion never reallocates.

use thiserror::Error;

use crate::arena::NULL_INDEX;

/// Default capacity reservation for each side's price levels.
pub const DEFAULT_MAX_PRICE_LEVELS: usize = 4096;

/// Sizing options accepted at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookConfig {
    /// Arena size: peak number of simultaneously live orders
    /// (resting + in-flight incoming).
    pub capacity: u32,
    /// Price-level reservation per side. Exceeding it in steady state is a
    /// sizing error (debug-asserted on insert).
    pub max_price_levels: usize,
}

impl BookConfig {
    /// Config with the given arena capacity and default level reservation.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            max_price_levels: DEFAULT_MAX_PRICE_LEVELS,
        }
    }

    /// Override the per-side price-level reservation.
    pub fn max_price_levels(mut self, max_price_levels: usize) -> Self {
        self.max_price_levels = max_price_levels;
        self
    }

    /// Check the sizing is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity >= NULL_INDEX {
            return Err(ConfigError::CapacityTooLarge(self.capacity));
        }
        if self.max_price_levels == 0 {
            return Err(ConfigError::ZeroPriceLevels);
        }
        Ok(())
    }
}

/// Rejected sizing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("capacity must be non-zero")]
    ZeroCapacity,

    #[error("capacity {0} collides with the null index sentinel")]
    CapacityTooLarge(u32),

    #[error("max_price_levels must be non-zero")]
    ZeroPriceLevels,
}
