//! Sizing configuration for the scratch buffer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScratchError};

/// Byte granularity every capacity must respect so the float32 window can
/// always cover the whole buffer.
pub const CAPACITY_ALIGN: usize = 4;

/// Configuration for a scratch marshaller instance.
///
/// Missing fields fall back to [`ScratchConfig::default`], so
/// `{ "initial_capacity": 64 }` is a valid JSON config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Bytes allocated when the instance is created.
    pub initial_capacity: usize,
    /// Upper bound for growth. Requests beyond it fail with `CapacityOverflow`.
    pub max_capacity: usize,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_capacity: 1 << 31,
        }
    }
}

impl ScratchConfig {
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    pub fn with_max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = bytes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(ScratchError::InvalidConfig(
                "initial_capacity must be non-zero".into(),
            ));
        }
        for (name, value) in [
            ("initial_capacity", self.initial_capacity),
            ("max_capacity", self.max_capacity),
        ] {
            if value % CAPACITY_ALIGN != 0 {
                return Err(ScratchError::InvalidConfig(format!(
                    "{name} ({value}) must be a multiple of {CAPACITY_ALIGN}"
                )));
            }
        }
        if self.initial_capacity > self.max_capacity {
            return Err(ScratchError::InvalidConfig(format!(
                "initial_capacity ({}) exceeds max_capacity ({})",
                self.initial_capacity, self.max_capacity
            )));
        }
        Ok(())
    }
}
