//! Ownership and growth of the single backing buffer.

use log::debug;

use crate::capacity::CapacityPolicy;
use crate::config::ScratchConfig;
use crate::error::Result;
use crate::host::ScratchHost;

/// Owns the one live scratch buffer of an instance.
///
/// Capacity never shrinks. Each reallocation bumps `generation` and drops the
/// store's handle to the old buffer; views cut from an older generation must
/// not be used again.
pub struct BufferStore<H: ScratchHost> {
    host: H,
    policy: CapacityPolicy,
    buffer: H::Buffer,
    capacity: usize,
    generation: u64,
    reallocations: u64,
}

impl<H: ScratchHost> BufferStore<H> {
    pub fn new(host: H, config: &ScratchConfig) -> Result<Self> {
        config.validate()?;
        let buffer = host.allocate(config.initial_capacity)?;
        Ok(Self {
            host,
            policy: CapacityPolicy::new(config.max_capacity),
            buffer,
            capacity: config.initial_capacity,
            generation: 0,
            reallocations: 0,
        })
    }

    /// Make room for `required` bytes. Returns `true` when the buffer was
    /// reallocated, `false` when the current one already sufficed.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<bool> {
        let next = self.policy.grow(self.capacity, required)?;
        if next == self.capacity {
            return Ok(false);
        }
        // Allocate before touching any state so a failed allocation leaves
        // the old buffer in place.
        let buffer = self.host.allocate(next)?;
        debug!(
            "scratch buffer grown {} -> {} bytes (required {}, generation {})",
            self.capacity,
            next,
            required,
            self.generation + 1
        );
        self.buffer = buffer;
        self.capacity = next;
        self.generation += 1;
        self.reallocations += 1;
        debug_assert_eq!(self.host.buffer_byte_length(&self.buffer), self.capacity);
        Ok(true)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    pub fn buffer(&self) -> &H::Buffer {
        &self.buffer
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}
