//! Growth sizing for the scratch buffer.

use crate::error::{Result, ScratchError};

/// Doubling growth policy bounded by a maximum capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityPolicy {
    max: usize,
}

impl CapacityPolicy {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// Returns the capacity needed to hold `required` bytes.
    ///
    /// `current` is returned unchanged when it already suffices (so a zero
    /// request never grows). Otherwise `current` is doubled until it covers
    /// `required`. A doubling step that would pass `max` settles on `max`,
    /// which still covers the request because requests above `max` are
    /// rejected up front.
    pub fn grow(&self, current: usize, required: usize) -> Result<usize> {
        if required <= current {
            return Ok(current);
        }
        if required > self.max {
            return Err(ScratchError::CapacityOverflow {
                requested: required,
                max: self.max,
            });
        }
        let mut cap = current.max(1);
        while cap < required {
            cap = match cap.checked_mul(2) {
                Some(next) if next <= self.max => next,
                _ => return Ok(self.max),
            };
        }
        Ok(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sufficient_capacity_is_a_no_op() {
        let p = CapacityPolicy::new(1 << 20);
        assert_eq!(p.grow(16, 0).unwrap(), 16);
        assert_eq!(p.grow(16, 10).unwrap(), 16);
        assert_eq!(p.grow(16, 16).unwrap(), 16);
    }

    #[test]
    fn doubles_from_current_value() {
        let p = CapacityPolicy::new(1 << 20);
        assert_eq!(p.grow(16, 17).unwrap(), 32);
        assert_eq!(p.grow(16, 100).unwrap(), 128);
        // Starts from 24, not from a power-of-two base.
        assert_eq!(p.grow(24, 100).unwrap(), 192);
    }

    #[test]
    fn settles_on_max_when_doubling_overshoots() {
        let p = CapacityPolicy::new(100);
        assert_eq!(p.grow(64, 90).unwrap(), 100);
    }

    #[test]
    fn requests_above_max_overflow() {
        let p = CapacityPolicy::new(128);
        assert_eq!(
            p.grow(16, 129),
            Err(ScratchError::CapacityOverflow {
                requested: 129,
                max: 128
            })
        );
    }

    #[test]
    fn near_usize_max_does_not_wrap() {
        let p = CapacityPolicy::new(usize::MAX);
        let required = usize::MAX / 2 + 2;
        assert_eq!(p.grow(16, required).unwrap(), usize::MAX);
    }
}
