//! Fixed-capacity byte region with a monotonically advancing boundary.
//!
//! ```text
//!   start                boundary                      limit
//!     │                     │                            │
//!     ▼                     ▼                            ▼
//!     ┌─────────────────────┬────────────────────────────┐
//!     │      granted        │         untouched          │
//!     └─────────────────────┴────────────────────────────┘
//! ```
//!
//! [`Reservoir::grow`] plays the part `sbrk` plays for a process: it hands
//! out the region between the old and the new boundary, or refuses without
//! moving anything.

use tracing::{trace, warn};

use crate::error::ReservoirError;

pub struct Reservoir {
  storage: Box<[u8]>,
  boundary: usize,
}

impl Reservoir {
  pub fn new(capacity: usize) -> Self {
    Self {
      storage: vec![0u8; capacity].into_boxed_slice(),
      boundary: 0,
    }
  }

  /// Total bytes the boundary may ever advance over.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.storage.len()
  }

  /// Offset of the first byte not yet granted.
  #[inline]
  pub fn boundary(&self) -> usize {
    self.boundary
  }

  #[inline]
  pub fn remaining(&self) -> usize {
    self.capacity() - self.boundary
  }

  /// Advances the boundary by `amount` and returns where the granted region starts.
  ///
  /// On exhaustion the boundary is restored to its value before the call.
  pub fn grow(
    &mut self,
    amount: usize,
  ) -> Result<usize, ReservoirError> {
    let previous = self.boundary;
    let exhausted = ReservoirError::Exhausted {
      requested: amount,
      available: self.remaining(),
    };

    self.boundary = match previous.checked_add(amount) {
      Some(next) => next,
      None => {
        warn!(requested = amount, "reservoir growth overflowed");
        return Err(exhausted);
      },
    };

    if self.boundary > self.capacity() {
      self.boundary = previous;
      warn!(requested = amount, available = self.remaining(), "reservoir exhausted");
      return Err(exhausted);
    }

    trace!(start = previous, boundary = self.boundary, "reservoir grown");
    Ok(previous)
  }

  /// Every byte handed out so far.
  #[inline]
  pub fn granted(&self) -> &[u8] {
    &self.storage[..self.boundary]
  }

  #[inline]
  pub fn granted_mut(&mut self) -> &mut [u8] {
    &mut self.storage[..self.boundary]
  }

  /// Granted bytes in `offset..offset + len`, or `None` if any of them lies past the boundary.
  pub fn bytes(
    &self,
    offset: usize,
    len: usize,
  ) -> Option<&[u8]> {
    self.granted().get(offset..offset.checked_add(len)?)
  }

  pub fn bytes_mut(
    &mut self,
    offset: usize,
    len: usize,
  ) -> Option<&mut [u8]> {
    let end = offset.checked_add(len)?;
    self.granted_mut().get_mut(offset..end)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_grow_returns_previous_boundary() {
    let mut reservoir = Reservoir::new(64);

    assert_eq!(reservoir.grow(16), Ok(0));
    assert_eq!(reservoir.grow(16), Ok(16));
    assert_eq!(reservoir.boundary(), 32);
    assert_eq!(reservoir.remaining(), 32);
  }

  #[test]
  fn test_grow_to_exact_limit() {
    let mut reservoir = Reservoir::new(64);

    assert_eq!(reservoir.grow(64), Ok(0));
    assert_eq!(reservoir.remaining(), 0);
    assert_eq!(reservoir.grow(0), Ok(64));
  }

  #[test]
  fn test_exhaustion_rolls_back() {
    let mut reservoir = Reservoir::new(64);
    reservoir.grow(40).unwrap();

    let result = reservoir.grow(32);

    assert_eq!(result, Err(ReservoirError::Exhausted { requested: 32, available: 24 }));
    assert_eq!(reservoir.boundary(), 40);
    assert_eq!(reservoir.grow(24), Ok(40));
  }

  #[test]
  fn test_overflowing_growth_is_exhaustion() {
    let mut reservoir = Reservoir::new(64);
    reservoir.grow(8).unwrap();

    assert!(reservoir.grow(usize::MAX).is_err());
    assert_eq!(reservoir.boundary(), 8);
  }

  #[test]
  fn test_bytes_are_bounded_by_boundary() {
    let mut reservoir = Reservoir::new(64);
    reservoir.grow(16).unwrap();

    assert_eq!(reservoir.bytes(0, 16).map(<[u8]>::len), Some(16));
    assert!(reservoir.bytes(8, 16).is_none());
    assert!(reservoir.bytes(usize::MAX, 2).is_none());

    reservoir.bytes_mut(4, 4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(reservoir.bytes(4, 4), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(reservoir.granted().len(), 16);
  }

  mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
      #[test]
      fn boundary_never_passes_limit(
        capacity in 0usize..4096,
        amounts in proptest::collection::vec(0usize..1024, 1..40),
      ) {
        let mut reservoir = Reservoir::new(capacity);

        for amount in amounts {
          let before = reservoir.boundary();

          match reservoir.grow(amount) {
            Ok(start) => {
              prop_assert_eq!(start, before);
              prop_assert_eq!(reservoir.boundary(), before + amount);
            },
            Err(ReservoirError::Exhausted { requested, available }) => {
              prop_assert_eq!(requested, amount);
              prop_assert_eq!(available, capacity - before);
              prop_assert!(before + amount > capacity);
              prop_assert_eq!(reservoir.boundary(), before);
            },
          }

          prop_assert!(reservoir.boundary() <= reservoir.capacity());
        }
      }
    }
  }
}
