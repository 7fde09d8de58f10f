//! Failure kinds surfaced by the reservoir and the chunk allocator.

use thiserror::Error;

use crate::heap::Address;

/// Failure of the bump reservoir.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservoirError {
  /// Advancing the boundary would cross the limit. The boundary was left untouched.
  #[error("reservoir exhausted: requested {requested} bytes, available {available} bytes")]
  Exhausted {
    /// Bytes asked for by `grow`.
    requested: usize,
    /// Bytes left between the boundary and the limit.
    available: usize,
  },
}

/// Failure of a heap operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
  /// The slab backing the heap could not be carved out of the reservoir.
  #[error("exhausted arena: {0}")]
  ExhaustedArena(#[from] ReservoirError),

  /// No chunk in the list could satisfy the request.
  #[error("out of memory: no chunk can hold {requested} bytes")]
  OutOfMemory {
    /// Size passed to `allocate`, before alignment.
    requested: usize,
  },

  /// The address handed to `release` is not the payload of any chunk.
  #[error("unknown pointer {0}")]
  UnknownPointer(Address),

  /// The heap configuration was rejected at build time.
  #[error("invalid heap configuration: {0}")]
  InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, HeapError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reservoir_error_converts() {
    let err: HeapError = ReservoirError::Exhausted { requested: 8192, available: 4096 }.into();

    assert!(matches!(err, HeapError::ExhaustedArena(ReservoirError::Exhausted { requested: 8192, .. })));
    assert_eq!(
      err.to_string(),
      "exhausted arena: reservoir exhausted: requested 8192 bytes, available 4096 bytes"
    );
  }

  #[test]
  fn test_unknown_pointer_message() {
    assert_eq!(HeapError::UnknownPointer(Address::new(0x18)).to_string(), "unknown pointer 0x0018");
  }
}
