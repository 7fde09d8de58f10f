//! Construction-time configuration for [`Heap`](crate::Heap).

use crate::{chunk::HEADER_SIZE, error::HeapError};

/// Reservoir size used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Sizes the reservoir and the slab the heap carves out of it.
///
/// # Example
/// ```
/// use rmalloc::HeapConfig;
///
/// let config = HeapConfig::builder().capacity(8192).slab_size(4096).build().unwrap();
/// assert_eq!(config.capacity, 8192);
/// assert_eq!(config.slab_size, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  /// Total bytes in the reservoir. The boundary never moves past it.
  pub capacity: usize,
  /// Bytes requested from the reservoir on first use, header included.
  pub slab_size: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      capacity: DEFAULT_CAPACITY,
      slab_size: DEFAULT_CAPACITY,
    }
  }
}

impl HeapConfig {
  pub fn builder() -> HeapConfigBuilder {
    HeapConfigBuilder {
      config: Self::default(),
      slab_size: None,
    }
  }

  /// Rejects configurations under which the first slab could never hold a chunk.
  ///
  /// A slab larger than the capacity is accepted: it makes initialization
  /// fail with [`HeapError::ExhaustedArena`], the same way an undersized
  /// reservoir does.
  pub fn validate(&self) -> Result<(), HeapError> {
    if self.capacity == 0 {
      return Err(HeapError::InvalidConfig("capacity must be non-zero"));
    }
    if self.slab_size < HEADER_SIZE {
      return Err(HeapError::InvalidConfig("slab must fit at least one chunk header"));
    }
    Ok(())
  }
}

/// Fluent builder for [`HeapConfig`].
///
/// The slab defaults to the whole reservoir unless set explicitly.
pub struct HeapConfigBuilder {
  config: HeapConfig,
  slab_size: Option<usize>,
}

impl HeapConfigBuilder {
  pub fn capacity(
    mut self,
    bytes: usize,
  ) -> Self {
    self.config.capacity = bytes;
    self
  }

  pub fn slab_size(
    mut self,
    bytes: usize,
  ) -> Self {
    self.slab_size = Some(bytes);
    self
  }

  pub fn build(self) -> Result<HeapConfig, HeapError> {
    let config = HeapConfig {
      slab_size: self.slab_size.unwrap_or(self.config.capacity),
      ..self.config
    };
    config.validate()?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = HeapConfig::default();

    assert_eq!(config.capacity, 4096);
    assert_eq!(config.slab_size, 4096);
    assert_eq!(HeapConfig::builder().build(), Ok(config));
  }

  #[test]
  fn test_slab_follows_capacity() {
    let config = HeapConfig::builder().capacity(1024).build().unwrap();

    assert_eq!(config.slab_size, 1024);
  }

  #[test]
  fn test_rejects_zero_capacity() {
    let result = HeapConfig::builder().capacity(0).slab_size(64).build();

    assert!(matches!(result, Err(HeapError::InvalidConfig(_))));
  }

  #[test]
  fn test_rejects_slab_smaller_than_header() {
    let result = HeapConfig::builder().slab_size(HEADER_SIZE - 1).build();

    assert!(matches!(result, Err(HeapError::InvalidConfig(_))));
  }

  #[test]
  fn test_accepts_oversized_slab() {
    let config = HeapConfig::builder().capacity(256).slab_size(512).build();

    assert!(config.is_ok());
  }
}
