//! Chunk metadata and its byte layout inside the reservoir.
//!
//! ```text
//!   ┌──────────────────────────┬──────────────────────────────┐
//!   │       ChunkHeader        │           payload            │
//!   │  size | free | next      │         `size` bytes         │
//!   │      3 machine words     │                              │
//!   └──────────────────────────┴──────────────────────────────┘
//!   ▲                          ▲
//!   offset                     payload address handed to callers
//! ```

use bytemuck::{Pod, Zeroable, bytes_of, pod_read_unaligned};

use crate::reservoir::Reservoir;

/// Bytes taken by one header in front of every payload.
pub const HEADER_SIZE: usize = ::core::mem::size_of::<ChunkHeader>();

/// `next` value of the last chunk in the list.
const NO_NEXT: usize = usize::MAX;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ChunkHeader {
  size: usize,
  free: usize,
  next: usize,
}

/// Decoded view of a chunk header, addressed by the byte offset of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
  pub offset: usize,
  pub size: usize,
  pub free: bool,
  pub next: Option<usize>,
}

impl Chunk {
  pub fn new(
    offset: usize,
    size: usize,
    free: bool,
    next: Option<usize>,
  ) -> Self {
    Self { offset, size, free, next }
  }

  /// Offset of the first payload byte.
  #[inline]
  pub fn payload(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  /// Offset one past the last payload byte, where the next chunk in address order starts.
  #[inline]
  pub fn end(&self) -> usize {
    self.payload() + self.size
  }

  /// Decodes the header stored at `offset`.
  ///
  /// Offsets come from the heap's own list, so a header outside the granted
  /// region is a broken list and panics like an out-of-range slice index.
  pub fn read(
    reservoir: &Reservoir,
    offset: usize,
  ) -> Self {
    let header: ChunkHeader = pod_read_unaligned(&reservoir.granted()[offset..offset + HEADER_SIZE]);

    Self {
      offset,
      size: header.size,
      free: header.free != 0,
      next: (header.next != NO_NEXT).then_some(header.next),
    }
  }

  pub fn write(
    &self,
    reservoir: &mut Reservoir,
  ) {
    let header = ChunkHeader {
      size: self.size,
      free: usize::from(self.free),
      next: self.next.unwrap_or(NO_NEXT),
    };

    reservoir.granted_mut()[self.offset..self.offset + HEADER_SIZE].copy_from_slice(bytes_of(&header));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::WORD;

  #[test]
  fn test_header_is_three_words() {
    assert_eq!(HEADER_SIZE, 3 * WORD);
  }

  #[test]
  fn test_write_then_read() {
    let mut reservoir = Reservoir::new(256);
    reservoir.grow(256).unwrap();

    let last = Chunk::new(64, 40, true, None);
    let first = Chunk::new(0, 40, false, Some(last.offset));
    first.write(&mut reservoir);
    last.write(&mut reservoir);

    assert_eq!(Chunk::read(&reservoir, 0), first);
    assert_eq!(Chunk::read(&reservoir, 64), last);
  }

  #[test]
  fn test_unaligned_offset() {
    let mut reservoir = Reservoir::new(128);
    reservoir.grow(128).unwrap();

    let chunk = Chunk::new(3, 7, true, Some(99));
    chunk.write(&mut reservoir);

    assert_eq!(Chunk::read(&reservoir, 3), chunk);
  }

  #[test]
  fn test_geometry() {
    let chunk = Chunk::new(WORD, 2 * WORD, false, None);

    assert_eq!(chunk.payload(), WORD + HEADER_SIZE);
    assert_eq!(chunk.end(), WORD + HEADER_SIZE + 2 * WORD);
  }

  #[test]
  #[should_panic]
  fn test_read_past_boundary_panics() {
    let mut reservoir = Reservoir::new(128);
    reservoir.grow(HEADER_SIZE).unwrap();

    Chunk::read(&reservoir, WORD);
  }
}
