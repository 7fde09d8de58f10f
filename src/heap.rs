use std::fmt;

use tracing::{debug, warn};

use crate::{
  align,
  chunk::{Chunk, HEADER_SIZE},
  config::HeapConfig,
  error::{HeapError, Result},
  reservoir::Reservoir,
};

/// Payload address handed out by [`Heap::allocate`], as a byte offset from the reservoir start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
  pub const fn new(offset: usize) -> Self {
    Self(offset)
  }

  #[inline]
  pub const fn offset(self) -> usize {
    self.0
  }
}

impl fmt::Display for Address {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#06x}", self.0)
  }
}

/// One row of [`Heap::dump_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
  pub address: Address,
  /// Usable payload bytes, header excluded.
  pub size: usize,
  pub free: bool,
  pub next: Option<Address>,
}

impl From<Chunk> for ChunkInfo {
  fn from(chunk: Chunk) -> Self {
    Self {
      address: Address(chunk.payload()),
      size: chunk.size,
      free: chunk.free,
      next: chunk.next.map(|offset| Address(offset + HEADER_SIZE)),
    }
  }
}

impl fmt::Display for ChunkInfo {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "Chunk Address: {} | Size: {} | Free: {} | Next: ", self.address, self.size, self.free)?;
    match self.next {
      Some(next) => write!(f, "{next}"),
      None => f.write_str("none"),
    }
  }
}

/// First-fit chunk allocator over a single slab carved from a [`Reservoir`].
///
/// The slab is requested lazily on the first [`allocate`](Heap::allocate)
/// (or eagerly through [`initialize`](Heap::initialize)) and starts out as
/// one free chunk. From then on the chunks tile the slab in address order:
///
/// ```text
///   ┌─────┬────────┬─────┬────────────────┬─────┬──────────────────────┐
///   │ hdr │ used 8 │ hdr │   free 16      │ hdr │     free (tail)      │
///   └─────┴────────┴─────┴────────────────┴─────┴──────────────────────┘
///      │                ▲  │                  ▲
///      └── next ────────┘  └── next ──────────┘
/// ```
///
/// Allocation walks the list and takes the first free chunk that either
/// fits exactly or can be split. A free chunk that does neither absorbs its
/// free successor on the way; the merged chunk is handed out only when the
/// merge lands on the exact size, and is not split within the same call.
/// Releasing only flips the free flag, so neighbours are coalesced lazily
/// by later allocations.
///
/// Not thread-safe: every operation takes `&mut self` and callers sharing a
/// heap must serialize whole operations.
pub struct Heap {
  config: HeapConfig,
  reservoir: Reservoir,
  head: Option<usize>,
}

impl Default for Heap {
  fn default() -> Self {
    Self::new(HeapConfig::default())
  }
}

impl Heap {
  /// Creates an uninitialized heap. The configuration is checked when the
  /// slab is carved, so a config built without [`HeapConfig::validate`]
  /// surfaces as [`HeapError::InvalidConfig`] from the first operation.
  pub fn new(config: HeapConfig) -> Self {
    Self {
      config,
      reservoir: Reservoir::new(config.capacity),
      head: None,
    }
  }

  /// Heap over a [`DEFAULT_CAPACITY`](crate::DEFAULT_CAPACITY) reservoir, carved as one slab.
  pub fn with_default() -> Self {
    Self::default()
  }

  pub fn config(&self) -> &HeapConfig {
    &self.config
  }

  pub fn reservoir(&self) -> &Reservoir {
    &self.reservoir
  }

  pub fn is_initialized(&self) -> bool {
    self.head.is_some()
  }

  /// Carves the slab out of the reservoir if that has not happened yet.
  ///
  /// A failure leaves the heap uninitialized, and every later attempt
  /// requests the same slab again.
  pub fn initialize(&mut self) -> Result<()> {
    self.ensure_head().map(|_| ())
  }

  fn ensure_head(&mut self) -> Result<usize> {
    if let Some(head) = self.head {
      return Ok(head);
    }

    self.config.validate()?;
    let start = self.reservoir.grow(self.config.slab_size)?;
    let chunk = Chunk::new(start, self.config.slab_size - HEADER_SIZE, true, None);
    chunk.write(&mut self.reservoir);

    debug!(
      head = %Address(chunk.payload()),
      size = chunk.size,
      header_size = HEADER_SIZE,
      "heap initialized"
    );

    self.head = Some(start);
    Ok(start)
  }

  /// Hands out a chunk of at least `requested` bytes, rounded up to the machine word.
  pub fn allocate(
    &mut self,
    requested: usize,
  ) -> Result<Address> {
    let head = self.ensure_head()?;

    if requested > self.reservoir.capacity() {
      warn!(requested, "allocation larger than the reservoir");
      return Err(HeapError::OutOfMemory { requested });
    }

    let size = align!(requested);
    let mut cursor = Some(head);

    while let Some(offset) = cursor {
      let mut chunk = Chunk::read(&self.reservoir, offset);

      if chunk.free {
        if chunk.size == size {
          chunk.free = false;
          chunk.write(&mut self.reservoir);

          let address = Address(chunk.payload());
          debug!(%address, size, "exact fit");
          return Ok(address);
        }

        if chunk.size >= size + HEADER_SIZE {
          self.split(&mut chunk, size);

          let address = Address(chunk.payload());
          debug!(%address, size, "split");
          return Ok(address);
        }

        if self.merge_with_next(&mut chunk) {
          if chunk.size == size {
            chunk.free = false;
            chunk.write(&mut self.reservoir);

            let address = Address(chunk.payload());
            debug!(%address, size, "merged");
            return Ok(address);
          }

          debug!(address = %Address(chunk.payload()), merged = chunk.size, size, "merged chunk left free");
        }
      }

      cursor = chunk.next;
    }

    warn!(requested, size, "out of memory");
    Err(HeapError::OutOfMemory { requested })
  }

  /// Shrinks `chunk` to `size` bytes, marks it allocated and links a free
  /// chunk holding the leftover bytes right after it.
  fn split(
    &mut self,
    chunk: &mut Chunk,
    size: usize,
  ) {
    let leftover = chunk.size - size - HEADER_SIZE;
    chunk.size = size;
    chunk.free = false;

    let remainder = Chunk::new(chunk.end(), leftover, true, chunk.next);
    remainder.write(&mut self.reservoir);

    chunk.next = Some(remainder.offset);
    chunk.write(&mut self.reservoir);
  }

  /// Absorbs the successor of `chunk` if it exists and is free, header included.
  fn merge_with_next(
    &mut self,
    chunk: &mut Chunk,
  ) -> bool {
    let Some(next) = chunk.next.map(|offset| Chunk::read(&self.reservoir, offset)) else {
      return false;
    };
    if !next.free {
      return false;
    }

    chunk.size += HEADER_SIZE + next.size;
    chunk.next = next.next;
    chunk.write(&mut self.reservoir);
    true
  }

  /// Marks the chunk whose payload starts at `address` as free.
  ///
  /// Only exact payload addresses match. Releasing a chunk that is already
  /// free succeeds and changes nothing.
  pub fn release(
    &mut self,
    address: Address,
  ) -> Result<()> {
    let Some(mut chunk) = self.walk().find(|chunk| chunk.payload() == address.0) else {
      warn!(%address, "release of unknown pointer");
      return Err(HeapError::UnknownPointer(address));
    };

    if chunk.free {
      debug!(%address, "chunk already free");
    }

    chunk.free = true;
    chunk.write(&mut self.reservoir);

    debug!(%address, size = chunk.size, "released");
    Ok(())
  }

  /// Payload bytes of the allocated chunk at `address`.
  pub fn payload(
    &self,
    address: Address,
  ) -> Option<&[u8]> {
    let chunk = self.allocated(address)?;
    self.reservoir.bytes(chunk.payload(), chunk.size)
  }

  pub fn payload_mut(
    &mut self,
    address: Address,
  ) -> Option<&mut [u8]> {
    let chunk = self.allocated(address)?;
    self.reservoir.bytes_mut(chunk.payload(), chunk.size)
  }

  fn allocated(
    &self,
    address: Address,
  ) -> Option<Chunk> {
    self.walk().find(|chunk| !chunk.free && chunk.payload() == address.0)
  }

  /// Chunks in list order. Empty until the heap is initialized.
  pub fn chunks(&self) -> impl Iterator<Item = ChunkInfo> + '_ {
    self.walk().map(ChunkInfo::from)
  }

  pub fn dump_state(&self) -> Vec<ChunkInfo> {
    self.chunks().collect()
  }

  fn walk(&self) -> Walk<'_> {
    Walk {
      reservoir: &self.reservoir,
      cursor: self.head,
    }
  }
}

struct Walk<'a> {
  reservoir: &'a Reservoir,
  cursor: Option<usize>,
}

impl Iterator for Walk<'_> {
  type Item = Chunk;

  fn next(&mut self) -> Option<Chunk> {
    let chunk = Chunk::read(self.reservoir, self.cursor?);
    self.cursor = chunk.next;
    Some(chunk)
  }
}
