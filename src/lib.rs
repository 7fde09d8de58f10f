//! # rmalloc - A Chunked Free-List Allocator
//!
//! This crate provides a small `malloc`/`free` style allocator layered on a
//! fixed-capacity **bump reservoir**, the way early Unix allocators sat on
//! top of `sbrk`.
//!
//! ## Overview
//!
//! ```text
//!   Reservoir (4096 bytes by default):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         ONE SLAB                                     │
//!   │                                                                      │
//!   │   ┌─────┬────┬─────┬────┬─────┬──────┬─────┬──────────────────────┐  │
//!   │   │ hdr │ A1 │ hdr │ A2 │ hdr │ free │ hdr │     free (tail)      │  │
//!   │   └─────┴────┴─────┴────┴─────┴──────┴─────┴──────────────────────┘  │
//!   │                                                                 ▲    │
//!   │                                                                 │    │
//!   │                                                            Boundary  │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On first use the heap grows the reservoir by one slab and formats it as a
//! single free chunk. Every allocation walks the chunk list in address order:
//!
//! 1. a free chunk of exactly the aligned size is taken as is;
//! 2. a free chunk with room for the request plus another header is split;
//! 3. otherwise a free chunk swallows its free successor, and is taken only
//!    if the merge produced exactly the aligned size.
//!
//! Releasing a chunk flips its free flag and nothing else.
//!
//! ## Crate Structure
//!
//! ```text
//!   rmalloc
//!   ├── align      - Word alignment (align!, WORD)
//!   ├── chunk      - Chunk header layout (internal)
//!   ├── config     - HeapConfig and its builder
//!   ├── error      - HeapError, ReservoirError
//!   ├── heap       - Heap, Address, ChunkInfo
//!   └── reservoir  - Reservoir, the bump region
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rmalloc::{Heap, HeapError};
//!
//! fn main() -> Result<(), HeapError> {
//!     let mut heap = Heap::default();
//!
//!     let address = heap.allocate(4)?;
//!     heap.payload_mut(address).unwrap()[..4].copy_from_slice(&42u32.to_ne_bytes());
//!
//!     for chunk in heap.dump_state() {
//!         println!("{chunk}");
//!     }
//!
//!     heap.release(address)
//! }
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: operations take `&mut self`, there is no internal locking
//! - **One slab**: once the slab is used up, allocations fail for good
//! - **Lazy coalescing**: free neighbours merge only while an allocation searches
//! - **Address identity**: `release` trusts any address that matches a chunk payload,
//!   so releasing a chunk twice is silently accepted

pub mod align;
mod chunk;
pub mod config;
pub mod error;
mod heap;
pub mod reservoir;

pub use chunk::HEADER_SIZE;
pub use config::{DEFAULT_CAPACITY, HeapConfig, HeapConfigBuilder};
pub use error::{HeapError, ReservoirError, Result};
pub use heap::{Address, ChunkInfo, Heap};
pub use reservoir::Reservoir;
