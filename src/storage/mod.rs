//! # Storage Layer
//!
//! Single-file block storage for the index. An index file is a fixed-size
//! header frame followed by uniformly sized node frames:
//!
//! ```text
//! +---------------------+
//! | FileHeader (26B)    |  sizes, tree order, root offset
//! +---------------------+
//! | NodeBlock 0 (59B)   |  the root slot, rewritten in place on root splits
//! +---------------------+
//! | NodeBlock 1+ (59B)  |  appended nodes, never relocated or freed
//! +---------------------+
//! ```
//!
//! All multi-byte fields are little-endian via `zerocopy` wrapper types, so
//! a frame is read and written as one exact-size byte copy with no manual
//! packing. The stored `header_size`/`block_size` double as the
//! compatibility check on open: a file whose layout differs from the
//! compiled one is rejected rather than reinterpreted.
//!
//! ## Module Organization
//!
//! - `header`: the [`FileHeader`] frame and its compatibility check
//! - `node`: the [`NodeBlock`] frame and its slot algebra
//! - `file`: [`IndexFile`], seek-based frame I/O with append

mod file;
mod header;
mod node;

pub use file::IndexFile;
pub use header::{FileHeader, HEADER_SIZE};
pub use node::{NodeBlock, BLOCK_SIZE};
