//! # B+ Tree Layer
//!
//! The tree engine and its two collaborators:
//!
//! - [`NodeBuffer`]: the one node the engine holds in memory. The engine
//!   loads a block, mutates it in place, and stores it back before
//!   touching another block; no in-memory node graph ever exists.
//! - [`BPlusTree`]: create/open an index, insert and look up keys, and
//!   run the overflow cascade when a node fills up.
//! - [`Walker`]: read-only enumeration of every node block in file order,
//!   independent of the engine.

mod buffer;
mod engine;
mod walker;

pub use buffer::NodeBuffer;
pub use engine::BPlusTree;
pub use walker::Walker;
