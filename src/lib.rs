//! # bpidx - Disk-Resident B+ Tree Index
//!
//! A B+ tree index over unsigned 16-bit keys, persisted to a single
//! binary file: one fixed-size header frame followed by uniformly sized
//! node frames. Nodes are addressed by byte offset, born by append, and
//! never relocated or freed; the root occupies the first node slot and is
//! rewritten in place when it splits.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bpidx::BPlusTree;
//!
//! let mut tree = BPlusTree::create("numbers.idx")?;
//! tree.insert(42)?;
//! tree.insert(7)?;
//! assert!(tree.lookup(42)?);
//! tree.close()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------+
//! |  Front-end (menu, prompts)          |  src/cli
//! +-------------------------------------+
//! |  Tree engine (insert, split) Walker |  src/tree
//! +-------------------------------------+
//! |  Frame codecs + paged file          |  src/storage
//! +-------------------------------------+
//! ```
//!
//! The engine holds exactly one node in memory (the [`NodeBuffer`]) and
//! walks the file by offset; there is no page cache and no in-memory
//! node graph. Splits distribute keys between the two siblings with a
//! coin toss seeded from the clock at engine construction.
//!
//! ## Binaries
//!
//! - `tree-build`: interactive menu for building an index file
//! - `tree-print <index-file>`: dumps every node block in file order
//!
//! ## Module Overview
//!
//! - [`storage`]: on-disk frames and seek-based file I/O
//! - [`tree`]: the engine, the single node buffer, and the walker
//! - [`cli`]: menu dispatcher and input prompts
//! - [`error`]: typed error kinds for every fallible operation

pub mod cli;
pub mod error;
pub mod storage;
pub mod tree;
pub mod types;

pub use error::{Error, ErrorKind, IoOp, Result};
pub use tree::{BPlusTree, NodeBuffer, Walker};
pub use types::{BlockOff, Key, KEY_MAX, NO_BLOCK, TREE_ORDER};
