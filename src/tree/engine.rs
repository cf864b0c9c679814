//! # B+ Tree Engine
//!
//! Create/open an index file, insert keys, and run the overflow cascade.
//!
//! ## Storage model
//!
//! Nodes are addressed by their byte offset in the index file; "following
//! a pointer" means seeking and reading. Nodes are born by append at the
//! file end, never relocated and never freed. The root always lives in
//! the first node slot (at `header_size`): when it splits, both halves
//! are appended as fresh siblings and the root slot is rewritten in place
//! to hold the single promoted separator.
//!
//! ## Insert Algorithm
//!
//! ```text
//! 1. Empty tree: point the header at a fresh appended root and stop.
//! 2. Descend from the root: at each node find the first slot whose key
//!    is >= v. An exact match is a duplicate and a successful no-op.
//! 3. The child at that slot is NO_BLOCK: this is a leaf. Insert v into
//!    the slot, write the node back, and if it now holds TREE_ORDER keys
//!    run the overflow cascade.
//! 4. Otherwise reload the buffer from that child and repeat.
//! ```
//!
//! ## Overflow cascade
//!
//! A full node is cut into a left sibling with `TREE_ORDER/2 - q` keys
//! and a right sibling with `TREE_ORDER/2 + q - 1` keys, where `q` is one
//! fair coin toss drawn when the cascade starts; the median key between
//! the halves is promoted into the parent. A non-root node keeps its own
//! offset as the left sibling and appends the right one; the root appends
//! both and rewrites its slot as the new 1-key root. Children moved to an
//! appended sibling get their parent pointer rewritten. If the promotion
//! fills the parent, the cascade repeats there.
//!
//! The cascade performs several dependent writes with no journal, so it
//! is not crash-safe; the binaries ignore SIGINT for this reason.
//!
//! ## Thread Safety
//!
//! `BPlusTree` is single-threaded and synchronous; every call blocks to
//! completion.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zerocopy::IntoBytes;

use crate::error::{Error, Result};
use crate::storage::{FileHeader, IndexFile, HEADER_SIZE};
use crate::tree::buffer::NodeBuffer;
use crate::types::{BlockOff, Key, NO_BLOCK, TREE_ORDER};

/// A disk-resident B+ tree over [`Key`] values in a single index file.
pub struct BPlusTree {
    file: IndexFile,
    header: FileHeader,
    buffer: NodeBuffer,
    rng: StdRng,
}

impl BPlusTree {
    /// Creates a new, empty index at `path`, truncating any existing
    /// file. The resulting file is exactly one header long.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().as_os_str().is_empty() {
            return Err(Error::invalid_argument("index file name"));
        }
        let mut file = IndexFile::create(&path)?;
        let header = FileHeader::new();
        file.write_at(0, header.as_bytes())?;
        file.flush()?;
        debug!("created index file {}", path.as_ref().display());
        Ok(Self {
            file,
            header,
            buffer: NodeBuffer::new(),
            rng: clock_seeded_rng(),
        })
    }

    /// Opens an existing index at `path` and verifies that its stored
    /// tree order and block layout match this build.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().as_os_str().is_empty() {
            return Err(Error::invalid_argument("index file name"));
        }
        let mut file = IndexFile::open_rw(&path)?;
        let mut frame = [0u8; HEADER_SIZE];
        file.read_at(0, &mut frame)?;
        let header = FileHeader::decode(&frame)?;
        header.ensure_compatible()?;
        debug!(
            "opened index file {} (root at {})",
            path.as_ref().display(),
            header.root_offset()
        );
        Ok(Self {
            file,
            header,
            buffer: NodeBuffer::new(),
            rng: clock_seeded_rng(),
        })
    }

    /// Offset of the root node, or [`NO_BLOCK`] for an empty tree.
    pub fn root_offset(&self) -> BlockOff {
        self.header.root_offset()
    }

    /// Inserts `key` into the tree. Inserting a key that is already
    /// stored succeeds without touching the file.
    pub fn insert(&mut self, key: Key) -> Result<()> {
        if self.header.root_offset() == NO_BLOCK {
            return self.insert_into_empty(key);
        }

        let mut off = self.header.root_offset();
        loop {
            self.buffer.load(&mut self.file, off as u64)?;
            let node = self.buffer.node();
            let slot = node.find_slot(key);
            if node.slot_matches(slot, key) {
                trace!("key {} already present in block {}", key, off);
                return Ok(());
            }
            let child = node.child(slot);
            if child == NO_BLOCK {
                return self.insert_into_leaf(off, slot, key);
            }
            trace!("descend from block {} slot {} to block {}", off, slot, child);
            off = child;
        }
    }

    /// Reports whether `key` is stored in the tree.
    pub fn lookup(&mut self, key: Key) -> Result<bool> {
        if self.header.root_offset() == NO_BLOCK {
            return Err(Error::tree_empty());
        }

        let mut off = self.header.root_offset();
        loop {
            self.buffer.load(&mut self.file, off as u64)?;
            let node = self.buffer.node();
            let slot = node.find_slot(key);
            if node.slot_matches(slot, key) {
                return Ok(true);
            }
            let child = node.child(slot);
            if child == NO_BLOCK {
                return Ok(false);
            }
            off = child;
        }
    }

    /// Flushes and closes the underlying file.
    pub fn close(self) -> Result<()> {
        self.file.close()
    }

    fn insert_into_empty(&mut self, key: Key) -> Result<()> {
        self.header.set_root_offset(HEADER_SIZE as BlockOff);
        self.file.write_at(0, self.header.as_bytes())?;
        self.file.flush()?;

        self.buffer
            .node_mut()
            .compose(&[key], &[NO_BLOCK, NO_BLOCK], NO_BLOCK);
        self.buffer.append(&mut self.file)?;
        self.file.flush()?;
        debug!("rooted empty tree with key {}", key);
        Ok(())
    }

    /// The buffer holds the leaf at `off`; puts `key` into `slot` and
    /// splits if the leaf is now full.
    fn insert_into_leaf(&mut self, off: BlockOff, slot: usize, key: Key) -> Result<()> {
        let node = self.buffer.node_mut();
        node.insert_at(slot, key, NO_BLOCK);
        let overflow = node.keys_used() == TREE_ORDER;

        self.buffer.store(&mut self.file, off as u64)?;
        self.file.flush()?;

        if overflow {
            self.split(off)?;
        }
        Ok(())
    }

    /// Runs the overflow cascade starting at the node in the buffer,
    /// which lives at `off` and holds exactly [`TREE_ORDER`] keys.
    fn split(&mut self, mut off: BlockOff) -> Result<()> {
        // One coin toss fixes the key distribution for the whole cascade.
        let q = usize::from(self.rng.gen_bool(0.5));
        let left_keys = TREE_ORDER / 2 - q;
        let right_keys = TREE_ORDER / 2 + q - 1;
        debug_assert_eq!(left_keys + right_keys, TREE_ORDER - 1);

        loop {
            let mut keys: [Key; TREE_ORDER] = [0; TREE_ORDER];
            let mut children = [NO_BLOCK; TREE_ORDER + 1];
            {
                let node = self.buffer.node();
                for slot in 0..TREE_ORDER {
                    keys[slot] = node.key(slot);
                }
                for slot in 0..=TREE_ORDER {
                    children[slot] = node.child(slot);
                }
            }
            let separator = keys[left_keys];

            if self.buffer.node().is_root() {
                self.split_root(&keys, &children, left_keys)?;
                return Ok(());
            }

            let parent_off = self.buffer.node().parent();

            // The full node keeps its offset and becomes the left sibling.
            self.buffer.node_mut().truncate(left_keys);
            self.buffer.store(&mut self.file, off as u64)?;
            self.file.flush()?;

            let right_off = self.append_right_sibling(&keys, &children, left_keys, parent_off)?;
            self.reparent(&children[left_keys + 1..], right_off)?;

            self.buffer.load(&mut self.file, parent_off as u64)?;
            let parent = self.buffer.node_mut();
            let slot = parent.find_slot(separator);
            parent.insert_at(slot, separator, right_off);
            let overflow = parent.keys_used() == TREE_ORDER;
            self.buffer.store(&mut self.file, parent_off as u64)?;
            self.file.flush()?;
            debug!(
                "split block {}: right sibling {}, separator {} promoted to {}",
                off, right_off, separator, parent_off
            );

            if !overflow {
                return Ok(());
            }
            // The buffer already holds the full parent; go around again.
            off = parent_off;
        }
    }

    /// Breaks the root: appends both halves as fresh siblings and
    /// rewrites the root slot in place as a 1-key node over them.
    fn split_root(
        &mut self,
        keys: &[Key; TREE_ORDER],
        children: &[BlockOff; TREE_ORDER + 1],
        left_keys: usize,
    ) -> Result<()> {
        let root_off = self.header.root_offset();
        let separator = keys[left_keys];

        self.buffer
            .node_mut()
            .compose(&keys[..left_keys], &children[..=left_keys], root_off);
        let left_off = self.buffer.append(&mut self.file)? as BlockOff;
        self.file.flush()?;
        self.reparent(&children[..=left_keys], left_off)?;

        let right_off = self.append_right_sibling(keys, children, left_keys, root_off)?;
        self.reparent(&children[left_keys + 1..], right_off)?;

        self.buffer
            .node_mut()
            .compose(&[separator], &[left_off, right_off], NO_BLOCK);
        self.buffer.store(&mut self.file, root_off as u64)?;
        self.file.flush()?;
        debug!(
            "root split: left {}, right {}, separator {}",
            left_off, right_off, separator
        );
        Ok(())
    }

    /// Composes the right sibling from the upper portion of the scratch
    /// copy and appends it.
    fn append_right_sibling(
        &mut self,
        keys: &[Key; TREE_ORDER],
        children: &[BlockOff; TREE_ORDER + 1],
        left_keys: usize,
        parent: BlockOff,
    ) -> Result<BlockOff> {
        self.buffer
            .node_mut()
            .compose(&keys[left_keys + 1..], &children[left_keys + 1..], parent);
        let off = self.buffer.append(&mut self.file)? as BlockOff;
        self.file.flush()?;
        Ok(off)
    }

    /// Rewrites the parent pointer of every real child in `children`.
    /// Clobbers the buffer.
    fn reparent(&mut self, children: &[BlockOff], parent: BlockOff) -> Result<()> {
        for &child in children {
            if child == NO_BLOCK {
                continue;
            }
            self.buffer.load(&mut self.file, child as u64)?;
            self.buffer.node_mut().set_parent(parent);
            self.buffer.store(&mut self.file, child as u64)?;
        }
        self.file.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for BPlusTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BPlusTree")
            .field("root_offset", &self.header.root_offset())
            .finish_non_exhaustive()
    }
}

fn clock_seeded_rng() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    StdRng::seed_from_u64(seed)
}
