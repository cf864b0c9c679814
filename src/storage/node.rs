//! On-disk node block frame and its slot algebra.
//!
//! A node frame holds up to [`TREE_ORDER`] sorted keys and
//! `TREE_ORDER + 1` child offsets, plus a back-pointer to its parent.
//! Key slot `i` separates the subtree at `child[i]` (keys `<= key[i]`)
//! from the subtree at `child[i + 1]` (keys `> key[i]`). Child slots past
//! `keys_used` and the parent slot of the root hold [`NO_BLOCK`].
//!
//! The `is_leaf` flag is persisted but never raised by the insertion
//! path; it is a forward-compatibility slot for leaf-chained scans and
//! must not be interpreted by readers.

use zerocopy::little_endian::{I64, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{Error, Result};
use crate::types::{BlockOff, Key, NO_BLOCK, TREE_ORDER};

/// Byte length of one node frame.
pub const BLOCK_SIZE: usize = std::mem::size_of::<NodeBlock>();

/// One node of the tree as laid out on disk.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeBlock {
    is_leaf: u8,
    keys_used: U16,
    keys: [U16; TREE_ORDER],
    children: [I64; TREE_ORDER + 1],
    parent: I64,
}

const _: () = assert!(std::mem::size_of::<NodeBlock>() == 59);

impl NodeBlock {
    /// A node with no keys, no children, and no parent.
    pub fn empty() -> Self {
        Self {
            is_leaf: 0,
            keys_used: U16::new(0),
            keys: [U16::new(0); TREE_ORDER],
            children: [I64::new(NO_BLOCK); TREE_ORDER + 1],
            parent: I64::new(NO_BLOCK),
        }
    }

    /// Decodes a node from an exact-size frame.
    pub fn decode(frame: &[u8; BLOCK_SIZE]) -> Result<Self> {
        Self::read_from_bytes(frame.as_slice())
            .map_err(|_| Error::incompatible("node frame size mismatch"))
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf != 0
    }

    pub fn keys_used(&self) -> usize {
        self.keys_used.get() as usize
    }

    pub fn key(&self, slot: usize) -> Key {
        self.keys[slot].get()
    }

    pub fn child(&self, slot: usize) -> BlockOff {
        self.children[slot].get()
    }

    pub fn parent(&self) -> BlockOff {
        self.parent.get()
    }

    pub fn set_parent(&mut self, off: BlockOff) {
        self.parent = I64::new(off);
    }

    /// True iff this node is the root.
    pub fn is_root(&self) -> bool {
        self.parent() == NO_BLOCK
    }

    /// First slot whose key is `>= key`, or `keys_used` when every stored
    /// key is smaller. This is both the descent slot and the insertion
    /// position.
    pub fn find_slot(&self, key: Key) -> usize {
        (0..self.keys_used())
            .find(|&slot| key <= self.key(slot))
            .unwrap_or_else(|| self.keys_used())
    }

    /// True when `slot` is in use and holds exactly `key`.
    pub fn slot_matches(&self, slot: usize, key: Key) -> bool {
        slot < self.keys_used() && self.key(slot) == key
    }

    /// Inserts `key` at `slot`, right-shifting the keys and the child
    /// slots above it; the child slot to the right of the new key
    /// receives `right_child`.
    ///
    /// May raise `keys_used` to [`TREE_ORDER`]; the caller is responsible
    /// for running the overflow protocol before the next insertion.
    pub fn insert_at(&mut self, slot: usize, key: Key, right_child: BlockOff) {
        let used = self.keys_used();
        self.keys.copy_within(slot..used, slot + 1);
        self.children.copy_within(slot + 1..used + 1, slot + 2);
        self.keys[slot] = U16::new(key);
        self.children[slot + 1] = I64::new(right_child);
        self.keys_used = U16::new(used as u16 + 1);
    }

    /// Rebuilds the node from `keys` and `children` (one more child than
    /// keys), clearing every other slot. The leaf flag is lowered.
    pub fn compose(&mut self, keys: &[Key], children: &[BlockOff], parent: BlockOff) {
        debug_assert_eq!(children.len(), keys.len() + 1);
        *self = Self::empty();
        for (slot, &key) in keys.iter().enumerate() {
            self.keys[slot] = U16::new(key);
        }
        for (slot, &child) in children.iter().enumerate() {
            self.children[slot] = I64::new(child);
        }
        self.keys_used = U16::new(keys.len() as u16);
        self.parent = I64::new(parent);
    }

    /// Shrinks the node to its first `keys_used` keys, resetting the
    /// vacated key slots to zero and the vacated child slots to
    /// [`NO_BLOCK`].
    pub fn truncate(&mut self, keys_used: usize) {
        for slot in keys_used..TREE_ORDER {
            self.keys[slot] = U16::new(0);
        }
        for slot in keys_used + 1..=TREE_ORDER {
            self.children[slot] = I64::new(NO_BLOCK);
        }
        self.keys_used = U16::new(keys_used as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_block_size_is_59() {
        assert_eq!(std::mem::size_of::<NodeBlock>(), 59);
    }

    #[test]
    fn empty_node_has_no_children() {
        let node = NodeBlock::empty();
        assert_eq!(node.keys_used(), 0);
        assert!(node.is_root());
        assert!(!node.is_leaf());
        for slot in 0..=TREE_ORDER {
            assert_eq!(node.child(slot), NO_BLOCK);
        }
    }

    #[test]
    fn find_slot_orders_keys() {
        let mut node = NodeBlock::empty();
        node.compose(&[10, 20, 40], &[NO_BLOCK; 4], NO_BLOCK);

        assert_eq!(node.find_slot(5), 0);
        assert_eq!(node.find_slot(10), 0);
        assert_eq!(node.find_slot(15), 1);
        assert_eq!(node.find_slot(40), 2);
        assert_eq!(node.find_slot(41), 3);
    }

    #[test]
    fn slot_matches_only_used_slots() {
        let mut node = NodeBlock::empty();
        node.compose(&[7], &[NO_BLOCK; 2], NO_BLOCK);

        assert!(node.slot_matches(0, 7));
        assert!(!node.slot_matches(0, 8));
        // Slot 1 is past keys_used even though the array has room.
        assert!(!node.slot_matches(1, 0));
    }

    #[test]
    fn insert_at_shifts_keys_and_children() {
        let mut node = NodeBlock::empty();
        node.compose(&[10, 30], &[100, 200, 300], NO_BLOCK);

        node.insert_at(1, 20, 250);

        assert_eq!(node.keys_used(), 3);
        assert_eq!(node.key(0), 10);
        assert_eq!(node.key(1), 20);
        assert_eq!(node.key(2), 30);
        assert_eq!(node.child(0), 100);
        assert_eq!(node.child(1), 200);
        assert_eq!(node.child(2), 250);
        assert_eq!(node.child(3), 300);
    }

    #[test]
    fn insert_at_tail_keeps_existing_children() {
        let mut node = NodeBlock::empty();
        node.compose(&[10], &[100, 200], NO_BLOCK);

        node.insert_at(1, 20, 300);

        assert_eq!(node.child(0), 100);
        assert_eq!(node.child(1), 200);
        assert_eq!(node.child(2), 300);
    }

    #[test]
    fn truncate_resets_vacated_slots() {
        let mut node = NodeBlock::empty();
        node.compose(&[10, 20, 30, 40], &[100, 200, 300, 400, 500], 77);

        node.truncate(2);

        assert_eq!(node.keys_used(), 2);
        assert_eq!(node.key(0), 10);
        assert_eq!(node.key(1), 20);
        assert_eq!(node.child(2), 300);
        assert_eq!(node.child(3), NO_BLOCK);
        assert_eq!(node.child(4), NO_BLOCK);
        assert_eq!(node.parent(), 77);
    }

    #[test]
    fn decode_roundtrip() {
        let mut node = NodeBlock::empty();
        node.compose(&[1, 2], &[NO_BLOCK, NO_BLOCK, NO_BLOCK], 26);

        let mut frame = [0u8; BLOCK_SIZE];
        frame.copy_from_slice(node.as_bytes());
        let parsed = NodeBlock::decode(&frame).unwrap();

        assert_eq!(parsed.keys_used(), 2);
        assert_eq!(parsed.key(1), 2);
        assert_eq!(parsed.parent(), 26);
    }
}
