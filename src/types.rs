//! Scalar types and compile-time parameters of the index.

/// Key type stored in the tree.
pub type Key = u16;

/// Upper bound of the key input range accepted by the front-end.
pub const KEY_MAX: Key = Key::MAX;

/// Byte offset of a block within the index file.
pub type BlockOff = i64;

/// Sentinel offset: no child below this slot, or no parent above the root.
pub const NO_BLOCK: BlockOff = -1;

/// Maximum number of keys a node holds; reaching it triggers a split.
pub const TREE_ORDER: usize = 4;
