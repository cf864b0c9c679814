//! On-disk file header frame.

use zerocopy::little_endian::{I64, U16, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::node::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::types::{BlockOff, NO_BLOCK, TREE_ORDER};

/// Byte length of the header frame at the start of every index file.
pub const HEADER_SIZE: usize = std::mem::size_of::<FileHeader>();

/// The header frame occupying the first [`HEADER_SIZE`] bytes of an index
/// file.
///
/// It records the byte sizes of the layout it was written with, the tree
/// order, and the offset of the root node (or [`NO_BLOCK`] while the tree
/// is empty). The sizes are what [`FileHeader::ensure_compatible`] checks
/// on open.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FileHeader {
    header_size: U64,
    block_size: U64,
    tree_order: U16,
    root_offset: I64,
}

const _: () = assert!(std::mem::size_of::<FileHeader>() == 26);

impl FileHeader {
    /// Creates the header of a fresh, empty index.
    pub fn new() -> Self {
        Self {
            header_size: U64::new(HEADER_SIZE as u64),
            block_size: U64::new(BLOCK_SIZE as u64),
            tree_order: U16::new(TREE_ORDER as u16),
            root_offset: I64::new(NO_BLOCK),
        }
    }

    /// Decodes a header from an exact-size frame.
    pub fn decode(frame: &[u8; HEADER_SIZE]) -> Result<Self> {
        Self::read_from_bytes(frame.as_slice())
            .map_err(|_| Error::incompatible("header frame size mismatch"))
    }

    /// Verifies that the stored layout matches the compiled one.
    pub fn ensure_compatible(&self) -> Result<()> {
        if self.tree_order() as usize > TREE_ORDER {
            return Err(Error::incompatible(format!(
                "tree order {} exceeds compiled order {}",
                self.tree_order(),
                TREE_ORDER
            )));
        }
        if self.header_size() != HEADER_SIZE as u64 || self.block_size() != BLOCK_SIZE as u64 {
            return Err(Error::incompatible(format!(
                "stored layout {}/{} does not match compiled layout {}/{}",
                self.header_size(),
                self.block_size(),
                HEADER_SIZE,
                BLOCK_SIZE
            )));
        }
        Ok(())
    }

    pub fn header_size(&self) -> u64 {
        self.header_size.get()
    }

    pub fn block_size(&self) -> u64 {
        self.block_size.get()
    }

    pub fn tree_order(&self) -> u16 {
        self.tree_order.get()
    }

    pub fn root_offset(&self) -> BlockOff {
        self.root_offset.get()
    }

    pub fn set_root_offset(&mut self, off: BlockOff) {
        self.root_offset = I64::new(off);
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}
