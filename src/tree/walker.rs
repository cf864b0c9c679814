//! Read-only enumeration of node blocks in file order.

use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::storage::{FileHeader, IndexFile, NodeBlock, BLOCK_SIZE, HEADER_SIZE};
use crate::types::BlockOff;

/// Walks every node block of an index file from `header_size` to the end
/// of the file, in file-position order.
///
/// The walker never consults the tree structure; appended siblings appear
/// in append order and the in-place rewritten root appears first, in the
/// slot right after the header.
#[derive(Debug)]
pub struct Walker {
    file: IndexFile,
    header: FileHeader,
    next_off: u64,
    len: u64,
}

impl Walker {
    /// Opens `path` read-only, verifies the stored layout, and positions
    /// at the first node block.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = IndexFile::open_read(&path)?;
        let mut frame = [0u8; HEADER_SIZE];
        file.read_at(0, &mut frame)?;
        let header = FileHeader::decode(&frame)?;
        header.ensure_compatible()?;
        let len = file.len()?;
        debug!(
            "walking index file {} ({} bytes)",
            path.as_ref().display(),
            len
        );
        Ok(Self {
            file,
            header,
            next_off: HEADER_SIZE as u64,
            len,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the next node block and its offset, or `None` at end of
    /// file. A partial trailing frame ends the walk.
    pub fn next_node(&mut self) -> Result<Option<(BlockOff, NodeBlock)>> {
        if self.next_off + BLOCK_SIZE as u64 > self.len {
            return Ok(None);
        }
        let mut frame = [0u8; BLOCK_SIZE];
        self.file.read_at(self.next_off, &mut frame)?;
        let node = NodeBlock::decode(&frame)?;
        let off = self.next_off as BlockOff;
        self.next_off += BLOCK_SIZE as u64;
        Ok(Some((off, node)))
    }
}
