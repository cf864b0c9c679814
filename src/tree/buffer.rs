//! The single in-memory node.

use zerocopy::IntoBytes;

use crate::error::Result;
use crate::storage::{IndexFile, NodeBlock, BLOCK_SIZE};

/// Owns the one [`NodeBlock`] the engine works on.
///
/// The buffer is reused across descent steps and split rounds; whatever it
/// held before a [`NodeBuffer::load`] is gone.
#[derive(Debug)]
pub struct NodeBuffer {
    node: NodeBlock,
}

impl NodeBuffer {
    pub fn new() -> Self {
        Self {
            node: NodeBlock::empty(),
        }
    }

    pub fn node(&self) -> &NodeBlock {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut NodeBlock {
        &mut self.node
    }

    /// Loads the block at `off` into the buffer.
    pub fn load(&mut self, file: &mut IndexFile, off: u64) -> Result<()> {
        let mut frame = [0u8; BLOCK_SIZE];
        file.read_at(off, &mut frame)?;
        self.node = NodeBlock::decode(&frame)?;
        Ok(())
    }

    /// Writes the buffered block back at `off`.
    pub fn store(&self, file: &mut IndexFile, off: u64) -> Result<()> {
        file.write_at(off, self.node.as_bytes())
    }

    /// Appends the buffered block and returns its assigned offset.
    pub fn append(&self, file: &mut IndexFile) -> Result<u64> {
        file.append(self.node.as_bytes())
    }
}

impl Default for NodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}
