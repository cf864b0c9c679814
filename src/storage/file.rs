//! Seek-based frame I/O over a single index file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, IoOp, Result};

/// A single index file accessed as fixed-size frames at byte offsets.
///
/// Every operation seeks explicitly and nothing is buffered in userspace,
/// so a completed write is visible to the next read on the same handle.
/// Offsets returned by [`IndexFile::append`] are stable for the lifetime
/// of the file: blocks are never relocated or freed.
#[derive(Debug)]
pub struct IndexFile {
    file: File,
}

impl IndexFile {
    /// Opens an existing file read-only.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| Error::io(IoOp::Open, e))?;
        Ok(Self { file })
    }

    /// Opens an existing file for reading and writing.
    pub fn open_rw<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::io(IoOp::Open, e))?;
        Ok(Self { file })
    }

    /// Creates a new file, truncating any previous content.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io(IoOp::Create, e))?;
        Ok(Self { file })
    }

    /// Reads exactly `buf.len()` bytes starting at `off`. A short read is
    /// an error; callers always request whole frames.
    pub fn read_at(&mut self, off: u64, buf: &mut [u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(off))
            .map_err(|e| Error::io(IoOp::Seek, e))?;
        self.file
            .read_exact(buf)
            .map_err(|e| Error::io(IoOp::Read, e))
    }

    /// Writes the whole of `buf` starting at `off`.
    pub fn write_at(&mut self, off: u64, buf: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(off))
            .map_err(|e| Error::io(IoOp::Seek, e))?;
        self.file
            .write_all(buf)
            .map_err(|e| Error::io(IoOp::Write, e))
    }

    /// Appends `buf` at the end of the file and returns the offset it was
    /// written at (the pre-append file length).
    pub fn append(&mut self, buf: &[u8]) -> Result<u64> {
        let off = self
            .file
            .seek(SeekFrom::End(0))
            .map_err(|e| Error::io(IoOp::Seek, e))?;
        self.file
            .write_all(buf)
            .map_err(|e| Error::io(IoOp::Write, e))?;
        Ok(off)
    }

    /// Current byte length of the file.
    pub fn len(&mut self) -> Result<u64> {
        self.file
            .seek(SeekFrom::End(0))
            .map_err(|e| Error::io(IoOp::Seek, e))
    }

    /// Flushes stream state. Writes are unbuffered; this marks the point
    /// after which dependent reads must observe them.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| Error::io(IoOp::Write, e))
    }

    /// Flushes and closes the handle, surfacing close-time errors instead
    /// of swallowing them in a drop.
    pub fn close(self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| Error::io(IoOp::Close, e))
    }
}
