//! File backed stream.
//!
//! This module provides [`crate::stream::FileStream`], the persistent implementation of the
//! [`crate::stream::Stream`] contract. It owns an open OS file handle for its whole lifetime and
//! releases it on drop, after syncing any written data to disk.
//!
//! # Modes
//!
//! - **Read-only** - the file must exist; writes and truncation fail with
//!   [`crate::Error::InvalidOperation`].
//! - **Read-write** - the file is created if missing and opened without truncation, so existing
//!   content can be read back or extended.
//!
//! # Size and Position
//!
//! The stream caches its logical position and size. The size is taken from the file metadata
//! when the stream is opened and updated on every write and truncation. Seeking past the end is
//! allowed; the operating system zero-fills the gap on the next write. Growing the file through
//! [`crate::stream::Stream::truncate`] zero-fills the new region as well.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use annostream::{FileStream, Stream, StreamExt};
//!
//! let mut stream = FileStream::new("values.bin", false)?;
//! stream.write(&42_i64)?;
//! stream.flush()?;
//!
//! stream.seek(0)?;
//! assert_eq!(stream.read::<i64>()?, 42);
//! # Ok::<(), annostream::Error>(())
//! ```

use std::{
    fmt, fs,
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::{
    stream::{host_byte_order, Access, ByteOrder, Stream},
    Error, Result,
};

/// Stream backed by a file on disk.
///
/// # Examples
///
/// ```rust,no_run
/// use annostream::{FileStream, Stream};
///
/// let stream = FileStream::new("existing.bin", true)?;
/// assert!(!stream.can_write());
/// println!("{} bytes", stream.size());
/// # Ok::<(), annostream::Error>(())
/// ```
#[derive(Debug)]
pub struct FileStream {
    file: fs::File,
    path: PathBuf,
    read_only: bool,
    pos: u64,
    size: u64,
    byte_order: ByteOrder,
}

impl FileStream {
    /// Open the file at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the file. Accepts `&Path`, `&str`, `String`, or `PathBuf`.
    /// * `read_only` - Open for reading only. Otherwise the file is opened for reading and
    ///   writing and created if it does not exist.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be opened or its metadata queried.
    pub fn new(path: impl AsRef<Path>, read_only: bool) -> Result<FileStream> {
        let path = path.as_ref();

        let file = if read_only {
            fs::OpenOptions::new().read(true).open(path)?
        } else {
            fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?
        };

        let size = file.metadata()?.len();

        Ok(FileStream {
            file,
            path: path.to_path_buf(),
            read_only,
            pos: 0,
            size,
            byte_order: ByteOrder::default(),
        })
    }

    /// Path the stream was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the stream was opened read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            return Err(invalid_operation!(
                "cannot {} read-only file '{}'",
                operation,
                self.path.display()
            ));
        }
        Ok(())
    }

    /// Bring the OS cursor back in line with the cached position after a failed transfer.
    fn resync(&mut self) {
        if let Err(error) = self.file.seek(SeekFrom::Start(self.pos)) {
            log::warn!(
                "failed to restore position {} in '{}': {}",
                self.pos,
                self.path.display(),
                error
            );
        }
    }
}

impl Stream for FileStream {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        let available = self.size.saturating_sub(self.pos);
        if buffer.len() as u64 > available {
            return Err(read_error!(
                "requested {} bytes at offset {} of '{}', only {} available",
                buffer.len(),
                self.pos,
                self.path.display(),
                available
            ));
        }

        match self.file.read_exact(buffer) {
            Ok(()) => {
                self.pos += buffer.len() as u64;
                Ok(())
            }
            Err(error) => {
                self.resync();
                if error.kind() == io::ErrorKind::UnexpectedEof {
                    Err(read_error!(
                        "unexpected end of '{}' at offset {}",
                        self.path.display(),
                        self.pos
                    ))
                } else {
                    Err(Error::Io(error))
                }
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_writable("write to")?;

        match self.file.write_all(data) {
            Ok(()) => {
                self.pos += data.len() as u64;
                self.size = self.size.max(self.pos);
                Ok(())
            }
            Err(error) => {
                self.resync();
                if error.kind() == io::ErrorKind::WriteZero {
                    Err(Error::Write(format!(
                        "'{}' accepted no more data at offset {}",
                        self.path.display(),
                        self.pos
                    )))
                } else {
                    Err(Error::Io(error))
                }
            }
        }
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = self.file.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn truncate(&mut self, size: u64) -> Result<()> {
        self.ensure_writable("truncate")?;

        self.file.set_len(size)?;
        self.size = size;
        if self.pos > size {
            self.seek(size)?;
        }
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn flush(&mut self) -> Result<()> {
        if self.read_only {
            return Ok(());
        }

        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    fn access(&self) -> Access {
        if self.read_only {
            Access::READ
        } else {
            Access::READ | Access::WRITE
        }
    }

    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = order;
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if let Err(error) = self.flush() {
            log::warn!("failed to flush '{}' on close: {}", self.path.display(), error);
        }
    }
}

impl fmt::Display for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FileStream[")?;
        writeln!(f, "  path = \"{}\",", self.path.display())?;
        writeln!(f, "  host_byte_order = {},", host_byte_order())?;
        writeln!(f, "  byte_order = {},", self.byte_order)?;
        writeln!(f, "  access = {},", self.access())?;
        writeln!(f, "  size = {},", self.size)?;
        writeln!(f, "  pos = {}", self.pos)?;
        write!(f, "]")
    }
}
