//! Byte-order aware binary streams.
//!
//! This module provides the [`crate::stream::Stream`] contract and its three backends. A stream
//! is a sequential, byte-addressable storage medium with a cursor, a logical size and a
//! configurable [`crate::stream::ByteOrder`] that is applied to every multi-byte scalar.
//!
//! # Architecture
//!
//! - **Raw contract** - [`crate::stream::Stream`] is object safe and only deals with bytes,
//!   positions and capabilities. Backends implement it.
//! - **Typed layer** - [`crate::stream::StreamExt`] is blanket-implemented for every stream and
//!   adds `read`/`write` for the supported value types, using [`crate::stream::io`] for the
//!   encoding.
//!
//! # Key Components
//!
//! ## Backend Implementations
//! - [`crate::stream::DummyStream`] - Discards writes, tracks virtual position and size
//! - [`crate::stream::FileStream`] - Backed by a file on disk
//! - [`crate::stream::MemoryStream`] - Backed by a growable in-memory buffer
//!
//! ## Values
//! - [`crate::stream::Value`] / [`crate::stream::TypeTag`] - Dynamically typed values
//! - [`crate::stream::io::Serializable`] - Statically typed values
//!
//! # Examples
//!
//! ```rust
//! use annostream::{ByteOrder, MemoryStream, Stream, StreamExt};
//!
//! let mut stream = MemoryStream::default();
//! stream.set_byte_order(ByteOrder::BigEndian);
//! stream.write(&0x0102_i64)?;
//! stream.write(&"hello".to_string())?;
//!
//! stream.seek(0)?;
//! assert_eq!(stream.read::<i64>()?, 0x0102);
//! assert_eq!(stream.read::<String>()?, "hello");
//! # Ok::<(), annostream::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Streams are plain owned values without interior mutability. Every mutating operation takes
//! `&mut self`, so sharing a stream between threads requires caller-provided synchronization.

pub mod io;

mod byteorder;
mod dummy;
mod file;
mod memory;
mod value;

use std::fmt;

use bitflags::bitflags;

use crate::Result;

pub use byteorder::{host_byte_order, ByteOrder};
pub use dummy::DummyStream;
pub use file::FileStream;
pub use io::{Float, Serializable};
pub use memory::MemoryStream;
pub use value::{TypeTag, Value};

bitflags! {
    /// Capabilities of a stream, fixed when the stream is constructed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u8 {
        /// The stream can be read from
        const READ = 0x01;
        /// The stream can be written to
        const WRITE = 0x02;
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let read = if self.contains(Access::READ) { "r" } else { "-" };
        let write = if self.contains(Access::WRITE) { "w" } else { "-" };
        write!(f, "{read}{write}")
    }
}

/// Contract shared by all stream backends.
///
/// The trait covers raw byte transfer, cursor handling and capability queries. Typed access
/// lives in [`StreamExt`], which every `Stream` gets for free.
///
/// Positions and sizes are logical byte counts. Seeking past the end is allowed; a subsequent
/// write zero-fills the gap. Truncating shrinks or zero-extends the stream and clamps the
/// cursor to the new size.
pub trait Stream: fmt::Display {
    /// Fill `buffer` completely from the current position and advance the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Read`] if fewer than `buffer.len()` bytes remain, or an
    /// [`crate::Error::Io`] if the backend fails.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Write all of `data` at the current position, advancing the cursor and extending the
    /// size if the write ends past it.
    ///
    /// # Errors
    /// Returns an error if the stream does not accept writes or the backend rejects the data.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Move the cursor to the absolute position `pos`.
    ///
    /// # Errors
    /// Returns an error if the backend cannot reposition.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Set the logical size of the stream.
    ///
    /// # Errors
    /// Returns an error if the stream does not accept writes or the backend fails.
    fn truncate(&mut self, size: u64) -> Result<()>;

    /// Current cursor position.
    fn pos(&self) -> u64;

    /// Current logical size in bytes.
    fn size(&self) -> u64;

    /// Push buffered data to the backing storage.
    ///
    /// # Errors
    /// Returns an error if the backend fails to persist the data.
    fn flush(&mut self) -> Result<()>;

    /// Capabilities of this stream.
    fn access(&self) -> Access;

    /// Byte order applied to multi-byte scalars.
    fn byte_order(&self) -> ByteOrder;

    /// Change the byte order for subsequent reads and writes.
    fn set_byte_order(&mut self, order: ByteOrder);

    /// Whether the stream can be read from.
    fn can_read(&self) -> bool {
        self.access().contains(Access::READ)
    }

    /// Whether the stream can be written to.
    fn can_write(&self) -> bool {
        self.access().contains(Access::WRITE)
    }
}

/// Typed reads and writes for every [`Stream`].
pub trait StreamExt: Stream {
    /// Serialize `value` at the current position in the stream's byte order.
    ///
    /// # Errors
    /// Returns the error of the underlying [`Stream::write_bytes`].
    fn write<T: Serializable>(&mut self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    /// Deserialize a `T` from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Read`] if not enough bytes remain or the bytes are invalid.
    fn read<T: Serializable>(&mut self) -> Result<T> {
        T::deserialize(self)
    }

    /// Serialize a dynamically typed value.
    ///
    /// # Errors
    /// Returns the error of the underlying [`Stream::write_bytes`].
    fn write_value(&mut self, value: &Value) -> Result<()> {
        value.serialize(self)
    }

    /// Deserialize a value of the type identified by `tag`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Read`] if not enough bytes remain or the bytes are invalid.
    fn read_value(&mut self, tag: TypeTag) -> Result<Value> {
        Value::deserialize(self, tag)
    }
}

impl<S: Stream + ?Sized> StreamExt for S {}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }

    fn truncate(&mut self, size: u64) -> Result<()> {
        (**self).truncate(size)
    }

    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn access(&self) -> Access {
        (**self).access()
    }

    fn byte_order(&self) -> ByteOrder {
        (**self).byte_order()
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        (**self).set_byte_order(order);
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }

    fn truncate(&mut self, size: u64) -> Result<()> {
        (**self).truncate(size)
    }

    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn access(&self) -> Access {
        (**self).access()
    }

    fn byte_order(&self) -> ByteOrder {
        (**self).byte_order()
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        (**self).set_byte_order(order);
    }
}
