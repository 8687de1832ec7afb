use std::{collections::TryReserveError, fmt};

use crate::{
    stream::{host_byte_order, Access, ByteOrder, Stream},
    Error, Result,
};

/// Capacity used by [`MemoryStream::default`].
pub const DEFAULT_CAPACITY: usize = 512;

/// Stream backed by a growable in-memory buffer.
///
/// The buffer is always fully initialised: its length is the capacity, and every byte past the
/// logical size is zero. This makes gaps created by seeking past the end, and regions exposed
/// by growing [`Stream::truncate`], read back as zeros without extra bookkeeping.
///
/// Capacity doubles whenever a write does not fit, so a sequence of appends costs amortised
/// O(1) per byte.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    buffer: Vec<u8>,
    size: usize,
    pos: usize,
    byte_order: ByteOrder,
}

impl MemoryStream {
    /// Create a new, empty memory stream.
    ///
    /// ## Arguments
    /// * 'capacity' - Initial capacity hint in bytes, must be greater than zero
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<MemoryStream> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "memory stream capacity must be greater than zero".to_string(),
            ));
        }

        Ok(MemoryStream {
            buffer: vec![0; capacity],
            size: 0,
            pos: 0,
            byte_order: ByteOrder::default(),
        })
    }

    /// Create a memory stream holding `data`, positioned at the start.
    ///
    /// ## Arguments
    /// * 'data' - The data buffer to consume
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> MemoryStream {
        MemoryStream {
            size: data.len(),
            buffer: data,
            pos: 0,
            byte_order: ByteOrder::default(),
        }
    }

    /// The bytes between offset zero and the logical size.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    /// Number of bytes the stream can hold before it reallocates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the stream and return its contents, trimmed to the logical size.
    #[must_use]
    pub fn into_inner(mut self) -> Vec<u8> {
        self.buffer.truncate(self.size);
        self.buffer
    }

    /// Grow the buffer to hold at least `required` bytes. Fails instead of aborting when the
    /// allocation cannot be satisfied; the stream is left unchanged in that case.
    fn reserve(&mut self, required: usize) -> std::result::Result<(), TryReserveError> {
        if required <= self.buffer.len() {
            return Ok(());
        }

        let mut capacity = self.buffer.len().max(1);
        while capacity < required {
            capacity = capacity.checked_mul(2).unwrap_or(required);
        }

        // Fall back to the exact requirement when the doubled size is out of reach
        if self
            .buffer
            .try_reserve_exact(capacity - self.buffer.len())
            .is_err()
        {
            self.buffer
                .try_reserve_exact(required - self.buffer.len())?;
            capacity = required;
        }

        self.buffer.resize(capacity, 0);
        Ok(())
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        MemoryStream {
            buffer: vec![0; DEFAULT_CAPACITY],
            size: 0,
            pos: 0,
            byte_order: ByteOrder::default(),
        }
    }
}

impl Stream for MemoryStream {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        let available = self.size.saturating_sub(self.pos);
        if buffer.len() > available {
            return Err(read_error!(
                "requested {} bytes at offset {}, only {} available",
                buffer.len(),
                self.pos,
                available
            ));
        }

        let end = self.pos + buffer.len();
        buffer.copy_from_slice(&self.buffer[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let Some(end) = self.pos.checked_add(data.len()) else {
            return Err(Error::Write(format!(
                "writing {} bytes at offset {} overflows the address space",
                data.len(),
                self.pos
            )));
        };

        self.reserve(end).map_err(|error| {
            Error::Write(format!(
                "cannot grow memory stream to {} bytes: {}",
                end, error
            ))
        })?;
        self.buffer[self.pos..end].copy_from_slice(data);
        self.pos = end;
        self.size = self.size.max(end);
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = usize::try_from(pos).map_err(|_| {
            Error::InvalidArgument(format!("seek offset {pos} exceeds the address space"))
        })?;
        Ok(())
    }

    fn truncate(&mut self, size: u64) -> Result<()> {
        let size = usize::try_from(size).map_err(|_| {
            Error::InvalidArgument(format!("truncate size {size} exceeds the address space"))
        })?;

        if size < self.size {
            self.buffer[size..self.size].fill(0);
        } else {
            self.reserve(size).map_err(|error| {
                Error::Write(format!(
                    "cannot grow memory stream to {} bytes: {}",
                    size, error
                ))
            })?;
        }

        self.size = size;
        self.pos = self.pos.min(size);
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos as u64
    }

    fn size(&self) -> u64 {
        self.size as u64
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn access(&self) -> Access {
        Access::READ | Access::WRITE
    }

    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = order;
    }
}

impl fmt::Display for MemoryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MemoryStream[")?;
        writeln!(f, "  host_byte_order = {},", host_byte_order())?;
        writeln!(f, "  byte_order = {},", self.byte_order)?;
        writeln!(f, "  access = {},", self.access())?;
        writeln!(f, "  capacity = {},", self.capacity())?;
        writeln!(f, "  size = {},", self.size)?;
        writeln!(f, "  pos = {}", self.pos)?;
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamExt;

    #[test]
    fn memory() {
        let mut stream = MemoryStream::default();
        assert_eq!(stream.capacity(), DEFAULT_CAPACITY);
        assert_eq!(stream.size(), 0);
        assert!(stream.can_read());
        assert!(stream.can_write());

        stream.write_bytes(&[0xCC; 10]).unwrap();
        stream.seek(4).unwrap();
        stream.write_bytes(&[0xBB; 2]).unwrap();

        assert_eq!(stream.size(), 10);
        assert_eq!(stream.pos(), 6);
        assert_eq!(
            stream.data(),
            &[0xCC, 0xCC, 0xCC, 0xCC, 0xBB, 0xBB, 0xCC, 0xCC, 0xCC, 0xCC]
        );
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            MemoryStream::new(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn growth_preserves_bytes() {
        let mut stream = MemoryStream::new(8).unwrap();
        let payload: Vec<u8> = (0..1000_u32).map(|i| (i % 251) as u8).collect();

        stream.write_bytes(&payload).unwrap();

        assert_eq!(stream.size(), 1000);
        assert!(stream.capacity() >= 1000);
        assert_eq!(stream.data(), payload.as_slice());

        let mut readback = vec![0_u8; 1000];
        stream.seek(0).unwrap();
        stream.read_bytes(&mut readback).unwrap();
        assert_eq!(readback, payload);
    }

    #[test]
    fn growth_doubles() {
        let mut stream = MemoryStream::new(8).unwrap();
        stream.write_bytes(&[1; 9]).unwrap();
        assert_eq!(stream.capacity(), 16);
        stream.write_bytes(&[1; 40]).unwrap();
        assert_eq!(stream.capacity(), 64);
    }

    #[test]
    fn read_past_end() {
        let mut stream = MemoryStream::default();
        stream.write_bytes(&[1, 2, 3]).unwrap();
        stream.seek(1).unwrap();

        let mut buffer = [0_u8; 4];
        assert!(matches!(stream.read_bytes(&mut buffer), Err(Error::Read(_))));
        assert_eq!(stream.pos(), 1);

        stream.seek(3).unwrap();
        assert!(matches!(stream.read::<bool>(), Err(Error::Read(_))));
    }

    #[test]
    fn seek_past_end_zero_fills() {
        let mut stream = MemoryStream::new(4).unwrap();
        stream.write_bytes(&[0xAA; 4]).unwrap();
        stream.seek(10).unwrap();
        stream.write_bytes(&[0xBB]).unwrap();

        assert_eq!(stream.size(), 11);
        assert_eq!(&stream.data()[4..10], &[0; 6]);
        assert_eq!(stream.data()[10], 0xBB);
    }

    #[test]
    fn truncate_shrink_then_grow_zero_fills() {
        let mut stream = MemoryStream::default();
        stream.write_bytes(&[0xFF; 16]).unwrap();

        stream.truncate(4).unwrap();
        assert_eq!(stream.size(), 4);
        assert_eq!(stream.pos(), 4);

        stream.truncate(12).unwrap();
        assert_eq!(stream.size(), 12);
        assert_eq!(stream.data(), &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn truncate_beyond_capacity() {
        let mut stream = MemoryStream::new(2).unwrap();
        stream.truncate(100).unwrap();
        assert_eq!(stream.size(), 100);
        assert_eq!(stream.pos(), 0);
        assert!(stream.data().iter().all(|&b| b == 0));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn impossible_growth_is_an_error() {
        let mut stream = MemoryStream::default();
        stream.write_bytes(&[7; 4]).unwrap();

        stream.seek(1 << 60).unwrap();
        assert!(matches!(stream.write_bytes(&[1]), Err(Error::Write(_))));
        assert!(matches!(stream.truncate(1 << 60), Err(Error::Write(_))));

        assert_eq!(stream.size(), 4);
        assert_eq!(stream.capacity(), DEFAULT_CAPACITY);
        assert_eq!(stream.data(), &[7, 7, 7, 7]);
    }

    #[test]
    fn from_vec_and_into_inner() {
        let mut stream = MemoryStream::from_vec(vec![1, 2, 3]);
        assert_eq!(stream.size(), 3);
        assert_eq!(stream.pos(), 0);

        stream.seek(3).unwrap();
        stream.write_bytes(&[4]).unwrap();
        assert_eq!(stream.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn from_empty_vec_grows() {
        let mut stream = MemoryStream::from_vec(Vec::new());
        stream.write_bytes(&[7; 3]).unwrap();
        assert_eq!(stream.data(), &[7, 7, 7]);
    }

    #[test]
    fn display() {
        let stream = MemoryStream::new(64).unwrap();
        let text = stream.to_string();
        assert!(text.starts_with("MemoryStream["));
        assert!(text.contains("capacity = 64"));
        assert!(text.contains("access = rw"));
    }
}
