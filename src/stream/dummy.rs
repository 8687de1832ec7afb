use std::fmt;

use crate::{
    stream::{host_byte_order, Access, ByteOrder, Stream},
    Error, Result,
};

/// Stream without backing storage.
///
/// Writes are discarded but advance a virtual cursor and size, which makes the dummy stream a
/// cheap way to measure how many bytes a sequence of writes would occupy. Reads always fail
/// because nothing was ever stored.
#[derive(Debug, Clone, Default)]
pub struct DummyStream {
    size: u64,
    pos: u64,
    byte_order: ByteOrder,
}

impl DummyStream {
    /// Create a new dummy stream with position and size at zero.
    #[must_use]
    pub fn new() -> DummyStream {
        DummyStream::default()
    }
}

impl Stream for DummyStream {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        Err(read_error!(
            "dummy stream holds no data (requested {} bytes at offset {})",
            buffer.len(),
            self.pos
        ))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let Some(end) = self.pos.checked_add(data.len() as u64) else {
            return Err(Error::Write(format!(
                "writing {} bytes at offset {} overflows the stream size",
                data.len(),
                self.pos
            )));
        };

        self.pos = end;
        self.size = self.size.max(end);
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn truncate(&mut self, size: u64) -> Result<()> {
        self.size = size;
        self.pos = self.pos.min(size);
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
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

impl fmt::Display for DummyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DummyStream[")?;
        writeln!(f, "  host_byte_order = {},", host_byte_order())?;
        writeln!(f, "  byte_order = {},", self.byte_order)?;
        writeln!(f, "  access = {},", self.access())?;
        writeln!(f, "  size = {},", self.size)?;
        writeln!(f, "  pos = {}", self.pos)?;
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Float, StreamExt};

    #[test]
    fn dummy_counts_writes() {
        let mut stream = DummyStream::new();
        assert!(stream.can_read());
        assert!(stream.can_write());

        stream.write(&true).unwrap();
        stream.write(&1_i64).unwrap();
        stream.write(&(1.0 as Float)).unwrap();
        stream.write(&"four".to_string()).unwrap();

        let expected = 1 + 8 + std::mem::size_of::<Float>() as u64 + 8 + 4;
        assert_eq!(stream.size(), expected);
        assert_eq!(stream.pos(), expected);
    }

    #[test]
    fn dummy_read_fails() {
        let mut stream = DummyStream::new();
        stream.write(&5_i64).unwrap();
        stream.seek(0).unwrap();

        assert!(matches!(stream.read::<i64>(), Err(Error::Read(_))));
    }

    #[test]
    fn dummy_seek_and_truncate() {
        let mut stream = DummyStream::new();
        stream.seek(100).unwrap();
        assert_eq!(stream.size(), 0);

        stream.write_bytes(&[0; 4]).unwrap();
        assert_eq!(stream.size(), 104);

        stream.truncate(10).unwrap();
        assert_eq!(stream.size(), 10);
        assert_eq!(stream.pos(), 10);

        stream.truncate(50).unwrap();
        assert_eq!(stream.size(), 50);
        assert_eq!(stream.pos(), 10);
        stream.flush().unwrap();
    }

    #[test]
    fn dummy_write_overflow() {
        let mut stream = DummyStream::new();
        stream.seek(u64::MAX).unwrap();
        assert!(matches!(stream.write_bytes(&[1]), Err(Error::Write(_))));
    }

    #[test]
    fn dummy_display() {
        let text = DummyStream::new().to_string();
        assert!(text.starts_with("DummyStream["));
        assert!(text.contains("byte_order = LittleEndian"));
    }
}
