//! Byte-order aware encoding of scalars and strings on top of a [`crate::Stream`].
//!
//! This module is the single place where the wire representation of values is defined. It is
//! built around two traits:
//!
//! - [`crate::stream::io::Primitive`] - fixed-size scalars that convert to and from byte arrays
//!   in either byte order. Used for the public value types as well as the framing integers of
//!   the annotated format.
//! - [`crate::stream::io::Serializable`] - the closed set of value types a caller can read and
//!   write: `bool`, `i64`, [`crate::Float`] and `String`. The trait is sealed, so any other type
//!   is rejected at compile time.
//!
//! # Wire Format
//!
//! | Type     | Encoding                                                    |
//! |----------|-------------------------------------------------------------|
//! | `bool`   | 1 byte, `0` or `1`                                          |
//! | `i64`    | 8 bytes in the stream's byte order                          |
//! | `Float`  | 4 bytes (`f32`) or 8 bytes (`f64` with `double-precision`)  |
//! | `String` | `u64` byte count in the stream's byte order, then UTF-8     |
//!
//! Strings carry no terminator. Every implementation reading a stream agrees on this single
//! representation, independent of the host.

use crate::{
    stream::{ByteOrder, Stream, TypeTag},
    Result,
};

/// Floating point type used for [`crate::Value::Float`] entries.
///
/// Single precision unless the `double-precision` feature is enabled. The precision is part of
/// the wire format: a reader must be built with the same setting as the writer.
#[cfg(not(feature = "double-precision"))]
pub type Float = f32;

/// Floating point type used for [`crate::Value::Float`] entries.
#[cfg(feature = "double-precision")]
pub type Float = f64;

/// Trait for fixed-size scalars that can be converted from and to bytes in either byte order.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size byte
/// array required for that particular type (e.g. `[u8; 8]` for `u64`).
pub trait Primitive: Sized + Copy {
    /// Byte array holding the encoded value.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;

    /// Encode `self` in the given byte order.
    fn encode(self, order: ByteOrder) -> Self::Bytes {
        match order {
            ByteOrder::LittleEndian => self.to_le_bytes(),
            ByteOrder::BigEndian => self.to_be_bytes(),
        }
    }

    /// Decode a value stored in the given byte order.
    fn decode(bytes: Self::Bytes, order: ByteOrder) -> Self {
        match order {
            ByteOrder::LittleEndian => Self::from_le_bytes(bytes),
            ByteOrder::BigEndian => Self::from_be_bytes(bytes),
        }
    }
}

macro_rules! impl_primitive {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => 1,
    u16 => 2,
    u32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Write a primitive at the stream's position in the stream's byte order.
pub(crate) fn write_primitive<T: Primitive, S: Stream + ?Sized>(
    stream: &mut S,
    value: T,
) -> Result<()> {
    let bytes = value.encode(stream.byte_order());
    stream.write_bytes(bytes.as_ref())
}

/// Read a primitive from the stream's position, converting from the stream's byte order.
pub(crate) fn read_primitive<T: Primitive, S: Stream + ?Sized>(stream: &mut S) -> Result<T> {
    let mut bytes = T::Bytes::default();
    stream.read_bytes(bytes.as_mut())?;
    Ok(T::decode(bytes, stream.byte_order()))
}

/// Write a length-prefixed UTF-8 string.
pub(crate) fn write_string<S: Stream + ?Sized>(stream: &mut S, value: &str) -> Result<()> {
    write_primitive(stream, value.len() as u64)?;
    stream.write_bytes(value.as_bytes())
}

/// Read a length-prefixed UTF-8 string.
///
/// The length is checked against the bytes remaining in the stream before anything is
/// allocated, so a corrupt prefix cannot trigger a huge allocation.
pub(crate) fn read_string<S: Stream + ?Sized>(stream: &mut S) -> Result<String> {
    let start = stream.pos();
    let length: u64 = read_primitive(stream)?;

    let remaining = stream.size().saturating_sub(stream.pos());
    if length > remaining {
        return Err(read_error!(
            "string at offset {} claims {} bytes, only {} remain",
            start,
            length,
            remaining
        ));
    }

    let Ok(length) = usize::try_from(length) else {
        return Err(read_error!("string length {} exceeds address space", length));
    };

    let mut buffer = vec![0_u8; length];
    stream.read_bytes(&mut buffer)?;

    String::from_utf8(buffer)
        .map_err(|e| read_error!("invalid UTF-8 string at offset {}: {}", start, e.utf8_error()))
}

mod private {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for i64 {}
    impl Sealed for super::Float {}
    impl Sealed for String {}
}

/// The closed set of value types that can be written to and read from a stream.
///
/// Implemented for `bool`, `i64`, [`Float`] and `String`. Each type maps to exactly one
/// [`TypeTag`], which the annotated format records next to every named entry.
pub trait Serializable: private::Sealed + Sized {
    /// Tag identifying this type in an annotated table of contents.
    const TAG: TypeTag;

    /// Serialize `self` at the stream's current position.
    ///
    /// # Errors
    /// Returns whatever the stream reports for the underlying write.
    fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()>;

    /// Deserialize a value from the stream's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Read`] if the stream holds too few bytes or the bytes do not
    /// form a valid value.
    fn deserialize<S: Stream + ?Sized>(stream: &mut S) -> Result<Self>;
}

impl Serializable for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        write_primitive(stream, u8::from(*self))
    }

    fn deserialize<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        let start = stream.pos();
        match read_primitive::<u8, S>(stream)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(read_error!(
                "invalid boolean byte 0x{:02X} at offset {}",
                other,
                start
            )),
        }
    }
}

impl Serializable for i64 {
    const TAG: TypeTag = TypeTag::Integer;

    fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        write_primitive(stream, *self)
    }

    fn deserialize<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        read_primitive(stream)
    }
}

impl Serializable for Float {
    const TAG: TypeTag = TypeTag::Float;

    fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        write_primitive(stream, *self)
    }

    fn deserialize<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        read_primitive(stream)
    }
}

impl Serializable for String {
    const TAG: TypeTag = TypeTag::String;

    fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        write_string(stream, self)
    }

    fn deserialize<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        read_string(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stream::MemoryStream, Error};

    #[test]
    fn primitive_encode_orders() {
        assert_eq!(
            0x0102_0304_u32.encode(ByteOrder::BigEndian),
            [0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(
            0x0102_0304_u32.encode(ByteOrder::LittleEndian),
            [0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            u32::decode([0x01, 0x02, 0x03, 0x04], ByteOrder::BigEndian),
            0x0102_0304
        );
    }

    #[test]
    fn big_endian_is_reversed_little_endian() {
        let value = -0x0123_4567_89AB_CDEF_i64;
        let mut big = value.encode(ByteOrder::BigEndian);
        big.reverse();
        assert_eq!(big, value.encode(ByteOrder::LittleEndian));
    }

    #[test]
    fn string_layout() {
        let mut stream = MemoryStream::default();
        stream.set_byte_order(ByteOrder::BigEndian);
        write_string(&mut stream, "abc").unwrap();

        assert_eq!(
            stream.data(),
            &[0, 0, 0, 0, 0, 0, 0, 3, b'a', b'b', b'c']
        );
    }

    #[test]
    fn string_length_beyond_end() {
        let mut stream = MemoryStream::default();
        write_primitive(&mut stream, 1000_u64).unwrap();
        stream.write_bytes(b"short").unwrap();
        stream.seek(0).unwrap();

        assert!(matches!(read_string(&mut stream), Err(Error::Read(_))));
    }

    #[test]
    fn string_invalid_utf8() {
        let mut stream = MemoryStream::default();
        write_primitive(&mut stream, 2_u64).unwrap();
        stream.write_bytes(&[0xC3, 0x28]).unwrap();
        stream.seek(0).unwrap();

        assert!(matches!(read_string(&mut stream), Err(Error::Read(_))));
    }

    #[test]
    fn bool_rejects_other_bytes() {
        let mut stream = MemoryStream::default();
        stream.write_bytes(&[2]).unwrap();
        stream.seek(0).unwrap();

        assert!(matches!(bool::deserialize(&mut stream), Err(Error::Read(_))));
    }

    #[test]
    fn float_width() {
        let mut stream = MemoryStream::default();
        (1.5 as Float).serialize(&mut stream).unwrap();
        assert_eq!(stream.size() as usize, std::mem::size_of::<Float>());
    }
}
