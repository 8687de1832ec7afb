//! Byte order selection for multi-byte scalars.

use strum::{Display, EnumIter};

/// The byte layout used when serializing multi-byte scalars.
///
/// Every stream carries one of these as mutable state. Changing it only affects values written
/// or read afterwards; bytes already in the stream are never rewritten.
/// New streams start out little-endian so that their output does not depend on the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ByteOrder {
    /// Most significant byte first
    BigEndian,
    /// Least significant byte first
    #[default]
    LittleEndian,
}

impl ByteOrder {
    /// Network byte order, which is big-endian.
    pub const NETWORK: ByteOrder = ByteOrder::BigEndian;

    /// The native byte order of the machine this process runs on.
    #[must_use]
    pub const fn host() -> ByteOrder {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Single byte marker recorded in annotated stream preambles.
    pub(crate) fn marker(self) -> u8 {
        match self {
            ByteOrder::LittleEndian => 0,
            ByteOrder::BigEndian => 1,
        }
    }

    pub(crate) fn from_marker(marker: u8) -> Option<ByteOrder> {
        match marker {
            0 => Some(ByteOrder::LittleEndian),
            1 => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }
}

/// Returns the byte order of the host, independent of any stream instance.
#[must_use]
pub const fn host_byte_order() -> ByteOrder {
    ByteOrder::host()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_is_big_endian() {
        assert_eq!(ByteOrder::NETWORK, ByteOrder::BigEndian);
    }

    #[test]
    fn host_matches_target() {
        let expected = if 1u16.to_ne_bytes()[0] == 1 {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        assert_eq!(host_byte_order(), expected);
    }

    #[test]
    fn marker_round_trip() {
        assert_eq!(
            ByteOrder::from_marker(ByteOrder::BigEndian.marker()),
            Some(ByteOrder::BigEndian)
        );
        assert_eq!(
            ByteOrder::from_marker(ByteOrder::LittleEndian.marker()),
            Some(ByteOrder::LittleEndian)
        );
        assert_eq!(ByteOrder::from_marker(7), None);
    }

    #[test]
    fn display() {
        assert_eq!(ByteOrder::BigEndian.to_string(), "BigEndian");
        assert_eq!(ByteOrder::default().to_string(), "LittleEndian");
    }
}
