//! Table of contents and on-stream framing of the annotated format.
//!
//! An annotated region starts at some base offset of the underlying stream and is laid out as
//!
//! ```text
//! +----------------------+ base
//! | preamble (24 bytes)  |  magic "ASTM", version, byte order marker, 2 reserved bytes,
//! |                      |  u64 trailer offset, u64 entry count
//! +----------------------+ base + 24
//! | values               |  serialized back to back, in `set` order
//! +----------------------+ base + trailer offset
//! | trailer              |  per entry: name, u8 type tag, u64 offset, u64 length
//! |                      |  then u64 entry count
//! +----------------------+
//! ```
//!
//! All offsets are relative to the base. Integers use the byte order recorded in the preamble;
//! the marker itself is a single byte and therefore readable in any order.

use std::collections::{HashMap, HashSet};

use crate::{
    annotated::AnnotatedConfig,
    stream::{
        io::{read_primitive, read_string, write_primitive, write_string},
        ByteOrder, Stream, TypeTag,
    },
    Result,
};

/// Magic bytes opening every annotated region.
pub const MAGIC: [u8; 4] = *b"ASTM";

/// Current version of the annotated format.
pub const VERSION: u8 = 1;

/// Size of the preamble in bytes.
pub const PREAMBLE_SIZE: u64 = 24;

/// Separator between namespace segments in qualified names.
pub const SEPARATOR: char = '.';

/// A named entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Fully qualified name, namespace segments joined by [`SEPARATOR`]
    pub name: String,
    /// Type of the stored value
    pub tag: TypeTag,
    /// Offset of the value relative to the start of the annotated region
    pub offset: u64,
    /// Number of bytes the serialized value occupies
    pub length: u64,
}

/// Fixed-size header at the start of an annotated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Preamble {
    pub order: ByteOrder,
    pub trailer_offset: u64,
    pub entry_count: u64,
}

impl Preamble {
    /// Write the preamble at the stream's position using the stream's byte order.
    pub fn write<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        debug_assert_eq!(self.order, stream.byte_order());

        stream.write_bytes(&MAGIC)?;
        stream.write_bytes(&[VERSION, self.order.marker(), 0, 0])?;
        write_primitive(stream, self.trailer_offset)?;
        write_primitive(stream, self.entry_count)
    }

    /// Read a preamble at the stream's position and switch the stream to the recorded order.
    pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Preamble> {
        let start = stream.pos();

        let mut magic = [0_u8; 4];
        stream
            .read_bytes(&mut magic)
            .map_err(|_| malformed_error!("no annotated preamble at offset {}", start))?;
        if magic != MAGIC {
            return Err(malformed_error!(
                "bad magic {:02X?} at offset {}",
                magic,
                start
            ));
        }

        let mut header = [0_u8; 4];
        stream.read_bytes(&mut header)?;
        let [version, marker, ..] = header;
        if version != VERSION {
            return Err(malformed_error!("unsupported format version {}", version));
        }
        let Some(order) = ByteOrder::from_marker(marker) else {
            return Err(malformed_error!("invalid byte order marker {}", marker));
        };

        stream.set_byte_order(order);
        let trailer_offset = read_primitive(stream)?;
        let entry_count = read_primitive(stream)?;

        Ok(Preamble {
            order,
            trailer_offset,
            entry_count,
        })
    }
}

/// Ordered list of entries plus an index resolving each name to its latest entry.
#[derive(Debug, Clone, Default)]
pub struct Toc {
    entries: Vec<TocEntry>,
    latest: HashMap<String, usize>,
}

impl Toc {
    /// Append an entry. A repeated name shadows earlier entries of the same name.
    pub fn push(&mut self, entry: TocEntry) {
        self.latest.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// The most recent entry with the given qualified name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TocEntry> {
        self.latest.get(name).map(|&index| &self.entries[index])
    }

    /// All entries in the order they were written, shadowed duplicates included.
    #[must_use]
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Number of entries, shadowed duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the direct children of `prefix`, relative to it, in first-insertion order.
    ///
    /// `prefix` is either empty (top level) or a namespace path ending in [`SEPARATOR`].
    #[must_use]
    pub fn children(&self, prefix: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter_map(|entry| entry.name.strip_prefix(prefix))
            .filter(|rest| !rest.contains(SEPARATOR))
            .filter(|rest| seen.insert(*rest))
            .map(str::to_string)
            .collect()
    }

    /// Serialize every entry followed by the entry count at the stream's position.
    pub(crate) fn write_trailer<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        for entry in &self.entries {
            write_string(stream, &entry.name)?;
            write_primitive(stream, entry.tag.as_byte())?;
            write_primitive(stream, entry.offset)?;
            write_primitive(stream, entry.length)?;
        }
        write_primitive(stream, self.entries.len() as u64)
    }

    /// Parse a trailer at the stream's position.
    ///
    /// Every entry is checked to lie inside the value region `[PREAMBLE_SIZE, trailer_offset)`
    /// and the closing count must agree with the preamble.
    pub(crate) fn read_trailer<S: Stream + ?Sized>(
        stream: &mut S,
        preamble: &Preamble,
        config: &AnnotatedConfig,
    ) -> Result<Toc> {
        if preamble.entry_count > config.max_entries {
            return Err(malformed_error!(
                "entry count {} exceeds the limit of {}",
                preamble.entry_count,
                config.max_entries
            ));
        }

        let mut toc = Toc::default();
        for _ in 0..preamble.entry_count {
            let name = read_string(stream)?;
            if name.len() > config.max_name_len
                || name.is_empty()
                || name.split(SEPARATOR).any(str::is_empty)
            {
                return Err(malformed_error!("invalid entry name '{}'", name));
            }

            let tag = TypeTag::try_from(read_primitive::<u8, S>(stream)?)?;
            let offset: u64 = read_primitive(stream)?;
            let length: u64 = read_primitive(stream)?;

            let in_bounds = offset >= PREAMBLE_SIZE
                && offset
                    .checked_add(length)
                    .is_some_and(|end| end <= preamble.trailer_offset);
            if !in_bounds {
                return Err(malformed_error!(
                    "entry '{}' spans {}..{} outside the value region",
                    name,
                    offset,
                    offset.saturating_add(length)
                ));
            }

            log::trace!("toc entry '{name}' ({tag}) at {offset}, {length} bytes");
            toc.push(TocEntry {
                name,
                tag,
                offset,
                length,
            });
        }

        let footer: u64 = read_primitive(stream)?;
        if footer != preamble.entry_count {
            return Err(malformed_error!(
                "trailer count {} does not match preamble count {}",
                footer,
                preamble.entry_count
            ));
        }

        Ok(toc)
    }
}
