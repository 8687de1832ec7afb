//! Named, hierarchical serialization on top of a [`crate::Stream`].
//!
//! An [`crate::annotated::AnnotatedStream`] stores values under names and keeps a table of
//! contents (ToC) recording where each value lives, which type it has and how many bytes it
//! occupies. When the annotated stream is closed the ToC is written as a trailer, so a later
//! reader can look values up by name without scanning the data.
//!
//! # Namespaces
//!
//! [`crate::annotated::AnnotatedStream::push`] enters a nested namespace and
//! [`crate::annotated::AnnotatedStream::pop`] leaves it. Names passed to `set`, `get` and
//! `keys` are relative to the current namespace and are stored fully qualified, with segments
//! joined by `.`:
//!
//! - Lookups resolve in the innermost namespace only. An entry in an enclosing namespace is not
//!   visible from a nested one.
//! - Setting the same name twice appends a second entry; lookups return the latest one.
//! - `keys` lists the direct children of the current namespace in insertion order, each name
//!   once.
//!
//! # Ownership
//!
//! The type parameter decides who owns the underlying stream. `AnnotatedStream<MemoryStream>`
//! owns it (and hands it back through [`crate::annotated::AnnotatedStream::into_inner`]),
//! `AnnotatedStream<&mut MemoryStream>` borrows a stream the caller keeps managing.
//!
//! # Examples
//!
//! ```rust
//! use annostream::{AnnotatedStream, MemoryStream};
//!
//! let mut stream = MemoryStream::default();
//!
//! let mut writer = AnnotatedStream::new(&mut stream, true)?;
//! writer.set("version", &3_i64)?;
//! writer.push("header")?;
//! writer.set("width", &1920_i64)?;
//! writer.set("height", &1080_i64)?;
//! writer.pop()?;
//! writer.close()?;
//! drop(writer);
//!
//! let mut reader = AnnotatedStream::new(&mut stream, true)?;
//! assert_eq!(reader.keys(), vec!["version"]);
//! reader.push("header")?;
//! assert_eq!(reader.keys(), vec!["width", "height"]);
//! assert_eq!(reader.get::<i64>("width")?, Some(1920));
//! # Ok::<(), annostream::Error>(())
//! ```

mod config;
mod toc;

use std::fmt;

use crate::{
    stream::{Serializable, Stream, TypeTag, Value},
    Error, Result,
};

pub use config::{AnnotatedConfig, OpenMode};
pub use toc::{TocEntry, MAGIC, PREAMBLE_SIZE, SEPARATOR, VERSION};

use toc::{Preamble, Toc};

fn attached<S>(stream: &mut Option<S>) -> Result<&mut S> {
    stream
        .as_mut()
        .ok_or_else(|| invalid_operation!("the underlying stream was detached"))
}

fn validate_segment(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("names must not be empty".to_string()));
    }
    if name.contains(SEPARATOR) {
        return Err(Error::InvalidArgument(format!(
            "name '{name}' must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Typed, named serialization layer over a single [`Stream`].
///
/// See the [module documentation](crate::annotated) for the naming rules and an example.
///
/// # Lifecycle
///
/// A writer starts out open and writable. [`AnnotatedStream::close`] commits the table of
/// contents; afterwards only diagnostics ([`AnnotatedStream::keys`], [`AnnotatedStream::len`],
/// `Display`, ...) remain available. A reader parses the table of contents eagerly when it is
/// constructed and is closed the same way. Dropping an unclosed writer commits it, logging
/// instead of returning any failure.
#[derive(Debug)]
pub struct AnnotatedStream<S: Stream> {
    stream: Option<S>,
    config: AnnotatedConfig,
    writable: bool,
    closed: bool,
    base: u64,
    append_pos: u64,
    toc: Toc,
    namespaces: Vec<String>,
}

impl<S: Stream> AnnotatedStream<S> {
    /// Wrap `stream`, writing a new annotated region if it is empty and writable, and reading
    /// the one at offset zero otherwise.
    ///
    /// Opening for reading switches `stream` to the byte order recorded in the region. The
    /// order is not restored afterwards, so a borrowed stream keeps it once the annotated
    /// stream is dropped.
    ///
    /// # Arguments
    /// * `stream` - The stream to wrap, owned or as `&mut`
    /// * `throw_on_missing` - Fail lookups of missing names instead of returning `None`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] if the stream lacks the needed capability,
    /// [`crate::Error::Malformed`] if an existing region cannot be parsed, or the stream's own
    /// error if the preamble cannot be written.
    pub fn new(stream: S, throw_on_missing: bool) -> Result<Self> {
        Self::with_config(
            stream,
            AnnotatedConfig {
                throw_on_missing,
                ..AnnotatedConfig::default()
            },
        )
    }

    /// Start a new annotated region at the end of `stream`.
    ///
    /// # Errors
    /// See [`AnnotatedStream::new`].
    pub fn writer(stream: S, throw_on_missing: bool) -> Result<Self> {
        Self::with_config(
            stream,
            AnnotatedConfig {
                throw_on_missing,
                mode: OpenMode::Write,
                ..AnnotatedConfig::default()
            },
        )
    }

    /// Parse the annotated region starting at the current position of `stream`.
    ///
    /// `stream` adopts the byte order recorded in the region and keeps it after the reader is
    /// dropped.
    ///
    /// # Errors
    /// See [`AnnotatedStream::new`].
    pub fn reader(stream: S, throw_on_missing: bool) -> Result<Self> {
        Self::with_config(
            stream,
            AnnotatedConfig {
                throw_on_missing,
                mode: OpenMode::Read,
                ..AnnotatedConfig::default()
            },
        )
    }

    /// Wrap `stream` using an explicit configuration.
    ///
    /// # Errors
    /// See [`AnnotatedStream::new`].
    pub fn with_config(mut stream: S, config: AnnotatedConfig) -> Result<Self> {
        let writable = match config.mode {
            OpenMode::Auto => {
                if stream.size() == 0 && stream.can_write() {
                    true
                } else {
                    stream.seek(0)?;
                    false
                }
            }
            OpenMode::Read => false,
            OpenMode::Write => true,
        };

        if writable {
            Self::open_writer(stream, config)
        } else {
            Self::open_reader(stream, config)
        }
    }

    fn open_writer(mut stream: S, config: AnnotatedConfig) -> Result<Self> {
        if !stream.can_write() {
            return Err(invalid_operation!(
                "cannot start an annotated region on a stream that does not accept writes"
            ));
        }

        let base = stream.size();
        stream.seek(base)?;
        Preamble {
            order: stream.byte_order(),
            trailer_offset: 0,
            entry_count: 0,
        }
        .write(&mut stream)?;

        Ok(AnnotatedStream {
            append_pos: stream.pos(),
            stream: Some(stream),
            config,
            writable: true,
            closed: false,
            base,
            toc: Toc::default(),
            namespaces: Vec::new(),
        })
    }

    fn open_reader(mut stream: S, config: AnnotatedConfig) -> Result<Self> {
        if !stream.can_read() {
            return Err(invalid_operation!(
                "cannot read an annotated region from a stream that does not allow reads"
            ));
        }

        let base = stream.pos();
        let preamble = Preamble::read(&mut stream)?;
        if preamble.trailer_offset == 0 {
            return Err(malformed_error!(
                "annotated region at offset {} was never closed",
                base
            ));
        }
        if preamble.trailer_offset < PREAMBLE_SIZE {
            return Err(malformed_error!(
                "trailer offset {} points into the preamble",
                preamble.trailer_offset
            ));
        }

        let Some(trailer_pos) = base.checked_add(preamble.trailer_offset) else {
            return Err(malformed_error!(
                "trailer offset {} overflows",
                preamble.trailer_offset
            ));
        };
        stream.seek(trailer_pos)?;
        let toc = Toc::read_trailer(&mut stream, &preamble, &config)?;

        log::debug!(
            "parsed {} table of contents entries at offset {} ({})",
            toc.len(),
            base,
            preamble.order
        );

        Ok(AnnotatedStream {
            stream: Some(stream),
            config,
            writable: false,
            closed: false,
            base,
            append_pos: trailer_pos,
            toc,
            namespaces: Vec::new(),
        })
    }

    /// Store `value` under `name` in the current namespace.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] if the stream is closed, was opened for
    /// reading or the underlying stream refuses writes, and
    /// [`crate::Error::InvalidArgument`] for an empty name or one containing `.`.
    pub fn set<T: Serializable>(&mut self, name: &str, value: &T) -> Result<()> {
        self.append(name, T::TAG, |stream| value.serialize(stream))
    }

    /// Store a dynamically typed value under `name` in the current namespace.
    ///
    /// # Errors
    /// See [`AnnotatedStream::set`].
    pub fn set_value(&mut self, name: &str, value: &Value) -> Result<()> {
        self.append(name, value.tag(), |stream| value.serialize(stream))
    }

    /// Look up `name` in the current namespace and decode it as a `T`.
    ///
    /// Returns `Ok(None)` for a missing name when `throw_on_missing` is disabled.
    ///
    /// # Errors
    /// Returns [`crate::Error::KeyNotFound`] for a missing name when `throw_on_missing` is
    /// enabled, [`crate::Error::TypeMismatch`] if the entry holds another type, and
    /// [`crate::Error::InvalidOperation`] once the stream is closed.
    pub fn get<T: Serializable>(&mut self, name: &str) -> Result<Option<T>> {
        let Some(entry) = self.resolve(name)? else {
            return Ok(None);
        };

        if entry.tag != T::TAG {
            return Err(Error::TypeMismatch {
                name: entry.name,
                expected: T::TAG,
                found: entry.tag,
            });
        }

        self.read_at(&entry, |stream| T::deserialize(stream))
            .map(Some)
    }

    /// Look up `name` and store the decoded value in `target`.
    ///
    /// Returns whether the name was found. On a miss `target` is left untouched.
    ///
    /// # Errors
    /// See [`AnnotatedStream::get`].
    pub fn get_into<T: Serializable>(&mut self, name: &str, target: &mut T) -> Result<bool> {
        match self.get(name)? {
            Some(value) => {
                *target = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Look up `name` and decode it using the type recorded in the table of contents.
    ///
    /// # Errors
    /// See [`AnnotatedStream::get`].
    pub fn get_value(&mut self, name: &str) -> Result<Option<Value>> {
        let Some(entry) = self.resolve(name)? else {
            return Ok(None);
        };

        self.read_at(&entry, |stream| Value::deserialize(stream, entry.tag))
            .map(Some)
    }

    /// Decode the value of an arbitrary entry, e.g. one taken from
    /// [`AnnotatedStream::entries`], regardless of the current namespace.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] once the stream is closed and
    /// [`crate::Error::Read`] if the entry does not decode.
    pub fn read_entry(&mut self, entry: &TocEntry) -> Result<Value> {
        self.ensure_readable()?;
        self.read_at(entry, |stream| Value::deserialize(stream, entry.tag))
    }

    /// Whether `name` resolves in the current namespace.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// The entry `name` resolves to in the current namespace.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&TocEntry> {
        if validate_segment(name).is_err() {
            return None;
        }
        self.toc.lookup(&format!("{}{}", self.prefix(), name))
    }

    /// Every entry in write order, including shadowed duplicates.
    #[must_use]
    pub fn entries(&self) -> &[TocEntry] {
        self.toc.entries()
    }

    /// Enter the nested namespace `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] once the stream is closed and
    /// [`crate::Error::InvalidArgument`] for an empty name or one containing `.`.
    pub fn push(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        validate_segment(name)?;
        self.namespaces.push(name.to_string());
        Ok(())
    }

    /// Leave the innermost namespace.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] if no namespace is active or the stream is
    /// closed.
    pub fn pop(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.namespaces.pop().is_none() {
            return Err(invalid_operation!("pop without a matching push"));
        }
        Ok(())
    }

    /// The current namespace path, segments joined by `.`; empty at the top level.
    #[must_use]
    pub fn namespace(&self) -> String {
        self.namespaces.join(SEPARATOR.to_string().as_str())
    }

    /// Names of the direct children of the current namespace, in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.toc.children(&self.prefix())
    }

    /// Commit the table of contents and make the stream immutable.
    ///
    /// Writers append the trailer, patch the preamble and flush the underlying stream. Closing
    /// a reader only changes its state. Closing twice is a no-op.
    ///
    /// # Errors
    /// Returns the underlying stream's error if the trailer cannot be written; the stream then
    /// stays open so the commit can be retried.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if !self.namespaces.is_empty() {
            log::warn!(
                "closing annotated stream inside namespace '{}'",
                self.namespace()
            );
        }

        if self.writable {
            self.commit()?;
        }

        self.closed = true;
        self.namespaces.clear();
        Ok(())
    }

    /// Whether [`AnnotatedStream::close`] has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether this instance was opened for writing.
    #[must_use]
    pub fn is_writer(&self) -> bool {
        self.writable
    }

    /// Size of the underlying stream in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.stream.as_ref().map_or(0, |stream| stream.size())
    }

    /// Number of table of contents entries, including shadowed duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.toc.len()
    }

    /// Whether no value has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toc.is_empty()
    }

    /// Whether values can currently be read.
    #[must_use]
    pub fn can_read(&self) -> bool {
        !self.closed && self.stream.as_ref().is_some_and(|stream| stream.can_read())
    }

    /// Whether values can currently be stored.
    #[must_use]
    pub fn can_write(&self) -> bool {
        !self.closed
            && self.writable
            && self.stream.as_ref().is_some_and(|stream| stream.can_write())
    }

    /// Byte order of the underlying stream.
    #[must_use]
    pub fn byte_order(&self) -> Option<crate::ByteOrder> {
        self.stream.as_ref().map(|stream| stream.byte_order())
    }

    /// The configuration this instance was opened with.
    #[must_use]
    pub fn config(&self) -> &AnnotatedConfig {
        &self.config
    }

    /// Close the annotated stream and hand back the underlying stream.
    ///
    /// # Errors
    /// Returns the error of [`AnnotatedStream::close`].
    pub fn into_inner(mut self) -> Result<S> {
        self.close()?;
        self.stream
            .take()
            .ok_or_else(|| invalid_operation!("the underlying stream was detached"))
    }

    fn prefix(&self) -> String {
        self.namespaces
            .iter()
            .map(|segment| format!("{segment}{SEPARATOR}"))
            .collect()
    }

    fn qualify(&self, name: &str) -> Result<String> {
        validate_segment(name)?;

        let qualified = format!("{}{}", self.prefix(), name);
        if qualified.len() > self.config.max_name_len {
            return Err(Error::InvalidArgument(format!(
                "qualified name of {} bytes exceeds the limit of {}",
                qualified.len(),
                self.config.max_name_len
            )));
        }
        Ok(qualified)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(invalid_operation!("annotated stream is closed"));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.ensure_open()?;
        if !self.writable {
            return Err(invalid_operation!(
                "annotated stream was opened for reading"
            ));
        }
        if !self.stream.as_ref().is_some_and(|stream| stream.can_write()) {
            return Err(invalid_operation!("underlying stream does not accept writes"));
        }
        Ok(())
    }

    fn ensure_readable(&self) -> Result<()> {
        self.ensure_open()?;
        if !self.stream.as_ref().is_some_and(|stream| stream.can_read()) {
            return Err(invalid_operation!("underlying stream does not allow reads"));
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<Option<TocEntry>> {
        self.ensure_readable()?;
        let qualified = self.qualify(name)?;

        match self.toc.lookup(&qualified) {
            Some(entry) => Ok(Some(entry.clone())),
            None if self.config.throw_on_missing => Err(Error::KeyNotFound(qualified)),
            None => Ok(None),
        }
    }

    fn append<F>(&mut self, name: &str, tag: TypeTag, write: F) -> Result<()>
    where
        F: FnOnce(&mut S) -> Result<()>,
    {
        self.ensure_writable()?;
        let qualified = self.qualify(name)?;

        let stream = attached(&mut self.stream)?;
        stream.seek(self.append_pos)?;
        write(stream)?;
        let end = stream.pos();

        self.toc.push(TocEntry {
            name: qualified,
            tag,
            offset: self.append_pos - self.base,
            length: end - self.append_pos,
        });
        self.append_pos = end;
        Ok(())
    }

    fn read_at<T, F>(&mut self, entry: &TocEntry, read: F) -> Result<T>
    where
        F: FnOnce(&mut S) -> Result<T>,
    {
        let stream = attached(&mut self.stream)?;
        let start = self.base + entry.offset;

        stream.seek(start)?;
        let result = read(stream);
        let consumed = stream.pos().saturating_sub(start);
        if self.writable {
            stream.seek(self.append_pos)?;
        }

        let value = result?;
        if consumed != entry.length {
            return Err(malformed_error!(
                "entry '{}' decoded {} bytes, the table of contents records {}",
                entry.name,
                consumed,
                entry.length
            ));
        }
        Ok(value)
    }

    fn commit(&mut self) -> Result<()> {
        let stream = attached(&mut self.stream)?;

        stream.seek(self.append_pos)?;
        self.toc.write_trailer(stream)?;
        let end = stream.pos();

        stream.seek(self.base)?;
        Preamble {
            order: stream.byte_order(),
            trailer_offset: self.append_pos - self.base,
            entry_count: self.toc.len() as u64,
        }
        .write(stream)?;
        stream.seek(end)?;
        stream.flush()?;

        log::debug!(
            "committed {} table of contents entries, {} bytes at offset {}",
            self.toc.len(),
            end - self.base,
            self.base
        );
        Ok(())
    }
}

impl<S: Stream> Drop for AnnotatedStream<S> {
    fn drop(&mut self) {
        if self.writable && !self.closed && self.stream.is_some() {
            if let Err(error) = self.close() {
                log::warn!("failed to commit annotated stream on drop: {error}");
            }
        }
    }
}

impl<S: Stream> fmt::Display for AnnotatedStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AnnotatedStream[")?;
        if let Some(stream) = &self.stream {
            writeln!(f, "  stream = {},", stream.to_string().replace('\n', "\n  "))?;
        }
        writeln!(f, "  mode = {},", if self.writable { "write" } else { "read" })?;
        writeln!(f, "  closed = {},", self.closed)?;
        writeln!(f, "  throw_on_missing = {},", self.config.throw_on_missing)?;
        writeln!(f, "  namespace = \"{}\",", self.namespace())?;
        writeln!(f, "  entries = {}", self.toc.len())?;
        write!(f, "]")
    }
}
