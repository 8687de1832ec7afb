// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # annostream
//!
//! Byte-order aware binary streams and a named, self-describing serialization format on top of
//! them.
//!
//! ## Features
//!
//! - **Uniform stream contract** - [`Stream`] with reading, writing, seeking and truncation over
//!   interchangeable backends
//! - **Three backends** - [`MemoryStream`] (growable buffer), [`FileStream`] (file on disk) and
//!   [`DummyStream`] (measures sizes without storing anything)
//! - **Explicit byte order** - every multi-byte scalar is encoded in the stream's
//!   [`ByteOrder`], independent of the host
//! - **Named values** - [`AnnotatedStream`] stores typed values under hierarchical names and
//!   writes a table of contents so readers can look them up directly
//!
//! ## Quick Start
//!
//! ```rust
//! use annostream::prelude::*;
//!
//! let mut stream = MemoryStream::default();
//! stream.set_byte_order(ByteOrder::BigEndian);
//!
//! let mut writer = AnnotatedStream::new(&mut stream, true)?;
//! writer.set("version", &3_i64)?;
//! writer.push("header")?;
//! writer.set("title", &"scene".to_string())?;
//! writer.pop()?;
//! writer.close()?;
//! drop(writer);
//!
//! let mut reader = AnnotatedStream::new(&mut stream, true)?;
//! reader.push("header")?;
//! assert_eq!(reader.get::<String>("title")?.as_deref(), Some("scene"));
//! # Ok::<(), annostream::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`stream`] - the [`Stream`] contract, its backends and the scalar wire encoding
//! - [`annotated`] - the named serialization layer and its table of contents format
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] with the crate-wide [`Error`] type. Nothing is retried
//! internally; a failed operation reports to its immediate caller.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Committing and parsing a table of contents logs
//! at `debug`; failures that cannot be returned (flushing or committing inside `Drop`) log at
//! `warn`.

#[macro_use]
pub(crate) mod error;

/// Binary stream contract and its backends.
///
/// # Examples
///
/// ```rust
/// use annostream::stream::{ByteOrder, MemoryStream, Stream, StreamExt};
///
/// let mut stream = MemoryStream::default();
/// stream.set_byte_order(ByteOrder::BigEndian);
/// stream.write(&1_i64)?;
/// assert_eq!(stream.data(), &[0, 0, 0, 0, 0, 0, 0, 1]);
/// # Ok::<(), annostream::Error>(())
/// ```
pub mod stream;

/// Named serialization with a table of contents.
pub mod annotated;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// `Result<T, Error>`
///
/// Provides a convenient alias for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type shared by every module.
pub use error::Error;

pub use stream::{
    host_byte_order, Access, ByteOrder, DummyStream, FileStream, Float, MemoryStream,
    Serializable, Stream, StreamExt, TypeTag, Value,
};

pub use annotated::{AnnotatedConfig, AnnotatedStream, OpenMode, TocEntry};
