//! # annostream Prelude
//!
//! The types and traits most programs need, importable in one line:
//!
//! ```rust
//! use annostream::prelude::*;
//!
//! let mut stream = MemoryStream::default();
//! stream.write(&7_i64)?;
//! assert_eq!(stream.size(), 8);
//! # Ok::<(), annostream::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

// ================================================================================================
// Streams
// ================================================================================================

/// Stream contract and typed extension methods
pub use crate::stream::{Stream, StreamExt};

/// Stream backends
pub use crate::stream::{DummyStream, FileStream, MemoryStream};

/// Encoding controls
pub use crate::stream::{host_byte_order, Access, ByteOrder};

/// Scalar types understood by the wire format
pub use crate::stream::{Float, Serializable, TypeTag, Value};

// ================================================================================================
// Annotated Serialization
// ================================================================================================

/// Named serialization and its configuration
pub use crate::annotated::{AnnotatedConfig, AnnotatedStream, OpenMode, TocEntry};
