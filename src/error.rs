use thiserror::Error;

use crate::stream::TypeTag;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! read_error {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        crate::Error::Read(format!($fmt $(, $arg)*))
    };
}

macro_rules! invalid_operation {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        crate::Error::InvalidOperation(format!($fmt $(, $arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is surfaced to the immediate caller. There is no internal retry and no silent
/// recovery; the only soft-failure path is [`crate::AnnotatedStream`] lookups configured with
/// `throw_on_missing = false`, which report a miss as `None` / `false` instead of
/// [`Error::KeyNotFound`].
///
/// # Error Categories
///
/// ## Stream Errors
/// - [`Error::Io`] - The operating system rejected a file operation
/// - [`Error::Read`] - Not enough data, or data that does not decode
/// - [`Error::Write`] - The backend refused or could not complete a write
///
/// ## Usage Errors
/// - [`Error::InvalidOperation`] - The operation is not valid in the current state
/// - [`Error::InvalidArgument`] - A constructor or name argument is malformed
/// - [`Error::UnsupportedType`] - A type tag outside the supported scalar set
/// - [`Error::TypeMismatch`] - A named entry was read back as a different type
/// - [`Error::KeyNotFound`] - A named lookup missed with `throw_on_missing` enabled
///
/// ## Format Errors
/// - [`Error::Malformed`] - A corrupt annotated preamble or table of contents
///
/// # Examples
///
/// ```rust
/// use annostream::{AnnotatedStream, Error, MemoryStream};
///
/// let mut stream = MemoryStream::default();
/// let mut annotated = AnnotatedStream::new(&mut stream, true)?;
///
/// match annotated.get::<i64>("missing") {
///     Err(Error::KeyNotFound(name)) => println!("no entry named {name}"),
///     Err(other) => return Err(other),
///     Ok(value) => println!("found {value:?}"),
/// }
/// # Ok::<(), annostream::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    ///
    /// Wraps standard I/O errors such as permission problems, missing files or a full disk.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A read could not be satisfied.
    ///
    /// Raised when fewer bytes remain than the requested value needs, when the backend holds
    /// no data at all ([`crate::DummyStream`]), or when the bytes do not form a valid value
    /// (a boolean byte other than 0/1, a string that is not UTF-8).
    #[error("Read error - {0}")]
    Read(String),

    /// A write could not be completed.
    #[error("Write error - {0}")]
    Write(String),

    /// The operation is not valid for the current state of the object.
    ///
    /// Examples are writing to a read-only [`crate::FileStream`], calling `set` on a closed
    /// [`crate::AnnotatedStream`] or popping an empty namespace stack.
    #[error("Invalid operation - {0}")]
    InvalidOperation(String),

    /// A named entry was not found and the stream was configured to raise on misses.
    #[error("Key not found - {0}")]
    KeyNotFound(String),

    /// A malformed argument, e.g. a zero capacity hint or an empty namespace name.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// A value type outside the supported set of bool, integer, float and string.
    ///
    /// The associated value is the raw type tag byte that was encountered.
    #[error("Unsupported type tag - {0}")]
    UnsupportedType(u8),

    /// An entry was requested as a different type than it was stored with.
    #[error("Type mismatch for '{name}' - stored as {found}, requested {expected}")]
    TypeMismatch {
        /// The fully qualified name of the entry
        name: String,
        /// The type the caller asked for
        expected: TypeTag,
        /// The type recorded in the table of contents
        found: TypeTag,
    },

    /// The annotated data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
