//! Dynamically typed values and their type tags.
//!
//! [`Value`] is the tagged counterpart of the [`crate::stream::io::Serializable`] types. It is
//! what a scripting host passes around when it does not know the static type of an entry, and
//! what [`crate::AnnotatedStream::get_value`] returns after consulting the stored type tag.

use std::fmt;

use strum::{Display, EnumIter};

use crate::{
    stream::{
        io::{read_primitive, Float, Serializable},
        Stream,
    },
    Error, Result,
};

/// Identifies the type of a serialized value.
///
/// The discriminant is the byte written to an annotated table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum TypeTag {
    /// `bool`
    #[strum(serialize = "bool")]
    Bool = 0,
    /// `i64`
    #[strum(serialize = "integer")]
    Integer = 1,
    /// [`Float`]
    #[strum(serialize = "float")]
    Float = 2,
    /// `String`
    #[strum(serialize = "string")]
    String = 3,
}

impl TypeTag {
    /// The byte representing this tag on the wire.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TypeTag::Bool),
            1 => Ok(TypeTag::Integer),
            2 => Ok(TypeTag::Float),
            3 => Ok(TypeTag::String),
            other => Err(Error::UnsupportedType(other)),
        }
    }
}

/// A single value of one of the supported types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean
    Bool(bool),
    /// A 64-bit signed integer
    Integer(i64),
    /// A floating point scalar
    Float(Float),
    /// A UTF-8 string
    String(String),
}

impl Value {
    /// The type tag of this value.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
        }
    }

    /// Serialize the contained value at the stream's current position.
    ///
    /// # Errors
    /// Returns whatever the stream reports for the underlying write.
    pub fn serialize<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        match self {
            Value::Bool(value) => value.serialize(stream),
            Value::Integer(value) => value.serialize(stream),
            Value::Float(value) => value.serialize(stream),
            Value::String(value) => value.serialize(stream),
        }
    }

    /// Deserialize a value of the given type from the stream's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Read`] if the stream holds too few bytes or invalid data.
    pub fn deserialize<S: Stream + ?Sized>(stream: &mut S, tag: TypeTag) -> Result<Value> {
        Ok(match tag {
            TypeTag::Bool => Value::Bool(bool::deserialize(stream)?),
            TypeTag::Integer => Value::Integer(read_primitive(stream)?),
            TypeTag::Float => Value::Float(read_primitive(stream)?),
            TypeTag::String => Value::String(String::deserialize(stream)?),
        })
    }

    /// Returns the boolean, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Integer`].
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float, if this is a [`Value::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<Float> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "\"{}\"", value.escape_debug()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Float> for Value {
    fn from(value: Float) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}
