//! Configuration for annotated streams.

/// How an [`crate::AnnotatedStream`] treats its underlying stream on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Write mode on an empty stream, otherwise read mode starting at offset zero
    #[default]
    Auto,
    /// Parse an existing annotated region at the stream's current position
    Read,
    /// Start a new annotated region at the end of the stream
    Write,
}

/// Configuration for an [`crate::AnnotatedStream`].
///
/// The limits only apply when parsing a table of contents and protect against corrupt or
/// hostile input claiming absurd entry counts or name lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatedConfig {
    /// Raise [`crate::Error::KeyNotFound`] on lookup misses instead of returning `None`
    pub throw_on_missing: bool,

    /// Read or write selection
    pub mode: OpenMode,

    /// Maximum number of entries accepted from a trailer (default: 1 << 20)
    pub max_entries: u64,

    /// Maximum length in bytes of a qualified entry name (default: 4096)
    pub max_name_len: usize,
}

impl Default for AnnotatedConfig {
    fn default() -> Self {
        Self {
            throw_on_missing: true,
            mode: OpenMode::Auto,
            max_entries: 1 << 20,
            max_name_len: 4096,
        }
    }
}

impl AnnotatedConfig {
    /// Lookups of missing names fail with [`crate::Error::KeyNotFound`].
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lookups of missing names return `None` / `false`.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            throw_on_missing: false,
            ..Self::default()
        }
    }

    /// Same configuration with a different open mode.
    #[must_use]
    pub fn with_mode(self, mode: OpenMode) -> Self {
        Self { mode, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(AnnotatedConfig::strict().throw_on_missing);
        assert!(!AnnotatedConfig::lenient().throw_on_missing);
        assert_eq!(AnnotatedConfig::default().mode, OpenMode::Auto);
        assert_eq!(
            AnnotatedConfig::lenient().with_mode(OpenMode::Read).mode,
            OpenMode::Read
        );
    }
}
