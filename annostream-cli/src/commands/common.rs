use std::path::Path;

use annostream::{annotated::SEPARATOR, AnnotatedStream, FileStream, Value};
use anyhow::Context;
use serde::Serialize;

/// Open `path` read-only and parse the annotated region at its start.
pub fn open_reader(path: &Path) -> anyhow::Result<AnnotatedStream<FileStream>> {
    let stream = FileStream::new(path, true)
        .with_context(|| format!("failed to open file: {}", path.display()))?;

    AnnotatedStream::reader(stream, true)
        .with_context(|| format!("failed to parse annotated stream: {}", path.display()))
}

/// Push every segment of a dotted namespace path.
pub fn enter_scope(reader: &mut AnnotatedStream<FileStream>, scope: &str) -> anyhow::Result<()> {
    for segment in scope.split(SEPARATOR) {
        reader
            .push(segment)
            .with_context(|| format!("invalid namespace: {scope}"))?;
    }
    Ok(())
}

/// A stored value in a form that serializes naturally to JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ValueInfo {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<&Value> for ValueInfo {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(value) => ValueInfo::Bool(*value),
            Value::Integer(value) => ValueInfo::Integer(*value),
            Value::Float(value) => ValueInfo::Float(f64::from(*value)),
            Value::String(value) => ValueInfo::String(value.clone()),
        }
    }
}
