//! Manifest reader
//!
//! Turns YAML or JSON text into a [`Manifest`]. Text is first decoded into
//! a generic `serde_json::Value`, so both formats share one mapping onto
//! the typed model and one set of structural errors. Semantic problems
//! are left for the rule engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::Manifest;

/// Input encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` is JSON; anything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Structural failures. None of these reach the rule engine.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("YAML syntax error at line {line}, column {column}: {message}")]
    Yaml {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("JSON syntax error at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Document is empty")]
    EmptyDocument,

    #[error("Document root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("Invalid manifest structure: {0}")]
    Shape(String),
}

impl ReadError {
    /// Line and column, when the parser reported them
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Yaml { line, column, .. } | Self::Json { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

/// Parse manifest text in the given format
pub fn read_manifest_str(text: &str, format: Format) -> Result<Manifest, ReadError> {
    if text.trim().is_empty() {
        return Err(ReadError::EmptyDocument);
    }

    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Value>(text).map_err(yaml_error)?,
        Format::Json => serde_json::from_str::<Value>(text).map_err(|e| ReadError::Json {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?,
    };

    match &value {
        Value::Object(map) => debug!(keys = map.len(), ?format, "decoded manifest document"),
        Value::Null => return Err(ReadError::EmptyDocument),
        other => return Err(ReadError::NotAMapping(kind(other))),
    }

    serde_json::from_value(value).map_err(|e| ReadError::Shape(e.to_string()))
}

/// Read and parse a manifest file; the format follows the extension
pub fn read_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ReadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading manifest");

    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
        _ => ReadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    read_manifest_str(&text, Format::from_path(path))
}

fn yaml_error(e: serde_yaml::Error) -> ReadError {
    let (line, column) = e
        .location()
        .map(|loc| (loc.line(), loc.column()))
        .unwrap_or((0, 0));
    ReadError::Yaml {
        line,
        column,
        message: e.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
