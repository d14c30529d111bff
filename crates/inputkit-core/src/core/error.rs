use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised by format parsers when text does not match the layout they expect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn at_line(line: usize, message: impl AsRef<str>) -> Self {
        Self {
            message: format!("line {}: {}", line, message.as_ref()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{operation} has not been implemented in {type_name}")]
    NotImplemented {
        operation: &'static str,
        type_name: &'static str,
    },

    #[error("File already exists: {}", filename.display())]
    FileExists { filename: PathBuf },

    #[error("Unsupported operand for union with {type_name}")]
    UnsupportedMerge { type_name: &'static str },

    #[error("'{type_name}' object has no attribute '{name}'")]
    NoSuchAttribute {
        type_name: &'static str,
        name: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive error for '{}': {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to build structured form: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to read structured form: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("Expected structured form of class '{expected}', found '{found}'")]
    ClassMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("No parser registered for content class '{0}'")]
    UnknownContentClass(String),

    #[error("Invalid value for parameter '{name}': {source}")]
    InvalidParameter {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

impl InputError {
    pub fn not_implemented(operation: &'static str, type_name: &'static str) -> Self {
        Self::NotImplemented {
            operation,
            type_name,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Last path segment of a Rust type name, e.g. `KeyValueFile` for
/// `inputkit::core::io::keyvalue::KeyValueFile`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
