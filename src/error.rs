//! Error types for conversion, upload and export operations

use std::fmt;

/// Errors that can occur while converting or exporting a document
///
/// Converter-level variants never reach callers of the top-level conversion
/// functions: those degrade to a safe default instead. Upload and export
/// variants are surfaced to the user by the collaborator that owns the file.
#[derive(Debug)]
pub enum ConversionError {
    /// Serializing a sanitized DOM tree failed
    SerializeError(String),
    /// File type is not accepted for conversion
    UnsupportedFile(String),
    /// Reading or writing a file failed
    Io(std::io::Error),
    /// Invalid input data
    InvalidInput(String),
    /// Internal error
    InternalError(String),
}

impl ConversionError {
    /// Get numeric error code (used as the CLI exit status)
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::SerializeError(_) => 3,
            ConversionError::UnsupportedFile(_) => 4,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::Io(_) => 6,
            ConversionError::InternalError(_) => 99,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::SerializeError(msg) => write!(f, "Serialize error: {}", msg),
            ConversionError::UnsupportedFile(name) => write!(
                f,
                "Unsupported file '{}': please upload a .txt, .md or .html file",
                name
            ),
            ConversionError::Io(err) => write!(f, "I/O error: {}", err),
            ConversionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ConversionError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::Io(err)
    }
}
