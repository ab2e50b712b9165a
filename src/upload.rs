//! File upload and export helpers
//!
//! The conversion core only sees strings. This module is the thin layer
//! around it that deals with files: deciding whether a file is accepted,
//! describing it for display, reading and decoding it, and writing the
//! converted result as `<stem>.html`.
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::upload::{export_file_name, format_file_size, validate_file_type};
//!
//! assert!(validate_file_type("README.md", None, &[]));
//! assert!(!validate_file_type("photo.png", Some("image/png"), &[]));
//! assert_eq!(format_file_size(1536), "1.5 KB");
//! assert_eq!(export_file_name("notes.md"), "notes.html");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::charset::decode_document;
use crate::content_type::{ContentType, detect_content_type};
use crate::error::ConversionError;
use crate::security::SanitizedHtml;

/// MIME types and extensions accepted for conversion
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/html",
    ".txt",
    ".md",
    ".markdown",
    ".html",
    ".htm",
];

/// MIME type of exported files, for collaborators that serve or download them
pub const EXPORT_MIME_TYPE: &str = "text/html";

/// Stem used when an export has no usable source name
pub const DEFAULT_EXPORT_STEM: &str = "converted";

/// Inserted before `.html` when the export would reuse the source's own name
pub const CONVERTED_SUFFIX: &str = ".converted";

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Check whether a file may be converted
///
/// Entries starting with `.` are matched against the end of the lowercased
/// file name; other entries are matched exactly against the lowercased MIME
/// type. An empty `allowed` list means [`DEFAULT_ALLOWED_TYPES`].
pub fn validate_file_type(name: &str, mime_type: Option<&str>, allowed: &[&str]) -> bool {
    let allowed = if allowed.is_empty() {
        DEFAULT_ALLOWED_TYPES
    } else {
        allowed
    };
    let name = name.to_lowercase();
    let mime_type = mime_type.map(str::to_lowercase);

    allowed.iter().any(|entry| {
        if entry.starts_with('.') {
            name.ends_with(&entry.to_lowercase())
        } else {
            mime_type.as_deref() == Some(entry.to_lowercase().as_str())
        }
    })
}

/// Human-readable file size in base-1024 units
///
/// At most two decimals, without trailing zeros. Sizes beyond gigabytes are
/// still expressed in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Name of the exported file: the source name without its final extension,
/// plus `.html`
///
/// ```rust
/// use doc_html_converter::upload::export_file_name;
///
/// assert_eq!(export_file_name("report.final.txt"), "report.final.html");
/// assert_eq!(export_file_name("document"), "document.html");
/// assert_eq!(export_file_name(""), "converted.html");
/// ```
pub fn export_file_name(source_name: &str) -> String {
    let base = Path::new(source_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    };

    if stem.is_empty() {
        format!("{DEFAULT_EXPORT_STEM}.html")
    } else {
        format!("{stem}.html")
    }
}

/// Where the export of `source_name` goes inside `directory`
///
/// An HTML source would map onto its own name, so its export becomes
/// `<stem>.converted.html` and the source is never replaced.
///
/// ```rust
/// use std::path::Path;
/// use doc_html_converter::upload::export_path;
///
/// let dir = Path::new("out");
/// assert_eq!(export_path(dir, "notes.md"), dir.join("notes.html"));
/// assert_eq!(export_path(dir, "page.html"), dir.join("page.converted.html"));
/// assert_eq!(export_path(dir, "page.htm"), dir.join("page.html"));
/// ```
pub fn export_path(directory: &Path, source_name: &str) -> PathBuf {
    let file_name = export_file_name(source_name);
    let source_base = Path::new(source_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    if source_base.eq_ignore_ascii_case(&file_name) {
        let stem = file_name.strip_suffix(".html").unwrap_or(&file_name);
        return directory.join(format!("{stem}{CONVERTED_SUFFIX}.html"));
    }

    directory.join(file_name)
}

/// Description of an uploaded file, held for display only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub content_type: ContentType,
}

impl FileDescriptor {
    /// Describe a file from its name and size
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let content_type = detect_content_type(Some(&name));
        Self {
            name,
            size,
            content_type,
        }
    }

    /// Describe a file on disk
    ///
    /// # Errors
    ///
    /// - `ConversionError::InvalidInput`: the path has no file name
    /// - `ConversionError::Io`: the file metadata cannot be read
    pub fn from_path(path: &Path) -> Result<Self, ConversionError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ConversionError::InvalidInput(format!("{} has no file name", path.display()))
            })?;
        let size = fs::metadata(path)?.len();
        Ok(Self::new(name, size))
    }

    /// Size formatted for display
    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// A validated, decoded upload ready for conversion
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub descriptor: FileDescriptor,
    pub content: String,
}

/// Read a file as text, decoding it per its detected content type
///
/// # Errors
///
/// - `ConversionError::Io`: the file cannot be read
pub fn read_file_as_text(path: &Path) -> Result<String, ConversionError> {
    let bytes = fs::read(path)?;
    let content_type = detect_content_type(path.file_name().and_then(|name| name.to_str()));
    Ok(decode_document(&bytes, content_type).text)
}

/// Validate and read an uploaded file
///
/// # Errors
///
/// - `ConversionError::UnsupportedFile`: the file type is not accepted
/// - `ConversionError::Io`: the file cannot be read
pub fn load_file(path: &Path) -> Result<LoadedFile, ConversionError> {
    let descriptor = FileDescriptor::from_path(path)?;

    if !validate_file_type(&descriptor.name, None, &[]) {
        tracing::warn!(file = %descriptor.name, "rejected upload with unsupported file type");
        return Err(ConversionError::UnsupportedFile(descriptor.name));
    }

    let content = read_file_as_text(path)?;
    tracing::debug!(
        file = %descriptor.name,
        size = %descriptor.display_size(),
        content_type = %descriptor.content_type,
        "loaded upload"
    );

    Ok(LoadedFile {
        descriptor,
        content,
    })
}

/// Write converted HTML to [`export_path`] inside `directory`
///
/// Returns the path that was written. Only sanitized HTML can be exported.
///
/// # Errors
///
/// - `ConversionError::Io`: the file cannot be written
pub fn export_html(
    directory: &Path,
    source_name: &str,
    html: &SanitizedHtml,
) -> Result<PathBuf, ConversionError> {
    let path = export_path(directory, source_name);
    fs::write(&path, html.as_str())?;
    tracing::debug!(path = %path.display(), bytes = html.as_str().len(), "exported HTML");
    Ok(path)
}
