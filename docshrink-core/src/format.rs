//! Document format detection
//!
//! Formats are identified purely by file extension, compared
//! case-insensitively. Content sniffing is left to the format handlers,
//! which fail with a format error when the bytes do not match.

use crate::error::{OptimizeError, Result};
use std::fmt;
use std::path::Path;

/// Extensions accepted for upload, with their leading dot.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pdf", ".docx", ".txt"];

/// A document format with a dedicated size-reduction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format, optimized by stream recompression
    Pdf,
    /// Office Open XML word-processing package, re-serialized
    Docx,
    /// UTF-8 plain text, trimmed of surrounding whitespace
    Txt,
}

impl DocumentFormat {
    /// All supported formats, in allow-list order
    pub const ALL: [DocumentFormat; 3] = [Self::Pdf, Self::Docx, Self::Txt];

    /// Parse an extension such as `"pdf"`, `".PDF"` or `".Docx"`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Detect the format of a path from its final extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        Self::from_extension(ext).ok_or_else(|| OptimizeError::UnsupportedType(suffix_of(path)))
    }

    /// Canonical lowercase extension, with leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Txt => ".txt",
        }
    }

    /// MIME type served on download
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        };
        f.pad(name)
    }
}

/// Lowercased suffix of a path with its dot, or an empty string.
pub fn suffix_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
