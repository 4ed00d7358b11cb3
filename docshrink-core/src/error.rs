use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(#[from] lopdf::Error),

    #[error("Invalid DOCX: {0}")]
    InvalidDocx(#[from] zip::result::ZipError),

    #[error("Invalid DOCX: missing required part {0}")]
    MissingDocxPart(&'static str),

    #[error("Invalid DOCX: part {part} expands beyond {limit} bytes")]
    DocxTooLarge { part: String, limit: u64 },

    #[error("Upload and output directories must differ: {}", .0.display())]
    SharedDirectory(PathBuf),

    #[error("Invalid text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),
}

impl OptimizeError {
    /// True when the input itself is at fault (wrong type or name) rather
    /// than the document contents or the filesystem.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OptimizeError::UnsupportedType(_) | OptimizeError::InvalidFilename(_)
        )
    }

    /// True for failures raised while decoding the document contents.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            OptimizeError::InvalidPdf(_)
                | OptimizeError::InvalidDocx(_)
                | OptimizeError::MissingDocxPart(_)
                | OptimizeError::DocxTooLarge { .. }
                | OptimizeError::InvalidText(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
