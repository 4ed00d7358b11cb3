//! # docshrink
//!
//! Format-specific size reduction for uploaded documents.
//!
//! ## Features
//!
//! - **PDF**: rewrite with Flate-compressed streams, page content untouched
//! - **DOCX**: re-serialize the OOXML package with Deflate
//! - **TXT**: normalize line endings and trim surrounding whitespace
//! - **Storage**: explicit input/output directories keyed by filename
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshrink::{Result, Storage};
//!
//! # fn main() -> Result<()> {
//! let storage = Storage::new("uploads", "compressed");
//! storage.init()?;
//!
//! let input = storage.save_upload("notes.txt", b"  hello world  \n")?;
//! let report = storage.optimizer().optimize(&input)?;
//!
//! println!(
//!     "{} -> {} bytes",
//!     report.original_size, report.optimized_size
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Output files keep the input filename and extension; a format is never
//! converted into another.

pub mod error;
pub mod format;
pub mod optimizer;
pub mod storage;

pub use error::{OptimizeError, Result};
pub use format::{DocumentFormat, ALLOWED_EXTENSIONS};
pub use optimizer::{optimize_bytes, Optimize, OptimizationReport, Optimizer};
pub use storage::{validate_filename, Storage};

/// Current version of docshrink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default ceiling for a single upload: 10 MiB
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_UPLOAD_SIZE, 10_485_760);
        assert_eq!(ALLOWED_EXTENSIONS, [".pdf", ".docx", ".txt"]);
    }

    #[test]
    fn test_optimize_bytes_dispatch() {
        let out = optimize_bytes(DocumentFormat::Txt, b"\n x \n").unwrap();
        assert_eq!(out, b"x");

        assert!(matches!(
            optimize_bytes(DocumentFormat::Pdf, b"nope"),
            Err(OptimizeError::InvalidPdf(_))
        ));
        assert!(matches!(
            optimize_bytes(DocumentFormat::Docx, b"nope"),
            Err(OptimizeError::InvalidDocx(_))
        ));
    }
}
