//! Optimizer dispatcher
//!
//! Routes a document to the size-reduction pass for its format. Each pass
//! is an in-memory transformation behind [`Optimize`]; [`Optimizer`] adds
//! the file lifecycle around it: read the input, run the pass, write
//! exactly one output named after the input.

pub mod docx;
pub mod pdf;
pub mod text;

pub use docx::DocxOptimizer;
pub use pdf::PdfOptimizer;
pub use text::TextOptimizer;

use crate::error::{OptimizeError, Result};
use crate::format::DocumentFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A format-specific size-reduction pass
pub trait Optimize {
    /// Produce the reduced form of `data`. Never changes the format.
    fn optimize(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Run the pass for `format` over an in-memory document.
pub fn optimize_bytes(format: DocumentFormat, data: &[u8]) -> Result<Vec<u8>> {
    match format {
        DocumentFormat::Pdf => PdfOptimizer.optimize(data),
        DocumentFormat::Docx => DocxOptimizer::default().optimize(data),
        DocumentFormat::Txt => TextOptimizer.optimize(data),
    }
}

/// Outcome of a single optimization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationReport {
    pub format: DocumentFormat,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub original_size: u64,
    pub optimized_size: u64,
}

impl OptimizationReport {
    /// Output filename, which is always the input filename
    pub fn output_filename(&self) -> Option<&str> {
        self.output_path.file_name().and_then(|name| name.to_str())
    }

    /// Bytes removed; zero when the pass made the file larger
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.optimized_size)
    }

    /// Optimized size as a fraction of the original size
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.optimized_size as f64 / self.original_size as f64
    }
}

/// Dispatches files to their format pass and writes into an output directory
#[derive(Debug, Clone)]
pub struct Optimizer {
    output_dir: PathBuf,
}

impl Optimizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Optimize the file at `input`, writing the result into the output
    /// directory under the same filename. The input file is left in place.
    pub fn optimize(&self, input: impl AsRef<Path>) -> Result<OptimizationReport> {
        let input = input.as_ref();
        let format = DocumentFormat::from_path(input)?;
        let filename = input
            .file_name()
            .ok_or_else(|| OptimizeError::InvalidFilename(input.display().to_string()))?;
        let output_path = self.output_dir.join(filename);

        debug!(
            input = %input.display(),
            output = %output_path.display(),
            %format,
            "Dispatching optimization"
        );

        let data = fs::read(input)?;
        let optimized = optimize_bytes(format, &data)?;
        fs::write(&output_path, &optimized)?;

        let report = OptimizationReport {
            format,
            input_path: input.to_path_buf(),
            output_path,
            original_size: data.len() as u64,
            optimized_size: optimized.len() as u64,
        };

        info!(
            file = %report.output_path.display(),
            %format,
            original_size = report.original_size,
            optimized_size = report.optimized_size,
            "Optimized document"
        );

        Ok(report)
    }
}
