//! DOCX pass: re-serialize the OOXML package.
//!
//! Every part is copied byte-for-byte into a fresh archive with Deflate
//! compression. Packages written with stored (uncompressed) entries or a
//! weak compressor get smaller; already well-compressed ones change little
//! and may grow slightly.

use super::Optimize;
use crate::error::{OptimizeError, Result};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Parts a word-processing package cannot be opened without
const REQUIRED_PARTS: [&str; 2] = ["[Content_Types].xml", "word/document.xml"];

/// Largest decompressed size accepted for a single part
pub const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

/// Largest decompressed size accepted for all parts together
pub const MAX_PACKAGE_SIZE: u64 = 256 * 1024 * 1024;

/// Re-serializes packages, refusing any whose parts inflate past the limits.
#[derive(Debug, Clone, Copy)]
pub struct DocxOptimizer {
    max_part_size: u64,
    max_package_size: u64,
}

impl Default for DocxOptimizer {
    fn default() -> Self {
        Self::with_limits(MAX_PART_SIZE, MAX_PACKAGE_SIZE)
    }
}

impl DocxOptimizer {
    pub fn with_limits(max_part_size: u64, max_package_size: u64) -> Self {
        Self {
            max_part_size,
            max_package_size,
        }
    }
}

impl Optimize for DocxOptimizer {
    fn optimize(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        for part in REQUIRED_PARTS {
            if !archive.file_names().any(|name| name == part) {
                return Err(OptimizeError::MissingDocxPart(part));
            }
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(data.len())));
        let mut buffer = Vec::new();
        let mut expanded: u64 = 0;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }

            // Entry headers can understate the inflated size, so the read itself is capped.
            let limit = self
                .max_part_size
                .min(self.max_package_size.saturating_sub(expanded));
            buffer.clear();
            (&mut entry).take(limit.saturating_add(1)).read_to_end(&mut buffer)?;
            if buffer.len() as u64 > limit {
                return Err(OptimizeError::DocxTooLarge { part: name, limit });
            }
            expanded += buffer.len() as u64;

            writer.start_file(name, options)?;
            writer.write_all(&buffer)?;
        }

        let output = writer.finish()?.into_inner();
        debug!(
            parts = archive.len(),
            original_size = data.len(),
            optimized_size = output.len(),
            "Re-serialized DOCX package"
        );
        Ok(output)
    }
}
