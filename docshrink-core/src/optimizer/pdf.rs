//! PDF pass: rewrite the document with its streams Flate-compressed.
//!
//! Objects and page content are carried over as they are; only the stream
//! encoding changes. Streams that are already filtered are left alone by
//! `lopdf`, so recompression never stacks filters.

use super::Optimize;
use crate::error::Result;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfOptimizer;

impl Optimize for PdfOptimizer {
    fn optimize(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = lopdf::Document::load_mem(data)?;
        debug!(
            version = %doc.version,
            objects = doc.objects.len(),
            "Loaded PDF for recompression"
        );

        doc.compress();

        let mut output = Vec::with_capacity(data.len());
        doc.save_to(&mut output)?;
        Ok(output)
    }
}
