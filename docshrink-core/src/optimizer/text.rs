//! Plain text pass: normalize line endings and trim surrounding whitespace.

use super::Optimize;
use crate::error::Result;

/// Trims leading and trailing whitespace from UTF-8 text.
///
/// Line endings are normalized to `\n` first, so `\r\n` and lone `\r`
/// both shrink to a single byte. No trailing newline is written back.
/// See [`is_strippable`] for the trimmed set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextOptimizer;

impl Optimize for TextOptimizer {
    fn optimize(&self, data: &[u8]) -> Result<Vec<u8>> {
        let text = String::from_utf8(data.to_vec())?;
        let normalized = normalize_newlines(&text);
        Ok(normalized.trim_matches(is_strippable).as_bytes().to_vec())
    }
}

/// Unicode `White_Space` plus the ASCII information separators
/// (`U+001C..=U+001F`), which text tools commonly treat as line breaks.
pub fn is_strippable(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
