use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::model::{ImageId, RawLine};
use crate::ocr::LineSource;

/// Reads OCR output that was already extracted, one line per text line.
#[derive(Debug, Clone, Default)]
pub struct TextFileSource;

impl TextFileSource {
    pub fn new() -> Self {
        Self
    }
}

pub fn lines_from_text(image: &ImageId, text: &str) -> Vec<RawLine> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| RawLine::new(image.clone(), index, line))
        .collect()
}

impl LineSource for TextFileSource {
    fn name(&self) -> &str {
        "text"
    }

    fn extract_lines(&self, image: &ImageId, path: &Path) -> Result<Vec<RawLine>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read OCR text {}", path.display()))?;
        Ok(lines_from_text(image, &text))
    }
}
