pub mod bridge;
pub mod cropper;
pub mod tesseract;
pub mod text_source;

pub use bridge::EasyOcrBridge;
pub use cropper::MagickCropper;
pub use tesseract::TesseractSource;
pub use text_source::TextFileSource;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::model::{ImageId, RawLine};

/// Anything that turns an image into ordered OCR lines.
pub trait LineSource: Send + Sync {
    fn name(&self) -> &str;
    fn extract_lines(&self, image: &ImageId, path: &Path) -> Result<Vec<RawLine>>;
}

/// Restricts a screenshot to the roster region.
pub trait ImageCropper: Send + Sync {
    fn crop(&self, image: &ImageId, path: &Path) -> Result<PathBuf>;
}
