use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::model::ImageId;
use crate::ocr::ImageCropper;

pub const DEFAULT_GEOMETRY: &str = "417x380+447+170";

/// Crops screenshots with ImageMagick using a fixed geometry.
#[derive(Debug, Clone)]
pub struct MagickCropper {
    out_dir: PathBuf,
    geometry: String,
}

impl MagickCropper {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            geometry: DEFAULT_GEOMETRY.to_string(),
        }
    }

    pub fn with_geometry(mut self, geometry: String) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn output_path(&self, image: &ImageId, path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.png", image.ordinal + 1));
        self.out_dir
            .join(format!("{:02}_{}", image.ordinal + 1, file_name))
    }
}

impl ImageCropper for MagickCropper {
    fn crop(&self, image: &ImageId, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let target = self.output_path(image, path);

        let status = Command::new("magick")
            .arg(path)
            .arg("-crop")
            .arg(&self.geometry)
            .arg("+repage")
            .arg(&target)
            .status()
            .with_context(|| "failed to invoke magick; is ImageMagick installed?")?;

        if !status.success() {
            anyhow::bail!("magick failed with status: {status}");
        }
        if !target.exists() {
            anyhow::bail!("expected cropped image not found: {}", target.display());
        }

        Ok(target)
    }
}
