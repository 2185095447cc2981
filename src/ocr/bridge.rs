use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::model::{ImageId, RawLine};
use crate::ocr::LineSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrFragment {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Runs EasyOCR through a small python script that prints
/// `[{"text": ..., "confidence": ...}]` in reading order.
#[derive(Debug, Clone)]
pub struct EasyOcrBridge {
    python: PathBuf,
    script_path: PathBuf,
    lang: String,
}

impl EasyOcrBridge {
    pub fn new() -> Self {
        Self {
            python: PathBuf::from("python3"),
            script_path: PathBuf::from("ocr/bridge/easyocr_bridge.py"),
            lang: "en".to_string(),
        }
    }

    pub fn with_script(mut self, script_path: PathBuf) -> Self {
        self.script_path = script_path;
        self
    }

    pub fn with_python(mut self, python: PathBuf) -> Self {
        self.python = python;
        self
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    pub fn run(&self, image_path: &Path) -> Result<Vec<OcrFragment>> {
        let output = Command::new(&self.python)
            .arg(&self.script_path)
            .arg("--image")
            .arg(image_path)
            .arg("--lang")
            .arg(&self.lang)
            .output()
            .with_context(|| "failed to invoke python OCR bridge")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("OCR bridge failed: {stderr}");
        }

        parse_bridge_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for EasyOcrBridge {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_bridge_output(stdout: &str) -> Result<Vec<OcrFragment>> {
    serde_json::from_str(stdout.trim()).with_context(|| "failed to parse OCR JSON response")
}

impl LineSource for EasyOcrBridge {
    fn name(&self) -> &str {
        "easyocr"
    }

    fn extract_lines(&self, image: &ImageId, path: &Path) -> Result<Vec<RawLine>> {
        let fragments = self.run(path)?;
        Ok(fragments
            .into_iter()
            .enumerate()
            .map(|(index, fragment)| RawLine {
                text: fragment.text,
                image: image.clone(),
                index,
                confidence: fragment.confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fragments_with_optional_confidence() {
        let fragments =
            parse_bridge_output(r#"[{"text": "Axel", "confidence": 0.91}, {"text": "4,200,000"}]"#)
                .unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].confidence, Some(0.91));
        assert_eq!(fragments[1].text, "4,200,000");
        assert_eq!(fragments[1].confidence, None);
    }

    #[test]
    fn rejects_non_json_output() {
        assert!(parse_bridge_output("Traceback (most recent call last)").is_err());
    }

    #[test]
    #[ignore] // needs python3 with easyocr installed
    fn missing_image_fails() {
        let bridge = EasyOcrBridge::new();
        let result = bridge.extract_lines(&ImageId::new(0, "nope"), Path::new("does/not/exist.png"));
        assert!(result.is_err());
    }
}
