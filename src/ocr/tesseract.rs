//! Legacy engine: the Tesseract command line tool with TSV output.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::model::{ImageId, RawLine};
use crate::ocr::LineSource;

#[derive(Debug, Clone)]
pub struct TesseractSource {
    executable: PathBuf,
    lang: String,
    psm: u8,
}

impl TesseractSource {
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            // single uniform block of text
            psm: 6,
        }
    }

    pub fn with_executable(mut self, executable: PathBuf) -> Self {
        self.executable = executable;
        self
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }
}

impl Default for TesseractSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for TesseractSource {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn extract_lines(&self, image: &ImageId, path: &Path) -> Result<Vec<RawLine>> {
        let output = Command::new(&self.executable)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("tsv")
            .output()
            .with_context(|| "failed to invoke tesseract; is it installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed: {stderr}");
        }

        Ok(parse_tsv(image, &String::from_utf8_lossy(&output.stdout)))
    }
}

struct PendingLine {
    id: (i32, i32, i32),
    words: Vec<String>,
    conf_sum: f32,
}

impl PendingLine {
    fn finish(self, image: &ImageId, index: usize) -> RawLine {
        let confidence = self.conf_sum / self.words.len() as f32 / 100.0;
        RawLine::new(image.clone(), index, self.words.join(" ")).with_confidence(confidence)
    }
}

/// Groups word rows (level 5) of Tesseract TSV output into lines.
/// Confidence is the mean word confidence scaled to [0, 1].
pub fn parse_tsv(image: &ImageId, tsv: &str) -> Vec<RawLine> {
    let mut lines = Vec::new();
    let mut current: Option<PendingLine> = None;

    // level, page, block, par, line, word, left, top, width, height, conf, text
    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }
        let level: i32 = fields[0].parse().unwrap_or(-1);
        let text = fields[11].trim();
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }
        let id = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );

        if let Some(line) = current.as_mut().filter(|line| line.id == id) {
            line.words.push(text.to_string());
            line.conf_sum += conf;
            continue;
        }
        if let Some(done) = current.take() {
            let index = lines.len();
            lines.push(done.finish(image, index));
        }
        current = Some(PendingLine {
            id,
            words: vec![text.to_string()],
            conf_sum: conf,
        });
    }

    if let Some(done) = current.take() {
        let index = lines.len();
        lines.push(done.finish(image, index));
    }
    lines
}
