use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::Report;
use crate::export::Exporter;

/// Writes `report.json`: every record, the clean and flagged partitions and
/// the review list.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

pub fn to_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize roster report")
}

impl Exporter for JsonExporter {
    fn export(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        let path = self.out_dir.join("report.json");
        let data = to_json(report)?;
        fs::write(&path, data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
