use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::Report;
use crate::export::Exporter;

/// Writes `players.csv` with columns name, power, status, images.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

const HEADER: [&str; 4] = ["name", "power", "status", "images"];

/// Header is written up front so an empty roster still yields a valid table.
pub fn to_csv(report: &Report) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in report.rows() {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for CsvExporter {
    fn export(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("players.csv");
        let data = to_csv(report)?;
        fs::write(&path, data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
