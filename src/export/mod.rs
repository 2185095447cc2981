pub mod csv_export;
pub mod html_review_export;
pub mod json_export;
pub mod text_export;

use anyhow::Result;

use crate::core::model::Report;

pub use csv_export::CsvExporter;
pub use html_review_export::HtmlReviewExporter;
pub use json_export::JsonExporter;
pub use text_export::{clipboard_text, render_table, TextExporter};

pub trait Exporter {
    fn export(&self, report: &Report) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
    Html,
}

pub fn exporter_for(format: ExportFormat, out_dir: std::path::PathBuf) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter::new(out_dir)),
        ExportFormat::Json => Box::new(JsonExporter::new(out_dir)),
        ExportFormat::Text => Box::new(TextExporter::new(out_dir)),
        ExportFormat::Html => Box::new(HtmlReviewExporter::new(out_dir)),
    }
}
