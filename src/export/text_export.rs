use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::Report;
use crate::export::Exporter;

/// Writes `players.txt`, one `Name,Power` line per player, ready to paste.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

pub fn clipboard_text(report: &Report) -> String {
    report
        .records
        .iter()
        .map(|record| format!("{},{}\n", record.name, record.power))
        .collect()
}

/// Aligned plain-text table of every record followed by the review list.
pub fn render_table(report: &Report) -> String {
    let name_w = report
        .records
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("Player Name".len()))
        .max()
        .unwrap_or(0);
    let power_w = report
        .records
        .iter()
        .map(|r| r.power.to_string().len())
        .chain(std::iter::once("Power".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_w$} | {:>power_w$} | {:<7} | Images\n",
        "Player Name", "Power", "Status"
    ));
    out.push_str(&format!(
        "{}-+-{}-+-{}-+-------\n",
        "-".repeat(name_w),
        "-".repeat(power_w),
        "-".repeat(7)
    ));
    for record in &report.records {
        out.push_str(&format!(
            "{:<name_w$} | {:>power_w$} | {:<7} | {}\n",
            record.name,
            record.power,
            record.status.to_string(),
            record.images.len()
        ));
    }

    if !report.review.is_empty() {
        out.push_str("\nFor review:\n");
        for entry in &report.review {
            let line = entry
                .line_index
                .map(|idx| format!(" line {}", idx + 1))
                .unwrap_or_default();
            out.push_str(&format!(
                "  - [{}{}] '{}' -> {}\n",
                entry.image, line, entry.raw_text, entry.reason
            ));
        }
    }
    out
}

impl Exporter for TextExporter {
    fn export(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("players.txt"), clipboard_text(report))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::core::model::{ImageId, PlayerRecord, RecordStatus, ReviewEntry, Verdict};
    use crate::report::build_report;
    use pretty_assertions::assert_eq;

    fn report() -> Report {
        build_report(&[
            PlayerRecord {
                name: "Bea".to_string(),
                key: "bea".to_string(),
                power: 3_900_000,
                status: RecordStatus::Valid,
                basis: Verdict::Valid,
                images: BTreeSet::from([ImageId::new(0, "a.png")]),
            },
            PlayerRecord {
                name: "Axel".to_string(),
                key: "axel".to_string(),
                power: 4_500_000,
                status: RecordStatus::Valid,
                basis: Verdict::Valid,
                images: BTreeSet::from([ImageId::new(0, "a.png")]),
            },
        ])
    }

    #[test]
    fn clipboard_lines_follow_report_order() {
        assert_eq!(clipboard_text(&report()), "Axel,4500000\nBea,3900000\n");
    }

    #[test]
    fn table_lists_records_and_review() {
        let report = report().with_review(vec![ReviewEntry::for_image(
            &ImageId::new(1, "b.png"),
            "decode failed",
        )]);
        let table = render_table(&report);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("Player Name |"));
        assert!(lines[0].contains("Power"));
        assert!(lines[2].starts_with("Axel"));
        assert!(lines[3].starts_with("Bea"));
        assert!(table.contains("[#2 b.png] '' -> image failed: decode failed"));
    }
}
