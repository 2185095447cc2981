use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{PlayerRecord, RecordStatus, Report, ReviewEntry};
use crate::export::Exporter;

/// Writes `review.html`: the player table with suspect rows highlighted and
/// the raw lines that need a human look.
#[derive(Debug, Clone)]
pub struct HtmlReviewExporter {
    out_dir: PathBuf,
}

impl HtmlReviewExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn record_row(record: &PlayerRecord) -> String {
        let class = match record.status {
            RecordStatus::Valid => "valid",
            RecordStatus::Suspect => "suspect",
        };
        let images = record
            .images
            .iter()
            .map(|image| image.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "<tr class='{class}'><td>{name}</td><td class='num'>{power}</td><td>{status}</td><td title='{images}'>{count}</td></tr>\n",
            name = html_escape::encode_text(&record.name),
            power = record.power,
            status = record.status,
            images = html_escape::encode_single_quoted_attribute(&images),
            count = record.images.len(),
        )
    }

    fn review_row(entry: &ReviewEntry) -> String {
        format!(
            "<tr><td>{image}</td><td class='num'>{line}</td><td><code>{raw}</code></td><td>{reason}</td></tr>\n",
            image = html_escape::encode_text(&entry.image.name),
            line = entry
                .line_index
                .map(|idx| (idx + 1).to_string())
                .unwrap_or_default(),
            raw = html_escape::encode_text(&entry.raw_text),
            reason = html_escape::encode_text(&entry.reason.to_string()),
        )
    }

    pub fn render(report: &Report) -> String {
        let summary = report.summary();
        let records: String = report.records.iter().map(Self::record_row).collect();
        let review: String = report.review.iter().map(Self::review_row).collect();
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>Roster review</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; }}
table {{ border-collapse: collapse; margin-bottom: 24px; }}
td, th {{ border: 1px solid #ddd; padding: 4px 8px; }}
td.num {{ text-align: right; }}
tr.suspect {{ background: #ffcccc; }}
</style>
</head>
<body>
<p>Players: {total} &middot; Suspect: {flagged} &middot; Highest power: {highest}</p>
<h2>Players</h2>
<table>
<tr><th>Name</th><th>Power</th><th>Status</th><th>Images</th></tr>
{records}</table>
<h2>For review</h2>
<table>
<tr><th>Image</th><th>Line</th><th>Raw text</th><th>Reason</th></tr>
{review}</table>
</body>
</html>"#,
            total = summary.total_players,
            flagged = summary.flagged_players,
            highest = summary
                .highest_power
                .map(|power| power.to_string())
                .unwrap_or_else(|| "-".to_string()),
            records = records,
            review = review,
        )
    }
}

impl Exporter for HtmlReviewExporter {
    fn export(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("review.html"), Self::render(report))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::core::model::{ImageId, ReviewReason, Verdict};
    use crate::report::build_report;

    #[test]
    fn escapes_names_and_raw_text() {
        let image = ImageId::new(0, "a.png");
        let report = build_report(&[PlayerRecord {
            name: "<Axel>".to_string(),
            key: "<axel>".to_string(),
            power: 2_000_000,
            status: RecordStatus::Suspect,
            basis: Verdict::SuspectLowPower,
            images: BTreeSet::from([image.clone()]),
        }])
        .with_review(vec![ReviewEntry {
            image,
            line_index: Some(4),
            raw_text: "Tom & Jerry".to_string(),
            reason: ReviewReason::Unparseable,
        }]);

        let html = HtmlReviewExporter::render(&report);
        assert!(html.contains("&lt;Axel&gt;"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("<tr class='suspect'>"));
        assert!(html.contains("Highest power: 2000000"));
    }
}
