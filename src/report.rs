use std::cmp::Ordering;

use crate::core::model::{
    PlayerRecord, RecordStatus, Report, ReportRow, ReportSummary, ReviewEntry,
};

/// Power descending, then name ascending.
pub fn record_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.power
        .cmp(&a.power)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.key.cmp(&b.key))
}

pub fn build_report(records: &[PlayerRecord]) -> Report {
    let mut sorted = records.to_vec();
    sorted.sort_by(record_order);

    let (clean, flagged): (Vec<PlayerRecord>, Vec<PlayerRecord>) = sorted
        .iter()
        .cloned()
        .partition(|record| record.status == RecordStatus::Valid);

    Report {
        records: sorted,
        clean,
        flagged,
        review: Vec::new(),
    }
}

impl Report {
    pub fn with_review(mut self, mut review: Vec<ReviewEntry>) -> Self {
        review.sort_by(|a, b| {
            a.image
                .cmp(&b.image)
                .then_with(|| a.line_index.cmp(&b.line_index))
        });
        self.review = review;
        self
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.records.iter().map(ReportRow::from).collect()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_players: self.records.len(),
            flagged_players: self.flagged.len(),
            highest_power: self.records.first().map(|record| record.power),
        }
    }
}

impl From<&PlayerRecord> for ReportRow {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            name: record.name.clone(),
            power: record.power,
            status: record.status,
            images: record.images.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::core::model::{ImageId, ReviewReason, Verdict};
    use pretty_assertions::assert_eq;

    fn record(name: &str, power: u64, status: RecordStatus) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            key: name.to_lowercase(),
            power,
            status,
            basis: match status {
                RecordStatus::Valid => Verdict::Valid,
                RecordStatus::Suspect => Verdict::SuspectLowPower,
            },
            images: BTreeSet::from([ImageId::new(0, "a.png")]),
        }
    }

    fn names(records: &[PlayerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn sorts_by_power_then_name() {
        let report = build_report(&[
            record("Bea", 4_000_000, RecordStatus::Valid),
            record("Axel", 4_000_000, RecordStatus::Valid),
            record("Cy", 9_000_000, RecordStatus::Valid),
        ]);
        assert_eq!(names(&report.records), vec!["Cy", "Axel", "Bea"]);
    }

    #[test]
    fn partitions_clean_and_flagged() {
        let report = build_report(&[
            record("Low", 1_000_000, RecordStatus::Suspect),
            record("Axel", 4_000_000, RecordStatus::Valid),
            record("Lower", 900_000, RecordStatus::Suspect),
        ]);
        assert_eq!(names(&report.clean), vec!["Axel"]);
        assert_eq!(names(&report.flagged), vec!["Low", "Lower"]);
    }

    #[test]
    fn rows_keep_column_order() {
        let report = build_report(&[record("Axel", 4_000_000, RecordStatus::Valid)]);
        let json = serde_json::to_string(&report.rows()[0]).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Axel","power":4000000,"status":"VALID","images":1}"#
        );
    }

    #[test]
    fn summary_counts() {
        let report = build_report(&[
            record("Axel", 4_000_000, RecordStatus::Valid),
            record("Low", 1_000_000, RecordStatus::Suspect),
        ]);
        let summary = report.summary();
        assert_eq!(summary.total_players, 2);
        assert_eq!(summary.flagged_players, 1);
        assert_eq!(summary.highest_power, Some(4_000_000));
    }

    #[test]
    fn review_is_ordered_by_image_then_line() {
        let second = ImageId::new(1, "b.png");
        let first = ImageId::new(0, "a.png");
        let report = build_report(&[]).with_review(vec![
            ReviewEntry {
                image: second.clone(),
                line_index: Some(0),
                raw_text: "x".into(),
                reason: ReviewReason::Noise,
            },
            ReviewEntry::for_image(&first, "decode failed"),
            ReviewEntry {
                image: first.clone(),
                line_index: Some(3),
                raw_text: "y".into(),
                reason: ReviewReason::Unparseable,
            },
        ]);
        let order: Vec<_> = report
            .review
            .iter()
            .map(|e| (e.image.ordinal, e.line_index))
            .collect();
        assert_eq!(order, vec![(0, None), (0, Some(3)), (1, Some(0))]);
    }
}
