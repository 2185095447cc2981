use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one image of a batch. `ordinal` is the batch position and
/// decides which image counts as processed first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageId {
    pub ordinal: usize,
    pub name: String,
}

impl ImageId {
    pub fn new(ordinal: usize, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
        }
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.ordinal + 1, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,
    pub image: ImageId,
    pub index: usize,
    /// Engine-reported confidence, not used for filtering yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl RawLine {
    pub fn new(image: ImageId, index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image,
            index,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Ok,
    Suspect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Display name with original casing.
    pub name: String,
    /// Canonical comparison key.
    pub key: String,
    /// `None` when the digit span does not fit a `u64`.
    pub power: Option<u64>,
    /// Digit span as it appeared after normalization, separators included.
    pub digit_span: String,
    pub digit_count: usize,
    pub source_image: ImageId,
    pub line_index: usize,
    pub raw_text: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    SuspectLowPower,
    SuspectMalformedDigits,
    SuspectMalformedName,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }

    /// Lower rank wins during reconciliation.
    pub fn tier(self) -> u8 {
        match self {
            Verdict::Valid => 0,
            Verdict::SuspectLowPower => 1,
            Verdict::SuspectMalformedDigits | Verdict::SuspectMalformedName => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedCandidate {
    pub candidate: Candidate,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Valid,
    Suspect,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Valid => write!(f, "VALID"),
            RecordStatus::Suspect => write!(f, "SUSPECT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub key: String,
    pub power: u64,
    pub status: RecordStatus,
    /// Verdict of the tier the record was built from.
    pub basis: Verdict,
    pub images: BTreeSet<ImageId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ReviewReason {
    Noise,
    Unparseable,
    MissingName,
    LowConfidence,
    LowPower(u64),
    MalformedDigits,
    MalformedName,
    ImageFailed(String),
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::Noise => write!(f, "noise"),
            ReviewReason::Unparseable => write!(f, "unparseable"),
            ReviewReason::MissingName => write!(f, "missing name"),
            ReviewReason::LowConfidence => write!(f, "low confidence"),
            ReviewReason::LowPower(power) => write!(f, "power below threshold ({power})"),
            ReviewReason::MalformedDigits => write!(f, "malformed digits"),
            ReviewReason::MalformedName => write!(f, "malformed name"),
            ReviewReason::ImageFailed(message) => write!(f, "image failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub image: ImageId,
    /// `None` for entries about a whole image.
    pub line_index: Option<usize>,
    pub raw_text: String,
    pub reason: ReviewReason,
}

impl ReviewEntry {
    pub fn for_line(line: &RawLine, reason: ReviewReason) -> Self {
        Self {
            image: line.image.clone(),
            line_index: Some(line.index),
            raw_text: line.text.clone(),
            reason,
        }
    }

    pub fn for_image(image: &ImageId, message: impl Into<String>) -> Self {
        Self {
            image: image.clone(),
            line_index: None,
            raw_text: String::new(),
            reason: ReviewReason::ImageFailed(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Every record, power descending then name ascending.
    pub records: Vec<PlayerRecord>,
    pub clean: Vec<PlayerRecord>,
    pub flagged: Vec<PlayerRecord>,
    pub review: Vec<ReviewEntry>,
}

/// One row of the tabular form of a report, in export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub power: u64,
    pub status: RecordStatus,
    pub images: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_players: usize,
    pub flagged_players: usize,
    pub highest_power: Option<u64>,
}
