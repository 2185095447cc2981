pub mod line;
pub mod normalize;
pub mod validator;

pub use normalize::{canonical_key, normalize};
pub use validator::validate;

use std::collections::VecDeque;

use tracing::debug;

use crate::core::config::RosterConfig;
use crate::core::model::{Candidate, Confidence, RawLine, ReviewEntry, ReviewReason};
use line::{find_digit_span, parse_power, NameRules};

/// Why a line produced no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No digit run long enough to be a power. `has_name` tells whether
    /// anything survived token cleaning.
    NoDigitSpan { has_name: bool },
    /// A power was found but nothing in front of it looks like a name.
    MissingName,
}

/// Candidates and review entries produced from one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageParse {
    pub candidates: Vec<Candidate>,
    pub review: Vec<ReviewEntry>,
}

#[derive(Debug, Clone)]
pub struct RosterParser {
    config: RosterConfig,
    rules: NameRules,
}

impl RosterParser {
    pub fn new(config: RosterConfig) -> Self {
        let rules = NameRules {
            drop_phrases: config.drop_phrases(),
            min_letter_ratio: config.min_letter_ratio,
        };
        Self { config, rules }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn parse(&self, line: &RawLine) -> Option<Candidate> {
        self.parse_line(line).ok()
    }

    pub fn parse_line(&self, line: &RawLine) -> Result<Candidate, Rejection> {
        let normalized = normalize(&line.text, &self.config.confusions, self.config.min_digits);
        let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

        let Some(span) = find_digit_span(&tokens, self.config.min_digits) else {
            let has_name = !self.rules.clean_name(&tokens).is_empty();
            return Err(Rejection::NoDigitSpan { has_name });
        };

        let name = self.rules.clean_name(&tokens[..span.start]);
        if name.is_empty() {
            return Err(Rejection::MissingName);
        }

        let confidence = if span.digits.len() < self.config.strict_digits
            || name.chars().any(|c| !self.is_name_char(c))
        {
            Confidence::Suspect
        } else {
            Confidence::Ok
        };

        Ok(Candidate {
            key: canonical_key(&name),
            name,
            power: parse_power(&span.digits),
            digit_count: span.digits.len(),
            digit_span: span.text,
            source_image: line.image.clone(),
            line_index: line.index,
            raw_text: line.text.clone(),
            confidence,
        })
    }

    fn is_name_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == ' ' || self.config.name_punctuation.contains(c)
    }

    /// Parses the lines of one image in order. Name fragments emitted on
    /// their own line are held back and joined to a following power-only line.
    pub fn parse_image(&self, lines: &[RawLine]) -> ImageParse {
        let joining = self.config.join_fragments && self.config.max_name_fragments > 0;
        let mut out = ImageParse::default();
        let mut pending: VecDeque<&RawLine> = VecDeque::new();

        for line in lines {
            match self.parse_line(line) {
                Ok(candidate) => {
                    flush(&mut pending, &mut out.review);
                    debug!(line = line.index, name = %candidate.name, power = ?candidate.power, "parsed roster line");
                    out.candidates.push(candidate);
                }
                Err(Rejection::MissingName) if joining && !pending.is_empty() => {
                    let merged = merge_fragments(&pending, line);
                    match self.parse_line(&merged) {
                        Ok(candidate) => {
                            debug!(line = line.index, fragments = pending.len(), name = %candidate.name, "joined name fragments");
                            pending.clear();
                            out.candidates.push(candidate);
                        }
                        Err(_) => {
                            flush(&mut pending, &mut out.review);
                            out.review.push(ReviewEntry::for_line(line, ReviewReason::MissingName));
                        }
                    }
                }
                Err(Rejection::MissingName) => {
                    out.review.push(ReviewEntry::for_line(line, ReviewReason::MissingName));
                }
                Err(Rejection::NoDigitSpan { has_name: true }) if joining => {
                    if pending.len() == self.config.max_name_fragments {
                        if let Some(evicted) = pending.pop_front() {
                            out.review.push(ReviewEntry::for_line(evicted, ReviewReason::Unparseable));
                        }
                    }
                    pending.push_back(line);
                }
                Err(Rejection::NoDigitSpan { has_name: true }) => {
                    out.review.push(ReviewEntry::for_line(line, ReviewReason::Unparseable));
                }
                Err(Rejection::NoDigitSpan { has_name: false }) => {
                    debug!(line = line.index, text = %line.text, "dropped chrome line");
                    out.review.push(ReviewEntry::for_line(line, ReviewReason::Noise));
                }
            }
        }

        flush(&mut pending, &mut out.review);
        out.review
            .sort_by_key(|entry| entry.line_index.unwrap_or(usize::MAX));
        out
    }
}

fn flush(pending: &mut VecDeque<&RawLine>, review: &mut Vec<ReviewEntry>) {
    for line in pending.drain(..) {
        review.push(ReviewEntry::for_line(line, ReviewReason::Unparseable));
    }
}

fn merge_fragments(pending: &VecDeque<&RawLine>, power_line: &RawLine) -> RawLine {
    let text = pending
        .iter()
        .map(|line| line.text.as_str())
        .chain(std::iter::once(power_line.text.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    RawLine {
        text,
        image: power_line.image.clone(),
        index: power_line.index,
        confidence: None,
    }
}
