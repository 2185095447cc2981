use std::collections::BTreeSet;

use crate::core::config::RosterConfig;
use crate::core::model::{Candidate, ValidatedCandidate, Verdict};
use crate::parser::normalize::is_group_separator;

/// Separators must be of a single kind and split the digits into a 1-3 digit
/// head followed by 3 digit groups.
pub fn separators_consistent(span: &str) -> bool {
    let kinds: BTreeSet<char> = span.chars().filter(|c| is_group_separator(*c)).collect();
    if kinds.len() > 1 {
        return false;
    }
    let groups: Vec<&str> = span
        .split(|c: char| is_group_separator(c) || c == ' ')
        .collect();
    if groups.len() == 1 {
        return true;
    }
    (1..=3).contains(&groups[0].len()) && groups[1..].iter().all(|group| group.len() == 3)
}

fn has_leading_zero(candidate: &Candidate) -> bool {
    candidate.digit_count > 1
        && candidate
            .digit_span
            .chars()
            .find(|c| c.is_ascii_digit())
            == Some('0')
}

fn digits_malformed(candidate: &Candidate, config: &RosterConfig) -> bool {
    candidate.power.is_none()
        || candidate.digit_count < config.min_digits
        || candidate.digit_count > config.max_digits
        || has_leading_zero(candidate)
        || !separators_consistent(&candidate.digit_span)
}

fn name_well_shaped(name: &str, config: &RosterConfig) -> bool {
    let len = name.chars().count();
    name.chars().any(char::is_alphabetic) && (config.name_min_len..=config.name_max_len).contains(&len)
}

pub fn classify(candidate: &Candidate, config: &RosterConfig) -> Verdict {
    if digits_malformed(candidate, config) {
        Verdict::SuspectMalformedDigits
    } else if !name_well_shaped(&candidate.name, config) {
        Verdict::SuspectMalformedName
    } else if candidate.power.unwrap_or(0) < config.strict_min_power {
        Verdict::SuspectLowPower
    } else {
        Verdict::Valid
    }
}

pub fn validate(candidate: Candidate, config: &RosterConfig) -> ValidatedCandidate {
    let verdict = classify(&candidate, config);
    ValidatedCandidate { candidate, verdict }
}
