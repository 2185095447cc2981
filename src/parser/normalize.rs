/// OCR token cleanup.
/// Folds compatibility forms (full-width digits, thin spaces), collapses
/// whitespace and repairs look-alike characters inside the power span only.
use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;

use crate::parser::line::find_digit_span;

pub type ConfusionTable = BTreeMap<char, char>;

pub fn is_group_separator(c: char) -> bool {
    matches!(c, ',' | '.')
}

/// A token is digit-like when it holds at least one real digit and every other
/// character is a separator or a known look-alike.
fn is_digit_like(token: &str, confusions: &ConfusionTable) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || is_group_separator(c) || confusions.contains_key(&c))
}

fn substitute(token: &str, confusions: &ConfusionTable) -> String {
    token
        .chars()
        .map(|c| confusions.get(&c).copied().unwrap_or(c))
        .collect()
}

/// Token range the power will be read from once look-alikes are repaired.
/// Located with the same rule the parser uses, so name tokens that happen to
/// hold a digit ("Bo5s", "Zo2") are never part of it.
fn power_run(
    tokens: &[String],
    confusions: &ConfusionTable,
    min_digits: usize,
) -> Option<(usize, usize)> {
    let repaired: Vec<String> = tokens
        .iter()
        .map(|token| {
            if is_digit_like(token, confusions) {
                substitute(token, confusions)
            } else {
                String::new()
            }
        })
        .collect();
    let views: Vec<&str> = repaired.iter().map(String::as_str).collect();
    find_digit_span(&views, min_digits).map(|span| (span.start, span.end))
}

pub fn normalize(raw: &str, confusions: &ConfusionTable, min_digits: usize) -> String {
    let folded = raw.nfkc().collect::<String>();
    let mut tokens: Vec<String> = folded.split_whitespace().map(str::to_string).collect();

    if let Some((start, end)) = power_run(&tokens, confusions, min_digits) {
        for token in &mut tokens[start..=end] {
            *token = substitute(token, confusions);
        }
    }

    tokens.join(" ")
}

/// Case-folded, whitespace-collapsed deduplication key.
pub fn canonical_key(name: &str) -> String {
    let folded = name
        .nfkc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    folded
        .trim_end_matches(|c: char| matches!(c, '-' | '_' | '.' | ':' | ';') || c.is_whitespace())
        .to_string()
}
