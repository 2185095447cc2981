use crate::parser::normalize::is_group_separator;

/// Location of the power value inside a whitespace-tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSpan {
    /// First token of the span.
    pub start: usize,
    /// Last token of the span (inclusive).
    pub end: usize,
    pub text: String,
    pub digits: String,
}

/// Splits a numeric token into its digit groups. Returns `None` for tokens
/// that are not purely digits and separators.
fn number_groups(token: &str) -> Option<Vec<&str>> {
    let token = token.trim_end_matches(is_group_separator);
    if !token.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_digit() || is_group_separator(c))
    {
        return None;
    }
    Some(token.split(is_group_separator).collect())
}

fn is_thousands_grouped(groups: &[&str]) -> bool {
    match groups.split_first() {
        Some((first, rest)) => {
            (1..=3).contains(&first.len()) && rest.iter().all(|group| group.len() == 3)
        }
        None => false,
    }
}

/// Finds the rightmost run of numeric tokens holding at least `min_digits`
/// digits. Neighbouring tokens separated by spaces join the run only when
/// they keep a thousands grouping ("3 245 600"), so a level number in front
/// of the power is left out.
pub fn find_digit_span(tokens: &[&str], min_digits: usize) -> Option<DigitSpan> {
    let mut cursor = tokens.len();
    while cursor > 0 {
        let end = cursor - 1;
        let Some(groups) = number_groups(tokens[end]) else {
            cursor = end;
            continue;
        };

        let mut start = end;
        let mut lead = groups[0].len();
        while start > 0 {
            let Some(left) = number_groups(tokens[start - 1]) else {
                break;
            };
            if lead != 3 || !is_thousands_grouped(&left) {
                break;
            }
            start -= 1;
            lead = left[0].len();
        }

        // a stray "." or "," after the number is OCR noise, not a group
        let text = tokens[start..=end]
            .join(" ")
            .trim_end_matches(is_group_separator)
            .to_string();
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= min_digits {
            return Some(DigitSpan {
                start,
                end,
                text,
                digits,
            });
        }
        cursor = start;
    }
    None
}

pub fn parse_power(digits: &str) -> Option<u64> {
    digits.parse::<u64>().ok()
}

/// Rules deciding which tokens in front of the power are UI chrome.
#[derive(Debug, Clone)]
pub struct NameRules {
    pub drop_phrases: Vec<Vec<String>>,
    pub min_letter_ratio: f32,
}

impl NameRules {
    fn is_decorative(&self, token: &str) -> bool {
        let total = token.chars().count();
        if total == 0 || !token.chars().any(char::is_alphanumeric) {
            return true;
        }
        // level and rank numbers such as "170"
        if total <= 4 && token.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        let letters = token.chars().filter(|c| c.is_alphabetic()).count();
        (letters as f32 / total as f32) < self.min_letter_ratio
    }

    fn phrase_at(&self, lowered: &[String]) -> Option<usize> {
        self.drop_phrases
            .iter()
            .find(|phrase| {
                phrase.len() <= lowered.len()
                    && phrase.iter().zip(lowered).all(|(word, token)| word == token)
            })
            .map(Vec::len)
    }

    /// Removes drop tokens and decoration, returning the remaining name.
    pub fn clean_name(&self, tokens: &[&str]) -> String {
        let lowered: Vec<String> = tokens
            .iter()
            .map(|token| {
                token
                    .trim_end_matches(|c: char| matches!(c, ':' | ';' | ',' | '-' | '–' | '—'))
                    .to_lowercase()
            })
            .collect();

        let mut kept = Vec::new();
        let mut idx = 0;
        while idx < tokens.len() {
            if let Some(len) = self.phrase_at(&lowered[idx..]) {
                idx += len;
                continue;
            }
            if !self.is_decorative(tokens[idx]) {
                kept.push(tokens[idx]);
            }
            idx += 1;
        }

        kept.join(" ")
            .trim_end_matches(|c: char| matches!(c, '-' | '_' | '.' | ';' | ':'))
            .trim()
            .to_string()
    }
}
