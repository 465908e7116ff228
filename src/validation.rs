//! Field-level input validation.
//!
//! Front ends run raw input through these checks before calling the
//! record store; the store re-checks the same contract.

use crate::error::RecordError;
use crate::models::{Score, ScoreRange};

/// Returns true if `text` has anything besides whitespace.
pub fn is_nonempty(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Subject names are words of letters separated by single spaces.
pub fn is_valid_subject(text: &str) -> bool {
    !text.is_empty()
        && text
            .split(' ')
            .all(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
}

/// Returns true if `value` lies in `[min, max]`.
pub fn is_valid_score(value: i64, min: Score, max: Score) -> bool {
    (i64::from(min)..=i64::from(max)).contains(&value)
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// Normalizes and checks a student name.
pub fn normalize_name(raw: &str) -> Result<String, RecordError> {
    if !is_nonempty(raw) {
        return Err(RecordError::InvalidInput(
            "name cannot be empty".to_string(),
        ));
    }
    Ok(title_case(raw))
}

/// Normalizes and checks a subject name.
///
/// Runs of whitespace collapse to one space, so `" computer  science"`
/// becomes `"Computer Science"`.
pub fn normalize_subject(raw: &str) -> Result<String, RecordError> {
    let subject = title_case(&raw.split_whitespace().collect::<Vec<_>>().join(" "));
    if !is_valid_subject(&subject) {
        return Err(RecordError::InvalidInput(format!(
            "invalid subject name '{}': use letters and spaces only",
            raw.trim()
        )));
    }
    Ok(subject)
}

/// Parses a score typed by the operator and checks it against `range`.
pub fn parse_score(raw: &str, range: ScoreRange) -> Result<Score, RecordError> {
    let invalid = || {
        RecordError::InvalidInput(format!(
            "score must be an integer between {} and {}",
            range.min, range.max
        ))
    };

    let value: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if !is_valid_score(value, range.min, range.max) {
        return Err(invalid());
    }
    Score::try_from(value).map_err(|_| invalid())
}
