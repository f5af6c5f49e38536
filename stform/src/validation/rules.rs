//! Built-in validators.
//!
//! Only [`required`] rejects empty values; every other rule passes an empty
//! field so that optional fields stay valid until filled in.

use chrono::NaiveDate;
use regex::Regex;

use super::Validator;
use crate::value::FieldValue;

pub const REQUIRED: &str = "required";
pub const MAX_LENGTH: &str = "maxLength";
pub const MIN_LENGTH: &str = "minLength";
pub const MAX: &str = "max";
pub const MIN: &str = "min";
pub const PATTERN: &str = "pattern";
pub const EMAIL: &str = "email";

/// Range limit for [`min`] and [`max`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Number(f64),
    Date(NaiveDate),
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for Bound {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Compare a value against a bound. `None` when not comparable or empty.
fn compare(value: &FieldValue, bound: Bound) -> Option<std::cmp::Ordering> {
    match (value, bound) {
        (FieldValue::Number(n), Bound::Number(b)) => n.partial_cmp(&b),
        (FieldValue::String(s), Bound::Number(b)) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok()?.partial_cmp(&b)
        }
        (FieldValue::Date(d), Bound::Date(b)) => Some(d.cmp(&b)),
        (FieldValue::String(s), Bound::Date(b)) if !s.trim().is_empty() => {
            Some(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?.cmp(&b))
        }
        _ => None,
    }
}

fn char_len(value: &FieldValue) -> Option<usize> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.chars().count())
}

/// Presence check. A checkbox must be checked.
pub fn required() -> Validator {
    Validator::new(REQUIRED, |value| match value {
        FieldValue::String(s) => !s.trim().is_empty(),
        FieldValue::Bool(b) => *b,
        other => !other.is_empty(),
    })
}

/// At most `max` characters.
pub fn max_length(max: usize) -> Validator {
    Validator::new(MAX_LENGTH, move |value| {
        char_len(value).is_none_or(|len| len <= max)
    })
}

/// At least `min` characters.
pub fn min_length(min: usize) -> Validator {
    Validator::new(MIN_LENGTH, move |value| {
        char_len(value).is_none_or(|len| len >= min)
    })
}

/// Not above `bound`. Unparsable values fail, empty values pass.
pub fn max(bound: impl Into<Bound>) -> Validator {
    let bound = bound.into();
    Validator::new(MAX, move |value| {
        if value.is_empty() || value.as_str().is_some_and(|s| s.trim().is_empty()) {
            return true;
        }
        compare(value, bound).is_some_and(|ord| ord.is_le())
    })
}

/// Not below `bound`. Unparsable values fail, empty values pass.
pub fn min(bound: impl Into<Bound>) -> Validator {
    let bound = bound.into();
    Validator::new(MIN, move |value| {
        if value.is_empty() || value.as_str().is_some_and(|s| s.trim().is_empty()) {
            return true;
        }
        compare(value, bound).is_some_and(|ord| ord.is_ge())
    })
}

/// Regex match on the string value.
pub fn pattern(re: Regex) -> Validator {
    Validator::new(PATTERN, move |value| match value.as_str() {
        Some(s) if !s.is_empty() => re.is_match(s),
        _ => true,
    })
}

/// Well-formed email address.
pub fn email() -> Validator {
    Validator::new(EMAIL, |value| match value.as_str() {
        Some(s) if !s.is_empty() => email_address::EmailAddress::is_valid(s),
        _ => true,
    })
}
