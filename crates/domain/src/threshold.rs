use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Similarity cut-off handed to the scoring oracle, fixed for a whole run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(into = "f64", try_from = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(DomainError::validation(format!(
                "threshold must be between 0 and 1, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Threshold {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::validation(format!("cannot parse threshold {s:?}")))?;
        Self::new(value)
    }
}

/// True when the entry, with every `.` removed, is a nonempty run of ASCII digits.
pub fn is_decimal_entry(entry: &str) -> bool {
    let mut digits = entry.chars().filter(|c| *c != '.').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert!(Threshold::new(1.01).is_err());
        assert!(Threshold::new(-0.01).is_err());
        assert!(Threshold::new(f64::NAN).is_err());
    }

    #[test]
    fn entry_rule_matches_prompt_validation() {
        assert!(is_decimal_entry("0.6"));
        assert!(is_decimal_entry("1"));
        assert!(is_decimal_entry("1.2.3"));
        assert!(!is_decimal_entry(""));
        assert!(!is_decimal_entry("."));
        assert!(!is_decimal_entry("-0.01"));
        assert!(!is_decimal_entry("abc"));
        assert!(!is_decimal_entry(" 0.6"));
    }

    #[test]
    fn from_str_accepts_cli_values() {
        let threshold: Threshold = "0.75".parse().unwrap();
        assert_eq!(threshold.value(), 0.75);
        assert!("2".parse::<Threshold>().is_err());
    }

    #[test]
    fn serializes_as_bare_number() {
        let threshold = Threshold::new(0.6).unwrap();
        assert_eq!(serde_json::to_string(&threshold).unwrap(), "0.6");
    }

    #[test]
    fn deserializing_checks_the_range() {
        let threshold: Threshold = serde_json::from_str("0.6").unwrap();
        assert_eq!(threshold.value(), 0.6);
        assert!(serde_json::from_str::<Threshold>("5.0").is_err());
        assert!(serde_json::from_str::<Threshold>("-0.5").is_err());
    }
}
