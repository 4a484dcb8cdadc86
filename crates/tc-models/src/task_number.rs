//! Year-scoped sequential task numbers
//!
//! Format: `#<2-digit-year>-<3-digit-sequence>`, e.g. `#25-042`. Numbers are
//! unique, allocated atomically at task creation, monotonic per calendar
//! year, and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Human-readable task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TaskNumber {
    /// Two-digit calendar year (e.g. 25 for 2025)
    pub year: u8,
    /// Per-year sequence, starting at 1
    pub sequence: u32,
}

impl TaskNumber {
    pub fn new(year: u8, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// Number for the given full year (2025 -> year part 25)
    pub fn for_year(full_year: i32, sequence: u32) -> Self {
        Self {
            year: (full_year.rem_euclid(100)) as u8,
            sequence,
        }
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02}-{:03}", self.year, self.sequence)
    }
}

/// Parse error for task numbers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid task number: {0}")]
pub struct ParseTaskNumberError(String);

impl FromStr for TaskNumber {
    type Err = ParseTaskNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('#')
            .ok_or_else(|| ParseTaskNumberError(s.to_string()))?;
        let (year, sequence) = body
            .split_once('-')
            .ok_or_else(|| ParseTaskNumberError(s.to_string()))?;
        if year.len() != 2 || sequence.len() < 3 {
            return Err(ParseTaskNumberError(s.to_string()));
        }
        let year = year
            .parse::<u8>()
            .map_err(|_| ParseTaskNumberError(s.to_string()))?;
        let sequence = sequence
            .parse::<u32>()
            .map_err(|_| ParseTaskNumberError(s.to_string()))?;
        Ok(Self { year, sequence })
    }
}

impl Serialize for TaskNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_padding() {
        assert_eq!(TaskNumber::new(25, 42).to_string(), "#25-042");
        assert_eq!(TaskNumber::new(7, 3).to_string(), "#07-003");
        // sequence keeps growing past three digits
        assert_eq!(TaskNumber::new(25, 1042).to_string(), "#25-1042");
    }

    #[test]
    fn test_parse_round_trip() {
        let n: TaskNumber = "#25-042".parse().unwrap();
        assert_eq!(n, TaskNumber::new(25, 42));
        assert_eq!(n.to_string().parse::<TaskNumber>().unwrap(), n);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("25-042".parse::<TaskNumber>().is_err());
        assert!("#25042".parse::<TaskNumber>().is_err());
        assert!("#2-042".parse::<TaskNumber>().is_err());
        assert!("#25-42".parse::<TaskNumber>().is_err());
        assert!("#25-abc".parse::<TaskNumber>().is_err());
    }

    #[test]
    fn test_for_year() {
        assert_eq!(TaskNumber::for_year(2025, 1), TaskNumber::new(25, 1));
        assert_eq!(TaskNumber::for_year(2099, 12), TaskNumber::new(99, 12));
    }

    #[test]
    fn test_serde_as_string() {
        let n = TaskNumber::new(25, 42);
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"#25-042\"");
        let back: TaskNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
