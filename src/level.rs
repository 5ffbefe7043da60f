//! Severity levels understood by loggers and handlers.
//!
//! Each [`FemtoLevel`] maps onto a numeric severity compatible with the
//! thresholds used by chat token tables, where `0` means "not set" and every
//! named level sits on a multiple of ten.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Numeric severity used when no level has been configured.
pub const NOTSET: u8 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FemtoLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Critical,
}

/// Returned when a string does not name a known level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid log level: {0}")]
pub struct ParseLevelError(pub String);

impl FemtoLevel {
    /// All levels in ascending order of severity.
    pub const ALL: [FemtoLevel; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Critical,
    ];

    /// Numeric severity of the level.
    pub const fn severity(self) -> u8 {
        match self {
            Self::Trace => 5,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warn => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Upper-case name used in formatted output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for FemtoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FemtoLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<FemtoLevel> for u8 {
    fn from(level: FemtoLevel) -> Self {
        level.severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("trace", FemtoLevel::Trace)]
    #[case("WARNING", FemtoLevel::Warn)]
    #[case("Error", FemtoLevel::Error)]
    #[case("fatal", FemtoLevel::Critical)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: FemtoLevel) {
        assert_eq!(input.parse::<FemtoLevel>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "loud".parse::<FemtoLevel>(),
            Err(ParseLevelError("loud".into()))
        );
    }

    #[test]
    fn severities_follow_level_order() {
        let severities: Vec<u8> = FemtoLevel::ALL.iter().map(|l| l.severity()).collect();
        let mut sorted = severities.clone();
        sorted.sort_unstable();
        assert_eq!(severities, sorted);
        assert_eq!(FemtoLevel::Error.severity(), 40);
        assert!(NOTSET < FemtoLevel::Trace.severity());
    }
}
