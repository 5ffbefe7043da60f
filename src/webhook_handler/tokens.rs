//! Severity thresholds mapped to presentation tokens (emoji names).

use std::collections::BTreeMap;

use crate::level::FemtoLevel;

/// Ordered table of `threshold -> token`.
///
/// A record of severity `s` uses the token of the highest threshold `<= s`.
/// Severities below every threshold fall back to the lowest threshold's
/// token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: BTreeMap<u8, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the token for `threshold`.
    pub fn insert(&mut self, threshold: u8, token: impl Into<String>) {
        self.entries.insert(threshold, token.into());
    }

    /// Builder form of [`insert`](Self::insert) keyed by level.
    pub fn with(mut self, level: FemtoLevel, token: impl Into<String>) -> Self {
        self.insert(level.severity(), token);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn resolve(&self, severity: u8) -> Option<&str> {
        self.entries
            .range(..=severity)
            .next_back()
            .or_else(|| self.entries.first_key_value())
            .map(|(_, token)| token.as_str())
    }
}

impl<S: Into<String>> FromIterator<(u8, S)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (u8, S)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}
