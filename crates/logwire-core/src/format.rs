//! Culture-style number formatting rules used when parsing scalars.

use serde::{Deserialize, Serialize};

/// Separators applied when converting scalar text to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatProvider {
    /// Display name, e.g. `invariant` or `de-DE`.
    pub name: String,
    /// Character separating the integral and fractional parts.
    pub decimal_separator: char,
    /// Optional digit grouping character, stripped before parsing.
    #[serde(default)]
    pub group_separator: Option<char>,
}

impl FormatProvider {
    /// Invariant rules: `.` as decimal separator, no grouping.
    pub fn invariant() -> Self {
        Self {
            name: "invariant".to_string(),
            decimal_separator: '.',
            group_separator: None,
        }
    }

    /// Creates custom rules.
    pub fn new(name: impl Into<String>, decimal_separator: char) -> Self {
        Self {
            name: name.into(),
            decimal_separator,
            group_separator: None,
        }
    }

    /// Builder method to set the grouping character.
    pub fn with_group_separator(mut self, separator: char) -> Self {
        self.group_separator = Some(separator);
        self
    }

    /// Rewrites `text` into invariant form: grouping removed, decimal
    /// separator replaced by `.`.
    pub fn normalize_number(&self, text: &str) -> String {
        text.trim()
            .chars()
            .filter(|c| Some(*c) != self.group_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect()
    }
}

impl Default for FormatProvider {
    fn default() -> Self {
        Self::invariant()
    }
}
