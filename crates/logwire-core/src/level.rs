//! Log event levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LevelParseError;

/// Severity of a log event, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum LogLevel {
    /// Tracing detail, rarely enabled.
    Verbose = 0,
    /// Internal diagnostics.
    Debug = 1,
    /// Normal operational events.
    #[default]
    Information = 2,
    /// Degraded but functioning.
    Warning = 3,
    /// A failed operation.
    Error = 4,
    /// The process cannot continue.
    Fatal = 5,
}

impl LogLevel {
    /// All levels in ordinal order.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Canonical member name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "Verbose",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        }
    }

    /// Numeric ordinal.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Level for an ordinal, if in range.
    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Strict member parse used for method arguments: exact member name
    /// (case-sensitive) or a decimal ordinal.
    #[must_use]
    pub fn parse_member(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(level) = Self::ALL.iter().find(|l| l.name() == text) {
            return Some(*level);
        }
        text.parse::<u8>().ok().and_then(Self::from_ordinal)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LevelParseError;

    /// Lenient parse used for level sections: member names compare
    /// case-insensitively, ordinals are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .find(|l| l.name().eq_ignore_ascii_case(trimmed))
            .copied()
            .or_else(|| trimmed.parse::<u8>().ok().and_then(Self::from_ordinal))
            .ok_or_else(|| LevelParseError {
                value: s.to_string(),
            })
    }
}
