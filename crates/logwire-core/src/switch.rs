//! Mutable level and filter switches.
//!
//! Switches are shared cells: the configuration reader creates them, the
//! logging hot path reads them from any thread, and change notifications
//! update them in place. Reads never take a lock.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::level::LogLevel;

// =============================================================================
// LEVEL SWITCH
// =============================================================================

/// A runtime-adjustable minimum level.
///
/// Clones share the same cell.
#[derive(Clone)]
pub struct LevelSwitch {
    level: Arc<AtomicU8>,
}

impl LevelSwitch {
    /// Creates a switch with an initial level.
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level.ordinal())),
        }
    }

    /// Current minimum level.
    pub fn minimum_level(&self) -> LogLevel {
        LogLevel::from_ordinal(self.level.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Replaces the minimum level.
    pub fn set_minimum_level(&self, level: LogLevel) {
        self.level.store(level.ordinal(), Ordering::Release);
    }

    /// Whether events at `level` pass this switch.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.minimum_level()
    }

    /// Whether both handles refer to the same cell.
    pub fn same_cell(&self, other: &LevelSwitch) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for LevelSwitch {
    fn default() -> Self {
        Self::new(LogLevel::Information)
    }
}

impl fmt::Debug for LevelSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelSwitch")
            .field("minimum_level", &self.minimum_level())
            .finish()
    }
}

// =============================================================================
// FILTER SWITCH
// =============================================================================

/// A runtime-adjustable filter expression.
///
/// A blank expression is stored as `None`, meaning "no filtering".
#[derive(Clone, Default)]
pub struct FilterSwitch {
    expression: Arc<ArcSwapOption<String>>,
}

impl FilterSwitch {
    /// Creates a switch with an initial expression.
    pub fn new(expression: Option<&str>) -> Self {
        let switch = Self::default();
        switch.set_expression(expression);
        switch
    }

    /// Current expression.
    pub fn expression(&self) -> Option<Arc<String>> {
        self.expression.load_full()
    }

    /// Replaces the expression.
    pub fn set_expression(&self, expression: Option<&str>) {
        let normalized = expression
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| Arc::new(e.to_string()));
        self.expression.store(normalized);
    }

    /// Whether both handles refer to the same cell.
    pub fn same_cell(&self, other: &FilterSwitch) -> bool {
        Arc::ptr_eq(&self.expression, &other.expression)
    }
}

impl fmt::Debug for FilterSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSwitch")
            .field("expression", &self.expression())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_level_switch_shared_between_clones() {
        let switch = LevelSwitch::new(LogLevel::Warning);
        let reader = switch.clone();
        assert!(!reader.is_enabled(LogLevel::Information));

        switch.set_minimum_level(LogLevel::Debug);
        assert_eq!(reader.minimum_level(), LogLevel::Debug);
        assert!(reader.is_enabled(LogLevel::Information));
        assert!(reader.same_cell(&switch));
        assert!(!reader.same_cell(&LevelSwitch::default()));
    }

    #[test]
    fn test_level_switch_concurrent_reads() {
        let switch = LevelSwitch::new(LogLevel::Verbose);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reader = switch.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let _ = reader.minimum_level();
                    }
                })
            })
            .collect();
        switch.set_minimum_level(LogLevel::Fatal);
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(switch.minimum_level(), LogLevel::Fatal);
    }

    #[test]
    fn test_filter_switch_normalizes_blank() {
        let switch = FilterSwitch::new(Some("  "));
        assert!(switch.expression().is_none());

        let reader = switch.clone();
        switch.set_expression(Some("Application = 'Sample'"));
        assert_eq!(reader.expression().as_deref().map(String::as_str), Some("Application = 'Sample'"));

        switch.set_expression(None);
        assert!(reader.expression().is_none());
    }
}
