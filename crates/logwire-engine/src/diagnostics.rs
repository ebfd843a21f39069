//! Non-fatal diagnostics.
//!
//! Two situations are deliberately not errors: a directive whose name
//! matches no eligible candidate is skipped, and a switch value that fails
//! to parse after a reload keeps its previous value. Both are reported here
//! so they are never silent.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// A non-fatal condition met while resolving or reloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A directive matched no eligible candidate and was skipped.
    UnmatchedDirective {
        /// Section the directive came from, e.g. `WriteTo`.
        section: String,
        /// Directive name.
        name: String,
        /// Path of the directive node.
        path: String,
        /// Argument names the directive supplied.
        supplied: Vec<String>,
        /// Signatures of same-named candidates that were not eligible.
        candidates: Vec<String>,
    },
    /// A reloaded switch value could not be applied.
    ReloadFailure {
        /// Switch name, or the level target for anonymous switches.
        switch: String,
        /// Path of the watched node.
        path: String,
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A switch name was declared twice; the later declaration wins.
    SwitchRedeclared {
        /// Switch name.
        name: String,
        /// Path of the later declaration.
        path: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedDirective {
                section,
                name,
                path,
                supplied,
                candidates,
            } => {
                write!(
                    f,
                    "{section} directive '{name}' at '{path}' with arguments [{}] matched no method",
                    supplied.join(", ")
                )?;
                if candidates.is_empty() {
                    write!(f, "; no method with that name is registered")
                } else {
                    write!(f, "; candidates: {}", candidates.join("; "))
                }
            }
            Diagnostic::ReloadFailure {
                switch,
                path,
                value,
                reason,
            } => write!(
                f,
                "switch '{switch}' kept its value: '{value}' at '{path}' was rejected ({reason})"
            ),
            Diagnostic::SwitchRedeclared { name, path } => {
                write!(f, "switch '{name}' redeclared at '{path}'")
            }
        }
    }
}

/// Receiver of [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic. Must not panic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Emits diagnostics as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnmatchedDirective { section, name, path, .. } => {
                warn!(section = %section, directive = %name, path = %path, "{diagnostic}");
            }
            Diagnostic::ReloadFailure { switch, path, .. } => {
                warn!(switch = %switch, path = %path, "{diagnostic}");
            }
            Diagnostic::SwitchRedeclared { name, path } => {
                warn!(switch = %name, path = %path, "{diagnostic}");
            }
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemoryDiagnostics {
    /// Creates an empty collector behind an `Arc`, ready to hand to
    /// [`crate::ReaderOptions::with_diagnostics`].
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copies of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().clone()
    }

    /// Drains the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.records.lock().push(diagnostic);
    }
}
