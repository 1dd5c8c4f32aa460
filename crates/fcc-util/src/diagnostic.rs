//! Diagnostics: severity levels, diagnostic values, and the `Handler` sink.
//!
//! The analyzer never raises exceptions for an unsound source program — a
//! type mismatch is a value, not a `Result::Err` (see the error handling
//! design). `Handler` is where those values accumulate and are eventually
//! rendered to the driver's output stream in the exact shape the diagnostic
//! surface specifies: `error(L:C): <message>`.

use std::fmt;
use std::io::Write;

use crate::Location;

/// Diagnostic severity.
///
/// Errors make the exit code non-zero; warnings do not unless promoted by
/// [`crate::AnalysisOptions`]-style configuration upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secondary label attached to a diagnostic, e.g. the "also declared at
/// …" sites chained onto a conflicting-redeclaration error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondaryLabel {
    pub location: Location,
    pub message: String,
}

/// A single diagnostic: severity, location, message, and any secondary
/// labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub secondary: Vec<SecondaryLabel>,
}

impl Diagnostic {
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            location,
            message: message.into(),
            secondary: Vec::new(),
        }
    }

    pub fn warning(location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            location,
            message: message.into(),
            secondary: Vec::new(),
        }
    }

    /// Attach a secondary label, e.g. a prior declaration site.
    pub fn with_secondary(mut self, location: Location, message: impl Into<String>) -> Self {
        self.secondary.push(SecondaryLabel {
            location,
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}({}): {}", self.severity, self.location, self.message)?;
        for label in &self.secondary {
            writeln!(f, "  {} at {}", label.message, label.location)?;
        }
        Ok(())
    }
}

/// Failure writing rendered diagnostics to the driver's sink.
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("failed to write diagnostics: {0}")]
    Sink(#[from] std::io::Error),
}

/// Owns the accumulated diagnostics and the error/warning counters for one
/// `analyze` invocation.
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
    error_count: u32,
    warning_count: u32,
    warnings_as_errors: bool,
}

impl Handler {
    pub fn new(warnings_as_errors: bool) -> Self {
        Handler {
            warnings_as_errors,
            ..Handler::default()
        }
    }

    /// Record a diagnostic and update the counters.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => {
                self.warning_count += 1;
                if self.warnings_as_errors {
                    self.error_count += 1;
                }
            }
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render every accumulated diagnostic, in emission order, to `sink`.
    pub fn render_to(&self, sink: &mut dyn Write) -> Result<(), HandlerError> {
        for diagnostic in &self.diagnostics {
            write!(sink, "{diagnostic}")?;
        }
        Ok(())
    }
}
