use std::fmt::{Display, Formatter};

use cxx_ast::Span;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::AccessViolation;

macro_rules! error_at {
    ($span:expr, $($arg:tt)*) => {
        $crate::diagnostic::Diagnostic::new(
            format!($($arg)*),
            $crate::diagnostic::Severity::Error,
            $span,
        )
    };
}

macro_rules! note_at {
    ($span:expr, $($arg:tt)*) => {
        $crate::diagnostic::Diagnostic::new(
            format!($($arg)*),
            $crate::diagnostic::Severity::Note,
            $span,
        )
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Severity {
    Error,
    Note,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Note => write!(f, "note"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostic {
    /// The message to display to the user.
    message: String,
    /// The location of the error.
    span: Span,
    /// The severity of the error.
    severity: Severity,
    /// Secondary locations, e.g. where an inaccessible member was declared private.
    notes: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn new(message: String, severity: Severity, span: Span) -> Self {
        Diagnostic {
            message,
            span,
            severity,
            notes: vec![],
        }
    }

    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.notes.push(note);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn notes(&self) -> &[Diagnostic] {
        &self.notes
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: {} on line {}:{}",
            self.severity.to_string().to_uppercase(),
            self.message,
            self.span.start.line + 1,
            self.span.start.column + 1
        )?;

        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }

        Ok(())
    }
}

impl From<AccessViolation> for Diagnostic {
    fn from(violation: AccessViolation) -> Self {
        error_at!(violation.span, "{violation}")
            .with_note(note_at!(violation.declared_at, "declared {} here", violation.access))
    }
}
