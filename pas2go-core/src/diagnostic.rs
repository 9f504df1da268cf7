//! User-facing diagnostics.
//!
//! A [`Diagnostic`] is the flattened, presentation-ready form of a
//! [`CoreError`]: a kind, a stable error code, the message and the source
//! location. Front ends should render these rather than matching on
//! `CoreError` directly.

use std::fmt;

use crate::error::CoreError;
use crate::span::Location;

/// Category of a diagnostic, one per pipeline phase that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Name,
    Type,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "LexicalError",
            DiagnosticKind::Syntax => "SyntaxError",
            DiagnosticKind::Name => "NameError",
            DiagnosticKind::Type => "TypeError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: &'static str,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Diagnostic {
            kind,
            code: default_code(kind),
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }
}

fn default_code(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::Lexical => "E0001",
        DiagnosticKind::Syntax => "E0100",
        DiagnosticKind::Name => "E0200",
        DiagnosticKind::Type => "E0300",
    }
}

impl From<&CoreError> for Diagnostic {
    fn from(err: &CoreError) -> Self {
        let location = err.location();
        let message = err.message();
        match err {
            CoreError::Unterminated { .. } => {
                Diagnostic::error(DiagnosticKind::Lexical, message, location).with_code("E0002")
            }
            CoreError::Lexical { .. } => {
                Diagnostic::error(DiagnosticKind::Lexical, message, location)
            }
            CoreError::ReservedWord { .. } => {
                Diagnostic::error(DiagnosticKind::Lexical, message, location).with_code("E0003")
            }
            CoreError::Syntax { .. } => Diagnostic::error(DiagnosticKind::Syntax, message, location),
            CoreError::Name { .. } => Diagnostic::error(DiagnosticKind::Name, message, location),
            CoreError::Type { .. } => Diagnostic::error(DiagnosticKind::Type, message, location),
        }
    }
}

impl From<CoreError> for Diagnostic {
    fn from(err: CoreError) -> Self {
        Diagnostic::from(&err)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}: {}", self.code, self.kind, self.message)?;
        if let Some(location) = self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
