use thiserror::Error;

use crate::span::Location;

pub type CoreResult<T> = Result<T, CoreError>;

/// Every failure the pipeline can produce.
///
/// Each phase stops at the first error and hands it back unchanged; the
/// caller decides how to present it (see [`crate::diagnostic::Diagnostic`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("lexical error at {location}: {message}")]
    Lexical { message: String, location: Location },
    /// A string literal or comment still open at end of line or input.
    #[error("lexical error at {location}: unterminated {construct}")]
    Unterminated {
        construct: &'static str,
        location: Location,
    },
    #[error("lexical error at {location}: '{word}' is a reserved word of the target language")]
    ReservedWord { word: String, location: Location },
    #[error("syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },
    #[error("name error at {location}: {message}")]
    Name { message: String, location: Location },
    #[error("type error at {location}: {message}")]
    Type { message: String, location: Location },
}

impl CoreError {
    pub fn lexical(message: impl Into<String>, location: Location) -> Self {
        CoreError::Lexical {
            message: message.into(),
            location,
        }
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        CoreError::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn name(message: impl Into<String>, location: Location) -> Self {
        CoreError::Name {
            message: message.into(),
            location,
        }
    }

    pub fn type_error(message: impl Into<String>, location: Location) -> Self {
        CoreError::Type {
            message: message.into(),
            location,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            CoreError::Lexical { location, .. }
            | CoreError::Unterminated { location, .. }
            | CoreError::ReservedWord { location, .. }
            | CoreError::Syntax { location, .. }
            | CoreError::Name { location, .. }
            | CoreError::Type { location, .. } => *location,
        }
    }

    /// The message without the kind prefix and location.
    pub fn message(&self) -> String {
        match self {
            CoreError::Lexical { message, .. }
            | CoreError::Syntax { message, .. }
            | CoreError::Name { message, .. }
            | CoreError::Type { message, .. } => message.clone(),
            CoreError::Unterminated { construct, .. } => format!("unterminated {construct}"),
            CoreError::ReservedWord { word, .. } => {
                format!("'{word}' is a reserved word of the target language")
            }
        }
    }
}
