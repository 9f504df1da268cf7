//! Source positions attached to tokens, AST nodes and errors.

use std::fmt;

/// A position in the source text.
///
/// Both `line` and `column` are 1-based; columns count characters, not
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }

    /// Location of the first character of a file.
    pub const fn start() -> Self {
        Location { line: 1, column: 1 }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
