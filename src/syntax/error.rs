use std::fmt;

use thiserror::Error;

/// A 1-based line/column location in a source file.
///
/// Columns count bytes, matching the Go toolchain's diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Input text that does not conform to the Go grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{pos}: {message}")]
pub struct ParseError {
    /// Path (or label) of the offending file
    pub path: String,
    /// Where the problem was detected
    pub pos: Position,
    /// Human-readable description
    pub message: String,
}

impl ParseError {
    pub fn new(path: impl Into<String>, pos: Position, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pos,
            message: message.into(),
        }
    }
}
