//! Error types for the SyReC parser.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ast::Position;

/// Errors raised while parsing a token stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Unexpected token.
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken {
        position: Position,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { position: Position, expected: String },

    /// Integer literal does not fit the context.
    #[error("integer {value} is out of range for {context}")]
    IntegerOutOfRange {
        position: Position,
        value: u64,
        context: String,
    },
}

impl ParseError {
    /// Where the error occurred.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::IntegerOutOfRange { position, .. } => *position,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Invalid character sequence.
    Lexical,
    /// Malformed token stream.
    Syntax,
    /// Well-formed program violating a language rule.
    Semantic,
    /// The source could not be read.
    Io,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::Lexical => "lexical error",
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::Semantic => "semantic error",
            DiagnosticKind::Io => "io error",
        };
        f.write_str(s)
    }
}

/// A problem found while reading a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }

    pub fn semantic(position: Position, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Semantic, position, message)
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic::new(DiagnosticKind::Syntax, err.position(), err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-- line {} col {}: {}: {}",
            self.position.line, self.position.column, self.kind, self.message
        )
    }
}
