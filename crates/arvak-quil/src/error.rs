//! Error types for the Quil crate.

use thiserror::Error;

/// Errors that can occur while reading or building Quil programs.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuilError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of an instruction.
    #[error("Unexpected end of instruction at line {line}: expected {expected}")]
    UnexpectedEnd { line: usize, expected: String },

    /// Unknown memory type in a `DECLARE`.
    #[error("Unknown memory type '{found}' at line {line}")]
    UnknownScalarType { line: usize, found: String },

    /// A memory region was declared twice.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// A string that should be a memory reference (`name[index]`) is not one.
    #[error("Invalid memory reference: '{0}'")]
    InvalidMemoryReference(String),
}

/// Result type for Quil operations.
pub type QuilResult<T> = Result<T, QuilError>;
