//! Error types for the patch crate.

use arvak_quil::{EvaluationError, QuilError};
use thiserror::Error;

/// Errors produced while rewriting program arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RewriteArithmeticError {
    /// The program text could not be parsed.
    #[error("failed to parse program: {0}")]
    Parse(#[from] QuilError),

    /// A frequency is set on a frame without a `DEFFRAME`.
    #[error("no DEFFRAME for {0}")]
    MissingDefFrame(String),

    /// The frame has no `SAMPLE-RATE`.
    #[error("SAMPLE-RATE is required for frame {0}")]
    MissingSampleRate(String),

    /// The frame's `SAMPLE-RATE` is not numeric.
    #[error("unable to use SAMPLE-RATE {sample_rate} for frame {frame}")]
    InvalidSampleRate { sample_rate: String, frame: String },

    /// The substitution region name is already taken.
    #[error("program already declares the substitution region {0}")]
    SubstitutionAlreadyDeclared(&'static str),
}

/// Result type for arithmetic rewriting.
pub type RewriteResult<T> = Result<T, RewriteArithmeticError>;

/// Errors produced while evaluating a recalculation table.
///
/// Every variant names the table entry that failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BuildPatchValuesError {
    /// A table entry is not a valid expression.
    #[error("unable to parse recalculation expression {expression}: {source}")]
    Parse {
        expression: String,
        #[source]
        source: QuilError,
    },

    /// The expression references a region with no values.
    #[error("could not evaluate {expression}: memory region '{name}' is undefined")]
    UndefinedMemory { expression: String, name: String },

    /// The expression indexes past the end of a region.
    #[error(
        "could not evaluate {expression}: index {index} is out of range for '{name}' of length {length}"
    )]
    IndexOutOfRange {
        expression: String,
        name: String,
        index: u64,
        length: usize,
    },

    /// A divisor evaluated to zero.
    #[error("could not evaluate {expression}: division by zero")]
    DivisionByZero { expression: String },

    /// The value is NaN or infinite.
    #[error("could not evaluate {expression}: result is not finite")]
    NonFinite { expression: String },

    /// Any other evaluation failure.
    #[error("could not evaluate {expression}: {source}")]
    Evaluation {
        expression: String,
        #[source]
        source: EvaluationError,
    },
}

impl BuildPatchValuesError {
    pub(crate) fn from_evaluation(expression: &str, error: EvaluationError) -> Self {
        let expression = expression.to_string();
        match error {
            EvaluationError::UndefinedMemory(name) => Self::UndefinedMemory { expression, name },
            EvaluationError::IndexOutOfRange {
                name,
                index,
                length,
            } => Self::IndexOutOfRange {
                expression,
                name,
                index,
                length,
            },
            EvaluationError::DivisionByZero => Self::DivisionByZero { expression },
            EvaluationError::NonFinite => Self::NonFinite { expression },
            source => Self::Evaluation { expression, source },
        }
    }

    /// The table entry that failed.
    pub fn expression(&self) -> &str {
        match self {
            Self::Parse { expression, .. }
            | Self::UndefinedMemory { expression, .. }
            | Self::IndexOutOfRange { expression, .. }
            | Self::DivisionByZero { expression }
            | Self::NonFinite { expression }
            | Self::Evaluation { expression, .. } => expression,
        }
    }
}

/// Result type for patch value evaluation.
pub type PatchResult<T> = Result<T, BuildPatchValuesError>;
