//! Error types for the results crate.

use thiserror::Error;

/// Errors that can occur while assembling register matrices from raw result
/// data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegisterMatrixConversionError {
    /// Columns (or rows) of a register have different lengths.
    #[error("The data for register {register} does not fit into a rectangular matrix")]
    JaggedData { register: String },

    /// Columns of a register hold different numeric kinds.
    #[error("The data for register {register} mixes integer, real, and complex values")]
    MixedKinds { register: String },

    /// Two mapping keys resolve to the same register slot.
    #[error("Register {register} has more than one mapping for index {index}")]
    DuplicateIndex { register: String, index: u64 },

    /// A mapping points at a readout handle with no values.
    #[error("The mapping of {memory_reference} to {handle} had no readout values")]
    UnmappedHandle {
        memory_reference: String,
        handle: String,
    },

    /// A mapping key is not of the form `name[index]`.
    #[error("Invalid memory reference in readout mappings: '{0}'")]
    InvalidMemoryReference(String),
}

/// Result type for register matrix assembly.
pub type ConversionResult<T> = Result<T, RegisterMatrixConversionError>;
