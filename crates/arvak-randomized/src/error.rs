//! Error types for the randomized crate.

use std::collections::BTreeSet;

use arvak_quil::{QuilError, Qubit, ScalarType};
use thiserror::Error;

use crate::random::MAX_SEQUENCER_VALUE;

/// Misuse of the sequencer randomization primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RandomError {
    /// Seed outside the sequencer range.
    #[error("seed values must be in range [1, {MAX_SEQUENCER_VALUE}], found {0}")]
    InvalidSeed(u64),

    /// The destination region must be `REAL[]`.
    #[error("destination must be a REAL[], found {destination_type}")]
    InvalidDestinationType {
        /// Type of the destination declaration.
        destination_type: ScalarType,
    },

    /// The source region must be `REAL[]`.
    #[error("source must be a REAL[], found {source_type}")]
    InvalidSourceType {
        /// Type of the source declaration.
        source_type: ScalarType,
    },

    /// The destination length is not a multiple of the sub-region size.
    #[error(
        "destination length must be divisible by a non-zero sub-region size, found {destination_length} % {sub_region_size}"
    )]
    InvalidDestinationLength {
        destination_length: u64,
        sub_region_size: u64,
    },

    /// The source length is not a multiple of the sub-region size.
    #[error(
        "source length must be divisible by a non-zero sub-region size, found {source_length} % {sub_region_size}"
    )]
    InvalidSourceLength {
        source_length: u64,
        sub_region_size: u64,
    },

    /// Indices were requested over zero sub-regions.
    #[error("sub-region count must be at least 1")]
    NoSubRegions,
}

/// Result type for randomization primitives.
pub type RandomResult<T> = Result<T, RandomError>;

/// Invalid randomized measurement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RandomizedMeasurementsError {
    /// No measurements to randomize.
    #[error("at least one measurement must be randomized")]
    NoMeasurements,

    /// The same qubit appears in more than one measurement.
    #[error("qubit {0} is randomized more than once")]
    DuplicateQubit(u64),

    /// A measurement does not target a fixed qubit.
    #[error("only measurements on fixed qubits are supported, found {0}")]
    UnsupportedMeasurementQubit(Qubit),

    /// A measurement has no readout target.
    #[error("measurement of qubit {0} has no target memory reference")]
    MissingMeasurementTarget(Qubit),

    /// The unitary set is empty or too large to index with a `u8`.
    #[error("the unitary count must be within range [1, {max}], found {0}", max = u8::MAX)]
    UnitaryCountOutOfRange(usize),

    /// Unitaries must be described by at least one parameter.
    #[error("a unitary must be described by at least one parameter")]
    NoParametersPerUnitary,
}

/// Result type for building a randomized measurement configuration.
pub type RandomizedMeasurementsResult<T> = Result<T, RandomizedMeasurementsError>;

/// Failure to append randomized measurements to a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppendToProgramError<E> {
    /// The program already measures randomized qubits.
    #[error("program contains preexisting measurements on qubits: {0:?}")]
    ProgramContainsPreexistingMeasurements(BTreeSet<u64>),

    /// Parsing the program failed, or a generated region is already declared.
    #[error("Quil error: {0}")]
    Quil(#[from] QuilError),

    /// The extern call could not be built.
    #[error("error building choose_random_real_sub_regions call: {0}")]
    ChooseRandomRealSubRegions(#[from] RandomError),

    /// The unitary set failed to produce its instructions.
    #[error("an error occurred while building unitary set instructions: {0}")]
    UnitarySet(E),
}

/// Failure to build the parameters of a randomized program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToParametersError<E> {
    /// No seed was provided for a randomized qubit.
    #[error("seed not provided for qubit {0}")]
    MissingSeed(u64),

    /// The unitary set produced the wrong number of source values.
    #[error("unitary set produced {found} source values, expected {expected}")]
    SourceLength { expected: usize, found: usize },

    /// The unitary set failed to produce its parameters.
    #[error("an error occurred while building unitary set parameters: {0}")]
    UnitarySet(E),
}
