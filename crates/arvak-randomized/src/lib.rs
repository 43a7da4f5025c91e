//! Per-shot randomized measurements for Arvak control data.
//!
//! This crate adds randomized measurement bases to Quil programs. The
//! control system draws a random unitary per qubit and shot with its own
//! 48-bit LFSR; the [`random`] module replays that generator so the drawn
//! unitaries can be recovered after execution.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::time::Duration;
//!
//! use arvak_quil::MemoryReference;
//! use arvak_randomized::{
//!     PrngSeedValue, RandomizedMeasurement, RandomizedMeasurements, ZxzxzUnitarySet,
//! };
//!
//! let measurements = (0..2)
//!     .map(|q| RandomizedMeasurement::new(q, MemoryReference::new("ro", q)))
//!     .collect();
//! let randomized = RandomizedMeasurements::try_new(
//!     measurements,
//!     ZxzxzUnitarySet::tetrahedral(),
//!     Duration::from_micros(1),
//! )
//! .unwrap();
//!
//! let quil = randomized
//!     .append_to_quil("DECLARE ro BIT[2]\nH 0\nCNOT 0 1")
//!     .unwrap();
//! assert!(quil.contains("MEASURE 1 ro[1]"));
//!
//! let seeds = BTreeMap::from([
//!     (0, PrngSeedValue::try_new(463_692_700).unwrap()),
//!     (1, PrngSeedValue::try_new(733_101_278).unwrap()),
//! ]);
//! let parameters = randomized.to_parameters(&seeds).unwrap();
//! assert_eq!(parameters["randomized_measurement_source"].len(), 36);
//!
//! let indices = randomized.get_random_indices(&seeds, 3);
//! assert_eq!(indices[&0], vec![0, 8, 1]);
//! ```

pub mod error;
pub mod measurements;
pub mod random;
pub mod zxzxz;

pub use error::{
    AppendToProgramError, RandomError, RandomResult, RandomizedMeasurementsError,
    RandomizedMeasurementsResult, ToParametersError,
};
pub use measurements::{
    QubitRandomization, RandomizedMeasurement, RandomizedMeasurements, UnitarySet,
};
pub use random::{
    ChooseRandomRealSubRegions, MAX_SEQUENCER_VALUE, PrngSeedValue,
    choose_random_real_sub_region_indices, lfsr_v1_next,
};
pub use zxzxz::{ZxzxzError, ZxzxzUnitarySet};
