//! Replay of the control-system pseudo-random number generator.
//!
//! The sequencer draws random sub-region indices with a 48-bit linear
//! feedback shift register. Anything that needs to know which unitary played
//! on which shot must reproduce that generator bit for bit, so the constants
//! and stepping rules here are fixed and covered by regression vectors.
//!
//! The sequencer exposes the generator as the extern function
//! `choose_random_real_sub_regions`, declared and called from Quil through
//! [`ChooseRandomRealSubRegions`].

use std::num::NonZeroU8;

use arvak_quil::{
    Call, CallArgument, Declaration, MemoryReference, Pragma, PragmaArgument, ScalarType,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RandomError, RandomResult};

/// Largest value the 48-bit sequencer registers hold, `2^48 - 1`.
pub const MAX_SEQUENCER_VALUE: u64 = (1 << 48) - 1;

/// Only the low 16 bits of each draw select a sub-region.
const SUB_REGION_SELECTION_MASK: u64 = 0xFFFF;

/// 0-based taps of the v1 generator; maximal length for 48-bit state.
const V1_TAPS: [u32; 4] = [47, 46, 20, 19];

/// A seed accepted by the sequencer PRNG.
///
/// Seeds live in `[1, 2^48 - 1]`. Every such value is exactly representable
/// as an `f64`, which is how seeds are written into `INTEGER` memory through
/// program parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PrngSeedValue {
    u64_value: u64,
    f64_value: f64,
}

impl PrngSeedValue {
    /// Validate a seed.
    pub fn try_new(value: u64) -> RandomResult<Self> {
        if !(1..=MAX_SEQUENCER_VALUE).contains(&value) {
            return Err(RandomError::InvalidSeed(value));
        }
        Ok(Self::from_valid(value))
    }

    /// Draw a uniformly distributed valid seed.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_valid(rng.gen_range(1..=MAX_SEQUENCER_VALUE))
    }

    // Callers guarantee `value <= MAX_SEQUENCER_VALUE < 2^53`.
    #[allow(clippy::cast_precision_loss)]
    fn from_valid(value: u64) -> Self {
        Self {
            u64_value: value,
            f64_value: value as f64,
        }
    }

    /// The seed as an integer.
    pub fn value(&self) -> u64 {
        self.u64_value
    }

    /// The seed as a parameter value.
    pub fn as_f64(&self) -> f64 {
        self.f64_value
    }
}

impl TryFrom<u64> for PrngSeedValue {
    type Error = RandomError;

    fn try_from(value: u64) -> RandomResult<Self> {
        Self::try_new(value)
    }
}

impl From<PrngSeedValue> for u64 {
    fn from(seed: PrngSeedValue) -> Self {
        seed.u64_value
    }
}

fn lfsr_next(state: u64, taps: &[u32]) -> u64 {
    let feedback = taps.iter().fold(0, |acc, &tap| acc ^ ((state >> tap) & 1));
    ((state << 1) & MAX_SEQUENCER_VALUE) | feedback
}

/// Advance the v1 sequencer LFSR by one step.
///
/// The register is 48 bits wide with taps at bit indices 47, 46, 20 and 19:
/// the state shifts left by one and the XOR of the tapped bits enters at
/// bit 0.
#[must_use]
pub fn lfsr_v1_next(seed: PrngSeedValue) -> u64 {
    lfsr_next(seed.u64_value, &V1_TAPS)
}

/// Raw LFSR states `start_index..start_index + series_length`. The first
/// state is one step past the seed.
fn lfsr_v1_sequence(seed: u64, start_index: u32, series_length: u32) -> Vec<u64> {
    let end = u64::from(start_index) + u64::from(series_length);
    let mut state = seed & MAX_SEQUENCER_VALUE;
    let mut sequence = Vec::with_capacity(series_length as usize);
    for i in 0..end {
        state = lfsr_next(state, &V1_TAPS);
        if i >= u64::from(start_index) {
            sequence.push(state);
        }
    }
    sequence
}

#[allow(clippy::cast_possible_truncation)]
fn to_sub_region_index(value: u64, sub_region_count: NonZeroU8) -> u8 {
    // The remainder is below `sub_region_count`, so it fits in a u8.
    ((value & SUB_REGION_SELECTION_MASK) % u64::from(sub_region_count.get())) as u8
}

pub(crate) fn sub_region_indices(
    seed: PrngSeedValue,
    start_index: u32,
    series_length: u32,
    sub_region_count: NonZeroU8,
) -> Vec<u8> {
    lfsr_v1_sequence(seed.u64_value, start_index, series_length)
        .into_iter()
        .map(|value| to_sub_region_index(value, sub_region_count))
        .collect()
}

/// Replay the sub-region indices the sequencer chose.
///
/// For a program declaring `destination REAL[6]` and `source REAL[12]` with
/// a sub-region size of 3, each shot makes two draws over four sub-regions,
/// so 100 shots correspond to `series_length = 200` and
/// `sub_region_count = 4`.
///
/// ```rust
/// use arvak_randomized::random::{choose_random_real_sub_region_indices, PrngSeedValue};
///
/// let seed = PrngSeedValue::try_new(639_523).unwrap();
/// let indices = choose_random_real_sub_region_indices(seed, 0, 8, 4).unwrap();
/// assert_eq!(indices, vec![3, 3, 2, 1, 2, 0, 1, 2]);
/// ```
pub fn choose_random_real_sub_region_indices(
    seed: PrngSeedValue,
    start_index: u32,
    series_length: u32,
    sub_region_count: u8,
) -> RandomResult<Vec<u8>> {
    let sub_region_count = NonZeroU8::new(sub_region_count).ok_or(RandomError::NoSubRegions)?;
    Ok(sub_region_indices(
        seed,
        start_index,
        series_length,
        sub_region_count,
    ))
}

/// A call to the `choose_random_real_sub_regions` extern.
///
/// On every invocation the sequencer advances the seed, picks one
/// sub-region of `source` per `sub_region_size` slots of `destination` and
/// copies it across.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooseRandomRealSubRegions {
    destination: String,
    source: String,
    sub_region_size: u64,
    seed: String,
}

impl ChooseRandomRealSubRegions {
    /// Name of the extern function.
    pub const EXTERN_NAME: &'static str = "choose_random_real_sub_regions";

    /// Signature carried by `PRAGMA EXTERN`.
    pub const SIGNATURE: &'static str = "(destination : mut REAL[], source : REAL[], sub_region_size : INTEGER, seed : mut INTEGER)";

    /// Validate the regions of a call. Both `destination` and `source` must
    /// be `REAL` regions whose lengths are multiples of `sub_region_size`.
    pub fn try_new(
        destination: &Declaration,
        source: &Declaration,
        sub_region_size: u64,
        seed: &MemoryReference,
    ) -> RandomResult<Self> {
        if destination.size.data_type != ScalarType::Real {
            return Err(RandomError::InvalidDestinationType {
                destination_type: destination.size.data_type,
            });
        }
        if source.size.data_type != ScalarType::Real {
            return Err(RandomError::InvalidSourceType {
                source_type: source.size.data_type,
            });
        }
        if sub_region_size == 0 || destination.size.length % sub_region_size != 0 {
            return Err(RandomError::InvalidDestinationLength {
                destination_length: destination.size.length,
                sub_region_size,
            });
        }
        if source.size.length % sub_region_size != 0 {
            return Err(RandomError::InvalidSourceLength {
                source_length: source.size.length,
                sub_region_size,
            });
        }

        Ok(Self {
            destination: destination.name.clone(),
            source: source.name.clone(),
            sub_region_size,
            seed: seed.name.clone(),
        })
    }

    /// `PRAGMA EXTERN choose_random_real_sub_regions "<signature>"`
    pub fn pragma_extern() -> Pragma {
        Pragma::new(
            "EXTERN",
            vec![PragmaArgument::Identifier(Self::EXTERN_NAME.to_string())],
            Some(Self::SIGNATURE.to_string()),
        )
    }

    /// `CALL choose_random_real_sub_regions <destination> <source> <size> <seed>`
    #[allow(clippy::cast_precision_loss)]
    pub fn to_call(&self) -> Call {
        Call::new(
            Self::EXTERN_NAME,
            vec![
                CallArgument::Identifier(self.destination.clone()),
                CallArgument::Identifier(self.source.clone()),
                CallArgument::Immediate(self.sub_region_size as f64),
                CallArgument::Identifier(self.seed.clone()),
            ],
        )
    }
}
