//! Per-shot randomized measurements.
//!
//! Randomizing the measurement basis of each qubit on every shot is the basis
//! of classical-shadow tomography and several error-mitigation schemes. The
//! randomness comes from the control system itself: before the pulse program
//! starts, one extern call per qubit copies a randomly chosen unitary's
//! parameters from a shared source region into that qubit's destination
//! region. A [`UnitarySet`] then realizes the chosen unitary from those
//! parameters right before measurement.
//!
//! [`RandomizedMeasurements`] covers the three pieces a caller needs:
//! building the program, building its parameters from per-qubit seeds, and
//! replaying which unitary was drawn on every shot.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU8;
use std::time::Duration;

use arvak_quil::{
    Declaration, Delay, Fence, Instruction, Measurement, MemoryReference, Parameters, Program,
    Qubit, ScalarType, Vector,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{
    AppendToProgramError, RandomizedMeasurementsError, RandomizedMeasurementsResult,
    ToParametersError,
};
use crate::random::{ChooseRandomRealSubRegions, PrngSeedValue, sub_region_indices};

/// Region holding the parameters of every unitary in the set.
pub const RANDOMIZED_MEASUREMENT_SOURCE: &str = "randomized_measurement_source";
/// Prefix of each qubit's region of drawn unitary parameters.
pub const RANDOMIZED_MEASUREMENT_DESTINATION: &str = "randomized_measurement_destination";
/// Prefix of each qubit's seed region.
pub const RANDOMIZED_MEASUREMENT_SEED: &str = "randomized_measurement_seed";

/// Measure `qubit` into `target`, in a randomly drawn basis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomizedMeasurement {
    pub qubit: u64,
    pub target: MemoryReference,
}

impl RandomizedMeasurement {
    pub fn new(qubit: u64, target: MemoryReference) -> Self {
        Self { qubit, target }
    }

    fn to_measurement(&self) -> Measurement {
        Measurement::new(Qubit::Fixed(self.qubit), Some(self.target.clone()))
    }
}

impl TryFrom<Measurement> for RandomizedMeasurement {
    type Error = RandomizedMeasurementsError;

    fn try_from(measurement: Measurement) -> RandomizedMeasurementsResult<Self> {
        let Qubit::Fixed(qubit) = measurement.qubit else {
            return Err(RandomizedMeasurementsError::UnsupportedMeasurementQubit(
                measurement.qubit,
            ));
        };
        let target = measurement.target.ok_or(
            RandomizedMeasurementsError::MissingMeasurementTarget(Qubit::Fixed(qubit)),
        )?;
        Ok(Self::new(qubit, target))
    }
}

/// The declarations that randomize one qubit.
#[derive(Debug, Clone, PartialEq)]
pub struct QubitRandomization {
    measurement: RandomizedMeasurement,
    destination_declaration: Declaration,
    seed_declaration: Declaration,
}

impl QubitRandomization {
    fn new(measurement: RandomizedMeasurement, parameters_per_unitary: u64) -> Self {
        let qubit = measurement.qubit;
        Self {
            destination_declaration: Declaration::new(
                format!("{RANDOMIZED_MEASUREMENT_DESTINATION}_q{qubit}"),
                Vector::new(ScalarType::Real, parameters_per_unitary),
            ),
            seed_declaration: Declaration::new(
                format!("{RANDOMIZED_MEASUREMENT_SEED}_q{qubit}"),
                Vector::new(ScalarType::Integer, 1),
            ),
            measurement,
        }
    }

    /// The `INTEGER[1]` region seeding this qubit's PRNG sequence.
    pub fn seed_declaration(&self) -> &Declaration {
        &self.seed_declaration
    }

    /// The `REAL` region that holds the parameters of the unitary drawn for
    /// the current shot.
    pub fn destination_declaration(&self) -> &Declaration {
        &self.destination_declaration
    }

    pub fn measurement(&self) -> &RandomizedMeasurement {
        &self.measurement
    }

    pub fn qubit_index(&self) -> u64 {
        self.measurement.qubit
    }

    pub fn qubit(&self) -> Qubit {
        Qubit::Fixed(self.measurement.qubit)
    }
}

/// A set of unitaries to draw measurement bases from, together with the
/// Quil that realizes a drawn unitary.
///
/// See [`ZxzxzUnitarySet`](crate::ZxzxzUnitarySet) for an implementation.
pub trait UnitarySet {
    /// Error raised while describing the set.
    type Error;

    /// Number of unitaries in the set.
    fn unitary_count(&self) -> usize;

    /// Number of real parameters describing one unitary.
    fn parameters_per_unitary(&self) -> usize;

    /// Parameters of every unitary, concatenated. Unitary `i` occupies
    /// `i * parameters_per_unitary()..(i + 1) * parameters_per_unitary()`.
    fn to_parameters(&self) -> Result<Vec<f64>, Self::Error>;

    /// Instructions applying, on each qubit, the unitary whose parameters
    /// were copied into that qubit's destination region.
    fn to_instructions(
        &self,
        qubit_randomizations: &[QubitRandomization],
    ) -> Result<Vec<Instruction>, Self::Error>;
}

/// Adds per-shot randomized measurements to programs.
#[derive(Debug, Clone)]
pub struct RandomizedMeasurements<U> {
    leading_delay: Duration,
    unitary_set: U,
    unitary_count: NonZeroU8,
    qubit_randomizations: Vec<QubitRandomization>,
    source_declaration: Declaration,
}

impl<U: UnitarySet> RandomizedMeasurements<U> {
    /// Configure randomized measurements.
    ///
    /// `measurements` must not already be present in the programs this is
    /// applied to. `leading_delay` is inserted at the start of the program
    /// to give the sequencer time to run the extern calls.
    pub fn try_new(
        measurements: Vec<RandomizedMeasurement>,
        unitary_set: U,
        leading_delay: Duration,
    ) -> RandomizedMeasurementsResult<Self> {
        if measurements.is_empty() {
            return Err(RandomizedMeasurementsError::NoMeasurements);
        }

        let unitary_count = u8::try_from(unitary_set.unitary_count())
            .ok()
            .and_then(NonZeroU8::new)
            .ok_or(RandomizedMeasurementsError::UnitaryCountOutOfRange(
                unitary_set.unitary_count(),
            ))?;

        let parameters_per_unitary = unitary_set.parameters_per_unitary();
        if parameters_per_unitary == 0 {
            return Err(RandomizedMeasurementsError::NoParametersPerUnitary);
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = measurements.iter().find(|m| !seen.insert(m.qubit)) {
            return Err(RandomizedMeasurementsError::DuplicateQubit(duplicate.qubit));
        }

        let source_declaration = Declaration::new(
            RANDOMIZED_MEASUREMENT_SOURCE,
            Vector::new(
                ScalarType::Real,
                (parameters_per_unitary * usize::from(unitary_count.get())) as u64,
            ),
        );
        let qubit_randomizations = measurements
            .into_iter()
            .map(|measurement| QubitRandomization::new(measurement, parameters_per_unitary as u64))
            .collect();

        Ok(Self {
            leading_delay,
            unitary_set,
            unitary_count,
            qubit_randomizations,
            source_declaration,
        })
    }

    pub fn unitary_set(&self) -> &U {
        &self.unitary_set
    }

    pub fn leading_delay(&self) -> Duration {
        self.leading_delay
    }

    pub fn qubit_randomizations(&self) -> &[QubitRandomization] {
        &self.qubit_randomizations
    }

    pub fn source_declaration(&self) -> &Declaration {
        &self.source_declaration
    }

    fn qubits(&self) -> Vec<Qubit> {
        self.qubit_randomizations
            .iter()
            .map(QubitRandomization::qubit)
            .collect()
    }

    /// Append randomized measurements to `program`.
    ///
    /// The result keeps the program's definitions, frames and declarations,
    /// followed by the generated declarations. Its body is a leading delay,
    /// the extern declaration and one sub-region draw per qubit, then the
    /// original body, the unitary set's instructions, a fence and finally
    /// the measurements.
    ///
    /// # Errors
    ///
    /// The program must not measure any randomized qubit or declare any of
    /// the generated regions, so applying the same configuration twice
    /// always fails.
    pub fn append_to_program(
        &self,
        program: Program,
    ) -> Result<Program, AppendToProgramError<U::Error>> {
        let measured = program.measured_qubits();
        let preexisting: BTreeSet<u64> = self
            .qubit_randomizations
            .iter()
            .filter(|randomization| measured.contains(&randomization.qubit()))
            .map(QubitRandomization::qubit_index)
            .collect();
        if !preexisting.is_empty() {
            return Err(AppendToProgramError::ProgramContainsPreexistingMeasurements(
                preexisting,
            ));
        }

        let mut randomized = program.clone_without_body();
        randomized.add_declaration(self.source_declaration.clone())?;
        for randomization in &self.qubit_randomizations {
            randomized.add_declaration(randomization.destination_declaration.clone())?;
            randomized.add_declaration(randomization.seed_declaration.clone())?;
        }

        randomized.add_instruction(Instruction::Delay(Delay::new(
            self.qubits(),
            Vec::new(),
            self.leading_delay.as_secs_f64(),
        )))?;
        randomized.add_instruction(Instruction::Pragma(
            ChooseRandomRealSubRegions::pragma_extern(),
        ))?;

        let parameters_per_unitary = self.unitary_set.parameters_per_unitary() as u64;
        for randomization in &self.qubit_randomizations {
            let call = ChooseRandomRealSubRegions::try_new(
                &randomization.destination_declaration,
                &self.source_declaration,
                parameters_per_unitary,
                &MemoryReference::new(randomization.seed_declaration.name.clone(), 0),
            )?;
            randomized.add_instruction(Instruction::Call(call.to_call()))?;
        }

        randomized.add_instructions(program.into_body())?;
        randomized.add_instructions(
            self.unitary_set
                .to_instructions(&self.qubit_randomizations)
                .map_err(AppendToProgramError::UnitarySet)?,
        )?;
        randomized.add_instruction(Instruction::Fence(Fence { qubits: Vec::new() }))?;
        randomized.add_instructions(
            self.qubit_randomizations
                .iter()
                .map(|randomization| Instruction::Measurement(randomization.measurement.to_measurement())),
        )?;

        debug!(
            qubits = self.qubit_randomizations.len(),
            unitary_count = self.unitary_count.get(),
            "appended randomized measurements"
        );
        Ok(randomized)
    }

    /// Text form of [`Self::append_to_program`].
    pub fn append_to_quil(&self, quil: &str) -> Result<String, AppendToProgramError<U::Error>> {
        let program: Program = quil.parse()?;
        Ok(self.append_to_program(program)?.to_quil())
    }

    /// Build the parameters of a randomized program from per-qubit seeds.
    ///
    /// The source region holds the unitary set's parameters, each
    /// destination region starts zeroed and each seed region holds its
    /// qubit's seed.
    pub fn to_parameters(
        &self,
        seeds: &BTreeMap<u64, PrngSeedValue>,
    ) -> Result<Parameters, ToParametersError<U::Error>> {
        let source = self
            .unitary_set
            .to_parameters()
            .map_err(ToParametersError::UnitarySet)?;
        let parameters_per_unitary = self.unitary_set.parameters_per_unitary();
        let expected = parameters_per_unitary * usize::from(self.unitary_count.get());
        if source.len() != expected {
            return Err(ToParametersError::SourceLength {
                expected,
                found: source.len(),
            });
        }

        let mut parameters = Parameters::new();
        parameters.insert(RANDOMIZED_MEASUREMENT_SOURCE.to_string(), source);
        for randomization in &self.qubit_randomizations {
            let seed = seeds
                .get(&randomization.qubit_index())
                .ok_or(ToParametersError::MissingSeed(randomization.qubit_index()))?;
            parameters.insert(
                randomization.seed_declaration.name.clone(),
                vec![seed.as_f64()],
            );
            parameters.insert(
                randomization.destination_declaration.name.clone(),
                vec![0.0; parameters_per_unitary],
            );
        }
        Ok(parameters)
    }

    /// Replay the unitary index drawn on each of the first `shot_count`
    /// shots, per seeded qubit.
    pub fn get_random_indices(
        &self,
        seeds: &BTreeMap<u64, PrngSeedValue>,
        shot_count: u32,
    ) -> BTreeMap<u64, Vec<u8>> {
        seeds
            .iter()
            .map(|(&qubit, &seed)| {
                (
                    qubit,
                    sub_region_indices(seed, 0, shot_count, self.unitary_count),
                )
            })
            .collect()
    }
}
