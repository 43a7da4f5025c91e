//! Integration tests for randomized measurement programs.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use approx::assert_relative_eq;
use arvak_quil::{Instruction, MemoryReference, Program, QuilError};
use arvak_randomized::{
    AppendToProgramError, PrngSeedValue, QubitRandomization, RandomizedMeasurement,
    RandomizedMeasurements, RandomizedMeasurementsError, ToParametersError, UnitarySet,
    ZxzxzUnitarySet,
};

const BASE_PROGRAM: &str = r"
DECLARE ro BIT[3]

H 0
H 1
H 2
";

const RANDOMIZED_PROGRAM: &str = r#"
DECLARE ro BIT[3]
DECLARE randomized_measurement_source REAL[36]
DECLARE randomized_measurement_destination_q0 REAL[3]
DECLARE randomized_measurement_seed_q0 INTEGER[1]
DECLARE randomized_measurement_destination_q1 REAL[3]
DECLARE randomized_measurement_seed_q1 INTEGER[1]
DECLARE randomized_measurement_destination_q2 REAL[3]
DECLARE randomized_measurement_seed_q2 INTEGER[1]

DELAY 0 1 2 1e-6

PRAGMA EXTERN choose_random_real_sub_regions "(destination : mut REAL[], source : REAL[], sub_region_size : INTEGER, seed : mut INTEGER)"

CALL choose_random_real_sub_regions randomized_measurement_destination_q0 randomized_measurement_source 3 randomized_measurement_seed_q0
CALL choose_random_real_sub_regions randomized_measurement_destination_q1 randomized_measurement_source 3 randomized_measurement_seed_q1
CALL choose_random_real_sub_regions randomized_measurement_destination_q2 randomized_measurement_source 3 randomized_measurement_seed_q2

H 0
H 1
H 2

FENCE

RZ(2*pi*randomized_measurement_destination_q0[0]) 0
RX(pi/2) 0
RZ(2*pi*randomized_measurement_destination_q0[1]) 0

RZ(2*pi*randomized_measurement_destination_q1[0]) 1
RX(pi/2) 1
RZ(2*pi*randomized_measurement_destination_q1[1]) 1

RZ(2*pi*randomized_measurement_destination_q2[0]) 2
RX(pi/2) 2
RZ(2*pi*randomized_measurement_destination_q2[1]) 2

FENCE

RX(pi/2) 0
RZ(2*pi*randomized_measurement_destination_q0[2]) 0

RX(pi/2) 1
RZ(2*pi*randomized_measurement_destination_q1[2]) 1

RX(pi/2) 2
RZ(2*pi*randomized_measurement_destination_q2[2]) 2

FENCE

MEASURE 0 ro[0]
MEASURE 1 ro[1]
MEASURE 2 ro[2]
"#;

fn measurements(qubits: &[u64]) -> Vec<RandomizedMeasurement> {
    qubits
        .iter()
        .map(|&q| RandomizedMeasurement::new(q, MemoryReference::new("ro", q)))
        .collect()
}

fn randomized_measurements() -> RandomizedMeasurements<ZxzxzUnitarySet> {
    RandomizedMeasurements::try_new(
        measurements(&[0, 1, 2]),
        ZxzxzUnitarySet::tetrahedral(),
        Duration::from_micros(1),
    )
    .unwrap()
}

fn seeds() -> BTreeMap<u64, PrngSeedValue> {
    [463_692_700, 733_101_278, 925_742_198]
        .into_iter()
        .enumerate()
        .map(|(i, value)| (i as u64, PrngSeedValue::try_new(value).unwrap()))
        .collect()
}

// ----------------------------------------------------------------------------
// Program construction
// ----------------------------------------------------------------------------

#[test]
fn test_append_to_program() {
    let program: Program = BASE_PROGRAM.parse().unwrap();
    let randomized = randomized_measurements().append_to_program(program).unwrap();

    let expected: Program = RANDOMIZED_PROGRAM.parse().unwrap();
    assert_eq!(randomized, expected);
}

#[test]
fn test_append_to_quil_reparses() {
    let quil = randomized_measurements().append_to_quil(BASE_PROGRAM).unwrap();
    let reparsed: Program = quil.parse().unwrap();
    let expected: Program = RANDOMIZED_PROGRAM.parse().unwrap();
    assert_eq!(reparsed, expected);
}

#[test]
fn test_reapplying_is_rejected() {
    let rm = randomized_measurements();
    let once = rm.append_to_program(BASE_PROGRAM.parse().unwrap()).unwrap();

    match rm.append_to_program(once) {
        Err(AppendToProgramError::ProgramContainsPreexistingMeasurements(qubits)) => {
            assert_eq!(qubits.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        }
        other => panic!("expected preexisting measurement error, got {other:?}"),
    }
}

#[test]
fn test_preexisting_measurement_on_some_qubits() {
    let program: Program = "DECLARE ro BIT[3]\nH 0\nMEASURE 1 ro[1]".parse().unwrap();
    let result = randomized_measurements().append_to_program(program);
    assert!(matches!(
        result,
        Err(AppendToProgramError::ProgramContainsPreexistingMeasurements(q)) if q.len() == 1 && q.contains(&1)
    ));
}

#[test]
fn test_measurement_of_other_qubit_is_kept() {
    let program: Program = "DECLARE ro BIT[4]\nMEASURE 3 ro[3]".parse().unwrap();
    let randomized = randomized_measurements().append_to_program(program).unwrap();
    let measured: Vec<_> = randomized.measured_qubits().into_iter().collect();
    assert_eq!(measured.len(), 4);
}

#[test]
fn test_generated_declaration_already_present() {
    let program: Program = "DECLARE randomized_measurement_source REAL[36]\nH 0"
        .parse()
        .unwrap();
    let result = randomized_measurements().append_to_program(program);
    assert!(matches!(
        result,
        Err(AppendToProgramError::Quil(QuilError::DuplicateDeclaration(name)))
            if name == "randomized_measurement_source"
    ));
}

#[test]
fn test_invalid_quil() {
    let result = randomized_measurements().append_to_quil("DECLARE ro BIT[");
    assert!(matches!(result, Err(AppendToProgramError::Quil(_))));
}

#[test]
fn test_leading_delay_follows_configuration() {
    let rm = RandomizedMeasurements::try_new(
        measurements(&[5]),
        ZxzxzUnitarySet::tetrahedral(),
        Duration::from_nanos(250),
    )
    .unwrap();
    let randomized = rm.append_to_program(Program::new()).unwrap();
    match &randomized.body[0] {
        Instruction::Delay(delay) => assert_relative_eq!(delay.duration, 2.5e-7),
        other => panic!("expected DELAY, got {other}"),
    }
}

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

#[test]
fn test_unitary_count_range() {
    let empty = ZxzxzUnitarySet::from_angles(ndarray::Array2::zeros((0, 3))).unwrap();
    assert!(matches!(
        RandomizedMeasurements::try_new(measurements(&[0]), empty, Duration::ZERO),
        Err(RandomizedMeasurementsError::UnitaryCountOutOfRange(0))
    ));

    let large = ZxzxzUnitarySet::from_angles(ndarray::Array2::zeros((256, 3))).unwrap();
    assert!(matches!(
        RandomizedMeasurements::try_new(measurements(&[0]), large, Duration::ZERO),
        Err(RandomizedMeasurementsError::UnitaryCountOutOfRange(256))
    ));

    let largest = ZxzxzUnitarySet::from_angles(ndarray::Array2::zeros((255, 3))).unwrap();
    assert!(RandomizedMeasurements::try_new(measurements(&[0]), largest, Duration::ZERO).is_ok());
}

// ----------------------------------------------------------------------------
// Parameters
// ----------------------------------------------------------------------------

#[test]
fn test_to_parameters() {
    let parameters = randomized_measurements().to_parameters(&seeds()).unwrap();
    assert_eq!(parameters.len(), 7);

    let source = &parameters["randomized_measurement_source"];
    assert_eq!(source.len(), 36);
    assert_eq!(&source[..3], &[0.0, FRAC_PI_2, -FRAC_PI_2]);
    assert_eq!(&source[33..], &[0.0, 0.0, PI]);

    for (qubit, seed) in seeds() {
        assert_eq!(
            parameters[&format!("randomized_measurement_seed_q{qubit}")],
            vec![seed.as_f64()]
        );
        assert_eq!(
            parameters[&format!("randomized_measurement_destination_q{qubit}")],
            vec![0.0; 3]
        );
    }
}

#[test]
fn test_to_parameters_missing_seed() {
    let mut seeds = seeds();
    seeds.remove(&1);
    assert!(matches!(
        randomized_measurements().to_parameters(&seeds),
        Err(ToParametersError::MissingSeed(1))
    ));
}

/// Claims two unitaries of two parameters but only describes one.
struct ShortUnitarySet;

impl UnitarySet for ShortUnitarySet {
    type Error = Infallible;

    fn unitary_count(&self) -> usize {
        2
    }

    fn parameters_per_unitary(&self) -> usize {
        2
    }

    fn to_parameters(&self) -> Result<Vec<f64>, Infallible> {
        Ok(vec![0.0, 1.0])
    }

    fn to_instructions(&self, _: &[QubitRandomization]) -> Result<Vec<Instruction>, Infallible> {
        Ok(Vec::new())
    }
}

#[test]
fn test_to_parameters_source_length() {
    let rm = RandomizedMeasurements::try_new(measurements(&[0]), ShortUnitarySet, Duration::ZERO)
        .unwrap();
    assert!(matches!(
        rm.to_parameters(&seeds()),
        Err(ToParametersError::SourceLength {
            expected: 4,
            found: 2
        })
    ));
}

// ----------------------------------------------------------------------------
// PRNG replay
// ----------------------------------------------------------------------------

#[test]
fn test_get_random_indices() {
    let indices = randomized_measurements().get_random_indices(&seeds(), 3);
    let expected = BTreeMap::from([
        (0, vec![0, 8, 1]),
        (1, vec![1, 2, 1]),
        (2, vec![5, 10, 5]),
    ]);
    assert_eq!(indices, expected);
}

#[test]
fn test_get_random_indices_no_shots() {
    let indices = randomized_measurements().get_random_indices(&seeds(), 0);
    assert!(indices.values().all(Vec::is_empty));
}
