//! Unitaries realized as `RZ-RX(pi/2)-RZ-RX(pi/2)-RZ`.

use std::f64::consts::{FRAC_PI_2, PI};

use arvak_quil::{Expression, Fence, Gate, Instruction, MemoryReference, Qubit};
use ndarray::Array2;
use thiserror::Error;

use crate::measurements::{QubitRandomization, UnitarySet};

const TETRAHEDRAL_UNITARY_SET_RADIANS: [[f64; 3]; 12] = [
    [0., FRAC_PI_2, -FRAC_PI_2],
    [PI, FRAC_PI_2, -FRAC_PI_2],
    [0., FRAC_PI_2, FRAC_PI_2],
    [PI, FRAC_PI_2, FRAC_PI_2],
    [-FRAC_PI_2, FRAC_PI_2, PI],
    [-FRAC_PI_2, FRAC_PI_2, 0.],
    [FRAC_PI_2, FRAC_PI_2, PI],
    [FRAC_PI_2, FRAC_PI_2, 0.],
    [FRAC_PI_2, PI, -FRAC_PI_2],
    [PI, PI, 0.],
    [-FRAC_PI_2, 0., -FRAC_PI_2],
    [0., 0., PI],
];

/// Errors from building a [`ZxzxzUnitarySet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ZxzxzError {
    #[error("unitary angles must have 3 columns, found {0}")]
    ColumnCount(usize),
}

/// Unitaries of the form
///
/// ```text
/// RZ(2*pi*a) - RX(pi/2) - RZ(2*pi*b) - RX(pi/2) - RZ(2*pi*c)
/// ```
///
/// stored one per row as `[a, b, c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZxzxzUnitarySet(Array2<f64>);

impl ZxzxzUnitarySet {
    /// The 12-element tetrahedral ensemble.
    pub fn tetrahedral() -> Self {
        Self(Array2::from_shape_fn((12, 3), |(i, j)| {
            TETRAHEDRAL_UNITARY_SET_RADIANS[i][j]
        }))
    }

    /// Use custom angles, one unitary per row.
    pub fn from_angles(angles: Array2<f64>) -> Result<Self, ZxzxzError> {
        if angles.ncols() != 3 {
            return Err(ZxzxzError::ColumnCount(angles.ncols()));
        }
        Ok(Self(angles))
    }

    pub fn angles(&self) -> &Array2<f64> {
        &self.0
    }
}

impl UnitarySet for ZxzxzUnitarySet {
    type Error = ZxzxzError;

    fn unitary_count(&self) -> usize {
        self.0.nrows()
    }

    fn parameters_per_unitary(&self) -> usize {
        3
    }

    fn to_parameters(&self) -> Result<Vec<f64>, ZxzxzError> {
        Ok(self.0.iter().copied().collect())
    }

    fn to_instructions(
        &self,
        qubit_randomizations: &[QubitRandomization],
    ) -> Result<Vec<Instruction>, ZxzxzError> {
        let destination = |randomization: &QubitRandomization, index| {
            MemoryReference::new(randomization.destination_declaration().name.clone(), index)
        };

        let mut instructions = vec![Instruction::Fence(Fence { qubits: Vec::new() })];
        for randomization in qubit_randomizations {
            let qubit = randomization.qubit();
            instructions.extend([
                rz(qubit.clone(), destination(randomization, 0)),
                rx_pi_over_2(qubit.clone()),
                rz(qubit, destination(randomization, 1)),
            ]);
        }
        instructions.push(Instruction::Fence(Fence { qubits: Vec::new() }));
        for randomization in qubit_randomizations {
            let qubit = randomization.qubit();
            instructions.extend([
                rx_pi_over_2(qubit.clone()),
                rz(qubit, destination(randomization, 2)),
            ]);
        }
        Ok(instructions)
    }
}

fn rx_pi_over_2(qubit: Qubit) -> Instruction {
    Instruction::Gate(Gate::new(
        "RX",
        vec![Expression::Pi / Expression::number(2.0)],
        vec![qubit],
    ))
}

fn rz(qubit: Qubit, reference: MemoryReference) -> Instruction {
    Instruction::Gate(Gate::new(
        "RZ",
        vec![Expression::number(2.0) * Expression::Pi * Expression::Address(reference)],
        vec![qubit],
    ))
}
