//! Register data and dense register matrices.

use ndarray::Array2;
use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};

use crate::error::{ConversionResult, RegisterMatrixConversionError};
use crate::values::ValueKind;

/// Memory contents of one register from a simulator run, one row per shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterData {
    /// `BIT` or `OCTET` registers.
    I8(Vec<Vec<i8>>),
    /// `INTEGER` registers.
    I16(Vec<Vec<i16>>),
    /// `REAL` registers.
    F64(Vec<Vec<f64>>),
    /// Complex-valued registers.
    #[serde(skip)]
    Complex32(Vec<Vec<Complex32>>),
}

impl RegisterData {
    /// Number of shots.
    pub fn shot_count(&self) -> usize {
        match self {
            RegisterData::I8(rows) => rows.len(),
            RegisterData::I16(rows) => rows.len(),
            RegisterData::F64(rows) => rows.len(),
            RegisterData::Complex32(rows) => rows.len(),
        }
    }

    pub fn as_i8(&self) -> Option<&[Vec<i8>]> {
        match self {
            RegisterData::I8(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<&[Vec<i16>]> {
        match self {
            RegisterData::I16(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[Vec<f64>]> {
        match self {
            RegisterData::F64(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_complex32(&self) -> Option<&[Vec<Complex32>]> {
        match self {
            RegisterData::Complex32(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_i8(self) -> Option<Vec<Vec<i8>>> {
        match self {
            RegisterData::I8(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_i16(self) -> Option<Vec<Vec<i16>>> {
        match self {
            RegisterData::I16(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_f64(self) -> Option<Vec<Vec<f64>>> {
        match self {
            RegisterData::F64(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_complex32(self) -> Option<Vec<Vec<Complex32>>> {
        match self {
            RegisterData::Complex32(rows) => Some(rows),
            _ => None,
        }
    }

    /// Convert to a dense matrix. Every row must have the first row's length.
    pub fn to_register_matrix(&self, register: &str) -> ConversionResult<RegisterMatrix> {
        match self {
            RegisterData::I8(rows) => stack_rows(register, rows, i64::from).map(RegisterMatrix::Integer),
            RegisterData::I16(rows) => {
                stack_rows(register, rows, i64::from).map(RegisterMatrix::Integer)
            }
            RegisterData::F64(rows) => stack_rows(register, rows, |v| v).map(RegisterMatrix::Real),
            RegisterData::Complex32(rows) => stack_rows(register, rows, |c| {
                Complex64::new(f64::from(c.re), f64::from(c.im))
            })
            .map(RegisterMatrix::Complex),
        }
    }
}

fn stack_rows<T: Copy, U>(
    register: &str,
    rows: &[Vec<T>],
    convert: impl Fn(T) -> U,
) -> ConversionResult<Array2<U>> {
    let jagged = || RegisterMatrixConversionError::JaggedData {
        register: register.to_string(),
    };
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != width) {
        return Err(jagged());
    }

    let data = rows.iter().flatten().copied().map(convert).collect();
    Array2::from_shape_vec((rows.len(), width), data).map_err(|_| jagged())
}

/// A rectangular (shots × slots) matrix of one register's final values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegisterMatrix {
    Integer(Array2<i64>),
    Real(Array2<f64>),
    Complex(Array2<Complex64>),
}

impl RegisterMatrix {
    pub fn from_integer(matrix: Array2<i64>) -> Self {
        RegisterMatrix::Integer(matrix)
    }

    pub fn from_real(matrix: Array2<f64>) -> Self {
        RegisterMatrix::Real(matrix)
    }

    pub fn from_complex(matrix: Array2<Complex64>) -> Self {
        RegisterMatrix::Complex(matrix)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            RegisterMatrix::Integer(_) => ValueKind::Integer,
            RegisterMatrix::Real(_) => ValueKind::Real,
            RegisterMatrix::Complex(_) => ValueKind::Complex,
        }
    }

    /// `(shot_count, slot_count)`
    pub fn shape(&self) -> (usize, usize) {
        match self {
            RegisterMatrix::Integer(m) => m.dim(),
            RegisterMatrix::Real(m) => m.dim(),
            RegisterMatrix::Complex(m) => m.dim(),
        }
    }

    pub fn shot_count(&self) -> usize {
        self.shape().0
    }

    pub fn slot_count(&self) -> usize {
        self.shape().1
    }

    pub fn as_integer(&self) -> Option<&Array2<i64>> {
        match self {
            RegisterMatrix::Integer(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&Array2<f64>> {
        match self {
            RegisterMatrix::Real(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&Array2<Complex64>> {
        match self {
            RegisterMatrix::Complex(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<Array2<i64>> {
        match self {
            RegisterMatrix::Integer(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_real(self) -> Option<Array2<f64>> {
        match self {
            RegisterMatrix::Real(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_complex(self) -> Option<Array2<Complex64>> {
        match self {
            RegisterMatrix::Complex(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Array2<i64>> for RegisterMatrix {
    fn from(matrix: Array2<i64>) -> Self {
        RegisterMatrix::Integer(matrix)
    }
}

impl From<Array2<f64>> for RegisterMatrix {
    fn from(matrix: Array2<f64>) -> Self {
        RegisterMatrix::Real(matrix)
    }
}

impl From<Array2<Complex64>> for RegisterMatrix {
    fn from(matrix: Array2<Complex64>) -> Self {
        RegisterMatrix::Complex(matrix)
    }
}
