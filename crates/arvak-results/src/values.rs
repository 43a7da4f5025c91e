//! Typed per-shot values.
//!
//! These unions are closed: there is no implicit coercion between variants and
//! narrowing returns `None` on a kind mismatch.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Numeric kind of a readout or register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Real,
    Complex,
}

/// All values emitted to one readout handle, one entry per shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReadoutValues {
    /// Integer readout values (e.g. discriminated bits).
    Integer(Vec<i64>),
    /// Real readout values.
    Real(Vec<f64>),
    /// Complex readout values (e.g. raw IQ points).
    Complex(Vec<Complex64>),
}

impl ReadoutValues {
    /// Number of shots.
    pub fn len(&self) -> usize {
        match self {
            ReadoutValues::Integer(v) => v.len(),
            ReadoutValues::Real(v) => v.len(),
            ReadoutValues::Complex(v) => v.len(),
        }
    }

    /// Check if no values were emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ReadoutValues::Integer(_) => ValueKind::Integer,
            ReadoutValues::Real(_) => ValueKind::Real,
            ReadoutValues::Complex(_) => ValueKind::Complex,
        }
    }

    pub fn as_integer(&self) -> Option<&[i64]> {
        match self {
            ReadoutValues::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            ReadoutValues::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            ReadoutValues::Complex(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<Vec<i64>> {
        match self {
            ReadoutValues::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_real(self) -> Option<Vec<f64>> {
        match self {
            ReadoutValues::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_complex(self) -> Option<Vec<Complex64>> {
        match self {
            ReadoutValues::Complex(v) => Some(v),
            _ => None,
        }
    }
}

/// The final contents of one classical memory region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemoryValues {
    /// `BIT` or `OCTET` regions.
    Binary(Vec<u8>),
    /// `INTEGER` regions.
    Integer(Vec<i64>),
    /// `REAL` regions.
    Real(Vec<f64>),
}

impl MemoryValues {
    /// Number of elements in the region.
    pub fn len(&self) -> usize {
        match self {
            MemoryValues::Binary(v) => v.len(),
            MemoryValues::Integer(v) => v.len(),
            MemoryValues::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            MemoryValues::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&[i64]> {
        match self {
            MemoryValues::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            MemoryValues::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<Vec<u8>> {
        match self {
            MemoryValues::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<Vec<i64>> {
        match self {
            MemoryValues::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_real(self) -> Option<Vec<f64>> {
        match self {
            MemoryValues::Real(v) => Some(v),
            _ => None,
        }
    }
}
