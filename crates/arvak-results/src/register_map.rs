//! Assembly of raw result data into per-register matrices.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::trace;

use arvak_quil::MemoryReference;

use crate::error::{ConversionResult, RegisterMatrixConversionError};
use crate::qpu::QpuResultData;
use crate::qvm::QvmResultData;
use crate::register::RegisterMatrix;
use crate::values::{ReadoutValues, ValueKind};

/// Raw data returned by an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultData {
    /// Readout streams from hardware.
    Qpu(QpuResultData),
    /// Final memory from a simulator.
    Qvm(QvmResultData),
}

impl ResultData {
    /// Build a [`RegisterMap`] where each row of a register's matrix holds the
    /// values of one shot and each column one register index, lowest first.
    ///
    /// # Errors
    ///
    /// Hardware readout is a stream per memory reference, so it only forms a
    /// matrix when every mapped reference emitted the same number of values
    /// of the same kind. Otherwise this returns
    /// [`RegisterMatrixConversionError::JaggedData`] or
    /// [`RegisterMatrixConversionError::MixedKinds`].
    pub fn to_register_map(&self) -> ConversionResult<RegisterMap> {
        match self {
            ResultData::Qpu(data) => RegisterMap::from_qpu_result_data(data),
            ResultData::Qvm(data) => RegisterMap::from_qvm_result_data(data),
        }
    }

    pub fn as_qpu(&self) -> Option<&QpuResultData> {
        match self {
            ResultData::Qpu(data) => Some(data),
            ResultData::Qvm(_) => None,
        }
    }

    pub fn as_qvm(&self) -> Option<&QvmResultData> {
        match self {
            ResultData::Qvm(data) => Some(data),
            ResultData::Qpu(_) => None,
        }
    }
}

/// The result of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionData {
    pub result_data: ResultData,
    /// Time spent executing on the device, excluding queueing and network.
    /// Always `None` for simulator runs.
    pub duration: Option<Duration>,
}

/// Register name to register matrix, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterMap(BTreeMap<String, RegisterMatrix>);

impl RegisterMap {
    /// Wrap an existing map.
    pub fn from_map(map: BTreeMap<String, RegisterMatrix>) -> Self {
        Self(map)
    }

    /// Get the matrix of a register, if present.
    pub fn get_register_matrix(&self, register_name: &str) -> Option<&RegisterMatrix> {
        self.0.get(register_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegisterMatrix)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &RegisterMatrix> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, RegisterMatrix> {
        self.0
    }

    fn from_qvm_result_data(data: &QvmResultData) -> ConversionResult<Self> {
        let map = data
            .memory
            .iter()
            .map(|(name, register)| Ok((name.clone(), register.to_register_matrix(name)?)))
            .collect::<ConversionResult<BTreeMap<_, _>>>()?;

        trace!(registers = map.len(), "converted QVM result data to register map");
        Ok(Self(map))
    }

    fn from_qpu_result_data(data: &QpuResultData) -> ConversionResult<Self> {
        let mut registers: BTreeMap<String, BTreeMap<u64, &ReadoutValues>> = BTreeMap::new();

        for (memory_reference, handle) in data.mappings() {
            let reference: MemoryReference = memory_reference.parse().map_err(|_| {
                RegisterMatrixConversionError::InvalidMemoryReference(memory_reference.clone())
            })?;
            let values = data.readout_values().get(handle).ok_or_else(|| {
                RegisterMatrixConversionError::UnmappedHandle {
                    memory_reference: memory_reference.clone(),
                    handle: handle.clone(),
                }
            })?;

            let columns = registers.entry(reference.name.clone()).or_default();
            if columns.insert(reference.index, values).is_some() {
                return Err(RegisterMatrixConversionError::DuplicateIndex {
                    register: reference.name,
                    index: reference.index,
                });
            }
        }

        let map = registers
            .into_iter()
            .map(|(name, columns)| {
                let columns: Vec<&ReadoutValues> = columns.into_values().collect();
                let matrix = stack_readout_columns(&name, &columns)?;
                Ok((name, matrix))
            })
            .collect::<ConversionResult<BTreeMap<_, _>>>()?;

        trace!(
            mappings = data.mappings().len(),
            registers = map.len(),
            "converted QPU result data to register map"
        );
        Ok(Self(map))
    }
}

/// Stack readout columns (already in index order) into one matrix.
fn stack_readout_columns(
    register: &str,
    columns: &[&ReadoutValues],
) -> ConversionResult<RegisterMatrix> {
    let shot_count = columns.first().map_or(0, |c| c.len());
    if columns.iter().any(|c| c.len() != shot_count) {
        return Err(RegisterMatrixConversionError::JaggedData {
            register: register.to_string(),
        });
    }

    let kind = columns.first().map_or(ValueKind::Integer, |c| c.kind());
    let mixed = || RegisterMatrixConversionError::MixedKinds {
        register: register.to_string(),
    };

    match kind {
        ValueKind::Integer => {
            let columns = columns
                .iter()
                .map(|c| c.as_integer().ok_or_else(mixed))
                .collect::<ConversionResult<Vec<_>>>()?;
            stack_columns(register, shot_count, &columns).map(RegisterMatrix::Integer)
        }
        ValueKind::Real => {
            let columns = columns
                .iter()
                .map(|c| c.as_real().ok_or_else(mixed))
                .collect::<ConversionResult<Vec<_>>>()?;
            stack_columns(register, shot_count, &columns).map(RegisterMatrix::Real)
        }
        ValueKind::Complex => {
            let columns = columns
                .iter()
                .map(|c| c.as_complex().ok_or_else(mixed))
                .collect::<ConversionResult<Vec<_>>>()?;
            stack_columns(register, shot_count, &columns).map(RegisterMatrix::Complex)
        }
    }
}

fn stack_columns<T: Copy>(
    register: &str,
    shot_count: usize,
    columns: &[&[T]],
) -> ConversionResult<Array2<T>> {
    let data = (0..shot_count)
        .flat_map(|shot| columns.iter().map(move |column| column[shot]))
        .collect();
    Array2::from_shape_vec((shot_count, columns.len()), data).map_err(|_| {
        RegisterMatrixConversionError::JaggedData {
            register: register.to_string(),
        }
    })
}
