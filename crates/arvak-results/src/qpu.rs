//! Data returned from a QPU.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::values::{MemoryValues, ReadoutValues};

/// Readout data returned from hardware after executing a job.
///
/// `mappings` connects memory references (`"ro[0]"`) to readout handles
/// (`"q0"`); `readout_values` holds every value emitted to each handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpuResultData {
    mappings: IndexMap<String, String>,
    readout_values: HashMap<String, ReadoutValues>,
    memory_values: HashMap<String, MemoryValues>,
}

impl QpuResultData {
    /// Build result data from mappings, readout values, and final memory
    /// contents.
    pub fn from_mappings_and_values(
        mappings: IndexMap<String, String>,
        readout_values: HashMap<String, ReadoutValues>,
        memory_values: HashMap<String, MemoryValues>,
    ) -> Self {
        Self {
            mappings,
            readout_values,
            memory_values,
        }
    }

    /// Get the readout values mapped to a memory reference such as `"ro[0]"`.
    pub fn get_values_for_memory_reference(&self, reference: &str) -> Option<&ReadoutValues> {
        self.mappings
            .get(reference)
            .and_then(|handle| self.readout_values.get(handle))
    }

    /// Memory reference to readout handle, in insertion order.
    pub fn mappings(&self) -> &IndexMap<String, String> {
        &self.mappings
    }

    /// Readout handle to values.
    pub fn readout_values(&self) -> &HashMap<String, ReadoutValues> {
        &self.readout_values
    }

    /// Memory region name to final contents.
    pub fn memory_values(&self) -> &HashMap<String, MemoryValues> {
        &self.memory_values
    }
}
