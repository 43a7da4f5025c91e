//! Data returned from a QVM simulator run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::register::RegisterData;

/// Final memory of every read-out register after a simulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QvmResultData {
    pub(crate) memory: HashMap<String, RegisterData>,
}

impl QvmResultData {
    /// Build result data from register name to register data.
    pub fn from_memory_map(memory: HashMap<String, RegisterData>) -> Self {
        Self { memory }
    }

    /// Register name to register data.
    pub fn memory(&self) -> &HashMap<String, RegisterData> {
        &self.memory
    }
}
