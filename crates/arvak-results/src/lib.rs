//! Typed execution results for Arvak control data.
//!
//! Hardware returns readout as a stream of values per readout handle plus a
//! mapping from memory references (`ro[0]`) to those handles; simulators
//! return the final memory of each register per shot. This crate models both
//! shapes and converts either into a [`RegisterMap`] of dense
//! `shots × slots` matrices.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use arvak_results::{QpuResultData, ReadoutValues, ResultData};
//! use indexmap::IndexMap;
//!
//! let mappings = IndexMap::from([
//!     ("ro[1]".to_string(), "q1".to_string()),
//!     ("ro[0]".to_string(), "q0".to_string()),
//! ]);
//! let readout = HashMap::from([
//!     ("q0".to_string(), ReadoutValues::Integer(vec![0, 1])),
//!     ("q1".to_string(), ReadoutValues::Integer(vec![1, 1])),
//! ]);
//! let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
//!     mappings,
//!     readout,
//!     HashMap::new(),
//! ));
//!
//! let registers = data.to_register_map().unwrap();
//! let ro = registers.get_register_matrix("ro").unwrap();
//! assert_eq!(ro.shape(), (2, 2));
//! ```

pub mod error;
pub mod qpu;
pub mod qvm;
pub mod register;
pub mod register_map;
pub mod values;

pub use error::{ConversionResult, RegisterMatrixConversionError};
pub use qpu::QpuResultData;
pub use qvm::QvmResultData;
pub use register::{RegisterData, RegisterMatrix};
pub use register_map::{ExecutionData, RegisterMap, ResultData};
pub use values::{MemoryValues, ReadoutValues, ValueKind};
