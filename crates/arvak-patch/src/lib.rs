//! Arithmetic rewriting and patch values for Arvak control data.
//!
//! Programs that compute gate angles or frame settings from classical
//! memory cannot run as-is: the sequencer evaluates no arithmetic. This
//! crate moves that arithmetic off the device.
//!
//! 1. [`rewrite_arithmetic`] replaces each computed value with a slot of the
//!    `__SUBST` region and returns the table of expressions behind the slots.
//! 2. [`build_patch_values`] evaluates that table for a concrete set of
//!    memory values, producing the parameters to run with.
//!
//! # Example
//!
//! ```rust
//! use arvak_patch::{build_patch_values, rewrite_quil};
//! use arvak_quil::Parameters;
//!
//! let rewritten = rewrite_quil("DECLARE theta REAL\nRX(pi*theta) 0").unwrap();
//! assert_eq!(rewritten.recalculation_table, vec!["0.5*theta[0]"]);
//!
//! let memory = Parameters::from([("theta".to_string(), vec![2.0])]);
//! let patch = build_patch_values(&rewritten.recalculation_table, &memory).unwrap();
//! assert_eq!(patch["__SUBST"], vec![1.0]);
//! ```

pub mod error;
pub mod patch;
pub mod rewrite;

pub use error::{BuildPatchValuesError, PatchResult, RewriteArithmeticError, RewriteResult};
pub use patch::{build_patch_value_batch, build_patch_values};
pub use rewrite::{RewrittenArithmetic, SUBSTITUTION_NAME, rewrite_arithmetic, rewrite_quil};
