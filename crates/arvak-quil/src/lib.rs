//! Minimal Quil reader and writer for Arvak control data.
//!
//! This crate models the parts of a Quil program that client-side control
//! data tooling has to understand: memory declarations, `PRAGMA` and `CALL`
//! instructions, gate and frame parameter expressions, `DEFFRAME` attributes,
//! fences, delays, and measurements. Every other instruction is carried through
//! as its source text, so a program can be read, edited, and written back
//! without a full Quil grammar.
//!
//! # Example: Reading and Writing Programs
//!
//! ```rust
//! use arvak_quil::{Instruction, Program};
//!
//! let program: Program = r#"
//! DECLARE ro BIT[1]
//! DECLARE theta REAL[1]
//! RX(2*pi*theta) 0
//! MEASURE 0 ro[0]
//! "#
//! .parse()
//! .unwrap();
//!
//! assert_eq!(program.declarations.len(), 2);
//! assert!(matches!(program.body[0], Instruction::Gate(_)));
//! assert!(program.to_quil().contains("RX(2*pi*theta[0]) 0"));
//! ```
//!
//! # Example: Evaluating Expressions
//!
//! ```rust
//! use arvak_quil::{Parameters, parse_expression};
//!
//! let expr = parse_expression("theta[1]/2").unwrap();
//! let memory = Parameters::from([("theta".to_string(), vec![0.0, 3.0])]);
//! assert_eq!(expr.evaluate(&memory).unwrap(), 1.5);
//! ```

pub mod error;
pub mod expression;
pub mod instruction;
pub mod lexer;
mod parser;
pub mod program;

pub use error::{QuilError, QuilResult};
pub use expression::{
    EvaluationError, Expression, ExpressionFunction, InfixOperator, MemoryReference, Parameters,
    PrefixOperator,
};
pub use instruction::{
    AttributeValue, Call, CallArgument, Declaration, Delay, Fence, FrameDefinition,
    FrameIdentifier, Gate, GateModifier, Instruction, Measurement, Pragma, PragmaArgument, Qubit,
    ScalarType, Vector,
};
pub use parser::{parse_expression, parse_instruction, parse_program};
pub use program::Program;
