//! Rewriting of classical arithmetic into precomputed parameters.
//!
//! The sequencer evaluates no arithmetic of its own, and expects angles in
//! rotations rather than radians. Every non-literal gate parameter, phase,
//! scale and frequency is therefore replaced by a slot of one `REAL` region,
//! [`SUBSTITUTION_NAME`]. The expression that computes each slot, already
//! converted to sequencer units, is recorded in a recalculation table and
//! evaluated per parameter set by [`build_patch_values`](crate::build_patch_values).
//!
//! ```text
//! DECLARE theta REAL          DECLARE __SUBST REAL[1]
//! RZ(theta*1.5) 0       =>    DECLARE theta REAL[1]
//!                             RZ(__SUBST[0]) 0
//! ```
//!
//! with `__SUBST[0]` recalculated as `0.238732414637843*theta[0]`
//! (`1.5 / 2π`).

use std::f64::consts::TAU;

use arvak_quil::{
    AttributeValue, Declaration, Expression, FrameIdentifier, Gate, Instruction, MemoryReference,
    Program, ScalarType, Vector,
};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::error::{RewriteArithmeticError, RewriteResult};

/// Name of the region holding substituted values.
pub const SUBSTITUTION_NAME: &str = "__SUBST";

/// Full scale of `SET-SCALE` in sequencer units.
const SCALE_FULL_RANGE: f64 = 8.0;

/// A program whose arithmetic has been replaced by [`SUBSTITUTION_NAME`]
/// slots, and the expressions computing those slots.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenArithmetic {
    pub program: Program,
    /// `recalculation_table[i]` computes `__SUBST[i]`.
    pub recalculation_table: Vec<String>,
}

impl RewrittenArithmetic {
    pub fn to_quil(&self) -> String {
        self.program.to_quil()
    }
}

/// Ordered, deduplicated substitution expressions, keyed by their text.
#[derive(Default)]
struct Substitutions(IndexSet<String, FxBuildHasher>);

impl Substitutions {
    /// Reference to the slot computing `expression`, allocating one on
    /// first use.
    fn slot(&mut self, expression: Expression) -> Expression {
        let (index, _) = self.0.insert_full(expression.to_string());
        Expression::Address(MemoryReference::new(SUBSTITUTION_NAME, index as u64))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_table(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

/// Rewrite the arithmetic of `program`.
///
/// Gate parameters and phases become `expr / 2π`, scales `expr / 8` and
/// frequencies `(expr - CENTER-FREQUENCY) / SAMPLE-RATE` of their frame.
/// Expressions that simplify to a number stay inline. Identical
/// substitutions share a slot, in order of first use. When anything was
/// substituted, `DECLARE __SUBST REAL[n]` becomes the first declaration.
pub fn rewrite_arithmetic(program: Program) -> RewriteResult<RewrittenArithmetic> {
    if program.declaration(SUBSTITUTION_NAME).is_some() {
        return Err(RewriteArithmeticError::SubstitutionAlreadyDeclared(
            SUBSTITUTION_NAME,
        ));
    }

    let mut rewritten = program.clone_without_body();
    let mut substitutions = Substitutions::default();
    let body = program
        .into_body()
        .into_iter()
        .map(|instruction| rewrite_instruction(instruction, &rewritten, &mut substitutions))
        .collect::<RewriteResult<Vec<_>>>()?;

    if !substitutions.is_empty() {
        rewritten.declarations.insert(
            0,
            Declaration::new(
                SUBSTITUTION_NAME,
                Vector::new(ScalarType::Real, substitutions.len() as u64),
            ),
        );
    }
    rewritten.body = body;

    debug!(
        substitutions = substitutions.len(),
        instructions = rewritten.body.len(),
        "rewrote program arithmetic"
    );
    Ok(RewrittenArithmetic {
        program: rewritten,
        recalculation_table: substitutions.into_table(),
    })
}

/// Parse `quil` and rewrite its arithmetic.
pub fn rewrite_quil(quil: &str) -> RewriteResult<RewrittenArithmetic> {
    rewrite_arithmetic(quil.parse()?)
}

fn rewrite_instruction(
    instruction: Instruction,
    program: &Program,
    substitutions: &mut Substitutions,
) -> RewriteResult<Instruction> {
    let instruction = match instruction {
        Instruction::Gate(gate) => Instruction::Gate(Gate {
            parameters: gate
                .parameters
                .into_iter()
                .map(|parameter| rewrite_angle(parameter, substitutions))
                .collect(),
            ..gate
        }),
        Instruction::SetPhase { frame, phase } => Instruction::SetPhase {
            frame,
            phase: rewrite_angle(phase, substitutions),
        },
        Instruction::ShiftPhase { frame, phase } => Instruction::ShiftPhase {
            frame,
            phase: rewrite_angle(phase, substitutions),
        },
        Instruction::SetScale { frame, scale } => Instruction::SetScale {
            frame,
            scale: rewrite_scale(scale, substitutions),
        },
        Instruction::SetFrequency { frame, frequency } => {
            let frequency = rewrite_frequency(frequency, &frame, program, substitutions)?;
            Instruction::SetFrequency { frame, frequency }
        }
        Instruction::ShiftFrequency { frame, frequency } => {
            let frequency = rewrite_frequency(frequency, &frame, program, substitutions)?;
            Instruction::ShiftFrequency { frame, frequency }
        }
        other => other,
    };
    Ok(instruction)
}

/// Radians to rotations.
fn rewrite_angle(expression: Expression, substitutions: &mut Substitutions) -> Expression {
    let expression = expression.simplify();
    if expression.is_number() {
        return expression;
    }
    substitutions.slot((expression / Expression::number(TAU)).simplify())
}

fn rewrite_scale(expression: Expression, substitutions: &mut Substitutions) -> Expression {
    let expression = expression.simplify();
    if expression.is_number() {
        return expression;
    }
    substitutions.slot((expression / Expression::number(SCALE_FULL_RANGE)).simplify())
}

fn rewrite_frequency(
    expression: Expression,
    frame: &FrameIdentifier,
    program: &Program,
    substitutions: &mut Substitutions,
) -> RewriteResult<Expression> {
    let expression = expression.simplify();
    if expression.is_number() {
        return Ok(expression);
    }

    let definition = program
        .frame(frame)
        .ok_or_else(|| RewriteArithmeticError::MissingDefFrame(frame.to_string()))?;
    let sample_rate = match definition.attribute("SAMPLE-RATE") {
        Some(AttributeValue::Expression(sample_rate)) => sample_rate.clone(),
        Some(AttributeValue::String(sample_rate)) => {
            return Err(RewriteArithmeticError::InvalidSampleRate {
                sample_rate: sample_rate.clone(),
                frame: frame.to_string(),
            });
        }
        None => return Err(RewriteArithmeticError::MissingSampleRate(frame.to_string())),
    };

    let offset = match definition.attribute("CENTER-FREQUENCY") {
        Some(AttributeValue::Expression(center)) => expression - center.clone(),
        _ => expression,
    };
    Ok(substitutions.slot((offset / sample_rate).simplify()))
}
