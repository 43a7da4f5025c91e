//! Evaluation of recalculation tables into patch values.

use arvak_quil::{Expression, Parameters, parse_expression};
use tracing::trace;

use crate::error::{BuildPatchValuesError, PatchResult};
use crate::rewrite::SUBSTITUTION_NAME;

/// A parsed recalculation table.
struct RecalculationTable<'a> {
    entries: Vec<(&'a str, Expression)>,
}

impl<'a> RecalculationTable<'a> {
    fn parse(table: &'a [String]) -> PatchResult<Self> {
        let entries = table
            .iter()
            .map(|text| {
                parse_expression(text)
                    .map(|expression| (text.as_str(), expression))
                    .map_err(|source| BuildPatchValuesError::Parse {
                        expression: text.clone(),
                        source,
                    })
            })
            .collect::<PatchResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    fn evaluate(&self, memory: &Parameters) -> PatchResult<Parameters> {
        let values = self
            .entries
            .iter()
            .map(|(text, expression)| {
                expression
                    .evaluate(memory)
                    .map_err(|error| BuildPatchValuesError::from_evaluation(text, error))
            })
            .collect::<PatchResult<Vec<f64>>>()?;

        let mut patch_values = memory.clone();
        patch_values.insert(SUBSTITUTION_NAME.to_string(), values);
        Ok(patch_values)
    }
}

/// Evaluate every recalculation table entry against `memory`.
///
/// The result is `memory` with one more region, `__SUBST`, holding one value
/// per table entry in table order.
///
/// # Errors
///
/// Fails on the first entry that does not parse or evaluate; the error
/// carries that entry's text.
pub fn build_patch_values(table: &[String], memory: &Parameters) -> PatchResult<Parameters> {
    let patch_values = RecalculationTable::parse(table)?.evaluate(memory)?;
    trace!(entries = table.len(), "built patch values");
    Ok(patch_values)
}

/// [`build_patch_values`] for a sequence of memory sets, typically one per
/// shot. The table is parsed once.
pub fn build_patch_value_batch(
    table: &[String],
    memories: &[Parameters],
) -> PatchResult<Vec<Parameters>> {
    let table_expressions = RecalculationTable::parse(table)?;
    let batch = memories
        .iter()
        .map(|memory| table_expressions.evaluate(memory))
        .collect::<PatchResult<Vec<_>>>()?;
    trace!(
        entries = table.len(),
        memory_sets = memories.len(),
        "built patch value batch"
    );
    Ok(batch)
}
