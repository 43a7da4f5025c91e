//! Program model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{QuilError, QuilResult};
use crate::instruction::{Declaration, FrameDefinition, FrameIdentifier, Instruction, Qubit};
use crate::parser::parse_program;

/// A Quil program split into the sections the control-data tooling cares
/// about.
///
/// Emission order is definitions, frames, declarations, then the body, which
/// is also the order the parser reads them back in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Verbatim `DEF*` blocks other than `DEFFRAME`.
    pub definitions: Vec<String>,
    /// `DEFFRAME` blocks.
    pub frames: Vec<FrameDefinition>,
    /// `DECLARE` statements, in declaration order.
    pub declarations: Vec<Declaration>,
    /// Every other instruction, in program order.
    pub body: Vec<Instruction>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a memory declaration; fails if the name is already declared.
    pub fn add_declaration(&mut self, declaration: Declaration) -> QuilResult<()> {
        if self.declaration(&declaration.name).is_some() {
            return Err(QuilError::DuplicateDeclaration(declaration.name));
        }
        self.declarations.push(declaration);
        Ok(())
    }

    /// Add an instruction. Declarations are routed to [`Self::declarations`].
    pub fn add_instruction(&mut self, instruction: Instruction) -> QuilResult<()> {
        match instruction {
            Instruction::Declaration(declaration) => self.add_declaration(declaration),
            other => {
                self.body.push(other);
                Ok(())
            }
        }
    }

    /// Add several instructions in order.
    pub fn add_instructions(
        &mut self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> QuilResult<()> {
        instructions
            .into_iter()
            .try_for_each(|instruction| self.add_instruction(instruction))
    }

    /// Look up a declaration by region name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Look up a frame definition by its identifier.
    pub fn frame(&self, identifier: &FrameIdentifier) -> Option<&FrameDefinition> {
        self.frames.iter().find(|f| &f.identifier == identifier)
    }

    /// Copy everything except the body.
    #[must_use]
    pub fn clone_without_body(&self) -> Self {
        Self {
            definitions: self.definitions.clone(),
            frames: self.frames.clone(),
            declarations: self.declarations.clone(),
            body: Vec::new(),
        }
    }

    /// Consume the program, returning its body.
    pub fn into_body(self) -> Vec<Instruction> {
        self.body
    }

    /// Qubits measured anywhere in the body.
    pub fn measured_qubits(&self) -> BTreeSet<Qubit> {
        self.body
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Measurement(measurement) => Some(measurement.qubit.clone()),
                _ => None,
            })
            .collect()
    }

    /// Emit Quil program text.
    pub fn to_quil(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections: [Vec<String>; 4] = [
            self.definitions.clone(),
            self.frames.iter().map(ToString::to_string).collect(),
            self.declarations.iter().map(ToString::to_string).collect(),
            self.body.iter().map(ToString::to_string).collect(),
        ];

        let mut first = true;
        for section in sections.iter().filter(|s| !s.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            for line in section {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = QuilError;

    fn from_str(s: &str) -> QuilResult<Self> {
        parse_program(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::MemoryReference;
    use crate::instruction::{Measurement, ScalarType, Vector};

    #[test]
    fn test_to_quil_section_order() {
        let source = "H 0\nDECLARE ro BIT[1]\nDEFFRAME 0 \"rf\":\n    SAMPLE-RATE: 1e9\nMEASURE 0 ro[0]\n";
        let program: Program = source.parse().unwrap();

        assert_eq!(
            program.to_quil(),
            "DEFFRAME 0 \"rf\":\n    SAMPLE-RATE: 1000000000\n\nDECLARE ro BIT[1]\n\nH 0\nMEASURE 0 ro[0]\n"
        );
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut program = Program::new();
        let declaration = Declaration::new("ro", Vector::new(ScalarType::Bit, 1));
        program.add_declaration(declaration.clone()).unwrap();

        assert_eq!(
            program.add_declaration(declaration),
            Err(QuilError::DuplicateDeclaration("ro".into()))
        );
        assert!("DECLARE a BIT\nDECLARE a REAL".parse::<Program>().is_err());
    }

    #[test]
    fn test_clone_without_body() {
        let program: Program = "DECLARE ro BIT[1]\nH 0".parse().unwrap();
        let header = program.clone_without_body();

        assert_eq!(header.declarations, program.declarations);
        assert!(header.body.is_empty());
        assert_eq!(program.into_body().len(), 1);
    }

    #[test]
    fn test_measured_qubits() {
        let mut program = Program::new();
        program
            .add_instructions([
                Instruction::Measurement(Measurement::new(
                    Qubit::Fixed(2),
                    Some(MemoryReference::new("ro", 0)),
                )),
                Instruction::Measurement(Measurement::new(Qubit::Fixed(0), None)),
                Instruction::Other("RESET".into()),
            ])
            .unwrap();

        let measured: Vec<_> = program.measured_qubits().into_iter().collect();
        assert_eq!(measured, vec![Qubit::Fixed(0), Qubit::Fixed(2)]);
    }

    #[test]
    fn test_empty_program() {
        let program: Program = "\n# nothing here\n".parse().unwrap();
        assert_eq!(program, Program::new());
        assert_eq!(program.to_quil(), "");
    }
}
