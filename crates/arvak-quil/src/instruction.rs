//! Quil instructions understood by the program layer.
//!
//! Only the instructions that carry declarations, pragmas, extern calls,
//! parameter expressions, or measurement targets are modelled. Everything else
//! is kept as its verbatim source text in [`Instruction::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expression::{Expression, MemoryReference, format_number};

/// Memory element type of a `DECLARE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bit,
    Octet,
    Integer,
    Real,
}

impl ScalarType {
    /// Look up a scalar type by its Quil keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "BIT" => Some(Self::Bit),
            "OCTET" => Some(Self::Octet),
            "INTEGER" => Some(Self::Integer),
            "REAL" => Some(Self::Real),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Bit => "BIT",
            Self::Octet => "OCTET",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        };
        f.write_str(keyword)
    }
}

/// Type and length of a declared memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub data_type: ScalarType,
    pub length: u64,
}

impl Vector {
    pub fn new(data_type: ScalarType, length: u64) -> Self {
        Self { data_type, length }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.data_type, self.length)
    }
}

/// `DECLARE name TYPE[length] [SHARING ...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub size: Vector,
    /// Verbatim text following `SHARING`, if any.
    pub sharing: Option<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, size: Vector) -> Self {
        Self {
            name: name.into(),
            size,
            sharing: None,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DECLARE {} {}", self.name, self.size)?;
        if let Some(sharing) = &self.sharing {
            write!(f, " SHARING {sharing}")?;
        }
        Ok(())
    }
}

/// A qubit operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Qubit {
    /// A physical qubit index.
    Fixed(u64),
    /// A formal qubit name, only valid inside definitions.
    Variable(String),
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qubit::Fixed(index) => write!(f, "{index}"),
            Qubit::Variable(name) => f.write_str(name),
        }
    }
}

/// An argument in a `PRAGMA` instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PragmaArgument {
    Identifier(String),
    Integer(u64),
}

impl fmt::Display for PragmaArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// `PRAGMA name args... ["data"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pragma {
    pub name: String,
    pub arguments: Vec<PragmaArgument>,
    pub data: Option<String>,
}

impl Pragma {
    pub fn new(name: impl Into<String>, arguments: Vec<PragmaArgument>, data: Option<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
            data,
        }
    }
}

impl fmt::Display for Pragma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PRAGMA {}", self.name)?;
        for argument in &self.arguments {
            write!(f, " {argument}")?;
        }
        if let Some(data) = &self.data {
            write!(f, " \"{data}\"")?;
        }
        Ok(())
    }
}

/// An argument of an extern `CALL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallArgument {
    /// A whole memory region, or an identifier resolved by the callee.
    Identifier(String),
    MemoryReference(MemoryReference),
    Immediate(f64),
}

impl fmt::Display for CallArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::MemoryReference(reference) => write!(f, "{reference}"),
            Self::Immediate(value) => f.write_str(&format_number(*value)),
        }
    }
}

/// `CALL name args...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub arguments: Vec<CallArgument>,
}

impl Call {
    pub fn new(name: impl Into<String>, arguments: Vec<CallArgument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CALL {}", self.name)?;
        for argument in &self.arguments {
            write!(f, " {argument}")?;
        }
        Ok(())
    }
}

/// Gate modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateModifier {
    Controlled,
    Dagger,
    Forked,
}

impl GateModifier {
    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "CONTROLLED" => Some(Self::Controlled),
            "DAGGER" => Some(Self::Dagger),
            "FORKED" => Some(Self::Forked),
            _ => None,
        }
    }
}

impl fmt::Display for GateModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Controlled => "CONTROLLED",
            Self::Dagger => "DAGGER",
            Self::Forked => "FORKED",
        };
        f.write_str(keyword)
    }
}

/// A gate application, e.g. `RZ(2*pi*theta) 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub name: String,
    pub parameters: Vec<Expression>,
    pub qubits: Vec<Qubit>,
    pub modifiers: Vec<GateModifier>,
}

impl Gate {
    /// Create an unmodified gate.
    pub fn new(name: impl Into<String>, parameters: Vec<Expression>, qubits: Vec<Qubit>) -> Self {
        Self {
            name: name.into(),
            parameters,
            qubits,
            modifiers: Vec::new(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{modifier} ")?;
        }
        f.write_str(&self.name)?;
        if !self.parameters.is_empty() {
            f.write_str("(")?;
            write_separated(f, &self.parameters, ", ")?;
            f.write_str(")")?;
        }
        for qubit in &self.qubits {
            write!(f, " {qubit}")?;
        }
        Ok(())
    }
}

/// `MEASURE qubit [target]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Measurement {
    pub qubit: Qubit,
    pub target: Option<MemoryReference>,
}

impl Measurement {
    pub fn new(qubit: Qubit, target: Option<MemoryReference>) -> Self {
        Self { qubit, target }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MEASURE {}", self.qubit)?;
        if let Some(target) = &self.target {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// `FENCE [qubits...]`; an empty qubit list fences every qubit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
    pub qubits: Vec<Qubit>,
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FENCE")?;
        for qubit in &self.qubits {
            write!(f, " {qubit}")?;
        }
        Ok(())
    }
}

/// `DELAY qubits... ["frame"...] seconds`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub qubits: Vec<Qubit>,
    pub frame_names: Vec<String>,
    /// Duration in seconds.
    pub duration: f64,
}

impl Delay {
    pub fn new(qubits: Vec<Qubit>, frame_names: Vec<String>, duration: f64) -> Self {
        Self {
            qubits,
            frame_names,
            duration,
        }
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DELAY")?;
        for qubit in &self.qubits {
            write!(f, " {qubit}")?;
        }
        for frame in &self.frame_names {
            write!(f, " \"{frame}\"")?;
        }
        write!(f, " {}", format_number(self.duration))
    }
}

/// A frame: the qubits it is attached to and its name, e.g. `0 1 "cz"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameIdentifier {
    pub name: String,
    pub qubits: Vec<Qubit>,
}

impl FrameIdentifier {
    pub fn new(name: impl Into<String>, qubits: Vec<Qubit>) -> Self {
        Self {
            name: name.into(),
            qubits,
        }
    }
}

impl fmt::Display for FrameIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qubit in &self.qubits {
            write!(f, "{qubit} ")?;
        }
        write!(f, "\"{}\"", self.name)
    }
}

/// Value of a `DEFFRAME` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    String(String),
    Expression(Expression),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "\"{value}\""),
            Self::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

/// A `DEFFRAME` block with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDefinition {
    pub identifier: FrameIdentifier,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl FrameDefinition {
    pub fn new(identifier: FrameIdentifier) -> Self {
        Self {
            identifier,
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute such as `SAMPLE-RATE`.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for FrameDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DEFFRAME {}:", self.identifier)?;
        for (key, value) in &self.attributes {
            write!(f, "\n    {key}: {value}")?;
        }
        Ok(())
    }
}

/// An instruction in a program body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Declaration(Declaration),
    Pragma(Pragma),
    Call(Call),
    Gate(Gate),
    Measurement(Measurement),
    Fence(Fence),
    Delay(Delay),
    SetPhase { frame: FrameIdentifier, phase: Expression },
    ShiftPhase { frame: FrameIdentifier, phase: Expression },
    SetScale { frame: FrameIdentifier, scale: Expression },
    SetFrequency { frame: FrameIdentifier, frequency: Expression },
    ShiftFrequency { frame: FrameIdentifier, frequency: Expression },
    /// Any other instruction, kept as its source text.
    Other(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Declaration(declaration) => write!(f, "{declaration}"),
            Instruction::Pragma(pragma) => write!(f, "{pragma}"),
            Instruction::Call(call) => write!(f, "{call}"),
            Instruction::Gate(gate) => write!(f, "{gate}"),
            Instruction::Measurement(measurement) => write!(f, "{measurement}"),
            Instruction::Fence(fence) => write!(f, "{fence}"),
            Instruction::Delay(delay) => write!(f, "{delay}"),
            Instruction::SetPhase { frame, phase } => write!(f, "SET-PHASE {frame} {phase}"),
            Instruction::ShiftPhase { frame, phase } => write!(f, "SHIFT-PHASE {frame} {phase}"),
            Instruction::SetScale { frame, scale } => write!(f, "SET-SCALE {frame} {scale}"),
            Instruction::SetFrequency { frame, frequency } => {
                write!(f, "SET-FREQUENCY {frame} {frequency}")
            }
            Instruction::ShiftFrequency { frame, frequency } => {
                write!(f, "SHIFT-FREQUENCY {frame} {frequency}")
            }
            Instruction::Other(text) => f.write_str(text),
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
