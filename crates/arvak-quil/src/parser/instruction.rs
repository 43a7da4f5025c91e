//! Instruction parsing for Quil.

use super::Parser;
use crate::error::{QuilError, QuilResult};
use crate::expression::Expression;
use crate::instruction::{
    AttributeValue, Call, CallArgument, Declaration, Delay, Fence, FrameDefinition,
    FrameIdentifier, Gate, GateModifier, Instruction, Measurement, Pragma, PragmaArgument, Qubit,
    ScalarType, Vector,
};
use crate::lexer::Token;

impl Parser<'_> {
    /// Parse one instruction and require that it spans the whole statement.
    pub(super) fn parse_instruction(&mut self) -> QuilResult<Instruction> {
        let keyword = self.parse_identifier()?;

        let instruction = match keyword.as_str() {
            "DECLARE" => Instruction::Declaration(self.parse_declaration()?),
            "PRAGMA" => Instruction::Pragma(self.parse_pragma()?),
            "CALL" => Instruction::Call(self.parse_call()?),
            "MEASURE" => Instruction::Measurement(self.parse_measurement()?),
            "FENCE" => Instruction::Fence(Fence {
                qubits: self.parse_qubits(),
            }),
            "DELAY" => Instruction::Delay(self.parse_delay()?),
            "SET-PHASE" => {
                let (frame, phase) = self.parse_frame_expression()?;
                Instruction::SetPhase { frame, phase }
            }
            "SHIFT-PHASE" => {
                let (frame, phase) = self.parse_frame_expression()?;
                Instruction::ShiftPhase { frame, phase }
            }
            "SET-SCALE" => {
                let (frame, scale) = self.parse_frame_expression()?;
                Instruction::SetScale { frame, scale }
            }
            "SET-FREQUENCY" => {
                let (frame, frequency) = self.parse_frame_expression()?;
                Instruction::SetFrequency { frame, frequency }
            }
            "SHIFT-FREQUENCY" => {
                let (frame, frequency) = self.parse_frame_expression()?;
                Instruction::ShiftFrequency { frame, frequency }
            }
            _ => Instruction::Gate(self.parse_gate(keyword)?),
        };

        self.expect_end()?;
        Ok(instruction)
    }

    /// Parse `name TYPE[length] [SHARING ...]`.
    fn parse_declaration(&mut self) -> QuilResult<Declaration> {
        let name = self.parse_identifier()?;
        let type_name = self.parse_identifier()?;
        let data_type =
            ScalarType::from_keyword(&type_name).ok_or_else(|| QuilError::UnknownScalarType {
                line: self.line,
                found: type_name.clone(),
            })?;

        let length = if self.consume(&Token::LBracket) {
            let length = self.parse_int_literal()?;
            self.expect(Token::RBracket)?;
            length
        } else {
            1
        };

        let sharing = match self.peek() {
            Some(Token::Identifier(s)) if s == "SHARING" => {
                self.advance();
                let rest = self.remainder();
                if rest.is_empty() {
                    return Err(self.unexpected_end("shared memory region"));
                }
                self.pos = self.tokens.len();
                Some(rest.to_string())
            }
            _ => None,
        };

        Ok(Declaration {
            name,
            size: Vector::new(data_type, length),
            sharing,
        })
    }

    /// Parse `name args... ["data"]`.
    fn parse_pragma(&mut self) -> QuilResult<Pragma> {
        let name = self.parse_identifier()?;
        let mut arguments = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Identifier(s)) => {
                    arguments.push(PragmaArgument::Identifier(s.clone()));
                    self.advance();
                }
                Some(Token::IntLiteral(v)) => {
                    arguments.push(PragmaArgument::Integer(*v));
                    self.advance();
                }
                _ => break,
            }
        }

        let data = match self.peek() {
            Some(Token::StringLiteral(_)) => Some(self.parse_string_literal()?),
            _ => None,
        };

        Ok(Pragma::new(name, arguments, data))
    }

    /// Parse `name args...`.
    fn parse_call(&mut self) -> QuilResult<Call> {
        let name = self.parse_identifier()?;
        let mut arguments = Vec::new();

        while let Some(token) = self.advance() {
            let argument = match token {
                Token::Identifier(name) if self.check(&Token::LBracket) => {
                    CallArgument::MemoryReference(self.parse_index(name)?)
                }
                Token::Identifier(name) => CallArgument::Identifier(name),
                #[allow(clippy::cast_precision_loss)]
                Token::IntLiteral(v) => CallArgument::Immediate(v as f64),
                Token::FloatLiteral(v) => CallArgument::Immediate(v),
                Token::Minus => match self.advance() {
                    #[allow(clippy::cast_precision_loss)]
                    Some(Token::IntLiteral(v)) => CallArgument::Immediate(-(v as f64)),
                    Some(Token::FloatLiteral(v)) => CallArgument::Immediate(-v),
                    Some(other) => return Err(self.unexpected("number", &other)),
                    None => return Err(self.unexpected_end("number")),
                },
                other => return Err(self.unexpected("call argument", &other)),
            };
            arguments.push(argument);
        }

        Ok(Call::new(name, arguments))
    }

    /// Parse `qubit [target]`.
    fn parse_measurement(&mut self) -> QuilResult<Measurement> {
        let qubit = self
            .parse_qubit()
            .ok_or_else(|| self.unexpected_end("qubit"))?;
        let target = if self.is_eof() {
            None
        } else {
            Some(self.parse_memory_reference()?)
        };
        Ok(Measurement::new(qubit, target))
    }

    /// Parse `qubits... ["frame"...] duration`.
    fn parse_delay(&mut self) -> QuilResult<Delay> {
        let mut qubits = Vec::new();
        let mut frame_names = Vec::new();
        let mut duration = None;

        while let Some(token) = self.advance() {
            if duration.is_some() {
                return Err(self.unexpected("end of instruction", &token));
            }
            match token {
                #[allow(clippy::cast_precision_loss)]
                Token::IntLiteral(v) if self.is_eof() => duration = Some(v as f64),
                Token::IntLiteral(v) if frame_names.is_empty() => qubits.push(Qubit::Fixed(v)),
                Token::Identifier(name) if frame_names.is_empty() => {
                    qubits.push(Qubit::Variable(name));
                }
                Token::StringLiteral(name) => frame_names.push(name),
                Token::FloatLiteral(v) => duration = Some(v),
                other => return Err(self.unexpected("delay duration", &other)),
            }
        }

        let duration = duration.ok_or_else(|| self.unexpected_end("delay duration"))?;
        Ok(Delay::new(qubits, frame_names, duration))
    }

    /// Parse `modifiers... name[(params)] qubits...`.
    fn parse_gate(&mut self, keyword: String) -> QuilResult<Gate> {
        let mut modifiers = Vec::new();
        let mut name = keyword;
        while let Some(modifier) = GateModifier::from_keyword(&name) {
            modifiers.push(modifier);
            name = self.parse_identifier()?;
        }

        let parameters = if self.consume(&Token::LParen) {
            let parameters = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            parameters
        } else {
            Vec::new()
        };

        let qubits = self.parse_qubits();
        if qubits.is_empty() {
            return match self.peek() {
                Some(token) => Err(self.unexpected("qubit", token)),
                None => Err(self.unexpected_end("qubit")),
            };
        }

        Ok(Gate {
            name,
            parameters,
            qubits,
            modifiers,
        })
    }

    fn parse_qubit(&mut self) -> Option<Qubit> {
        let qubit = match self.peek()? {
            Token::IntLiteral(v) => Qubit::Fixed(*v),
            Token::Identifier(name) => Qubit::Variable(name.clone()),
            _ => return None,
        };
        self.advance();
        Some(qubit)
    }

    fn parse_qubits(&mut self) -> Vec<Qubit> {
        std::iter::from_fn(|| self.parse_qubit()).collect()
    }

    /// Parse `qubits... "name"`.
    fn parse_frame_identifier(&mut self) -> QuilResult<FrameIdentifier> {
        let qubits = self.parse_qubits();
        let name = self.parse_string_literal()?;
        Ok(FrameIdentifier::new(name, qubits))
    }

    fn parse_frame_expression(&mut self) -> QuilResult<(FrameIdentifier, Expression)> {
        let frame = self.parse_frame_identifier()?;
        let expression = self.parse_expression()?;
        Ok((frame, expression))
    }

    /// Parse `DEFFRAME qubits... "name":`.
    pub(super) fn parse_frame_header(&mut self) -> QuilResult<FrameDefinition> {
        let keyword = self.parse_identifier()?;
        if keyword != "DEFFRAME" {
            return Err(self.unexpected("DEFFRAME", &Token::Identifier(keyword)));
        }
        let identifier = self.parse_frame_identifier()?;
        self.expect(Token::Colon)?;
        self.expect_end()?;
        Ok(FrameDefinition::new(identifier))
    }

    /// Parse an indented `KEY: value` line of a `DEFFRAME` block.
    pub(super) fn parse_frame_attribute(&mut self) -> QuilResult<(String, AttributeValue)> {
        let key = self.parse_identifier()?;
        self.expect(Token::Colon)?;
        let value = match self.peek() {
            Some(Token::StringLiteral(_)) => AttributeValue::String(self.parse_string_literal()?),
            _ => AttributeValue::Expression(self.parse_expression()?),
        };
        self.expect_end()?;
        Ok((key, value))
    }
}
