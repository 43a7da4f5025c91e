//! Line-oriented parser for Quil program text.
//!
//! The reader groups source lines into statements, keeps `DEF*` blocks other
//! than `DEFFRAME` verbatim, and lexes only the instructions it models.

mod expression;
mod instruction;

use crate::error::{QuilError, QuilResult};
use crate::expression::Expression;
use crate::instruction::{FrameDefinition, Instruction};
use crate::lexer::{SpannedToken, Token, tokenize};
use crate::program::Program;

/// Instructions carried through as source text without being lexed.
const VERBATIM_KEYWORDS: &[&str] = &[
    "ADD",
    "AND",
    "CAPTURE",
    "CONVERT",
    "DIV",
    "EQ",
    "EXCHANGE",
    "GE",
    "GT",
    "HALT",
    "INCLUDE",
    "IOR",
    "JUMP",
    "JUMP-UNLESS",
    "JUMP-WHEN",
    "LABEL",
    "LE",
    "LOAD",
    "LT",
    "MOVE",
    "MUL",
    "NEG",
    "NONBLOCKING",
    "NOP",
    "NOT",
    "PULSE",
    "RAW-CAPTURE",
    "RESET",
    "STORE",
    "SUB",
    "SWAP-PHASES",
    "WAIT",
    "XOR",
];

/// Parse Quil source text into a [`Program`].
pub fn parse_program(source: &str) -> QuilResult<Program> {
    let mut program = Program::new();
    let mut block: Option<Block> = None;

    for (i, raw_line) in source.lines().enumerate() {
        let line_number = i + 1;
        let line = strip_comment(raw_line).trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        if indented {
            match block.as_mut() {
                Some(Block::Frame(frame)) => {
                    let attribute = Parser::new(line, line_number)?.parse_frame_attribute()?;
                    frame.attributes.push(attribute);
                    continue;
                }
                Some(Block::Verbatim(text)) => {
                    text.push('\n');
                    text.push_str(line);
                    continue;
                }
                None => {}
            }
        } else if let Some(open) = block.take() {
            open.close_into(&mut program);
        }

        let statement = line.trim();
        let keyword = first_word(statement);
        if keyword == "DEFFRAME" {
            let header = Parser::new(statement, line_number)?.parse_frame_header()?;
            block = Some(Block::Frame(header));
        } else if keyword.starts_with("DEF") {
            block = Some(Block::Verbatim(statement.to_string()));
        } else {
            for part in split_statements(statement) {
                let instruction = parse_instruction(part, line_number)?;
                program.add_instruction(instruction)?;
            }
        }
    }

    if let Some(open) = block {
        open.close_into(&mut program);
    }

    Ok(program)
}

/// Parse a single instruction (one statement, no line breaks).
pub fn parse_instruction(statement: &str, line: usize) -> QuilResult<Instruction> {
    let statement = statement.trim();
    if VERBATIM_KEYWORDS.contains(&first_word(statement)) {
        return Ok(Instruction::Other(statement.to_string()));
    }
    Parser::new(statement, line)?.parse_instruction()
}

/// Parse a standalone expression such as a recalculation table entry.
pub fn parse_expression(source: &str) -> QuilResult<Expression> {
    let mut parser = Parser::new(source, 1)?;
    let expression = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expression)
}

/// A multi-line definition being collected.
enum Block {
    Frame(FrameDefinition),
    Verbatim(String),
}

impl Block {
    fn close_into(self, program: &mut Program) {
        match self {
            Block::Frame(frame) => program.frames.push(frame),
            Block::Verbatim(text) => program.definitions.push(text),
        }
    }
}

fn first_word(statement: &str) -> &str {
    statement
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
}

/// Remove a trailing `#` comment, ignoring `#` inside string literals.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split a line on `;` outside of string literals.
fn split_statements(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ';' if !in_string => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&line[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// Parser state for one statement.
pub(super) struct Parser<'a> {
    pub(super) source: &'a str,
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    pub(super) line: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a statement starting on `line`.
    fn new(source: &'a str, line: usize) -> QuilResult<Self> {
        let mut tokens = Vec::new();

        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(QuilError::LexerError {
                        line,
                        column: span.start + 1,
                        message,
                    });
                }
            }
        }

        Ok(Self {
            source,
            tokens,
            pos: 0,
            line,
        })
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek `offset` tokens ahead.
    pub(super) fn peek_nth(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> QuilResult<()> {
        let found = self.advance().ok_or_else(|| QuilError::UnexpectedEnd {
            line: self.line,
            expected: expected.to_string(),
        })?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(self.unexpected(expected.to_string(), &found));
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Fail unless every token has been consumed.
    pub(super) fn expect_end(&self) -> QuilResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.unexpected("end of instruction", token)),
        }
    }

    /// The unconsumed source text.
    pub(super) fn remainder(&self) -> &'a str {
        self.tokens
            .get(self.pos)
            .map_or("", |t| self.source[t.span.start..].trim())
    }

    pub(super) fn unexpected(&self, expected: impl Into<String>, found: &Token) -> QuilError {
        QuilError::UnexpectedToken {
            line: self.line,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    pub(super) fn unexpected_end(&self, expected: impl Into<String>) -> QuilError {
        QuilError::UnexpectedEnd {
            line: self.line,
            expected: expected.into(),
        }
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> QuilResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(self.unexpected("identifier", &other)),
            None => Err(self.unexpected_end("identifier")),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> QuilResult<u64> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(self.unexpected("integer", &other)),
            None => Err(self.unexpected_end("integer")),
        }
    }

    /// Parse a string literal.
    pub(super) fn parse_string_literal(&mut self) -> QuilResult<String> {
        match self.advance() {
            Some(Token::StringLiteral(s)) => Ok(s),
            Some(other) => Err(self.unexpected("string", &other)),
            None => Err(self.unexpected_end("string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::MemoryReference;
    use crate::instruction::{AttributeValue, Qubit, ScalarType};

    #[test]
    fn test_parse_declarations_and_body() {
        let program = parse_program(
            "DECLARE ro BIT[2]\nDECLARE theta REAL\nH 0\nRX(theta) 1\nMEASURE 0 ro[0]\n",
        )
        .unwrap();

        assert_eq!(program.declarations.len(), 2);
        assert_eq!(program.declarations[1].size.data_type, ScalarType::Real);
        assert_eq!(program.declarations[1].size.length, 1);
        assert_eq!(program.body.len(), 3);
        assert!(matches!(
            &program.body[2],
            Instruction::Measurement(m)
                if m.qubit == Qubit::Fixed(0) && m.target == Some(MemoryReference::new("ro", 0))
        ));
    }

    #[test]
    fn test_parse_deframe_block() {
        let source = r#"
DEFFRAME 0 "rf":
    SAMPLE-RATE: 1000000000.0
    INITIAL-FREQUENCY: 4.5e9
    DIRECTION: "tx"
SET-FREQUENCY 0 "rf" theta
"#;
        let program = parse_program(source).unwrap();

        assert_eq!(program.frames.len(), 1);
        let frame = &program.frames[0];
        assert_eq!(frame.identifier.name, "rf");
        assert_eq!(
            frame.attribute("SAMPLE-RATE"),
            Some(&AttributeValue::Expression(Expression::Number(1e9)))
        );
        assert_eq!(
            frame.attribute("DIRECTION"),
            Some(&AttributeValue::String("tx".into()))
        );
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_other_definitions_kept_verbatim() {
        let source = "DEFCAL RX(pi/2) 0:\n    NONBLOCKING PULSE 0 \"rf\" drag\nH 0\n";
        let program = parse_program(source).unwrap();

        assert_eq!(program.definitions.len(), 1);
        assert_eq!(
            program.definitions[0],
            "DEFCAL RX(pi/2) 0:\n    NONBLOCKING PULSE 0 \"rf\" drag"
        );
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_unmodelled_instructions_are_verbatim() {
        let program = parse_program("MOVE theta[0] 1.5\nRESET; HALT").unwrap();
        assert_eq!(
            program.body,
            vec![
                Instruction::Other("MOVE theta[0] 1.5".into()),
                Instruction::Other("RESET".into()),
                Instruction::Other("HALT".into()),
            ]
        );
    }

    #[test]
    fn test_comments_and_semicolons() {
        let program = parse_program("H 0; X 1 # flip\n# full line comment\nPRAGMA X \"a;b#c\"").unwrap();
        assert_eq!(program.body.len(), 3);
        assert_eq!(program.body[2].to_string(), "PRAGMA X \"a;b#c\"");
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_program("H 0\nDECLARE ro BYTE[1]\n").unwrap_err();
        assert_eq!(
            err,
            QuilError::UnknownScalarType {
                line: 2,
                found: "BYTE".into()
            }
        );

        let err = parse_program("H 0\n\nRX(theta 0\n").unwrap_err();
        assert!(matches!(err, QuilError::UnexpectedToken { line: 3, .. }));
    }

    #[test]
    fn test_lexer_error() {
        let err = parse_program("RX(@) 0").unwrap_err();
        assert!(matches!(err, QuilError::LexerError { line: 1, column: 4, .. }));
    }

    #[test]
    fn test_parse_expression() {
        let expr = parse_expression("(theta - 10)/20").unwrap();
        assert_eq!(expr.to_string(), "(theta[0]-10)/20");
        assert!(parse_expression("theta )").is_err());
    }
}
