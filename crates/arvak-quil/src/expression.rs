//! Classical arithmetic expressions found in gate parameters and frame
//! instructions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::{QuilError, QuilResult};

/// Memory region contents keyed on region name.
///
/// Each vector holds the values of one declared region, indexed the same way
/// as the region (`theta[1]` is `parameters["theta"][1]`).
pub type Parameters = BTreeMap<String, Vec<f64>>;

/// A reference to one slot of a declared memory region, e.g. `ro[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemoryReference {
    /// Name of the memory region.
    pub name: String,
    /// Index into the region.
    pub index: u64,
}

impl MemoryReference {
    /// Create a new memory reference.
    pub fn new(name: impl Into<String>, index: u64) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for MemoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

impl FromStr for MemoryReference {
    type Err = QuilError;

    /// Parse the strict `name[index]` form used for readout mappings.
    fn from_str(s: &str) -> QuilResult<Self> {
        let invalid = || QuilError::InvalidMemoryReference(s.to_string());
        let (name, rest) = s.split_once('[').ok_or_else(invalid)?;
        let index = rest.strip_suffix(']').ok_or_else(invalid)?;

        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_start || !valid_rest || name.ends_with('-') {
            return Err(invalid());
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index = index.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self::new(name, index))
    }
}

/// Functions that may be applied inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionFunction {
    Sine,
    Cosine,
    SquareRoot,
    Exponent,
}

impl ExpressionFunction {
    /// Look up a function by its Quil name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sin" => Some(Self::Sine),
            "cos" => Some(Self::Cosine),
            "sqrt" => Some(Self::SquareRoot),
            "exp" => Some(Self::Exponent),
            _ => None,
        }
    }

    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Sine => value.sin(),
            Self::Cosine => value.cos(),
            Self::SquareRoot => value.sqrt(),
            Self::Exponent => value.exp(),
        }
    }
}

impl fmt::Display for ExpressionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sine => "sin",
            Self::Cosine => "cos",
            Self::SquareRoot => "sqrt",
            Self::Exponent => "exp",
        };
        f.write_str(name)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    Plus,
    Minus,
}

/// Binary infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
}

impl InfixOperator {
    /// Binding strength used by both the parser and the emitter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Star | Self::Slash => 2,
            Self::Caret => 3,
        }
    }

    /// `^` is the only right-associative operator.
    pub(crate) fn is_right_associative(self) -> bool {
        matches!(self, Self::Caret)
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Caret => "^",
        };
        f.write_str(op)
    }
}

/// A real-valued classical expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),
    /// The constant π.
    Pi,
    /// A memory reference; a bare identifier `theta` means `theta[0]`.
    Address(MemoryReference),
    /// Function application, e.g. `cos(theta)`.
    FunctionCall {
        function: ExpressionFunction,
        argument: Box<Expression>,
    },
    /// Unary plus or minus.
    Prefix {
        operator: PrefixOperator,
        expression: Box<Expression>,
    },
    /// Binary arithmetic.
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
}

/// Errors that can occur while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EvaluationError {
    /// The expression references a region that has no values.
    #[error("memory region '{0}' is undefined")]
    UndefinedMemory(String),

    /// The expression indexes past the end of a region.
    #[error("index {index} is out of range for memory region '{name}' of length {length}")]
    IndexOutOfRange {
        name: String,
        index: u64,
        length: usize,
    },

    /// A divisor evaluated to zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The result (or an intermediate) is NaN or infinite.
    #[error("expression evaluated to a non-finite value")]
    NonFinite,
}

impl Expression {
    /// Create a numeric literal.
    pub fn number(value: f64) -> Self {
        Expression::Number(value)
    }

    /// Create a memory reference expression.
    pub fn address(name: impl Into<String>, index: u64) -> Self {
        Expression::Address(MemoryReference::new(name, index))
    }

    /// Build `left <operator> right`.
    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Check if this expression is a plain number.
    pub fn is_number(&self) -> bool {
        matches!(self, Expression::Number(_))
    }

    /// Check if this expression reads classical memory.
    pub fn is_symbolic(&self) -> bool {
        match self {
            Expression::Address(_) => true,
            Expression::Number(_) | Expression::Pi => false,
            Expression::FunctionCall { argument, .. } => argument.is_symbolic(),
            Expression::Prefix { expression, .. } => expression.is_symbolic(),
            Expression::Infix { left, right, .. } => left.is_symbolic() || right.is_symbolic(),
        }
    }

    /// Try to evaluate without any memory.
    pub fn as_f64(&self) -> Option<f64> {
        self.evaluate(&Parameters::new()).ok()
    }

    /// Evaluate the expression against memory region contents.
    pub fn evaluate(&self, memory: &Parameters) -> Result<f64, EvaluationError> {
        let value = match self {
            Expression::Number(v) => *v,
            Expression::Pi => PI,
            Expression::Address(reference) => {
                let values = memory
                    .get(&reference.name)
                    .ok_or_else(|| EvaluationError::UndefinedMemory(reference.name.clone()))?;
                usize::try_from(reference.index)
                    .ok()
                    .and_then(|i| values.get(i))
                    .copied()
                    .ok_or_else(|| EvaluationError::IndexOutOfRange {
                        name: reference.name.clone(),
                        index: reference.index,
                        length: values.len(),
                    })?
            }
            Expression::FunctionCall { function, argument } => {
                function.apply(argument.evaluate(memory)?)
            }
            Expression::Prefix {
                operator,
                expression,
            } => {
                let v = expression.evaluate(memory)?;
                match operator {
                    PrefixOperator::Plus => v,
                    PrefixOperator::Minus => -v,
                }
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let l = left.evaluate(memory)?;
                let r = right.evaluate(memory)?;
                match operator {
                    InfixOperator::Plus => l + r,
                    InfixOperator::Minus => l - r,
                    InfixOperator::Star => l * r,
                    InfixOperator::Slash => {
                        if r == 0.0 {
                            return Err(EvaluationError::DivisionByZero);
                        }
                        l / r
                    }
                    InfixOperator::Caret => l.powf(r),
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFinite)
        }
    }

    /// Get all memory references read by this expression.
    pub fn memory_references(&self) -> Vec<&MemoryReference> {
        let mut references = Vec::new();
        self.collect_references(&mut references);
        references
    }

    fn collect_references<'a>(&'a self, references: &mut Vec<&'a MemoryReference>) {
        match self {
            Expression::Number(_) | Expression::Pi => {}
            Expression::Address(reference) => references.push(reference),
            Expression::FunctionCall { argument, .. } => argument.collect_references(references),
            Expression::Prefix { expression, .. } => expression.collect_references(references),
            Expression::Infix { left, right, .. } => {
                left.collect_references(references);
                right.collect_references(references);
            }
        }
    }

    /// Simplify the expression by folding constant subexpressions and
    /// removing arithmetic identities.
    ///
    /// `pi` folds to its numeric value. Folds that would divide by zero or
    /// produce a non-finite value are left unevaluated.
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Expression::Number(_) | Expression::Address(_) => self,
            Expression::Pi => Expression::Number(PI),
            Expression::FunctionCall { function, argument } => {
                let argument = argument.simplify();
                match argument {
                    Expression::Number(v) if function.apply(v).is_finite() => {
                        Expression::Number(function.apply(v))
                    }
                    argument => Expression::FunctionCall {
                        function,
                        argument: Box::new(argument),
                    },
                }
            }
            Expression::Prefix {
                operator,
                expression,
            } => match (operator, expression.simplify()) {
                (PrefixOperator::Plus, e) => e,
                (PrefixOperator::Minus, Expression::Number(v)) => Expression::Number(-v),
                (PrefixOperator::Minus, e) => Expression::Prefix {
                    operator,
                    expression: Box::new(e),
                },
            },
            Expression::Infix {
                left,
                operator,
                right,
            } => simplify_infix(left.simplify(), operator, right.simplify()),
        }
    }
}

fn fold(l: f64, operator: InfixOperator, r: f64) -> Option<f64> {
    let value = match operator {
        InfixOperator::Plus => l + r,
        InfixOperator::Minus => l - r,
        InfixOperator::Star => l * r,
        InfixOperator::Slash if r == 0.0 => return None,
        InfixOperator::Slash => l / r,
        InfixOperator::Caret => l.powf(r),
    };
    value.is_finite().then_some(value)
}

fn simplify_infix(left: Expression, operator: InfixOperator, right: Expression) -> Expression {
    use Expression::Number;

    if let (Number(l), Number(r)) = (&left, &right) {
        if let Some(v) = fold(*l, operator, *r) {
            return Number(v);
        }
    }

    match (left, operator, right) {
        (e, InfixOperator::Star, Number(one)) | (Number(one), InfixOperator::Star, e)
            if one == 1.0 =>
        {
            e
        }
        (e, InfixOperator::Slash, Number(one)) if one == 1.0 => e,
        (e, InfixOperator::Plus, Number(zero)) | (Number(zero), InfixOperator::Plus, e)
            if zero == 0.0 =>
        {
            e
        }
        (e, InfixOperator::Minus, Number(zero)) if zero == 0.0 => e,
        // (c * x) / d  =>  (c / d) * x
        (
            Expression::Infix {
                left: inner_left,
                operator: InfixOperator::Star,
                right: inner_right,
            },
            InfixOperator::Slash,
            Number(d),
        ) if d != 0.0 => match (*inner_left, *inner_right) {
            (Number(c), x) | (x, Number(c)) if fold(c, InfixOperator::Slash, d).is_some() => {
                simplify_infix(Number(c / d), InfixOperator::Star, x)
            }
            (l, r) => Expression::infix(
                Expression::infix(l, InfixOperator::Star, r),
                InfixOperator::Slash,
                Number(d),
            ),
        },
        (left, operator, right) => Expression::infix(left, operator, right),
    }
}

/// Format a literal so that it reads back as the same `f64`.
///
/// Quil has no spelling for infinity or NaN. Those are written as divisions
/// by zero, which parse back as arithmetic that fails to evaluate.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "(0/0)".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "(1/0)" } else { "(-1/0)" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let integral = value as i64;
        format!("{integral}")
    } else {
        format!("{value:?}")
    }
}

impl Expression {
    fn precedence(&self) -> u8 {
        match self {
            Expression::Infix { operator, .. } => operator.precedence(),
            Expression::Prefix { .. } => 4,
            Expression::Number(v) if *v < 0.0 => 4,
            _ => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(v) => f.write_str(&format_number(*v)),
            Expression::Pi => f.write_str("pi"),
            Expression::Address(reference) => write!(f, "{reference}"),
            Expression::FunctionCall { function, argument } => {
                write!(f, "{function}({argument})")
            }
            Expression::Prefix {
                operator,
                expression,
            } => {
                let op = match operator {
                    PrefixOperator::Plus => "+",
                    PrefixOperator::Minus => "-",
                };
                f.write_str(op)?;
                // `-2` reads back as a literal, so literal operands are wrapped.
                let parenthesize = expression.precedence() < 4
                    || matches!(expression.as_ref(), Expression::Number(_));
                expression.fmt_operand(f, parenthesize)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let prec = operator.precedence();
                let (left_parens, right_parens) = if operator.is_right_associative() {
                    (left.precedence() <= prec, right.precedence() < prec)
                } else {
                    (left.precedence() < prec, right.precedence() <= prec)
                };
                let left = if left_parens {
                    format!("({left})")
                } else {
                    left.to_string()
                };
                f.write_str(&left)?;
                // `pi-1` would lex as a single hyphenated identifier.
                if *operator == InfixOperator::Minus && left.ends_with(|c: char| c.is_ascii_alphabetic()) {
                    f.write_str(" ")?;
                }
                write!(f, "{operator}")?;
                right.fmt_operand(f, right_parens)
            }
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Number(value)
    }
}

impl From<MemoryReference> for Expression {
    fn from(reference: MemoryReference) -> Self {
        Expression::Address(reference)
    }
}

impl std::ops::Add for Expression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expression::infix(self, InfixOperator::Plus, rhs)
    }
}

impl std::ops::Sub for Expression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expression::infix(self, InfixOperator::Minus, rhs)
    }
}

impl std::ops::Mul for Expression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expression::infix(self, InfixOperator::Star, rhs)
    }
}

impl std::ops::Div for Expression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expression::infix(self, InfixOperator::Slash, rhs)
    }
}

impl std::ops::Neg for Expression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expression::Prefix {
            operator: PrefixOperator::Minus,
            expression: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn theta() -> Expression {
        Expression::address("theta", 0)
    }

    fn memory() -> Parameters {
        Parameters::from([("theta".to_string(), vec![2.0, 0.5])])
    }

    #[test]
    fn test_memory_reference_from_str() {
        let reference: MemoryReference = "ro[12]".parse().unwrap();
        assert_eq!(reference, MemoryReference::new("ro", 12));

        assert!("ro".parse::<MemoryReference>().is_err());
        assert!("ro[]".parse::<MemoryReference>().is_err());
        assert!("ro[-1]".parse::<MemoryReference>().is_err());
        assert!("[0]".parse::<MemoryReference>().is_err());
        assert!("ro[1]x".parse::<MemoryReference>().is_err());
    }

    #[test]
    fn test_evaluate() {
        let expr = Expression::number(2.0) * theta() + Expression::address("theta", 1);
        assert_relative_eq!(expr.evaluate(&memory()).unwrap(), 4.5);
    }

    #[test]
    fn test_evaluate_errors() {
        let undefined = Expression::address("beta", 0);
        assert_eq!(
            undefined.evaluate(&memory()),
            Err(EvaluationError::UndefinedMemory("beta".into()))
        );

        let out_of_range = Expression::address("theta", 5);
        assert!(matches!(
            out_of_range.evaluate(&memory()),
            Err(EvaluationError::IndexOutOfRange { index: 5, length: 2, .. })
        ));

        let div_zero = theta() / Expression::number(0.0);
        assert_eq!(
            div_zero.evaluate(&memory()),
            Err(EvaluationError::DivisionByZero)
        );

        let sqrt_negative = Expression::FunctionCall {
            function: ExpressionFunction::SquareRoot,
            argument: Box::new(-theta()),
        };
        assert_eq!(
            sqrt_negative.evaluate(&memory()),
            Err(EvaluationError::NonFinite)
        );
    }

    #[test]
    fn test_simplify_folds_constants() {
        let expr = Expression::Pi / Expression::number(2.0);
        assert_eq!(expr.simplify(), Expression::Number(PI / 2.0));
    }

    #[test]
    fn test_simplify_moves_coefficient_out_of_division() {
        let expr = (Expression::number(3.0) * theta()) / Expression::number(2.0);
        assert_eq!(
            expr.simplify(),
            Expression::number(1.5) * theta()
        );
    }

    #[test]
    fn test_simplify_identities() {
        assert_eq!((theta() * Expression::number(1.0)).simplify(), theta());
        assert_eq!((Expression::number(0.0) + theta()).simplify(), theta());
        assert_eq!((theta() / Expression::number(1.0)).simplify(), theta());
    }

    #[test]
    fn test_simplify_keeps_division_by_zero() {
        let expr = Expression::number(1.0) / Expression::number(0.0);
        assert!(!expr.clone().simplify().is_number());
    }

    #[test]
    fn test_simplify_preserves_value() {
        let expr = (Expression::Pi * theta()) / (Expression::number(2.0) * Expression::Pi);
        let simplified = expr.clone().simplify();
        assert_relative_eq!(
            expr.evaluate(&memory()).unwrap(),
            simplified.evaluate(&memory()).unwrap()
        );
        assert_eq!(simplified.evaluate(&memory()).unwrap(), 1.0);
    }

    #[test]
    fn test_display() {
        let expr = Expression::number(2.0) * Expression::Pi * theta();
        assert_eq!(expr.to_string(), "2*pi*theta[0]");

        let expr = (theta() + Expression::address("beta", 0)) / Expression::number(8.0);
        assert_eq!(expr.to_string(), "(theta[0]+beta[0])/8");

        let expr = theta() - (Expression::address("beta", 0) - Expression::number(1.0));
        assert_eq!(expr.to_string(), "theta[0]-(beta[0]-1)");

        assert_eq!(Expression::number(1e-6).to_string(), "1e-6");
        assert_eq!((-theta()).to_string(), "-theta[0]");
    }

    #[test]
    fn test_non_finite_display_fails_evaluation() {
        let expr = Expression::number(f64::INFINITY) * theta();
        assert_eq!(expr.to_string(), "(1/0)*theta[0]");
        assert_eq!(Expression::number(f64::NEG_INFINITY).to_string(), "(-1/0)");
        assert_eq!(Expression::number(f64::NAN).to_string(), "(0/0)");

        let reparsed = crate::parse_expression(&expr.to_string()).unwrap();
        assert_eq!(
            reparsed.evaluate(&memory()),
            Err(EvaluationError::DivisionByZero)
        );
    }
}
