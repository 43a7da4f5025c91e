//! Expression parsing for Quil.

use super::Parser;
use crate::error::QuilResult;
use crate::expression::{
    Expression, ExpressionFunction, InfixOperator, MemoryReference, PrefixOperator,
};
use crate::lexer::Token;

impl Parser<'_> {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> QuilResult<Expression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> QuilResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(operator) = self.peek_binary_op() {
            let prec = operator.precedence();
            if prec < min_prec {
                break;
            }
            self.advance(); // consume operator

            let next_min = if operator.is_right_associative() {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary_expr(next_min)?;
            left = Expression::infix(left, operator, right);
        }

        Ok(left)
    }

    /// Parse unary expression. A sign directly in front of a numeric literal
    /// becomes part of the literal.
    fn parse_unary_expr(&mut self) -> QuilResult<Expression> {
        if self.consume(&Token::Minus) {
            match self.peek() {
                Some(Token::IntLiteral(v)) => {
                    #[allow(clippy::cast_precision_loss)]
                    let value = -(*v as f64);
                    self.advance();
                    return Ok(Expression::Number(value));
                }
                Some(Token::FloatLiteral(v)) => {
                    let value = -*v;
                    self.advance();
                    return Ok(Expression::Number(value));
                }
                _ => {}
            }
            let expression = self.parse_unary_expr()?;
            return Ok(Expression::Prefix {
                operator: PrefixOperator::Minus,
                expression: Box::new(expression),
            });
        }
        if self.consume(&Token::Plus) {
            let expression = self.parse_unary_expr()?;
            return Ok(Expression::Prefix {
                operator: PrefixOperator::Plus,
                expression: Box::new(expression),
            });
        }
        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> QuilResult<Expression> {
        let token = self
            .advance()
            .ok_or_else(|| self.unexpected_end("expression"))?;

        match token {
            #[allow(clippy::cast_precision_loss)]
            Token::IntLiteral(v) => Ok(Expression::Number(v as f64)),
            Token::FloatLiteral(v) => Ok(Expression::Number(v)),
            Token::Identifier(name) => {
                if self.check(&Token::LBracket) {
                    return Ok(Expression::Address(self.parse_index(name)?));
                }
                if name == "pi" {
                    return Ok(Expression::Pi);
                }
                if self.check(&Token::LParen) {
                    let Some(function) = ExpressionFunction::from_name(&name) else {
                        return Err(self.unexpected("expression function", &Token::Identifier(name)));
                    };
                    self.advance();
                    let argument = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    return Ok(Expression::FunctionCall {
                        function,
                        argument: Box::new(argument),
                    });
                }
                Ok(Expression::Address(MemoryReference::new(name, 0)))
            }
            Token::LParen => {
                let expression = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expression)
            }
            other => Err(self.unexpected("expression", &other)),
        }
    }

    /// Parse the `[index]` suffix of a memory reference.
    pub(super) fn parse_index(&mut self, name: String) -> QuilResult<MemoryReference> {
        self.expect(Token::LBracket)?;
        let index = self.parse_int_literal()?;
        self.expect(Token::RBracket)?;
        Ok(MemoryReference::new(name, index))
    }

    /// Parse a memory reference where the index defaults to zero.
    pub(super) fn parse_memory_reference(&mut self) -> QuilResult<MemoryReference> {
        let name = self.parse_identifier()?;
        if self.check(&Token::LBracket) {
            self.parse_index(name)
        } else {
            Ok(MemoryReference::new(name, 0))
        }
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<InfixOperator> {
        match self.peek()? {
            Token::Plus => Some(InfixOperator::Plus),
            Token::Minus => Some(InfixOperator::Minus),
            Token::Star => Some(InfixOperator::Star),
            Token::Slash => Some(InfixOperator::Slash),
            Token::Caret => Some(InfixOperator::Caret),
            _ => None,
        }
    }

    /// Parse a comma-separated expression list.
    pub(super) fn parse_expression_list(&mut self) -> QuilResult<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::{Expression, InfixOperator, PrefixOperator};
    use crate::parser::parse_expression;

    #[test]
    fn test_precedence() {
        let expr = parse_expression("1+2*theta").unwrap();
        assert!(matches!(
            expr,
            Expression::Infix {
                operator: InfixOperator::Plus,
                ..
            }
        ));
        assert_eq!(expr.to_string(), "1+2*theta[0]");
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expression("2^3^2").unwrap();
        assert_eq!(expr.as_f64(), Some(512.0));
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse_expression("10-4-3").unwrap();
        assert_eq!(expr.as_f64(), Some(3.0));
    }

    #[test]
    fn test_negative_literal() {
        assert_eq!(parse_expression("-1.5").unwrap(), Expression::Number(-1.5));
        assert!(matches!(
            parse_expression("-theta").unwrap(),
            Expression::Prefix {
                operator: PrefixOperator::Minus,
                ..
            }
        ));
    }

    #[test]
    fn test_functions_and_pi() {
        let expr = parse_expression("cos(pi)").unwrap();
        assert_eq!(expr.as_f64(), Some(-1.0));
        assert!(parse_expression("tan(pi)").is_err());
    }

    #[test]
    fn test_pi_minus_reparses() {
        let expr = parse_expression("(pi)-1").unwrap();
        let reparsed = parse_expression(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed);
    }
}
