//! Lexer for Quil instructions.
//!
//! Statements are split into lines by the parser before lexing, so newlines
//! never reach this lexer.

use logos::Logos;

/// Float literals that overflow `f64` are invalid tokens.
fn finite_float(lex: &mut logos::Lexer<'_, Token>) -> Option<f64> {
    lex.slice().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Tokens for a single Quil statement.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", finite_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", finite_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", finite_float)]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLiteral(String),

    // Identifiers. Quil allows interior hyphens (`SET-PHASE`, `SAMPLE-RATE`).
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(-[a-zA-Z0-9_]+)*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
        }
    }
}

/// A token with its byte span in the statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize one Quil statement.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &source[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_gate_with_expression() {
        let toks = tokens("RZ(2*pi*theta[0]) 0");

        assert!(matches!(toks[0], Token::Identifier(ref s) if s == "RZ"));
        assert_eq!(toks[1], Token::LParen);
        assert_eq!(toks[2], Token::IntLiteral(2));
        assert_eq!(toks[3], Token::Star);
        assert!(matches!(toks[4], Token::Identifier(ref s) if s == "pi"));
        assert_eq!(toks[6], Token::Identifier("theta".into()));
        assert_eq!(toks[7], Token::LBracket);
        assert_eq!(toks[8], Token::IntLiteral(0));
        assert_eq!(toks[10], Token::RParen);
        assert_eq!(toks[11], Token::IntLiteral(0));
    }

    #[test]
    fn test_hyphenated_keywords() {
        let toks = tokens("SET-FREQUENCY 0 \"rf\" theta");
        assert_eq!(toks[0], Token::Identifier("SET-FREQUENCY".into()));
        assert_eq!(toks[1], Token::IntLiteral(0));
        assert_eq!(toks[2], Token::StringLiteral("rf".into()));
    }

    #[test]
    fn test_spaced_minus_is_an_operator() {
        let toks = tokens("theta - 1");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1], Token::Minus);
    }

    #[test]
    fn test_scientific_literals() {
        assert_eq!(tokens("1e-6"), vec![Token::FloatLiteral(1e-6)]);
        assert_eq!(tokens("2.5E3"), vec![Token::FloatLiteral(2500.0)]);
        assert_eq!(tokens(".5"), vec![Token::FloatLiteral(0.5)]);
    }

    #[test]
    fn test_overflowing_float_is_invalid() {
        let results = tokenize("RX(1e400) 0");
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert!(tokenize("-1.5e308").iter().all(Result::is_ok));
    }

    #[test]
    fn test_comments_are_skipped() {
        let toks = tokens("H 0 # hadamard");
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn test_invalid_token() {
        let results = tokenize("MOVE ro[0] @x");
        assert!(results.iter().any(Result::is_err));
    }
}
