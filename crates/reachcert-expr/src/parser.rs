//! Recursive-descent parser for the serialized expression grammar.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := atom (('^' | '**') unary)?
//! atom    := NUMBER | IDENT | IDENT '(' expr (',' expr)* ')' | '(' expr ')'
//! ```

use thiserror::Error;

use crate::ast::{Expr, Func};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character `{ch}` at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("malformed number `{text}` at byte {pos}")]
    MalformedNumber { text: String, pos: usize },
    #[error("unknown function `{name}` at byte {pos}")]
    UnknownFunction { name: String, pos: usize },
    #[error("`{func}` expects {expected} argument(s), got {got}")]
    WrongArity {
        func: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unexpected token at byte {pos}, expected {expected}")]
    UnexpectedToken { pos: usize, expected: &'static str },
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                // `**` is the exponent spelling the upstream extractor uses.
                if bytes.get(i + 1) == Some(&b'*') {
                    tokens.push((Token::Caret, i));
                    i += 2;
                } else {
                    tokens.push((Token::Star, i));
                    i += 1;
                }
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '^' => {
                tokens.push((Token::Caret, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.') {
                    i += 1;
                }
                // Optional exponent part: 1.5e-3
                if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text = &src[start..i];
                let value = text.parse::<f64>().map_err(|_| ParseError::MalformedNumber {
                    text: text.to_string(),
                    pos: start,
                })?;
                tokens.push((Token::Num(value), start));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < bytes.len()
                    && matches!(bytes[i], b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(src[start..i].to_string()), start));
            }
            other => {
                return Err(ParseError::UnexpectedChar { ch: other, pos: i });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn here(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        match self.bump() {
            Some(t) if t == token => Ok(()),
            Some(_) => Err(ParseError::UnexpectedToken {
                pos: self.tokens[self.pos - 1].1,
                expected,
            }),
            None => Err(ParseError::UnexpectedEnd { expected }),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    lhs = lhs.add(self.parse_term()?);
                }
                Some(Token::Minus) => {
                    self.bump();
                    lhs = lhs.sub(self.parse_term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    lhs = lhs.mul(self.parse_unary()?);
                }
                Some(Token::Slash) => {
                    self.bump();
                    lhs = lhs.div(self.parse_unary()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == Some(&Token::Minus) {
            self.bump();
            return Ok(self.parse_unary()?.neg());
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.bump();
            // Right-associative; the exponent may carry a unary minus.
            let exponent = self.parse_unary()?;
            return Ok(base.pow(exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let pos = self.here();
        match self.bump() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let func = Func::from_name(&name)
                        .ok_or(ParseError::UnknownFunction { name, pos })?;
                    self.bump();
                    let mut args = vec![self.parse_expr()?];
                    while self.peek() == Some(&Token::Comma) {
                        self.bump();
                        args.push(self.parse_expr()?);
                    }
                    self.expect(Token::RParen, "`)`")?;
                    if args.len() != func.arity() {
                        return Err(ParseError::WrongArity {
                            func: func.name(),
                            expected: func.arity(),
                            got: args.len(),
                        });
                    }
                    Ok(Expr::Call(func, args))
                } else if Func::from_name(&name).is_some() {
                    Err(ParseError::UnexpectedToken {
                        pos,
                        expected: "`(` after function name",
                    })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(_) => Err(ParseError::UnexpectedToken {
                pos,
                expected: "a number, variable, function call, or `(`",
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: "a number, variable, function call, or `(`",
            }),
        }
    }
}

/// Parse a serialized expression into an AST.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ParseError::UnexpectedToken {
            pos: parser.tokens[parser.pos].1,
            expected: "end of expression",
        });
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precedence_and_associativity() {
        let e = parse("1 + 2 * x_1_2 - 3").unwrap();
        assert_eq!(
            e,
            Expr::num(1.0)
                .add(Expr::num(2.0).mul(Expr::var("x_1_2")))
                .sub(Expr::num(3.0))
        );
    }

    #[test]
    fn parses_function_calls() {
        let e = parse("tanh(x_1_1) + Max(x_1_2, 0.25)").unwrap();
        assert_eq!(
            e,
            Expr::Call(Func::Tanh, vec![Expr::var("x_1_1")]).add(Expr::Call(
                Func::Max,
                vec![Expr::var("x_1_2"), Expr::num(0.25)]
            ))
        );
    }

    #[test]
    fn parses_unary_minus_and_powers() {
        let e = parse("-x_1_2 ** 2").unwrap();
        assert_eq!(e, Expr::var("x_1_2").pow(Expr::num(2.0)).neg());

        let e = parse("x_1_2 ^ -1").unwrap();
        assert_eq!(e, Expr::var("x_1_2").pow(Expr::num(1.0).neg()));
    }

    #[test]
    fn parses_nested_parens_and_division() {
        let e = parse("(x_1_2 + 1) / (x_1_3 - 2.5)").unwrap();
        assert_eq!(
            e,
            Expr::var("x_1_2")
                .add(Expr::num(1.0))
                .div(Expr::var("x_1_3").sub(Expr::num(2.5)))
        );
    }

    #[test]
    fn parses_scientific_notation() {
        assert_eq!(parse("1.5e-3").unwrap(), Expr::num(0.0015));
        assert_eq!(parse("2E2").unwrap(), Expr::num(200.0));
    }

    #[test]
    fn rejects_unknown_functions() {
        assert!(matches!(
            parse("log(x_1_2)"),
            Err(ParseError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(matches!(
            parse("min(x_1_2)"),
            Err(ParseError::WrongArity {
                func: "min",
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            parse("sin(x_1_2, 1)"),
            Err(ParseError::WrongArity { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse(""), Err(ParseError::Empty)));
        assert!(matches!(parse("   "), Err(ParseError::Empty)));
        assert!(matches!(
            parse("(x_1_2"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("x_1_2 +"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("1 $ 2"),
            Err(ParseError::UnexpectedChar { ch: '$', .. })
        ));
        assert!(matches!(
            parse("1..5"),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert!(matches!(
            parse("x_1_2 3"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn function_name_without_call_is_an_error() {
        assert!(matches!(
            parse("sin + 1"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }
}
