//! Arithmetic expression evaluator: `+ - * / ^`, parentheses and postfix
//! factorial, via a hand-rolled tokenizer and recursive-descent parser.
//! Unicode operator forms (`×`, `÷`, `−`) are accepted the way pasted text
//! tends to arrive and normalized while tokenizing.

use crate::shared::error::{EngineError, EngineResult};

/// 170! is the largest factorial that fits in an f64.
const MAX_FACTORIAL: f64 = 170.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> EngineResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal.parse::<f64>().map_err(|_| {
                    EngineError::MalformedExpression(format!("bad number '{}'", literal))
                })?;
                tokens.push(Token::Number(value));
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' | '−' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '*' | '×' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '/' | '÷' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '^' => {
                tokens.push(Token::Caret);
                chars.next();
            }
            '!' => {
                tokens.push(Token::Bang);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            other => {
                return Err(EngineError::MalformedExpression(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> EngineResult<f64> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn term(&mut self) -> EngineResult<f64> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EngineError::MalformedExpression(
                            "division by zero".to_string(),
                        ));
                    }
                    acc /= divisor;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // Unary minus binds looser than ^, so -2^2 is -(2^2).
    fn unary(&mut self) -> EngineResult<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> EngineResult<f64> {
        let base = self.postfix()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            // Right-associative; the exponent may carry its own sign.
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> EngineResult<f64> {
        let mut value = self.primary()?;
        while self.peek() == Some(Token::Bang) {
            self.pos += 1;
            value = factorial(value)?;
        }
        Ok(value)
    }

    fn primary(&mut self) -> EngineResult<f64> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EngineError::MalformedExpression(
                        "missing closing parenthesis".to_string(),
                    )),
                }
            }
            Some(token) => Err(EngineError::MalformedExpression(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(EngineError::MalformedExpression(
                "unexpected end of expression".to_string(),
            )),
        }
    }
}

fn factorial(value: f64) -> EngineResult<f64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(EngineError::MalformedExpression(format!(
            "factorial of {} is undefined",
            value
        )));
    }
    if value > MAX_FACTORIAL {
        return Err(EngineError::MalformedExpression(format!(
            "factorial of {} overflows",
            value
        )));
    }
    let n = value as u64;
    let mut acc = 1.0f64;
    for i in 2..=n {
        acc *= i as f64;
    }
    Ok(acc)
}

/// C(n, r) by the multiplicative formula. `None` when r > n or the count
/// leaves f64 range.
pub fn combinations(n: u64, r: u64) -> Option<f64> {
    if r > n {
        return None;
    }
    let r = r.min(n - r);
    let mut acc = 1.0f64;
    for i in 1..=r {
        acc = acc * (n - r + i) as f64 / i as f64;
    }
    if !acc.is_finite() {
        return None;
    }
    Some(acc.round())
}

/// Evaluate one arithmetic line. Anything outside the grammar, division by
/// zero, factorial domain errors and non-finite results all surface as
/// `MalformedExpression`; the dispatcher renders that as an empty result.
pub fn evaluate(expr: &str) -> EngineResult<f64> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(EngineError::MalformedExpression(
            "empty expression".to_string(),
        ));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(EngineError::MalformedExpression(
            "trailing input after expression".to_string(),
        ));
    }
    if !value.is_finite() {
        return Err(EngineError::MalformedExpression(
            "result is not finite".to_string(),
        ));
    }
    Ok(value)
}
