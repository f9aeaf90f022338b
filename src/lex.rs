use std::fmt::Display;

use crate::{error::EvalError, op::Operation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the whole expression.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Operator(Operation),
    LeftParen,
    RightParen,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number(n) => write!(f, "NUMBER {lit} {n}"),
            TokenKind::Operator(op) => write!(f, "OPERATOR {lit} {}", op.name()),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    /// Length in bytes of a number starting at the beginning of `s`, if one
    /// does. Matches `-?[0-9]+(\.[0-9]+)?`.
    fn number_len(s: &str) -> Option<usize> {
        let bytes = s.as_bytes();
        let mut end = usize::from(bytes.first() == Some(&b'-'));

        let digits = |from: usize| {
            bytes[from..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let whole = digits(end);
        if whole == 0 {
            return None;
        }
        end += whole;

        if bytes.get(end) == Some(&b'.') {
            let fraction = digits(end + 1);
            if fraction > 0 {
                end += 1 + fraction;
            }
        }
        Some(end)
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let trimmed = self.rest.trim_start();
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let c = self.rest.chars().next()?;
        let offset = self.byte;

        // Numbers go first, so `-` directly followed by a digit is a sign.
        if let Some(len) = Self::number_len(self.rest) {
            let literal = &self.rest[..len];
            self.rest = &self.rest[len..];
            self.byte += len;

            return Some(match literal.parse() {
                Ok(n) => Ok(Token {
                    kind: TokenKind::Number(n),
                    literal,
                    offset,
                }),
                Err(_) => Err(EvalError::token(self.whole, offset)),
            });
        }

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            c => match Operation::from_symbol(c) {
                Some(op) => TokenKind::Operator(op),
                None => {
                    // Nothing sensible can follow, stop here.
                    self.rest = "";
                    return Some(Err(EvalError::token(self.whole, offset)));
                }
            },
        };

        let literal = &self.rest[..c.len_utf8()];
        self.rest = &self.rest[c.len_utf8()..];
        self.byte += c.len_utf8();
        Some(Ok(Token {
            kind,
            literal,
            offset,
        }))
    }
}

/// Collects every token of `input`, failing on the first unrecognized one.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, EvalError> {
    Lexer::new(input).collect()
}
