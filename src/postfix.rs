use std::fmt::Display;

use crate::{
    error::EvalError,
    lex::{Token, TokenKind, tokenize},
    op::Operation,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostfixToken {
    Number(f64),
    Operator(Operation),
}

impl Display for PostfixToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostfixToken::Number(n) => write!(f, "{n}"),
            PostfixToken::Operator(op) => write!(f, "{op}"),
        }
    }
}

/// An expression in postfix order. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Postfix {
    tokens: Vec<PostfixToken>,
}

/// What can sit on the shunting-yard stack.
enum Pending {
    Operator(Operation),
    Paren { offset: usize },
}

impl Postfix {
    /// Tokenizes `source` and converts it.
    pub fn parse(source: &str) -> Result<Self, EvalError> {
        let tokens = tokenize(source)?;
        Self::from_tokens(source, &tokens)
    }

    /// Shunting-yard conversion. `source` is only used for diagnostics.
    pub fn from_tokens(source: &str, tokens: &[Token<'_>]) -> Result<Self, EvalError> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut stack = Vec::new();
        let mut expect_operand = true;

        for token in tokens {
            match token.kind {
                TokenKind::Number(n) => {
                    output.push(PostfixToken::Number(n));
                    expect_operand = false;
                }
                TokenKind::Operator(op) => {
                    if expect_operand {
                        return Err(EvalError::MissingOperands { operation: op });
                    }
                    while let Some(&Pending::Operator(top)) = stack.last() {
                        if !top.binds_before(op) {
                            break;
                        }
                        output.push(PostfixToken::Operator(top));
                        stack.pop();
                    }
                    stack.push(Pending::Operator(op));
                    expect_operand = true;
                }
                TokenKind::LeftParen => {
                    stack.push(Pending::Paren {
                        offset: token.offset,
                    });
                    expect_operand = true;
                }
                TokenKind::RightParen => loop {
                    match stack.pop() {
                        Some(Pending::Operator(op)) => output.push(PostfixToken::Operator(op)),
                        Some(Pending::Paren { .. }) => break,
                        None => return Err(EvalError::unbalanced(source, token.offset)),
                    }
                },
            }
        }

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::Operator(op) => output.push(PostfixToken::Operator(op)),
                Pending::Paren { offset } => return Err(EvalError::unbalanced(source, offset)),
            }
        }

        Ok(Postfix { tokens: output })
    }

    pub fn tokens(&self) -> &[PostfixToken] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<PostfixToken> {
        self.tokens.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Display for Postfix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens = self.tokens.iter();
        if let Some(first) = tokens.next() {
            write!(f, "{first}")?;
            for token in tokens {
                write!(f, " {token}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn rpn(source: &str) -> String {
        Postfix::parse(source)
            .unwrap_or_else(|e| panic!("`{source}` should convert: {e}"))
            .to_string()
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(rpn("2 + 3 * 4 - 5"), "2 3 4 * + 5 -");
        assert_eq!(rpn("2 * 3 + 4"), "2 3 * 4 +");
        assert_eq!(rpn("1 + 2 ^ 3 * 4"), "1 2 3 ^ 4 * +");
    }

    #[test]
    fn left_and_right_associativity() {
        assert_eq!(rpn("8 - 4 - 2"), "8 4 - 2 -");
        assert_eq!(rpn("8 / 4 / 2"), "8 4 / 2 /");
        assert_eq!(rpn("2 ^ 3 ^ 2"), "2 3 2 ^ ^");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(rpn("(1 + 2) * 3"), "1 2 + 3 *");
        assert_eq!(rpn("((4))"), "4");
        assert_eq!(rpn("(2 ^ 3) ^ 2"), "2 3 ^ 2 ^");
    }

    #[test]
    fn negative_literals_pass_through() {
        assert_eq!(rpn("-1.5 * -2"), "-1.5 -2 *");
    }

    #[test]
    fn empty_expression_is_empty_postfix() {
        assert!(Postfix::parse("").unwrap().is_empty());
        assert_eq!(rpn(""), "");
    }

    #[test]
    fn unmatched_open_paren() {
        let err = Postfix::parse("(1 + 2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnbalancedParens);
        let EvalError::UnbalancedParens { paren, .. } = err else {
            unreachable!()
        };
        assert_eq!(paren.offset(), 0);
    }

    #[test]
    fn unmatched_close_paren() {
        let err = Postfix::parse("1 + 2)").unwrap_err();
        let EvalError::UnbalancedParens { paren, .. } = err else {
            panic!("expected unbalanced parentheses, got {err:?}");
        };
        assert_eq!(paren.offset(), 5);
    }

    #[test]
    fn operator_without_left_operand() {
        for source in ["+ 2 3", "(* 2)", "1 + / 2", "2 (+ 3)", "4 * (/ 2)"] {
            let err = Postfix::parse(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingOperands, "{source}");
        }
    }

    #[test]
    fn trailing_operator_is_left_for_evaluation() {
        assert_eq!(rpn("2 +"), "2 +");
    }
}
