use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::op::Operation;

const SOURCE_NAME: &str = "<expr>";

/// Everything that can end an evaluation. All variants are terminal: once the
/// coordinator holds one it stops advancing.
#[derive(Error, Debug, Diagnostic)]
pub enum EvalError {
    #[error("unrecognized token near `{near}`")]
    #[diagnostic(
        code(calc::token),
        help("expressions may only contain numbers and `+ - * / ^ ( )`")
    )]
    Token {
        #[source_code]
        src: NamedSource<String>,

        #[label("no token starts here")]
        bad_bit: SourceSpan,

        near: String,
    },

    #[error("unbalanced parentheses")]
    #[diagnostic(code(calc::unbalanced_parens))]
    UnbalancedParens {
        #[source_code]
        src: NamedSource<String>,

        #[label("this parenthesis has no partner")]
        paren: SourceSpan,
    },

    #[error("missing operands for `{operation}`")]
    #[diagnostic(
        code(calc::missing_operands),
        help("every operator needs a value on both sides")
    )]
    MissingOperands { operation: Operation },

    #[error("division by zero ({dividend} / 0)")]
    #[diagnostic(code(calc::division_by_zero))]
    DivisionByZero { dividend: f64 },

    #[error("invalid expression: {remaining} values left on the stack")]
    #[diagnostic(
        code(calc::invalid_expression),
        help("two numbers may be missing an operator between them")
    )]
    InvalidExpression { remaining: usize },
}

/// The category of an [`EvalError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Token,
    UnbalancedParens,
    MissingOperands,
    DivisionByZero,
    InvalidExpression,
}

impl EvalError {
    pub(crate) fn token(source: &str, offset: usize) -> Self {
        let rest = &source[offset..];
        let width = rest.chars().next().map_or(0, char::len_utf8);
        EvalError::Token {
            src: NamedSource::new(SOURCE_NAME, source.to_string()),
            bad_bit: SourceSpan::from(offset..offset + width),
            near: rest.to_string(),
        }
    }

    pub(crate) fn unbalanced(source: &str, offset: usize) -> Self {
        EvalError::UnbalancedParens {
            src: NamedSource::new(SOURCE_NAME, source.to_string()),
            paren: SourceSpan::from(offset..offset + 1),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Token { .. } => ErrorKind::Token,
            EvalError::UnbalancedParens { .. } => ErrorKind::UnbalancedParens,
            EvalError::MissingOperands { .. } => ErrorKind::MissingOperands,
            EvalError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            EvalError::InvalidExpression { .. } => ErrorKind::InvalidExpression,
        }
    }
}
