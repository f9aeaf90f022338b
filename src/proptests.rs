//! Property-based tests for the agent evaluator.

use proptest::prelude::*;

use crate::{DeliveryPolicy, ErrorKind, ModelConfig, Operation, evaluate, evaluate_with};

#[derive(Debug, Clone)]
enum Expr {
    Num(u8),
    Bin(Operation, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Straightforward recursive evaluation, `None` on division by zero.
    fn direct(&self) -> Option<f64> {
        match self {
            Expr::Num(n) => Some(f64::from(*n)),
            Expr::Bin(op, lhs, rhs) => {
                let (a, b) = (lhs.direct()?, rhs.direct()?);
                if *op == Operation::Div && b == 0.0 {
                    return None;
                }
                Some(op.apply(a, b))
            }
        }
    }

    /// Renders with only the parentheses precedence and associativity need.
    fn render(&self) -> String {
        match self {
            Expr::Num(n) => n.to_string(),
            Expr::Bin(op, lhs, rhs) => {
                let wrap = |child: &Expr, same_level_needs_parens: bool| {
                    let text = child.render();
                    match child {
                        Expr::Bin(inner, ..)
                            if inner.precedence() < op.precedence()
                                || (inner.precedence() == op.precedence()
                                    && same_level_needs_parens) =>
                        {
                            format!("({text})")
                        }
                        _ => text,
                    }
                };
                let left = wrap(lhs, op.is_right_assoc());
                let right = wrap(rhs, !op.is_right_assoc());
                format!("{left} {} {right}", op.symbol())
            }
        }
    }
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Add),
        Just(Operation::Sub),
        Just(Operation::Mul),
        Just(Operation::Div),
        Just(Operation::Pow),
    ]
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = (0u8..10).prop_map(Expr::Num);
    leaf.prop_recursive(4, 24, 2, |inner| {
        (operation(), inner.clone(), inner)
            .prop_map(|(op, lhs, rhs)| Expr::Bin(op, Box::new(lhs), Box::new(rhs)))
    })
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #[test]
    fn agents_agree_with_direct_evaluation(tree in expr()) {
        let source = tree.render();
        match (tree.direct(), evaluate(&source)) {
            (Some(expected), Ok(actual)) => {
                prop_assert!(same_number(expected, actual), "{source}: {expected} != {actual}");
            }
            (None, Err(e)) => prop_assert_eq!(e.kind(), ErrorKind::DivisionByZero),
            (expected, actual) => {
                prop_assert!(false, "{source}: expected {expected:?}, got {actual:?}");
            }
        }
    }

    #[test]
    fn delivery_policy_does_not_change_outcome(tree in expr()) {
        let source = tree.render();
        let one = evaluate(&source);
        let drained = evaluate_with(
            &source,
            ModelConfig::default().with_delivery(DeliveryPolicy::Drain),
        );
        match (one, drained) {
            (Ok(a), Ok(b)) => prop_assert!(same_number(a, b)),
            (Err(a), Err(b)) => prop_assert_eq!(a.kind(), b.kind()),
            (a, b) => prop_assert!(false, "{source}: {a:?} vs {b:?}"),
        }
    }

    #[test]
    fn reruns_are_identical(source in "[0-9+*/^() .-]{0,16}") {
        let first = evaluate(&source);
        let second = evaluate(&source);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert!(same_number(a, b)),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            (a, b) => prop_assert!(false, "{source:?}: {a:?} vs {b:?}"),
        }
    }
}
