use std::fmt::Display;

/// One of the five binary operations an operator agent can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Pow,
    ];

    pub fn from_symbol(c: char) -> Option<Self> {
        Some(match c {
            '+' => Operation::Add,
            '-' => Operation::Sub,
            '*' => Operation::Mul,
            '/' => Operation::Div,
            '^' => Operation::Pow,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '*',
            Operation::Div => '/',
            Operation::Pow => '^',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
            Operation::Pow => "pow",
        }
    }

    /// Position of this operation in [`Operation::ALL`].
    pub fn index(self) -> usize {
        match self {
            Operation::Add => 0,
            Operation::Sub => 1,
            Operation::Mul => 2,
            Operation::Div => 3,
            Operation::Pow => 4,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operation::Add | Operation::Sub => 1,
            Operation::Mul | Operation::Div => 2,
            Operation::Pow => 3,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, Operation::Pow)
    }

    /// Whether `self`, sitting on the operator stack, must be emitted before
    /// `incoming` is pushed.
    pub fn binds_before(self, incoming: Operation) -> bool {
        if self.is_right_assoc() {
            self.precedence() > incoming.precedence()
        } else {
            self.precedence() >= incoming.precedence()
        }
    }

    /// Plain `f64` arithmetic. Division by zero is rejected by the handler
    /// before it gets here.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operation::Add => lhs + rhs,
            Operation::Sub => lhs - rhs,
            Operation::Mul => lhs * rhs,
            Operation::Div => lhs / rhs,
            Operation::Pow => lhs.powf(rhs),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
