//! A toy arithmetic evaluator built out of message-passing agents.
//!
//! A [`Coordinator`] turns an infix expression into postfix form and walks it
//! one step at a time. Every binary operation is sent as a request to the
//! [`OperatorAgent`] responsible for it, and the answer comes back through a
//! shared [`MessageQueue`]. [`Model`] ties them together and advances the
//! whole ensemble one step per call.
//!
//! ```
//! use agent_calculator::evaluate;
//!
//! assert_eq!(evaluate("2 + 3 * 4 - 5").unwrap(), 9.0);
//! assert!(evaluate("1 / 0").is_err());
//! ```

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod lex;
pub mod message;
pub mod model;
pub mod op;
pub mod postfix;

#[cfg(test)]
mod proptests;

pub use agent::OperatorAgent;
pub use config::{DeliveryPolicy, ModelConfig};
pub use coordinator::{Coordinator, Directory, Event, Phase};
pub use error::{ErrorKind, EvalError};
pub use lex::{Lexer, Token, TokenKind, tokenize};
pub use message::{AgentId, Message, MessageKind, MessageQueue, Payload};
pub use model::{Model, StepRecord, evaluate, evaluate_with};
pub use op::Operation;
pub use postfix::{Postfix, PostfixToken};
