use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::{
    error::EvalError,
    message::{AgentId, Message, MessageKind, MessageQueue, Payload},
    op::Operation,
    postfix::{Postfix, PostfixToken},
};

/// Which agent answers which operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directory {
    ids: [AgentId; 5],
}

impl Directory {
    /// `ids` is indexed like [`Operation::ALL`].
    pub fn new(ids: [AgentId; 5]) -> Self {
        Directory { ids }
    }

    pub fn lookup(&self, operation: Operation) -> AgentId {
        self.ids[operation.index()]
    }
}

#[derive(Debug)]
pub enum Phase {
    Parsing,
    Evaluating,
    Waiting(Operation),
    Done(f64),
    Failed(EvalError),
}

impl Phase {
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Done(_) | Phase::Failed(_))
    }
}

/// What the most recent step did.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Parsed(Postfix),
    Pushed(f64),
    Requested {
        operation: Operation,
        operands: (f64, f64),
    },
    Received {
        operation: Operation,
        result: f64,
    },
    Finished(f64),
    Failed(String),
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Parsed(postfix) => write!(f, "postfix: {postfix}"),
            Event::Pushed(n) => write!(f, "push {n}"),
            Event::Requested {
                operation,
                operands: (a, b),
            } => write!(f, "request {}({a}, {b})", operation.name()),
            Event::Received { operation, result } => {
                write!(f, "response {}: {result}", operation.name())
            }
            Event::Finished(n) => write!(f, "result = {n}"),
            Event::Failed(e) => write!(f, "error: {e}"),
        }
    }
}

/// Parses an expression and evaluates it one step at a time, delegating every
/// operator to the agent the [`Directory`] names for it.
///
/// Only one request is ever in flight: after sending one the coordinator
/// does nothing but wait for its response.
#[derive(Debug)]
pub struct Coordinator {
    id: AgentId,
    directory: Directory,
    expr: String,
    postfix: Option<Postfix>,
    cursor: usize,
    stack: Vec<f64>,
    phase: Phase,
    last_event: Option<Event>,
}

impl Coordinator {
    pub fn new(id: AgentId, directory: Directory, expr: impl Into<String>) -> Self {
        Coordinator {
            id,
            directory,
            expr: expr.into(),
            postfix: None,
            cursor: 0,
            stack: Vec::new(),
            phase: Phase::Parsing,
            last_event: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// `None` until the first step has parsed the expression.
    pub fn postfix(&self) -> Option<&Postfix> {
        self.postfix.as_ref()
    }

    pub fn stack(&self) -> &[f64] {
        &self.stack
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn result(&self) -> Option<f64> {
        match self.phase {
            Phase::Done(n) => Some(n),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EvalError> {
        match &self.phase {
            Phase::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The final result or error. A coordinator that has not finished yet
    /// is handed back unchanged.
    pub fn into_outcome(self) -> Result<Result<f64, EvalError>, Self> {
        match self.phase {
            Phase::Done(n) => Ok(Ok(n)),
            Phase::Failed(e) => Ok(Err(e)),
            phase => Err(Coordinator { phase, ..self }),
        }
    }

    pub fn step(&mut self, queue: &mut MessageQueue) {
        let next = match self.phase {
            Phase::Done(_) | Phase::Failed(_) => return,
            Phase::Parsing => self.parse(),
            Phase::Evaluating => self.advance(queue),
            Phase::Waiting(operation) => Ok(self.poll(queue, operation)),
        };
        match next {
            Ok(phase) => self.phase = phase,
            Err(e) => self.fail(e),
        }
    }

    /// Moves to the terminal error state. Also used by the model when an
    /// operator agent fails on our behalf.
    pub(crate) fn fail(&mut self, error: EvalError) {
        if self.is_finished() {
            return;
        }
        warn!(expr = %self.expr, %error, "evaluation failed");
        self.last_event = Some(Event::Failed(error.to_string()));
        self.phase = Phase::Failed(error);
    }

    fn parse(&mut self) -> Result<Phase, EvalError> {
        let postfix = Postfix::parse(&self.expr)?;
        debug!(expr = %self.expr, %postfix, "parsed");
        self.last_event = Some(Event::Parsed(postfix.clone()));
        self.postfix = Some(postfix);
        self.cursor = 0;
        Ok(Phase::Evaluating)
    }

    fn advance(&mut self, queue: &mut MessageQueue) -> Result<Phase, EvalError> {
        let token = self
            .postfix
            .as_ref()
            .and_then(|postfix| postfix.get(self.cursor));

        let Some(token) = token else {
            return self.finish();
        };
        self.cursor += 1;

        match token {
            PostfixToken::Number(n) => {
                debug!(value = n, "push");
                self.stack.push(n);
                self.last_event = Some(Event::Pushed(n));
                Ok(Phase::Evaluating)
            }
            PostfixToken::Operator(operation) => {
                let [.., a, b] = self.stack[..] else {
                    return Err(EvalError::MissingOperands { operation });
                };
                self.stack.truncate(self.stack.len() - 2);

                let receiver = self.directory.lookup(operation);
                debug!(op = operation.name(), a, b, to = %receiver, "request");
                queue.push(Message::request(operation, (a, b), self.id, receiver));
                self.last_event = Some(Event::Requested {
                    operation,
                    operands: (a, b),
                });
                Ok(Phase::Waiting(operation))
            }
        }
    }

    fn poll(&mut self, queue: &mut MessageQueue, operation: Operation) -> Phase {
        let result = match queue.pop(self.id, operation, MessageKind::Response) {
            Some(Message {
                payload: Payload::Response { result },
                ..
            }) => result,
            _ => return Phase::Waiting(operation),
        };

        debug!(op = operation.name(), result, "response");
        self.stack.push(result);
        self.last_event = Some(Event::Received { operation, result });
        Phase::Evaluating
    }

    fn finish(&mut self) -> Result<Phase, EvalError> {
        match self.stack.as_slice() {
            &[n] => {
                info!(expr = %self.expr, result = n, "done");
                self.last_event = Some(Event::Finished(n));
                Ok(Phase::Done(n))
            }
            rest => Err(EvalError::InvalidExpression {
                remaining: rest.len(),
            }),
        }
    }
}
