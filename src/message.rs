use std::{collections::VecDeque, fmt::Display};

use crate::op::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Request { operands: (f64, f64) },
    Response { result: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Message {
    pub operation: Operation,
    pub payload: Payload,
    pub sender: AgentId,
    pub receiver: AgentId,
}

impl Message {
    pub fn request(
        operation: Operation,
        operands: (f64, f64),
        sender: AgentId,
        receiver: AgentId,
    ) -> Self {
        Message {
            operation,
            payload: Payload::Request { operands },
            sender,
            receiver,
        }
    }

    pub fn response(operation: Operation, result: f64, sender: AgentId, receiver: AgentId) -> Self {
        Message {
            operation,
            payload: Payload::Response { result },
            sender,
            receiver,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.payload {
            Payload::Request { .. } => MessageKind::Request,
            Payload::Response { .. } => MessageKind::Response,
        }
    }

    pub fn operands(&self) -> Option<(f64, f64)> {
        match self.payload {
            Payload::Request { operands } => Some(operands),
            Payload::Response { .. } => None,
        }
    }

    pub fn result(&self) -> Option<f64> {
        match self.payload {
            Payload::Response { result } => Some(result),
            Payload::Request { .. } => None,
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (from, to, op) = (self.sender, self.receiver, self.operation.name());
        match self.payload {
            Payload::Request { operands: (a, b) } => write!(f, "{from} -> {to}: {op}({a}, {b})"),
            Payload::Response { result } => write!(f, "{from} -> {to}: {op} = {result}"),
        }
    }
}

/// The mailbox shared by the coordinator and the operator agents.
///
/// Messages stay in arrival order. A receiver takes the oldest message
/// addressed to it that matches what it is waiting for; everything else is
/// left in place.
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: VecDeque<Message>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// Removes and returns the oldest `kind` message for `receiver` about
    /// `operation`.
    pub fn pop(
        &mut self,
        receiver: AgentId,
        operation: Operation,
        kind: MessageKind,
    ) -> Option<Message> {
        let index = self.messages.iter().position(|message| {
            message.receiver == receiver && message.operation == operation && message.kind() == kind
        })?;
        self.messages.remove(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
