use tracing::trace;

use crate::{
    config::DeliveryPolicy,
    error::EvalError,
    message::{AgentId, Message, MessageKind, MessageQueue, Payload},
    op::Operation,
};

/// A stateless agent that answers requests for a single operation.
#[derive(Debug, Clone)]
pub struct OperatorAgent {
    id: AgentId,
    operation: Operation,
    active: bool,
}

impl OperatorAgent {
    pub fn new(id: AgentId, operation: Operation) -> Self {
        OperatorAgent {
            id,
            operation,
            active: false,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Whether the last step answered at least one request.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Answers pending requests according to `policy`. Returns how many were
    /// handled.
    pub fn step(
        &mut self,
        queue: &mut MessageQueue,
        policy: DeliveryPolicy,
    ) -> Result<usize, EvalError> {
        self.active = false;
        let mut handled = 0;
        while self.answer_one(queue)? {
            handled += 1;
            self.active = true;
            if policy == DeliveryPolicy::OnePerStep {
                break;
            }
        }
        Ok(handled)
    }

    fn answer_one(&self, queue: &mut MessageQueue) -> Result<bool, EvalError> {
        // `pop` only hands out requests here, so anything else means the
        // queue is empty for us.
        let (a, b, sender) = match queue.pop(self.id, self.operation, MessageKind::Request) {
            Some(Message {
                payload: Payload::Request { operands: (a, b) },
                sender,
                ..
            }) => (a, b, sender),
            _ => return Ok(false),
        };

        if self.operation == Operation::Div && b == 0.0 {
            return Err(EvalError::DivisionByZero { dividend: a });
        }

        let result = self.operation.apply(a, b);
        trace!(agent = %self.id, op = self.operation.name(), a, b, result, "answered request");
        queue.push(Message::response(self.operation, result, self.id, sender));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const COORDINATOR: AgentId = AgentId(1);

    fn request(queue: &mut MessageQueue, to: &OperatorAgent, a: f64, b: f64) {
        queue.push(Message::request(to.operation(), (a, b), COORDINATOR, to.id()));
    }

    #[test]
    fn answers_with_a_response_to_the_sender() {
        let mut agent = OperatorAgent::new(AgentId(4), Operation::Mul);
        let mut queue = MessageQueue::new();
        request(&mut queue, &agent, 6.0, 7.0);

        assert_eq!(agent.step(&mut queue, DeliveryPolicy::OnePerStep).unwrap(), 1);
        assert!(agent.is_active());

        let response = queue
            .pop(COORDINATOR, Operation::Mul, MessageKind::Response)
            .unwrap();
        assert_eq!(response.result(), Some(42.0));
        assert_eq!(response.sender, AgentId(4));
        assert!(queue.is_empty());
    }

    #[test]
    fn idle_without_requests() {
        let mut agent = OperatorAgent::new(AgentId(2), Operation::Add);
        let mut queue = MessageQueue::new();
        queue.push(Message::request(Operation::Sub, (1.0, 1.0), COORDINATOR, AgentId(3)));

        assert_eq!(agent.step(&mut queue, DeliveryPolicy::Drain).unwrap(), 0);
        assert!(!agent.is_active());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn one_per_step_leaves_the_rest_queued() {
        let mut agent = OperatorAgent::new(AgentId(2), Operation::Add);
        let mut queue = MessageQueue::new();
        request(&mut queue, &agent, 1.0, 1.0);
        request(&mut queue, &agent, 2.0, 2.0);

        assert_eq!(agent.step(&mut queue, DeliveryPolicy::OnePerStep).unwrap(), 1);
        assert_eq!(agent.step(&mut queue, DeliveryPolicy::OnePerStep).unwrap(), 1);
        assert_eq!(agent.step(&mut queue, DeliveryPolicy::OnePerStep).unwrap(), 0);
        assert!(!agent.is_active());
    }

    #[test]
    fn drain_answers_everything() {
        let mut agent = OperatorAgent::new(AgentId(3), Operation::Sub);
        let mut queue = MessageQueue::new();
        for n in 0..4u8 {
            request(&mut queue, &agent, f64::from(n), 1.0);
        }

        assert_eq!(agent.step(&mut queue, DeliveryPolicy::Drain).unwrap(), 4);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn leaves_responses_addressed_to_it_in_place() {
        let mut agent = OperatorAgent::new(AgentId(2), Operation::Add);
        let mut queue = MessageQueue::new();
        queue.push(Message::response(Operation::Add, 5.0, COORDINATOR, agent.id()));
        request(&mut queue, &agent, 2.0, 3.0);

        assert_eq!(agent.step(&mut queue, DeliveryPolicy::Drain).unwrap(), 1);
        assert_eq!(queue.len(), 2);
        let stray = queue
            .pop(agent.id(), Operation::Add, MessageKind::Response)
            .unwrap();
        assert_eq!(stray.result(), Some(5.0));
        let answer = queue
            .pop(COORDINATOR, Operation::Add, MessageKind::Response)
            .unwrap();
        assert_eq!(answer.result(), Some(5.0));
        assert_eq!(answer.sender, agent.id());
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let mut agent = OperatorAgent::new(AgentId(5), Operation::Div);
        let mut queue = MessageQueue::new();
        request(&mut queue, &agent, 1.0, 0.0);

        let err = agent.step(&mut queue, DeliveryPolicy::OnePerStep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivisionByZero);
        assert!(queue.is_empty());
    }
}
