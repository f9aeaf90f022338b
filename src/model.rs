use tracing::debug;

use crate::{
    agent::OperatorAgent,
    config::ModelConfig,
    coordinator::{Coordinator, Directory},
    error::EvalError,
    message::{AgentId, MessageQueue},
    op::Operation,
};

pub const COORDINATOR_ID: AgentId = AgentId(1);

/// Operator agent ids, indexed like [`Operation::ALL`].
pub const AGENT_IDS: [AgentId; 5] = [AgentId(2), AgentId(3), AgentId(4), AgentId(5), AgentId(6)];

/// One row of the per-step history, taken once the step has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRecord {
    pub stack_size: usize,
    pub done: bool,
}

/// The whole ensemble: one coordinator, one agent per operation and the queue
/// they talk through.
///
/// Each [`Model::step`] runs the coordinator first and then every operator
/// agent in [`Operation::ALL`] order, so a request sent in one step is
/// answered in that same step and picked up by the coordinator in the next.
#[derive(Debug)]
pub struct Model {
    config: ModelConfig,
    queue: MessageQueue,
    coordinator: Coordinator,
    agents: Vec<OperatorAgent>,
    history: Vec<StepRecord>,
    steps: usize,
}

impl Model {
    pub fn new(expr: impl Into<String>) -> Self {
        Self::with_config(expr, ModelConfig::default())
    }

    pub fn with_config(expr: impl Into<String>, config: ModelConfig) -> Self {
        let agents = Operation::ALL
            .into_iter()
            .zip(AGENT_IDS)
            .map(|(operation, id)| OperatorAgent::new(id, operation))
            .collect();
        let directory = Directory::new(AGENT_IDS);

        Model {
            config,
            queue: MessageQueue::new(),
            coordinator: Coordinator::new(COORDINATOR_ID, directory, expr),
            agents,
            history: Vec::new(),
            steps: 0,
        }
    }

    /// Starts over with `expr`, dropping all state of the previous run.
    pub fn reset(&mut self, expr: impl Into<String>) {
        *self = Self::with_config(expr, self.config);
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn agents(&self) -> &[OperatorAgent] {
        &self.agents
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Messages sent but not yet consumed.
    pub fn pending_messages(&self) -> usize {
        self.queue.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_running(&self) -> bool {
        !self.coordinator.is_finished()
    }

    pub fn step(&mut self) {
        if !self.is_running() {
            return;
        }
        self.steps += 1;

        self.coordinator.step(&mut self.queue);
        for agent in &mut self.agents {
            if let Err(error) = agent.step(&mut self.queue, self.config.delivery) {
                self.coordinator.fail(error);
                break;
            }
        }
        self.history.push(StepRecord {
            stack_size: self.coordinator.stack().len(),
            done: self.coordinator.result().is_some(),
        });
        debug!(
            step = self.steps,
            pending = self.queue.len(),
            stack = ?self.coordinator.stack(),
            "step"
        );
    }

    /// Steps until the coordinator is done or has failed. Returns the number
    /// of steps this call took.
    pub fn run(&mut self) -> usize {
        let start = self.steps;
        while self.is_running() {
            self.step();
        }
        self.steps - start
    }

    /// `None` while still running.
    pub fn outcome(&self) -> Option<Result<f64, &EvalError>> {
        match (self.coordinator.result(), self.coordinator.error()) {
            (Some(n), _) => Some(Ok(n)),
            (None, Some(e)) => Some(Err(e)),
            (None, None) => None,
        }
    }

    /// Steps until finished and returns the result or the error.
    pub fn finish(mut self) -> Result<f64, EvalError> {
        loop {
            match self.coordinator.into_outcome() {
                Ok(outcome) => return outcome,
                Err(coordinator) => {
                    self.coordinator = coordinator;
                    self.step();
                }
            }
        }
    }
}

/// Evaluates `expr` on a fresh model with the default configuration.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    evaluate_with(expr, ModelConfig::default())
}

pub fn evaluate_with(expr: &str, config: ModelConfig) -> Result<f64, EvalError> {
    Model::with_config(expr, config).finish()
}
