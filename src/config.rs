/// How many requests an operator agent may answer in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// At most one request per agent per step.
    #[default]
    OnePerStep,
    /// Every request addressed to the agent.
    Drain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelConfig {
    pub delivery: DeliveryPolicy,
}

impl ModelConfig {
    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }
}
