use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use super::Responder;
use crate::config::Config;
use crate::error::Result;
use crate::state::{ChatMessage, ChatRole};

/// Stand-in for a model backend: waits a random while, then echoes the prompt.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    delay_min: Duration,
    delay_max: Duration,
}

impl SimulatedResponder {
    pub fn new(delay_min: Duration, delay_max: Duration) -> Self {
        let (delay_min, delay_max) = if delay_min <= delay_max {
            (delay_min, delay_max)
        } else {
            (delay_max, delay_min)
        };
        Self { delay_min, delay_max }
    }

    pub fn from_config(config: &Config) -> Self {
        let (min, max) = config.reply_delay_range();
        Self::new(min, max)
    }

    /// A responder that answers immediately.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn delay_range(&self) -> (Duration, Duration) {
        (self.delay_min, self.delay_max)
    }

    fn sample_delay(&self) -> Duration {
        if self.delay_min == self.delay_max {
            return self.delay_min;
        }
        rand::thread_rng().gen_range(self.delay_min..=self.delay_max)
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The templated reply text for `prompt`.
pub fn simulated_reply(prompt: &str) -> String {
    format!(
        "This is a simulated response to: \"{}\". In a real implementation, this would connect to an AI API like OpenAI's GPT models.",
        prompt
    )
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn submit(&self, history: &[ChatMessage], model: &str) -> Result<ChatMessage> {
        let prompt = history
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let delay = self.sample_delay();
        tracing::debug!(model, delay_ms = delay.as_millis() as u64, "simulating reply latency");
        tokio::time::sleep(delay).await;

        Ok(ChatMessage::assistant(simulated_reply(prompt), Some(model.to_string())))
    }
}
