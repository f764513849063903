use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// Settings for a streaming turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub model: String,
    #[serde(default)]
    pub context: ContextPolicy,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Capacity of the live event channel handed to the caller
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            context: ContextPolicy::default(),
            system_prompt: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl SessionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: ContextPolicy) -> Self {
        self.context = context;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// How much of the thread is sent to the model with each turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextPolicy {
    LastK { k: usize },
    AllMessages,
}

impl Default for ContextPolicy {
    /// Only the latest user message
    fn default() -> Self {
        Self::LastK { k: 1 }
    }
}

impl ContextPolicy {
    /// Index of the first message to include out of `len`
    pub fn window_start(&self, len: usize) -> usize {
        match self {
            Self::LastK { k } => len.saturating_sub((*k).max(1)),
            Self::AllMessages => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_keeps_latest_turn() {
        let policy = ContextPolicy::default();
        assert_eq!(policy.window_start(5), 4);
        assert_eq!(policy.window_start(0), 0);
    }

    #[test]
    fn test_last_k_zero_still_sends_one() {
        assert_eq!(ContextPolicy::LastK { k: 0 }.window_start(3), 2);
        assert_eq!(ContextPolicy::AllMessages.window_start(3), 0);
    }

    #[test]
    fn test_policy_from_toml_shape() {
        let policy: ContextPolicy = serde_json::from_str(r#"{"type":"last_k","k":4}"#).unwrap();
        assert_eq!(policy, ContextPolicy::LastK { k: 4 });
    }
}
