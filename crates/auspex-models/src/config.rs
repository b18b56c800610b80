use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for auspex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuspexConfig {
    /// Caller-level timeout for the entire analysis in seconds. Component
    /// timeouts below are expected to be strictly shorter.
    pub total_timeout_seconds: u64,
    pub client: ClientConfig,
    pub pipeline: PipelineConfig,
}

impl Default for AuspexConfig {
    fn default() -> Self {
        Self {
            total_timeout_seconds: 90,
            client: ClientConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Which completion API surface the client speaks. Fixed at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallShape {
    /// Single-shot response call returning one output-text field.
    #[default]
    Responses,
    /// Conversational chat call whose reply content is a string or segments.
    Chat,
}

/// Configuration for the completion client layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub call_shape: CallShape,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            call_shape: CallShape::Responses,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Configuration for the batch analysis and reconciliation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Model identifier passed to the completion client.
    pub model: String,
    /// Number of markets analyzed per completion call. Must be >= 1.
    pub batch_size: usize,
    pub per_batch_timeout_seconds: u64,
    pub reconciliation_timeout_seconds: u64,
    /// Additional attempts after the first, for batches and reconciliation alike.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5.1".to_string(),
            batch_size: 5,
            per_batch_timeout_seconds: 30,
            reconciliation_timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 2000,
        }
    }
}

impl PipelineConfig {
    pub fn per_batch_timeout(&self) -> Duration {
        Duration::from_secs(self.per_batch_timeout_seconds)
    }

    pub fn reconciliation_timeout(&self) -> Duration {
        Duration::from_secs(self.reconciliation_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
