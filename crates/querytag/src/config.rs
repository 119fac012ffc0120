//! # Configuration
//!
//! Batching knobs for the service. Values are resolved in order:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. Environment variables prefixed with `QUERYTAG_`
//!
//! # Environment Variables
//!
//! - `QUERYTAG_BATCH_SIZE`: maximum requests per inference call
//! - `QUERYTAG_MAX_WAIT_MS`: how long batch formation waits for the next request
//! - `QUERYTAG_MAX_LEN`: maximum accepted input length, in characters
//! - `QUERYTAG_WAIT_POLICY`: `per_item` or `deadline`

use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use crate::error::{Error, Result};

const ENV_PREFIX: &str = "QUERYTAG";

/// How the batch formation wait is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// The wait restarts with every admitted request. Batches fill best under
    /// bursts, but a steady drip just under `max_wait` delays the first
    /// request of a batch by up to `batch_size * max_wait`.
    #[default]
    PerItem,

    /// A single deadline is fixed when the first request is admitted, capping
    /// formation latency at `max_wait`.
    Deadline,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Maximum number of requests per inference call
    pub batch_size: usize,

    /// Batch formation wait, in milliseconds
    pub max_wait_ms: u64,

    /// Maximum accepted input length in characters, after normalization.
    /// Also the tokenizer truncation length.
    pub max_len: usize,

    pub wait_policy: WaitPolicy,

    /// Input pushed through the model once at startup
    pub warmup_text: String,

    /// Tokenizer truncation length used for the warmup input
    pub warmup_max_length: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_wait_ms: 50,
            max_len: 500,
            wait_policy: WaitPolicy::PerItem,
            warmup_text: "warmup".to_string(),
            warmup_max_length: 8,
        }
    }
}

impl BatcherConfig {
    /// Loads configuration from an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: BatcherConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.max_len == 0 {
            return Err(Error::Config("max_len must be at least 1".into()));
        }
        if self.warmup_max_length == 0 {
            return Err(Error::Config("warmup_max_length must be at least 1".into()));
        }
        if self.warmup_text.trim().is_empty() {
            return Err(Error::Config("warmup_text must not be empty".into()));
        }
        Ok(())
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}
