use crate::config::default_settle_ms;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recipe execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Pause after every recipe step.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl RecipeConfig {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
        }
    }
}
