use crate::config::default_threshold_percent;

use serde::{Deserialize, Serialize};

/// Flicker detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Relative change, in percent, that opens and closes a flicker run.
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold_percent: default_threshold_percent(),
        }
    }
}
