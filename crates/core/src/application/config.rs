// Engine Configuration

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_ALMOST_READY_THRESHOLD_MINUTES, DEFAULT_MAX_DISPLAY_NAME_LEN,
    DEFAULT_MAX_HISTORY_RECORDS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Estimated waits strictly below this display as "almost ready"
    pub almost_ready_threshold_minutes: u32,

    /// Joins with longer display names are rejected by the desk
    pub max_display_name_len: usize,

    /// Departure history is trimmed to the most recent records
    pub max_history_records: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            almost_ready_threshold_minutes: DEFAULT_ALMOST_READY_THRESHOLD_MINUTES,
            max_display_name_len: DEFAULT_MAX_DISPLAY_NAME_LEN,
            max_history_records: DEFAULT_MAX_HISTORY_RECORDS,
        }
    }
}
