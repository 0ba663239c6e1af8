// Presentation-facing status derivation

use serde::{Deserialize, Serialize};

use super::entry::{EntryStatus, QueueEntry};

/// Status badge shown next to a queued entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStatus {
    Waiting,
    AlmostReady,
    Serving,
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStatus::Waiting => write!(f, "waiting"),
            DisplayStatus::AlmostReady => write!(f, "almost ready"),
            DisplayStatus::Serving => write!(f, "serving"),
        }
    }
}

/// Derive the display status of an entry.
///
/// Pure and recomputed on every read. Ordering never depends on it.
pub fn status_of(entry: &QueueEntry, almost_ready_threshold_minutes: u32) -> DisplayStatus {
    if entry.position == 1 && entry.status == EntryStatus::Serving {
        DisplayStatus::Serving
    } else if entry.estimated_wait_minutes < almost_ready_threshold_minutes {
        DisplayStatus::AlmostReady
    } else {
        DisplayStatus::Waiting
    }
}
