// Departure History

use serde::{Deserialize, Serialize};

use super::entry::{EntryId, EntryStatus, QueueEntry};
use super::service::ServiceId;

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Completed,
    Cancelled,
    NoShow,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::Cancelled => write!(f, "cancelled"),
            Outcome::NoShow => write!(f, "no-show"),
        }
    }
}

/// One entry that has left its queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub entry_id: EntryId,
    pub service_id: ServiceId,
    pub service_name: String,
    pub display_name: String,
    pub outcome: Outcome,
    pub waited_minutes: i64,
    pub departed_at: i64, // epoch ms
}

impl HistoryRecord {
    /// Build a record from a departed entry. Returns None for entries that
    /// are still queued.
    pub fn from_departure(
        entry: &QueueEntry,
        service_name: impl Into<String>,
        departed_at: i64,
    ) -> Option<Self> {
        let outcome = match entry.status {
            EntryStatus::Served => Outcome::Completed,
            EntryStatus::Cancelled => Outcome::Cancelled,
            EntryStatus::NoShow => Outcome::NoShow,
            _ => return None,
        };

        Some(Self {
            entry_id: entry.id.clone(),
            service_id: entry.service_id.clone(),
            service_name: service_name.into(),
            display_name: entry.display_name.clone(),
            outcome,
            waited_minutes: (departed_at - entry.joined_at).max(0) / MILLIS_PER_MINUTE,
            departed_at,
        })
    }
}
