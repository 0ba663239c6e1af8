// Queue Entry Domain Model

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::service::ServiceId;

/// Entry ID (UUID v4 in production, injected via IdProvider)
pub type EntryId = String;

/// Stored entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    Waiting,
    AlmostReady,
    Serving,
    Served,
    Cancelled,
    NoShow,
}

impl EntryStatus {
    /// Served, cancelled and no-show entries have already left their queue
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EntryStatus::Served | EntryStatus::Cancelled | EntryStatus::NoShow
        )
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "waiting"),
            EntryStatus::AlmostReady => write!(f, "almost-ready"),
            EntryStatus::Serving => write!(f, "serving"),
            EntryStatus::Served => write!(f, "served"),
            EntryStatus::Cancelled => write!(f, "cancelled"),
            EntryStatus::NoShow => write!(f, "no-show"),
        }
    }
}

/// One participant in a service queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub service_id: ServiceId,
    pub display_name: String,
    pub joined_at: i64, // epoch ms
    pub status: EntryStatus,

    /// 1-based rank, always index + 1 in the owning queue
    pub position: usize,
    pub estimated_wait_minutes: u32,
}

impl QueueEntry {
    /// Create a new waiting entry
    ///
    /// # Arguments
    ///
    /// * `id` - Unique entry ID (injected, not generated)
    /// * `joined_at` - Join timestamp in epoch ms (injected, not system time)
    /// * `service_id` - Owning service
    /// * `display_name` - Human-readable label
    pub fn new(
        id: impl Into<String>,
        joined_at: i64,
        service_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_id: service_id.into(),
            display_name: display_name.into(),
            joined_at,
            status: EntryStatus::Waiting,
            position: 0,
            estimated_wait_minutes: 0,
        }
    }

    /// Transition to Serving (head of queue after a serve)
    pub fn promote(&mut self) -> Result<()> {
        self.transition(EntryStatus::Serving)
    }

    /// Return a displaced serving entry to Waiting
    pub fn demote(&mut self) -> Result<()> {
        self.transition(EntryStatus::Waiting)
    }

    /// Transition to Served on departure from the head
    pub fn mark_served(&mut self) -> Result<()> {
        self.transition(EntryStatus::Served)
    }

    /// Transition to Cancelled on leave or queue retirement
    pub fn mark_cancelled(&mut self) -> Result<()> {
        self.transition(EntryStatus::Cancelled)
    }

    /// Transition to NoShow when an admin dismisses an absent entry
    pub fn mark_no_show(&mut self) -> Result<()> {
        self.transition(EntryStatus::NoShow)
    }

    fn transition(&mut self, to: EntryStatus) -> Result<()> {
        if self.status.is_terminal() || self.status == to {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
