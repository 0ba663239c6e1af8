// Service Queue Domain Model

use serde::{Deserialize, Serialize};

use super::display::DisplayStatus;
use super::entry::{EntryId, EntryStatus, QueueEntry};
use super::error::Result;
use super::service::ServiceId;

/// Ordered entries of one service. Order is the sole source of truth for
/// position and for who is served next.
///
/// Mutators are crate-private: only the engine may reshape a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQueue {
    service_id: ServiceId,
    average_duration_minutes: u32,
    entries: Vec<QueueEntry>,
    served_count: u64,
}

impl ServiceQueue {
    pub fn new(service_id: impl Into<String>, average_duration_minutes: u32) -> Self {
        Self {
            service_id: service_id.into(),
            average_duration_minutes,
            entries: Vec::new(),
            served_count: 0,
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn average_duration_minutes(&self) -> u32 {
        self.average_duration_minutes
    }

    pub fn served_count(&self) -> u64 {
        self.served_count
    }

    pub fn index_of(&self, entry_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == entry_id)
    }

    pub fn get(&self, entry_id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub(crate) fn push(&mut self, entry: QueueEntry) -> &QueueEntry {
        let index = self.entries.len();
        self.entries.push(entry);
        self.renumber_from(index);
        &self.entries[index]
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> QueueEntry {
        let entry = self.entries.remove(index);
        self.renumber_from(index);
        entry
    }

    /// Remove the head and count it as served
    pub(crate) fn take_head(&mut self) -> Option<QueueEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.served_count += 1;
        Some(self.remove_at(0))
    }

    /// Make the head the only serving entry. An entry left serving further
    /// back (moved down by an admin) returns to waiting.
    pub(crate) fn promote_head(&mut self) -> Result<()> {
        for entry in self
            .entries
            .iter_mut()
            .skip(1)
            .filter(|e| e.status == EntryStatus::Serving)
        {
            entry.demote()?;
        }
        if let Some(head) = self.entries.first_mut() {
            if head.status != EntryStatus::Serving {
                head.promote()?;
            }
        }
        self.assert_invariants();
        Ok(())
    }

    /// Swap two adjacent entries
    pub(crate) fn swap_adjacent(&mut self, upper: usize) {
        self.entries.swap(upper, upper + 1);
        self.renumber_from(upper);
    }

    pub(crate) fn drain(&mut self) -> Vec<QueueEntry> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn set_average_duration(&mut self, minutes: u32) {
        self.average_duration_minutes = minutes;
        self.renumber_from(0);
    }

    /// Recompute position and estimated wait for `entries[start..]`
    fn renumber_from(&mut self, start: usize) {
        let average = self.average_duration_minutes;
        for (index, entry) in self.entries.iter_mut().enumerate().skip(start) {
            entry.position = index + 1;
            let ahead = u32::try_from(index).unwrap_or(u32::MAX);
            entry.estimated_wait_minutes = ahead.saturating_mul(average);
        }
        self.assert_invariants();
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.entries
                .iter()
                .enumerate()
                .all(|(i, e)| e.position == i + 1),
            "Queue {} has non-contiguous positions",
            self.service_id
        );
        debug_assert!(
            self.entries
                .iter()
                .filter(|e| e.status == EntryStatus::Serving)
                .count()
                <= 1,
            "Queue {} has more than one serving entry",
            self.service_id
        );
        debug_assert!(
            self.entries.iter().all(|e| e.service_id == self.service_id),
            "Queue {} holds an entry of another service",
            self.service_id
        );
    }
}

/// Read-only queue view handed to a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub service_id: ServiceId,
    pub served_count: u64,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: EntryId,
    pub display_name: String,
    pub position: usize,
    pub status: DisplayStatus,
    pub estimated_wait_minutes: u32,
    pub joined_at: i64,
}

impl QueueSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display names in queue order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.display_name.as_str()).collect()
    }
}
