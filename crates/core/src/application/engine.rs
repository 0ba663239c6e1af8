//! Queue Engine - ordering and transition rules for service queues
//!
//! Owns one ordered entry sequence per service and provides the only
//! sanctioned mutations:
//! - join: append at the tail
//! - leave / dismiss_no_show: remove anywhere, later entries shift up
//! - serve_next: strict FIFO removal of the head, new head becomes serving
//! - move_up / move_down: swap with a neighbour, inert at the boundaries
//!
//! Every mutation renumbers the affected suffix, so `position == index + 1`
//! holds after each call.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::config::EngineConfig;
use crate::domain::error::{DomainError, Result};
use crate::domain::{
    status_of, DisplayStatus, EntryStatus, QueueEntry, QueueSnapshot, ServiceId, ServiceQueue,
    SnapshotEntry,
};
use crate::port::{IdProvider, TimeProvider};

pub struct QueueEngine {
    queues: BTreeMap<ServiceId, ServiceQueue>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    config: EngineConfig,
}

impl QueueEngine {
    pub fn new(
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            queues: BTreeMap::new(),
            id_provider,
            time_provider,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create an empty queue for a service.
    ///
    /// Idempotent: an existing queue keeps its entries and only has its
    /// average duration refreshed. Returns true if a queue was created.
    pub fn provision(
        &mut self,
        service_id: impl Into<String>,
        average_duration_minutes: u32,
    ) -> bool {
        let service_id = service_id.into();
        if let Some(queue) = self.queues.get_mut(&service_id) {
            queue.set_average_duration(average_duration_minutes);
            return false;
        }

        info!(
            service_id = %service_id,
            average_duration_minutes,
            "Queue provisioned"
        );
        self.queues.insert(
            service_id.clone(),
            ServiceQueue::new(service_id, average_duration_minutes),
        );
        true
    }

    /// Drop a service's queue, returning the entries it still held as cancelled
    pub fn retire(&mut self, service_id: &str) -> Result<Vec<QueueEntry>> {
        let mut queue = self
            .queues
            .remove(service_id)
            .ok_or_else(|| DomainError::UnknownService(service_id.to_string()))?;

        let dropped = queue
            .drain()
            .into_iter()
            .map(|mut entry| {
                entry.mark_cancelled()?;
                Ok(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            service_id = %service_id,
            dropped = dropped.len(),
            "Queue retired"
        );
        Ok(dropped)
    }

    /// Refresh the duration used for wait estimates
    pub fn set_average_duration(&mut self, service_id: &str, minutes: u32) -> Result<()> {
        self.queue_mut(service_id)?.set_average_duration(minutes);
        Ok(())
    }

    /// Append a new waiting entry at the tail.
    ///
    /// Open/closed gating belongs to the caller; the engine only requires a
    /// provisioned queue.
    pub fn join(
        &mut self,
        service_id: &str,
        display_name: impl Into<String>,
    ) -> Result<QueueEntry> {
        let id = self.id_provider.generate_id();
        let joined_at = self.time_provider.now_millis();

        let queue = self.queue_mut(service_id)?;
        let entry = queue
            .push(QueueEntry::new(id, joined_at, service_id, display_name))
            .clone();

        info!(
            service_id = %service_id,
            entry_id = %entry.id,
            position = entry.position,
            "Entry joined queue"
        );
        Ok(entry)
    }

    /// Remove an entry from anywhere in the queue.
    ///
    /// Returns the removed entry marked cancelled.
    pub fn leave(&mut self, service_id: &str, entry_id: &str) -> Result<QueueEntry> {
        let queue = self.queue_mut(service_id)?;
        let index = queue
            .index_of(entry_id)
            .ok_or_else(|| entry_not_found(service_id, entry_id))?;

        let mut entry = queue.remove_at(index);
        entry.mark_cancelled()?;

        info!(
            service_id = %service_id,
            entry_id = %entry_id,
            from_position = index + 1,
            remaining = queue.len(),
            "Entry left queue"
        );
        Ok(entry)
    }

    /// Dismiss an entry that did not show up when called.
    ///
    /// Removes it like `leave` but marks it no-show. A dismissed head hands
    /// the counter to the next entry.
    pub fn dismiss_no_show(&mut self, service_id: &str, entry_id: &str) -> Result<QueueEntry> {
        let queue = self.queue_mut(service_id)?;
        let index = queue
            .index_of(entry_id)
            .ok_or_else(|| entry_not_found(service_id, entry_id))?;

        let was_serving = queue.entries()[index].status == EntryStatus::Serving;
        let mut entry = queue.remove_at(index);
        entry.mark_no_show()?;
        if was_serving {
            queue.promote_head()?;
        }

        info!(
            service_id = %service_id,
            entry_id = %entry_id,
            from_position = index + 1,
            remaining = queue.len(),
            "Entry dismissed as no-show"
        );
        Ok(entry)
    }

    /// Serve the head of the queue (strict FIFO by position).
    ///
    /// Returns the removed entry marked served and promotes the new head to
    /// serving. An empty queue reports `EmptyQueue` and is left untouched.
    pub fn serve_next(&mut self, service_id: &str) -> Result<QueueEntry> {
        let queue = self.queue_mut(service_id)?;
        let mut served = queue.take_head().ok_or_else(|| {
            debug!(service_id = %service_id, "Serve requested on empty queue");
            DomainError::EmptyQueue(service_id.to_string())
        })?;
        served.mark_served()?;
        queue.promote_head()?;

        info!(
            service_id = %service_id,
            entry_id = %served.id,
            next = ?queue.entries().first().map(|e| e.id.as_str()),
            remaining = queue.len(),
            "Entry served"
        );
        Ok(served)
    }

    /// Mark the current head as serving without removing anyone.
    ///
    /// Used when a counter opens on a queue that already has people in it.
    pub fn start_serving(&mut self, service_id: &str) -> Result<QueueEntry> {
        let queue = self.queue_mut(service_id)?;
        queue.promote_head()?;
        let head = queue
            .entries()
            .first()
            .cloned()
            .ok_or_else(|| DomainError::EmptyQueue(service_id.to_string()))?;

        info!(service_id = %service_id, entry_id = %head.id, "Serving head of queue");
        Ok(head)
    }

    /// Swap an entry with the one ahead of it; no-op at position 1
    pub fn move_up(&mut self, service_id: &str, entry_id: &str) -> Result<()> {
        let queue = self.queue_mut(service_id)?;
        let index = queue
            .index_of(entry_id)
            .ok_or_else(|| entry_not_found(service_id, entry_id))?;

        if index == 0 {
            debug!(service_id = %service_id, entry_id = %entry_id, "Already at head");
            return Ok(());
        }

        queue.swap_adjacent(index - 1);
        info!(
            service_id = %service_id,
            entry_id = %entry_id,
            position = index,
            "Entry moved up"
        );
        Ok(())
    }

    /// Swap an entry with the one behind it; no-op at the tail
    pub fn move_down(&mut self, service_id: &str, entry_id: &str) -> Result<()> {
        let queue = self.queue_mut(service_id)?;
        let index = queue
            .index_of(entry_id)
            .ok_or_else(|| entry_not_found(service_id, entry_id))?;

        if index + 1 == queue.len() {
            debug!(service_id = %service_id, entry_id = %entry_id, "Already at tail");
            return Ok(());
        }

        queue.swap_adjacent(index);
        info!(
            service_id = %service_id,
            entry_id = %entry_id,
            position = index + 2,
            "Entry moved down"
        );
        Ok(())
    }

    /// Display status of an entry under this engine's threshold
    pub fn status_of(&self, entry: &QueueEntry) -> DisplayStatus {
        status_of(entry, self.config.almost_ready_threshold_minutes)
    }

    /// Read-only view of a queue for rendering
    pub fn snapshot(&self, service_id: &str) -> Result<QueueSnapshot> {
        let queue = self.queue(service_id)?;
        Ok(QueueSnapshot {
            service_id: queue.service_id().to_string(),
            served_count: queue.served_count(),
            entries: queue
                .entries()
                .iter()
                .map(|entry| SnapshotEntry {
                    id: entry.id.clone(),
                    display_name: entry.display_name.clone(),
                    position: entry.position,
                    status: self.status_of(entry),
                    estimated_wait_minutes: entry.estimated_wait_minutes,
                    joined_at: entry.joined_at,
                })
                .collect(),
        })
    }

    pub fn queue(&self, service_id: &str) -> Result<&ServiceQueue> {
        self.queues
            .get(service_id)
            .ok_or_else(|| DomainError::UnknownService(service_id.to_string()))
    }

    pub fn entry(&self, service_id: &str, entry_id: &str) -> Result<&QueueEntry> {
        self.queue(service_id)?
            .get(entry_id)
            .ok_or_else(|| entry_not_found(service_id, entry_id))
    }

    pub fn len(&self, service_id: &str) -> Result<usize> {
        Ok(self.queue(service_id)?.len())
    }

    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.queues.keys().map(String::as_str)
    }

    fn queue_mut(&mut self, service_id: &str) -> Result<&mut ServiceQueue> {
        self.queues
            .get_mut(service_id)
            .ok_or_else(|| DomainError::UnknownService(service_id.to_string()))
    }
}

fn entry_not_found(service_id: &str, entry_id: &str) -> DomainError {
    DomainError::EntryNotFound {
        service_id: service_id.to_string(),
        entry_id: entry_id.to_string(),
    }
}
