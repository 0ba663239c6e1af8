//! Queue Desk - thread-safe façade over catalog, engine and history
//!
//! Every operation takes the desk lock for its whole duration, so mutations
//! from concurrent callers are serialized and the position invariant holds
//! under any interleaving. Unknown and closed services are rejected here,
//! before the engine sees them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::catalog::ServiceCatalog;
use super::config::EngineConfig;
use super::engine::QueueEngine;
use crate::domain::{HistoryRecord, QueueEntry, QueueSnapshot, Service, ServiceDraft};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ServiceRegistry, TimeProvider};

struct DeskState {
    catalog: ServiceCatalog,
    engine: QueueEngine,
    /// Oldest first, capped at `EngineConfig::max_history_records`
    history: VecDeque<HistoryRecord>,
}

pub struct QueueDesk {
    state: Mutex<DeskState>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueDesk {
    pub fn new(
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            state: Mutex::new(DeskState {
                catalog: ServiceCatalog::new(id_provider.clone()),
                engine: QueueEngine::new(id_provider, time_provider.clone(), config),
                history: VecDeque::new(),
            }),
            time_provider,
        }
    }

    // ------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------

    pub fn create_service(&self, draft: &ServiceDraft) -> Result<Service> {
        let mut state = self.lock()?;
        let service = state.catalog.create(draft)?;
        state
            .engine
            .provision(service.id.clone(), service.expected_duration_minutes);
        Ok(service)
    }

    /// Validate and add a service under a fixed id (seeding from configuration)
    pub fn register_service(
        &self,
        service_id: impl Into<String>,
        draft: &ServiceDraft,
    ) -> Result<Service> {
        let mut state = self.lock()?;
        let service = state.catalog.register(service_id, draft)?;
        state
            .engine
            .provision(service.id.clone(), service.expected_duration_minutes);
        Ok(service)
    }

    /// Update a service; its queue's wait estimates follow the new duration
    pub fn update_service(&self, service_id: &str, draft: &ServiceDraft) -> Result<Service> {
        let mut state = self.lock()?;
        let service = state.catalog.update(service_id, draft)?;
        state
            .engine
            .provision(service.id.clone(), service.expected_duration_minutes);
        Ok(service)
    }

    /// Remove a service, cancelling everyone still waiting in its queue
    pub fn remove_service(&self, service_id: &str) -> Result<Service> {
        let mut state = self.lock()?;
        let service = state.catalog.remove(service_id)?;
        let dropped = state.engine.retire(service_id)?;

        let now = self.time_provider.now_millis();
        for entry in &dropped {
            state.record(entry, &service.name, now);
        }
        Ok(service)
    }

    pub fn set_service_open(&self, service_id: &str, is_open: bool) -> Result<()> {
        self.lock()?.catalog.set_open(service_id, is_open)
    }

    /// Flip a service between open and closed, returning the new state
    pub fn toggle_service(&self, service_id: &str) -> Result<bool> {
        self.lock()?.catalog.toggle_open(service_id)
    }

    pub fn service(&self, service_id: &str) -> Result<Service> {
        let state = self.lock()?;
        state
            .catalog
            .get(service_id)
            .cloned()
            .ok_or_else(|| service_not_found(service_id))
    }

    pub fn services(&self) -> Result<Vec<Service>> {
        Ok(self.lock()?.catalog.list().to_vec())
    }

    // ------------------------------------------------------------------
    // Queues
    // ------------------------------------------------------------------

    /// Join an open service's queue
    pub fn join(&self, service_id: &str, display_name: &str) -> Result<QueueEntry> {
        let mut state = self.lock()?;

        let info = state
            .catalog
            .lookup(service_id)
            .ok_or_else(|| service_not_found(service_id))?;

        let display_name = display_name.trim();
        let max_len = state.engine.config().max_display_name_len;
        if display_name.is_empty() {
            return Err(AppError::Validation("Display name is required".to_string()));
        }
        if display_name.chars().count() > max_len {
            return Err(AppError::Validation(format!(
                "Display name exceeds {} characters",
                max_len
            )));
        }

        if !info.is_open {
            warn!(service_id = %service_id, "Join rejected: service is closed");
            return Err(AppError::Conflict(format!(
                "Service {} is closed",
                service_id
            )));
        }

        Ok(state.engine.join(service_id, display_name)?)
    }

    pub fn leave(&self, service_id: &str, entry_id: &str) -> Result<QueueEntry> {
        let mut state = self.lock()?;
        let name = state.service_name(service_id)?;
        let entry = state.engine.leave(service_id, entry_id)?;
        state.record(&entry, &name, self.time_provider.now_millis());
        Ok(entry)
    }

    pub fn serve_next(&self, service_id: &str) -> Result<QueueEntry> {
        let mut state = self.lock()?;
        let name = state.service_name(service_id)?;
        let entry = state.engine.serve_next(service_id)?;
        state.record(&entry, &name, self.time_provider.now_millis());
        Ok(entry)
    }

    /// Dismiss an entry that was called but never came to the counter
    pub fn dismiss_no_show(&self, service_id: &str, entry_id: &str) -> Result<QueueEntry> {
        let mut state = self.lock()?;
        let name = state.service_name(service_id)?;
        let entry = state.engine.dismiss_no_show(service_id, entry_id)?;
        state.record(&entry, &name, self.time_provider.now_millis());
        Ok(entry)
    }

    /// Mark the head of a queue as serving
    pub fn start_serving(&self, service_id: &str) -> Result<QueueEntry> {
        let mut state = self.lock()?;
        state.service_name(service_id)?;
        Ok(state.engine.start_serving(service_id)?)
    }

    pub fn move_up(&self, service_id: &str, entry_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.service_name(service_id)?;
        Ok(state.engine.move_up(service_id, entry_id)?)
    }

    pub fn move_down(&self, service_id: &str, entry_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.service_name(service_id)?;
        Ok(state.engine.move_down(service_id, entry_id)?)
    }

    pub fn snapshot(&self, service_id: &str) -> Result<QueueSnapshot> {
        let state = self.lock()?;
        state.service_name(service_id)?;
        Ok(state.engine.snapshot(service_id)?)
    }

    /// Snapshots of every service, in catalog order
    pub fn snapshots(&self) -> Result<Vec<QueueSnapshot>> {
        let state = self.lock()?;
        state
            .catalog
            .list()
            .iter()
            .map(|s| state.engine.snapshot(&s.id).map_err(AppError::from))
            .collect()
    }

    /// Departures, most recent first (the oldest are dropped past the cap)
    pub fn history(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.lock()?.history.iter().rev().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, DeskState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("Queue desk lock poisoned".to_string()))
    }
}

impl DeskState {
    fn service_name(&self, service_id: &str) -> Result<String> {
        self.catalog
            .get(service_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| service_not_found(service_id))
    }

    fn record(&mut self, entry: &QueueEntry, service_name: &str, now: i64) {
        if let Some(record) = HistoryRecord::from_departure(entry, service_name, now) {
            self.history.push_back(record);
            let limit = self.engine.config().max_history_records;
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

fn service_not_found(service_id: &str) -> AppError {
    AppError::NotFound(format!("Service {}", service_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayStatus, DomainError, Outcome, ServicePriority};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::ManualTimeProvider;

    fn desk_with_clock() -> (QueueDesk, Arc<ManualTimeProvider>, String) {
        desk_with_config(EngineConfig::default())
    }

    fn desk_with_config(config: EngineConfig) -> (QueueDesk, Arc<ManualTimeProvider>, String) {
        let clock = Arc::new(ManualTimeProvider::new(0));
        let desk = QueueDesk::new(
            Arc::new(SequentialIdProvider::new("id")),
            clock.clone(),
            config,
        );
        let service = desk
            .create_service(&ServiceDraft::new(
                "Billing Inquiry",
                "Invoice, payment, and billing questions",
                10,
                ServicePriority::Low,
            ))
            .unwrap();
        (desk, clock, service.id)
    }

    #[test]
    fn test_join_closed_service_rejected() {
        let (desk, _, service_id) = desk_with_clock();
        desk.set_service_open(&service_id, false).unwrap();

        let err = desk.join(&service_id, "Tom Baker").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(desk.snapshot(&service_id).unwrap().is_empty());
    }

    #[test]
    fn test_join_unknown_service_rejected() {
        let (desk, _, _) = desk_with_clock();
        let err = desk.join("ghost", "Tom Baker").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_join_unknown_service_reported_before_bad_name() {
        let (desk, _, _) = desk_with_clock();
        let err = desk.join("ghost", "   ").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_register_service_rejects_invalid_fields() {
        let (desk, _, _) = desk_with_clock();
        let err = desk
            .register_service(
                "walk-in",
                &ServiceDraft::new("", "", 0, ServicePriority::Medium),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidService(_))
        ));
        assert!(matches!(desk.service("walk-in"), Err(AppError::NotFound(_))));
        assert!(matches!(desk.snapshot("walk-in"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_join_validates_display_name() {
        let (desk, _, service_id) = desk_with_clock();
        assert!(matches!(
            desk.join(&service_id, "   "),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            desk.join(&service_id, &"x".repeat(101)),
            Err(AppError::Validation(_))
        ));

        let entry = desk.join(&service_id, "  Tom Baker ").unwrap();
        assert_eq!(entry.display_name, "Tom Baker");
    }

    #[test]
    fn test_history_records_outcomes() {
        let (desk, clock, service_id) = desk_with_clock();
        desk.join(&service_id, "Tom Baker").unwrap();
        let lisa = desk.join(&service_id, "Lisa Wong").unwrap();

        clock.advance_minutes(5);
        desk.serve_next(&service_id).unwrap();
        clock.advance_minutes(3);
        desk.leave(&service_id, &lisa.id).unwrap();

        let history = desk.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].display_name, "Lisa Wong");
        assert_eq!(history[0].outcome, Outcome::Cancelled);
        assert_eq!(history[0].waited_minutes, 8);
        assert_eq!(history[1].outcome, Outcome::Completed);
        assert_eq!(history[1].waited_minutes, 5);
        assert_eq!(history[1].service_name, "Billing Inquiry");
    }

    #[test]
    fn test_no_show_recorded_and_counter_handed_over() {
        let (desk, clock, service_id) = desk_with_clock();
        let tom = desk.join(&service_id, "Tom Baker").unwrap();
        let lisa = desk.join(&service_id, "Lisa Wong").unwrap();
        desk.start_serving(&service_id).unwrap();

        clock.advance_minutes(4);
        desk.dismiss_no_show(&service_id, &tom.id).unwrap();

        let snapshot = desk.snapshot(&service_id).unwrap();
        assert_eq!(snapshot.names(), vec!["Lisa Wong"]);
        assert_eq!(snapshot.entries[0].id, lisa.id);
        assert_eq!(snapshot.entries[0].status, DisplayStatus::Serving);
        assert_eq!(snapshot.served_count, 0);

        let history = desk.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outcome, Outcome::NoShow);
        assert_eq!(history[0].waited_minutes, 4);
    }

    #[test]
    fn test_history_keeps_most_recent_records() {
        let (desk, _, service_id) = desk_with_config(EngineConfig {
            max_history_records: 2,
            ..EngineConfig::default()
        });
        for name in ["A", "B", "C"] {
            desk.join(&service_id, name).unwrap();
        }
        for _ in 0..3 {
            desk.serve_next(&service_id).unwrap();
        }

        let names: Vec<_> = desk
            .history()
            .unwrap()
            .into_iter()
            .map(|r| r.display_name)
            .collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn test_empty_serve_is_recoverable() {
        let (desk, _, service_id) = desk_with_clock();
        let err = desk.serve_next(&service_id).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::EmptyQueue(_))
        ));
        assert!(err.is_recoverable());
        assert!(desk.history().unwrap().is_empty());
    }

    #[test]
    fn test_update_service_refreshes_waits() {
        let (desk, _, service_id) = desk_with_clock();
        desk.join(&service_id, "A").unwrap();
        desk.join(&service_id, "B").unwrap();

        desk.update_service(
            &service_id,
            &ServiceDraft::new("Billing Inquiry", "Billing", 25, ServicePriority::Low),
        )
        .unwrap();

        let snapshot = desk.snapshot(&service_id).unwrap();
        assert_eq!(snapshot.entries[1].estimated_wait_minutes, 25);
    }

    #[test]
    fn test_remove_service_cancels_queue() {
        let (desk, _, service_id) = desk_with_clock();
        desk.join(&service_id, "A").unwrap();
        desk.join(&service_id, "B").unwrap();

        desk.remove_service(&service_id).unwrap();

        let history = desk.history().unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.outcome == Outcome::Cancelled));
        assert!(matches!(
            desk.snapshot(&service_id),
            Err(AppError::NotFound(_))
        ));
    }
}
