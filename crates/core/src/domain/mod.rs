// Domain Layer - Pure business logic and entities

pub mod display;
pub mod entry;
pub mod error;
pub mod history;
pub mod queue;
pub mod service;

// Re-exports
pub use display::{status_of, DisplayStatus};
pub use entry::{EntryId, EntryStatus, QueueEntry};
pub use error::{DomainError, FieldError};
pub use history::{HistoryRecord, Outcome};
pub use queue::{QueueSnapshot, ServiceQueue, SnapshotEntry};
pub use service::{Service, ServiceDraft, ServiceFields, ServiceId, ServicePriority};
