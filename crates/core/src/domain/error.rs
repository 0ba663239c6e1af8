// Domain Error Types

use thiserror::Error;

use super::entry::EntryStatus;

/// A single rejected field from service validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entry {entry_id} not found in queue {service_id}")]
    EntryNotFound {
        service_id: String,
        entry_id: String,
    },

    #[error("Queue {0} is empty")]
    EmptyQueue(String),

    #[error("No queue provisioned for service {0}")]
    UnknownService(String),

    #[error("Invalid entry status transition: {from} -> {to}")]
    InvalidTransition { from: EntryStatus, to: EntryStatus },

    #[error("Invalid service: {}", join_fields(.0))]
    InvalidService(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, DomainError>;
