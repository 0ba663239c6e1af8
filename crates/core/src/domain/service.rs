// Service Domain Model

use serde::{Deserialize, Serialize};

use super::error::{DomainError, FieldError, Result};

/// Service identifier
pub type ServiceId = String;

/// Longest accepted service name (characters, after trimming)
pub const MAX_SERVICE_NAME_LEN: usize = 100;

/// Display-only urgency label; never used as an ordering key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for ServicePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServicePriority::Low => write!(f, "low"),
            ServicePriority::Medium => write!(f, "medium"),
            ServicePriority::High => write!(f, "high"),
        }
    }
}

/// A service with its own independent queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub expected_duration_minutes: u32,
    pub priority: ServicePriority,
    pub is_open: bool,
}

/// Unvalidated service fields, as submitted by an admin form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub name: String,
    pub description: String,
    pub expected_duration_minutes: Option<i64>,
    #[serde(default)]
    pub priority: ServicePriority,
}

/// Validated service fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFields {
    pub name: String,
    pub description: String,
    pub expected_duration_minutes: u32,
    pub priority: ServicePriority,
}

impl ServiceDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_duration_minutes: i64,
        priority: ServicePriority,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_duration_minutes: Some(expected_duration_minutes),
            priority,
        }
    }

    /// Validate every field, collecting all failures rather than the first
    pub fn validate(&self) -> Result<ServiceFields> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Service name is required"));
        } else if name.chars().count() > MAX_SERVICE_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("Max {} characters", MAX_SERVICE_NAME_LEN),
            ));
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }

        let duration = match self.expected_duration_minutes {
            None => {
                errors.push(FieldError::new("duration", "Duration is required"));
                None
            }
            Some(d) if d <= 0 => {
                errors.push(FieldError::new("duration", "Must be a positive number"));
                None
            }
            Some(d) => match u32::try_from(d) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push(FieldError::new(
                        "duration",
                        format!("Must be at most {} minutes", u32::MAX),
                    ));
                    None
                }
            },
        };

        match duration {
            Some(expected_duration_minutes) if errors.is_empty() => Ok(ServiceFields {
                name: name.to_string(),
                description: description.to_string(),
                expected_duration_minutes,
                priority: self.priority,
            }),
            _ => Err(DomainError::InvalidService(errors)),
        }
    }
}

impl Service {
    pub fn from_fields(id: impl Into<String>, fields: ServiceFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            description: fields.description,
            expected_duration_minutes: fields.expected_duration_minutes,
            priority: fields.priority,
            is_open: true,
        }
    }

    /// Overwrite editable fields, keeping id and open state
    pub fn apply(&mut self, fields: ServiceFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.expected_duration_minutes = fields.expected_duration_minutes;
        self.priority = fields.priority;
    }
}
