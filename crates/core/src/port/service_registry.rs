// Service Registry Port
//
// Consulted before a join: unknown and closed services never reach the engine.

/// What the queue side needs to know about a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInfo {
    pub is_open: bool,
    pub average_duration_minutes: u32,
}

pub trait ServiceRegistry: Send + Sync {
    /// Look up a service; None if it does not exist
    fn lookup(&self, service_id: &str) -> Option<ServiceInfo>;
}
