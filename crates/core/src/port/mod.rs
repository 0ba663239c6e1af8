// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod service_registry;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use service_registry::{ServiceInfo, ServiceRegistry};
pub use time_provider::TimeProvider;
