// Application Layer - Use Cases and Business Logic

pub mod catalog;
pub mod config;
pub mod constants;
pub mod desk;
pub mod engine;

// Re-exports
pub use catalog::ServiceCatalog;
pub use config::EngineConfig;
pub use desk::QueueDesk;
pub use engine::QueueEngine;
