pub mod alarm;
pub mod alert_email;
pub mod geometry;
pub mod ledger;
pub mod orchestrator;
pub mod registry;
pub mod wind;
pub mod windows;

pub use alarm::AlarmService;
pub use alert_email::MessageContext;
pub use orchestrator::{DecisionOrchestrator, EngineSettings};
pub use registry::BeachRegistry;
