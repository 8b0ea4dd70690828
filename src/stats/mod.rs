//! Session, registry and server statistics

pub mod metrics;

pub use metrics::{RegistryStats, ServerCounters, ServerStats, SessionStats};
