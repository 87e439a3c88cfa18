pub mod check;
pub mod classify;
pub mod collector;
pub mod error;
pub mod escalator;
pub mod publisher;
pub mod scheduler;
pub mod status;
pub mod streak;

pub use check::{HostCheck, ProviderCheck};
pub use classify::{Direction, Thresholds};
pub use collector::{
    HostMetricsCollector, ProviderStatisticsSource, SharedProviderStats, SystemHostCollector,
};
pub use error::MonitorError;
pub use escalator::EmailEscalator;
pub use publisher::NotificationPublisher;
pub use scheduler::HealthMonitor;
pub use status::{StatusRegistry, HOST_TARGET_ID};
pub use streak::{DebounceDecision, DebounceState, FailureStreak, StreakTable};
