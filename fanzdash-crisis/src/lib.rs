//! # FanzDash Crisis — incident lifecycle and command center
//!
//! The crisis layer of the FanzDash core:
//! - Crisis declaration, status tracking, and timeline
//! - Threat alerts with escalation into crises
//! - Static response plan catalog (versioned TOML data)
//! - Command center snapshot aggregation

pub mod command_center;
pub mod lifecycle;
pub mod response_plans;
pub mod types;


pub use command_center::{
    CommandCenter, CommandCenterSnapshot, CommandMetrics, MetricsProvider, StaticMetrics,
};
pub use lifecycle::{CrisisManager, NewAlert};
pub use response_plans::{PlanCatalog, ResponsePlan};
pub use types::{
    AlertStatus, ConfidenceTier, Crisis, CrisisStatus, CrisisType, ImpactAssessment, RiskTier,
    ThreatAlert,
};
