//! # FanzDash Core — Foundation for the compliance/crisis layers
//!
//! Shared building blocks every FanzDash core crate links against:
//! - Severity orderings (`RiskLevel`, `CrisisSeverity`) as total orders
//! - The `FanzError` taxonomy (NotFound / InvalidTransition / Validation)
//! - The signal bus: fire-and-forget pub/sub between layers and consumers
//! - TOML configuration loading with defaults-on-missing semantics

pub mod config;
pub mod error;
pub mod signal_bus;
pub mod types;

pub use config::FanzConfig;
pub use error::{FanzError, FanzResult};
pub use signal_bus::{Signal, SignalBus, SignalKind};
pub use types::{CrisisSeverity, OverallStatus, RiskLevel};
