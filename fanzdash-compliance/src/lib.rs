//! # FanzDash Compliance — violation classification and review workflow
//!
//! The legal/policy risk-detection layer of the FanzDash core:
//! - Violation taxonomy: versioned rule table (keywords + patterns) with
//!   per-rule policy metadata (blocks? needs approval? mandatory report?)
//! - Rule engine: classifies actions/content against the taxonomy
//! - Compliance event log: bounded, time-ordered record of outcomes
//! - Approval workflow: human review for flagged-but-not-blocked actions

pub mod approval;
pub mod event_log;
pub mod rule_engine;
pub mod taxonomy;
pub mod types;

pub use approval::ApprovalWorkflow;
pub use event_log::ComplianceLog;
pub use rule_engine::{AuthorityNotifier, LoggedNotifier, RuleEngine};
pub use taxonomy::{ViolationRule, ViolationTaxonomy};
pub use types::{ApprovalRequest, ApprovalStatus, ComplianceEvent, ViolationKind};

#[cfg(test)]
mod tests;
