//! Shared types for the compliance layer.

use fanzdash_core::RiskLevel;
use serde::{Deserialize, Serialize};

/// The violation taxonomy tags. Declaration order is the canonical sort
/// order used when storing matched kinds, so classification output is
/// independent of rule iteration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ViolationKind {
    ChildExploitation,
    NonConsensualContent,
    SectionComplianceViolation,
    CopyrightInfringement,
    HarassmentThreat,
    MoneyLaundering,
    SanctionsViolation,
    DataProtectionViolation,
}

/// Outcome of a single compliance check. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub id: String,
    /// Unix timestamp (seconds)
    pub timestamp: i64,
    pub actor_id: String,
    pub action: String,
    /// Truncated copy of the checked content, if any
    pub content_snippet: Option<String>,
    /// Max severity among matched rules (Low when nothing matched)
    pub risk_level: RiskLevel,
    /// Matched violation kinds, deduplicated, in taxonomy tag order
    pub violations: Vec<ViolationKind>,
    /// True if any matched rule blocks the action
    pub blocked: bool,
    /// True if any matched rule wants human review and the action was
    /// not blocked (blocking takes precedence)
    pub approval_required: bool,
    /// True iff risk level is Critical or ImmediateBlock
    pub escalated: bool,
    pub details: String,
}

/// Status of a human-review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
}

/// A human-review request created from a compliance event.
///
/// Transitions Pending → Approved or Pending → Denied exactly once;
/// no further mutation after resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: String,
    pub event_id: String,
    pub actor_id: String,
    pub action: String,
    pub risk_level: RiskLevel,
    pub violations: Vec<ViolationKind>,
    pub requested_by: String,
    pub requested_at: i64,
    pub status: ApprovalStatus,
    pub approver: Option<String>,
    pub resolved_at: Option<i64>,
    pub notes: Option<String>,
}
