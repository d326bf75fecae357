//! Crisis and threat alert data types.

use fanzdash_core::CrisisSeverity;
use serde::{Deserialize, Serialize};

/// Crisis category. Keys the response plan catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrisisType {
    DataBreach,
    CsamDetection,
    PlatformOutage,
    PaymentProcessorSuspension,
    LegalThreat,
    RegulatoryViolation,
    UnauthorizedAccess,
    FraudAttack,
}

/// Crisis lifecycle stages. The manager does not enforce a linear
/// progression; any status may be written from any status, matching the
/// operational reality that incidents jump stages in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrisisStatus {
    Detected,
    Acknowledged,
    Investigating,
    Responding,
    Mitigating,
    Resolving,
    Resolved,
    PostMortem,
    Closed,
}

/// Qualitative risk tier used by impact assessments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
    Severe,
}

/// Estimated blast radius of a crisis, supplied at declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub affected_platforms: u32,
    pub affected_creators: u64,
    pub affected_users: u64,
    /// Estimated revenue at risk, USD.
    pub estimated_revenue_impact: f64,
    pub reputation_risk: RiskTier,
    pub legal_risk: RiskTier,
}

/// One timeline entry on a crisis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub timestamp: i64,
    /// "detection" or "update"
    pub entry_kind: String,
    pub actor: String,
    pub description: String,
}

/// A communication sent during a crisis (internal or external).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommRecord {
    pub timestamp: i64,
    pub audience: String,
    pub channel: String,
    pub message: String,
    pub sent_by: String,
}

/// A declared incident. Never deleted; terminal statuses only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crisis {
    pub id: String,
    pub crisis_type: CrisisType,
    pub severity: CrisisSeverity,
    pub status: CrisisStatus,
    pub title: String,
    pub description: String,
    pub detected_at: i64,
    pub detected_by: String,
    pub acknowledged_at: Option<i64>,
    pub acknowledged_by: Option<String>,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub impact: ImpactAssessment,
    /// Role names seeded from the matching response plan.
    pub response_team: Vec<String>,
    /// Actions in flight, seeded from the plan's immediate actions.
    pub current_actions: Vec<String>,
    pub timeline: Vec<CrisisEvent>,
    pub internal_comms: Vec<CommRecord>,
    pub external_comms: Vec<CommRecord>,
    /// Notification fan-out breadth, 1-5, derived from severity.
    pub escalation_level: u8,
    pub executive_notified: bool,
}

impl Crisis {
    pub fn is_active(&self) -> bool {
        self.status != CrisisStatus::Closed
    }
}

/// Detection confidence for a threat alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ConfidenceTier {
    Low,
    #[default]
    Medium,
    High,
    Confirmed,
}

/// Threat alert lifecycle. Escalated is terminal and links the crisis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    New,
    Investigating,
    Confirmed,
    FalsePositive,
    Escalated,
}

/// A detection that may become a crisis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAlert {
    pub id: String,
    /// Free-form category ("security", "compliance", "operational",
    /// "financial", "legal", ...); maps to a CrisisType on escalation.
    pub category: String,
    pub severity: CrisisSeverity,
    pub title: String,
    pub description: String,
    /// Which detection source raised this.
    pub source: String,
    pub indicators: Vec<String>,
    pub affected_systems: Vec<String>,
    pub confidence: ConfidenceTier,
    pub status: AlertStatus,
    pub detected_at: i64,
    /// Set once the alert is escalated.
    pub escalated_to_crisis: Option<String>,
}
