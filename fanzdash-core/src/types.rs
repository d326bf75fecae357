//! Shared severity and status types for the FanzDash core.

use serde::{Deserialize, Serialize};

/// Risk level assigned to a compliance classification.
///
/// Declaration order is the severity order: `Low < Medium < High <
/// Critical < ImmediateBlock`. Aggregation across matched rules always
/// takes the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
    ImmediateBlock,
}

impl RiskLevel {
    /// Critical and ImmediateBlock classifications escalate automatically.
    pub fn escalates(self) -> bool {
        self >= RiskLevel::Critical
    }
}

/// Severity of a declared crisis or threat alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrisisSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrisisSeverity {
    /// Escalation level 1-5 controlling notification fan-out breadth.
    pub fn escalation_level(self) -> u8 {
        match self {
            CrisisSeverity::Critical => 5,
            CrisisSeverity::High => 4,
            CrisisSeverity::Medium => 3,
            CrisisSeverity::Low => 2,
        }
    }
}

/// Derived readiness status shown on the command center.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum OverallStatus {
    #[default]
    Normal,
    Elevated,
    Crisis,
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(RiskLevel::Critical < RiskLevel::ImmediateBlock);
    }

    #[test]
    fn test_risk_level_escalates() {
        assert!(!RiskLevel::High.escalates());
        assert!(RiskLevel::Critical.escalates());
        assert!(RiskLevel::ImmediateBlock.escalates());
    }

    #[test]
    fn test_escalation_levels() {
        assert_eq!(CrisisSeverity::Critical.escalation_level(), 5);
        assert_eq!(CrisisSeverity::High.escalation_level(), 4);
        assert_eq!(CrisisSeverity::Medium.escalation_level(), 3);
        assert_eq!(CrisisSeverity::Low.escalation_level(), 2);
    }
}
