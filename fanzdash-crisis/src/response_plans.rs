//! Response Plan Catalog — static playbooks keyed by crisis type
//!
//! Plans are versioned data, not code: a TOML document (embedded builtin
//! or an operator-supplied file) parsed once at startup and read-only
//! afterwards. The lifecycle manager consults the catalog at declaration
//! time to seed a new crisis's response team and immediate actions.
//! Absence of a plan for a type is a valid state, not an error.

use crate::types::CrisisType;
use fanzdash_core::{FanzError, FanzResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Builtin plan catalog, shipped with the crate as versioned data.
const BUILTIN_PLANS: &str = include_str!("../config/response_plans.toml");

// ── Plan Structure ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRole {
    pub role: String,
    pub responsibilities: String,
    pub contact: String,
}

/// An immediate action, executed in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    pub priority: u8,
    pub action: String,
    pub assigned_role: String,
    pub time_estimate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OngoingAction {
    pub action: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommPlanEntry {
    pub audience: String,
    pub timing: String,
    pub channel: String,
    pub requires_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationStep {
    pub level: u8,
    pub trigger: String,
    pub notify_roles: Vec<String>,
}

/// A complete playbook for one crisis type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub crisis_type: CrisisType,
    #[serde(default)]
    pub team: Vec<TeamRole>,
    #[serde(default)]
    pub immediate_actions: Vec<PlannedAction>,
    #[serde(default)]
    pub short_term_actions: Vec<String>,
    #[serde(default)]
    pub ongoing_actions: Vec<OngoingAction>,
    #[serde(default)]
    pub communication_plan: Vec<CommPlanEntry>,
    #[serde(default)]
    pub escalation_path: Vec<EscalationStep>,
    #[serde(default)]
    pub resolution_criteria: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    #[serde(rename = "plan")]
    plans: Vec<ResponsePlan>,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

/// The full plan catalog, loaded once and immutable afterwards.
#[derive(Debug)]
pub struct PlanCatalog {
    version: String,
    plans: Vec<ResponsePlan>,
}

impl PlanCatalog {
    /// The plan catalog shipped with the crate.
    pub fn builtin() -> FanzResult<Self> {
        Self::from_toml_str(BUILTIN_PLANS)
    }

    /// Load a plan catalog from an operator-supplied TOML file.
    pub fn load(path: impl AsRef<Path>) -> FanzResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_toml_str(&content)?;
        info!(
            path = %path.as_ref().display(),
            version = %catalog.version,
            plans = catalog.plans.len(),
            "Response plan catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog from TOML text. At most one plan per crisis type;
    /// immediate actions are re-sorted by priority.
    pub fn from_toml_str(content: &str) -> FanzResult<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| FanzError::Config(format!("Failed to parse plan catalog: {}", e)))?;
        if file.plans.is_empty() {
            return Err(FanzError::Config("Plan catalog contains no plans".into()));
        }
        let mut plans = file.plans;
        for i in 0..plans.len() {
            for j in (i + 1)..plans.len() {
                if plans[i].crisis_type == plans[j].crisis_type {
                    return Err(FanzError::Config(format!(
                        "Duplicate plan for crisis type {:?}",
                        plans[i].crisis_type
                    )));
                }
            }
        }
        // Plans are consulted in priority order.
        for plan in &mut plans {
            plan.immediate_actions.sort_by_key(|a| a.priority);
        }
        Ok(Self { version: file.version, plans })
    }

    /// Look up the plan for a crisis type, if one exists.
    pub fn plan_for(&self, crisis_type: CrisisType) -> Option<&ResponsePlan> {
        self.plans.iter().find(|p| p.crisis_type == crisis_type)
    }

    pub fn all_plans(&self) -> &[ResponsePlan] {
        &self.plans
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
