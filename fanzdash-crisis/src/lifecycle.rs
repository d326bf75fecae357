//! Crisis Lifecycle Manager — declarations, alerts, and escalation
//!
//! Features:
//! - Crisis declaration seeded from the response plan catalog
//! - Permissive status writes with an append-only timeline
//! - Threat alert intake and triage
//! - One-shot escalation of an alert into a crisis
//! - Overall readiness status recomputed after every mutation
//!
//! Crises are never deleted; Closed is the only terminal state and the
//! record stays queryable after it.

use crate::response_plans::PlanCatalog;
use crate::types::{
    AlertStatus, ConfidenceTier, Crisis, CrisisEvent, CrisisStatus, CrisisType, ImpactAssessment,
    ThreatAlert,
};
use fanzdash_core::{CrisisSeverity, FanzError, FanzResult, OverallStatus, SignalBus, SignalKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for a new threat alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub category: String,
    pub severity: CrisisSeverity,
    pub title: String,
    pub description: String,
    pub source: String,
    pub indicators: Vec<String>,
    pub affected_systems: Vec<String>,
    pub confidence: ConfidenceTier,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CrisisReport {
    pub total_declared: u64,
    pub active: u64,
    pub total_alerts: u64,
    pub alerts_escalated: u64,
    pub overall_status: OverallStatus,
}

pub struct CrisisManager {
    plans: Arc<PlanCatalog>,
    bus: Arc<SignalBus>,
    crises: RwLock<Vec<Crisis>>,
    alerts: RwLock<Vec<ThreatAlert>>,
    overall: RwLock<OverallStatus>,
    next_crisis_id: AtomicU64,
    next_alert_id: AtomicU64,
    total_declared: AtomicU64,
    total_alerts: AtomicU64,
    alerts_escalated: AtomicU64,
}

impl CrisisManager {
    pub fn new(plans: Arc<PlanCatalog>, bus: Arc<SignalBus>) -> Self {
        Self {
            plans,
            bus,
            crises: RwLock::new(Vec::new()),
            alerts: RwLock::new(Vec::new()),
            overall: RwLock::new(OverallStatus::Normal),
            next_crisis_id: AtomicU64::new(1),
            next_alert_id: AtomicU64::new(1),
            total_declared: AtomicU64::new(0),
            total_alerts: AtomicU64::new(0),
            alerts_escalated: AtomicU64::new(0),
        }
    }

    // ── Crises ──────────────────────────────────────────────────────────

    /// Declare a crisis. Always succeeds. The response team and current
    /// actions are seeded from the matching plan when one exists; an
    /// absent plan just leaves them empty.
    pub fn declare_crisis(
        &self,
        crisis_type: CrisisType,
        severity: CrisisSeverity,
        title: &str,
        description: &str,
        detected_by: &str,
        impact: ImpactAssessment,
    ) -> Crisis {
        let now = chrono::Utc::now().timestamp();
        let id = format!("cr-{}", self.next_crisis_id.fetch_add(1, Ordering::Relaxed));

        let (response_team, current_actions) = match self.plans.plan_for(crisis_type) {
            Some(plan) => (
                plan.team.iter().map(|t| t.role.clone()).collect(),
                plan.immediate_actions.iter().map(|a| a.action.clone()).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let crisis = Crisis {
            id: id.clone(),
            crisis_type,
            severity,
            status: CrisisStatus::Detected,
            title: title.into(),
            description: description.into(),
            detected_at: now,
            detected_by: detected_by.into(),
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
            impact,
            response_team,
            current_actions,
            timeline: vec![CrisisEvent {
                timestamp: now,
                entry_kind: "detection".into(),
                actor: detected_by.into(),
                description: format!("Crisis detected: {}", title),
            }],
            internal_comms: Vec::new(),
            external_comms: Vec::new(),
            escalation_level: severity.escalation_level(),
            executive_notified: severity == CrisisSeverity::Critical,
        };

        self.total_declared.fetch_add(1, Ordering::Relaxed);
        self.crises.write().push(crisis.clone());
        self.recompute_overall();

        info!(
            id = %id,
            crisis_type = ?crisis_type,
            severity = ?severity,
            escalation_level = crisis.escalation_level,
            "Crisis declared"
        );
        let mut details = HashMap::new();
        details.insert("crisis_type".into(), format!("{:?}", crisis_type));
        details.insert("severity".into(), format!("{:?}", severity));
        self.bus.emit(
            SignalKind::CrisisDeclared,
            "crisis_manager",
            &id,
            detected_by,
            title,
            details,
        );

        crisis
    }

    /// Write a new status. Any status may follow any status; the source
    /// console allows incidents to jump stages in both directions and
    /// that behavior is kept. Acknowledged and Resolved stamp their
    /// actor/time fields; every write appends a timeline entry.
    pub fn update_status(
        &self,
        crisis_id: &str,
        new_status: CrisisStatus,
        actor: &str,
    ) -> FanzResult<Crisis> {
        let now = chrono::Utc::now().timestamp();
        let updated = {
            let mut crises = self.crises.write();
            let crisis = crises
                .iter_mut()
                .find(|c| c.id == crisis_id)
                .ok_or_else(|| FanzError::not_found("crisis", crisis_id))?;

            let old_status = crisis.status;
            crisis.status = new_status;
            match new_status {
                CrisisStatus::Acknowledged => {
                    crisis.acknowledged_at = Some(now);
                    crisis.acknowledged_by = Some(actor.into());
                }
                CrisisStatus::Resolved => {
                    crisis.resolved_at = Some(now);
                    crisis.resolved_by = Some(actor.into());
                }
                _ => {}
            }
            crisis.timeline.push(CrisisEvent {
                timestamp: now,
                entry_kind: "update".into(),
                actor: actor.into(),
                description: format!("Status {:?} -> {:?}", old_status, new_status),
            });
            crisis.clone()
        };
        self.recompute_overall();

        info!(id = %crisis_id, status = ?new_status, actor = %actor, "Crisis status updated");
        let mut details = HashMap::new();
        details.insert("status".into(), format!("{:?}", new_status));
        self.bus.emit(
            SignalKind::CrisisUpdated,
            "crisis_manager",
            crisis_id,
            actor,
            &format!("Status -> {:?}", new_status),
            details,
        );

        Ok(updated)
    }

    pub fn crisis(&self, crisis_id: &str) -> Option<Crisis> {
        self.crises.read().iter().find(|c| c.id == crisis_id).cloned()
    }

    /// All non-Closed crises, oldest declaration first.
    pub fn active_crises(&self) -> Vec<Crisis> {
        self.crises.read().iter().filter(|c| c.is_active()).cloned().collect()
    }

    pub fn all_crises(&self) -> Vec<Crisis> {
        self.crises.read().clone()
    }

    // ── Threat Alerts ───────────────────────────────────────────────────

    pub fn create_alert(&self, new: NewAlert) -> ThreatAlert {
        let id = format!("alert-{}", self.next_alert_id.fetch_add(1, Ordering::Relaxed));
        let alert = ThreatAlert {
            id: id.clone(),
            category: new.category,
            severity: new.severity,
            title: new.title,
            description: new.description,
            source: new.source,
            indicators: new.indicators,
            affected_systems: new.affected_systems,
            confidence: new.confidence,
            status: AlertStatus::New,
            detected_at: chrono::Utc::now().timestamp(),
            escalated_to_crisis: None,
        };

        self.total_alerts.fetch_add(1, Ordering::Relaxed);
        self.alerts.write().push(alert.clone());

        warn!(id = %id, category = %alert.category, severity = ?alert.severity, "Threat alert raised");
        let mut details = HashMap::new();
        details.insert("category".into(), alert.category.clone());
        details.insert("severity".into(), format!("{:?}", alert.severity));
        self.bus.emit(
            SignalKind::AlertRaised,
            "crisis_manager",
            &id,
            &alert.source,
            &alert.title,
            details,
        );

        alert
    }

    /// Triage an alert. Escalated can only be reached through
    /// `escalate_to_crisis`, and an Escalated alert is immutable.
    pub fn set_alert_status(&self, alert_id: &str, status: AlertStatus) -> FanzResult<ThreatAlert> {
        if status == AlertStatus::Escalated {
            return Err(FanzError::InvalidTransition(
                "Escalated is set by escalate_to_crisis, not triage".into(),
            ));
        }
        let mut alerts = self.alerts.write();
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| FanzError::not_found("threat alert", alert_id))?;
        if alert.status == AlertStatus::Escalated {
            return Err(FanzError::InvalidTransition(format!(
                "Alert '{}' is already escalated",
                alert_id
            )));
        }
        alert.status = status;
        Ok(alert.clone())
    }

    /// Promote an alert into a crisis. The alert's category picks the
    /// crisis type; an unrecognized category falls back to an outage.
    /// One crisis per alert: the status flips to Escalated in the same
    /// critical section as the check, so a concurrent second caller
    /// fails instead of declaring a duplicate crisis.
    pub fn escalate_to_crisis(&self, alert_id: &str, actor: &str) -> FanzResult<Crisis> {
        let (category, severity, title, alert_desc) = {
            let mut alerts = self.alerts.write();
            let alert = alerts
                .iter_mut()
                .find(|a| a.id == alert_id)
                .ok_or_else(|| FanzError::not_found("threat alert", alert_id))?;
            if alert.status == AlertStatus::Escalated {
                return Err(FanzError::InvalidTransition(format!(
                    "Alert '{}' was already escalated to crisis '{}'",
                    alert_id,
                    alert.escalated_to_crisis.as_deref().unwrap_or("?")
                )));
            }
            alert.status = AlertStatus::Escalated;
            (alert.category.clone(), alert.severity, alert.title.clone(), alert.description.clone())
        };

        let crisis_type = crisis_type_for_category(&category);
        let crisis = self.declare_crisis(
            crisis_type,
            severity,
            &format!("Escalated: {}", title),
            &format!("Escalated from threat alert {}: {}", alert_id, alert_desc),
            actor,
            ImpactAssessment::default(),
        );

        {
            let mut alerts = self.alerts.write();
            if let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) {
                alert.escalated_to_crisis = Some(crisis.id.clone());
            }
        }
        self.alerts_escalated.fetch_add(1, Ordering::Relaxed);

        warn!(alert = %alert_id, crisis = %crisis.id, "Alert escalated to crisis");
        let mut details = HashMap::new();
        details.insert("crisis_id".into(), crisis.id.clone());
        details.insert("crisis_type".into(), format!("{:?}", crisis_type));
        self.bus.emit(
            SignalKind::AlertEscalated,
            "crisis_manager",
            alert_id,
            actor,
            &format!("Escalated into {}", crisis.id),
            details,
        );

        Ok(crisis)
    }

    pub fn alert(&self, alert_id: &str) -> Option<ThreatAlert> {
        self.alerts.read().iter().find(|a| a.id == alert_id).cloned()
    }

    pub fn threat_alerts(&self) -> Vec<ThreatAlert> {
        self.alerts.read().clone()
    }

    // ── Overall Status ──────────────────────────────────────────────────

    pub fn overall_status(&self) -> OverallStatus {
        *self.overall.read()
    }

    /// Readiness derivation. One High crisis reads differently depending
    /// on how much else is burning: alone it is only Elevated, alongside
    /// three other incidents it tips the console into Crisis.
    fn recompute_overall(&self) {
        let crises = self.crises.read();
        let active: Vec<_> = crises.iter().filter(|c| c.is_active()).collect();
        let critical = active.iter().filter(|c| c.severity == CrisisSeverity::Critical).count();
        let high = active.iter().filter(|c| c.severity == CrisisSeverity::High).count();

        let status = if critical > 0 {
            OverallStatus::Critical
        } else if high > 1 || (high == 1 && active.len() > 3) {
            OverallStatus::Crisis
        } else if !active.is_empty() {
            OverallStatus::Elevated
        } else {
            OverallStatus::Normal
        };
        *self.overall.write() = status;
    }

    pub fn report(&self) -> CrisisReport {
        CrisisReport {
            total_declared: self.total_declared.load(Ordering::Relaxed),
            active: self.active_crises().len() as u64,
            total_alerts: self.total_alerts.load(Ordering::Relaxed),
            alerts_escalated: self.alerts_escalated.load(Ordering::Relaxed),
            overall_status: self.overall_status(),
        }
    }
}

/// Fixed category-to-type table for alert escalation.
fn crisis_type_for_category(category: &str) -> CrisisType {
    match category.to_lowercase().as_str() {
        "security" => CrisisType::UnauthorizedAccess,
        "compliance" => CrisisType::RegulatoryViolation,
        "operational" => CrisisType::PlatformOutage,
        "financial" => CrisisType::FraudAttack,
        "legal" => CrisisType::LegalThreat,
        _ => CrisisType::PlatformOutage,
    }
}
