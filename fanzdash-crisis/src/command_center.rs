//! Command Center Aggregator — one dashboard snapshot for the console
//!
//! Pure composition: filters the lifecycle manager's state, pulls a
//! metrics block from the collaborator provider, and merges recent
//! crisis/alert activity into one time-sorted feed. Nothing here is
//! stored; every snapshot is recomputed on demand.

use crate::lifecycle::CrisisManager;
use crate::types::{AlertStatus, Crisis, ThreatAlert};
use fanzdash_core::config::RosterConfig;
use fanzdash_core::{CrisisSeverity, OverallStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Recent-activity feed length cap.
const MAX_RECENT_ACTIVITY: usize = 10;
/// How many of each kind feed the merge.
const RECENT_PER_KIND: usize = 5;

// ── Collaborator Metrics ─────────────────────────────────────────────────────

/// Platform health numbers sourced from external collaborator systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMetrics {
    pub platform_uptime_pct: f64,
    pub security_posture_score: f64,
    /// Pending compliance/moderation reviews.
    pub compliance_backlog: u64,
    pub financial_health_score: f64,
    pub support_backlog: u64,
}

/// Read-only metrics source. The aggregator composes, it never computes:
/// real deployments wire uptime/security/finance collectors in here.
pub trait MetricsProvider: Send + Sync {
    fn metrics(&self) -> CommandMetrics;
}

/// Canned numbers standing in for the external collectors.
pub struct StaticMetrics;

impl MetricsProvider for StaticMetrics {
    fn metrics(&self) -> CommandMetrics {
        CommandMetrics {
            platform_uptime_pct: 99.97,
            security_posture_score: 94.2,
            compliance_backlog: 45,
            financial_health_score: 87.5,
            support_backlog: 128,
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// One on-call roster row shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnCallRoster {
    pub team: String,
    pub primary: String,
    pub secondary: String,
    pub contact: String,
}

impl From<&RosterConfig> for OnCallRoster {
    fn from(r: &RosterConfig) -> Self {
        Self {
            team: r.team.clone(),
            primary: r.primary.clone(),
            secondary: r.secondary.clone(),
            contact: r.contact.clone(),
        }
    }
}

/// One row of the merged recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: i64,
    /// "crisis" or "alert"
    pub kind: String,
    pub id: String,
    pub title: String,
    pub severity: CrisisSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandCenterSnapshot {
    pub generated_at: i64,
    pub overall_status: OverallStatus,
    pub active_crises: Vec<Crisis>,
    /// Alerts still in triage (New or Investigating).
    pub active_alerts: Vec<ThreatAlert>,
    pub metrics: CommandMetrics,
    /// True once the compliance backlog passes the configured threshold.
    pub compliance_backlog_elevated: bool,
    pub rosters: Vec<OnCallRoster>,
    pub recent_activity: Vec<ActivityEntry>,
}

// ── Aggregator ───────────────────────────────────────────────────────────────

pub struct CommandCenter {
    manager: Arc<CrisisManager>,
    metrics: Arc<dyn MetricsProvider>,
    rosters: Vec<OnCallRoster>,
    backlog_threshold: u64,
}

impl CommandCenter {
    pub fn new(
        manager: Arc<CrisisManager>,
        metrics: Arc<dyn MetricsProvider>,
        rosters: &[RosterConfig],
        backlog_threshold: u64,
    ) -> Self {
        Self {
            manager,
            metrics,
            rosters: rosters.iter().map(OnCallRoster::from).collect(),
            backlog_threshold,
        }
    }

    /// Build the dashboard snapshot.
    pub fn snapshot(&self) -> CommandCenterSnapshot {
        let active_crises = self.manager.active_crises();
        let active_alerts: Vec<_> = self
            .manager
            .threat_alerts()
            .into_iter()
            .filter(|a| matches!(a.status, AlertStatus::New | AlertStatus::Investigating))
            .collect();
        let metrics = self.metrics.metrics();
        let recent_activity = self.recent_activity();

        debug!(
            crises = active_crises.len(),
            alerts = active_alerts.len(),
            status = ?self.manager.overall_status(),
            "Command center snapshot"
        );

        CommandCenterSnapshot {
            generated_at: chrono::Utc::now().timestamp(),
            overall_status: self.manager.overall_status(),
            active_crises,
            active_alerts,
            compliance_backlog_elevated: metrics.compliance_backlog > self.backlog_threshold,
            metrics,
            rosters: self.rosters.clone(),
            recent_activity,
        }
    }

    /// The 5 most recent crises and 5 most recent alerts by detection
    /// time, merged newest first, capped at 10.
    fn recent_activity(&self) -> Vec<ActivityEntry> {
        let mut crises = self.manager.all_crises();
        crises.sort_by_key(|c| std::cmp::Reverse(c.detected_at));
        let mut alerts = self.manager.threat_alerts();
        alerts.sort_by_key(|a| std::cmp::Reverse(a.detected_at));

        let mut feed: Vec<ActivityEntry> = crises
            .iter()
            .take(RECENT_PER_KIND)
            .map(|c| ActivityEntry {
                timestamp: c.detected_at,
                kind: "crisis".into(),
                id: c.id.clone(),
                title: c.title.clone(),
                severity: c.severity,
            })
            .chain(alerts.iter().take(RECENT_PER_KIND).map(|a| ActivityEntry {
                timestamp: a.detected_at,
                kind: "alert".into(),
                id: a.id.clone(),
                title: a.title.clone(),
                severity: a.severity,
            }))
            .collect();
        feed.sort_by_key(|e| std::cmp::Reverse(e.timestamp));
        feed.truncate(MAX_RECENT_ACTIVITY);
        feed
    }
}
