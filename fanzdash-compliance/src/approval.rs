//! Approval Workflow — human review for flagged-but-not-blocked actions
//!
//! Requests are created from existing compliance events and resolve
//! exactly once: Pending → Approved or Pending → Denied. A second
//! resolution attempt is an error, not a no-op.

use crate::event_log::ComplianceLog;
use crate::types::{ApprovalRequest, ApprovalStatus};
use fanzdash_core::{FanzError, FanzResult, SignalBus, SignalKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApprovalReport {
    pub total_requested: u64,
    pub pending: u64,
    pub approved: u64,
    pub denied: u64,
}

pub struct ApprovalWorkflow {
    log: Arc<ComplianceLog>,
    bus: Arc<SignalBus>,
    requests: RwLock<Vec<ApprovalRequest>>,
    next_request_id: AtomicU64,
    total_requested: AtomicU64,
    total_approved: AtomicU64,
    total_denied: AtomicU64,
}

impl ApprovalWorkflow {
    pub fn new(log: Arc<ComplianceLog>, bus: Arc<SignalBus>) -> Self {
        Self {
            log,
            bus,
            requests: RwLock::new(Vec::new()),
            next_request_id: AtomicU64::new(1),
            total_requested: AtomicU64::new(0),
            total_approved: AtomicU64::new(0),
            total_denied: AtomicU64::new(0),
        }
    }

    /// Open a pending review request for an existing compliance event.
    pub fn request_approval(
        &self,
        event_id: &str,
        requested_by: &str,
    ) -> FanzResult<ApprovalRequest> {
        let event = self
            .log
            .get(event_id)
            .ok_or_else(|| FanzError::not_found("compliance event", event_id))?;

        let id = format!("apr-{}", self.next_request_id.fetch_add(1, Ordering::Relaxed));
        let request = ApprovalRequest {
            id: id.clone(),
            event_id: event.id.clone(),
            actor_id: event.actor_id.clone(),
            action: event.action.clone(),
            risk_level: event.risk_level,
            violations: event.violations.clone(),
            requested_by: requested_by.into(),
            requested_at: chrono::Utc::now().timestamp(),
            status: ApprovalStatus::Pending,
            approver: None,
            resolved_at: None,
            notes: None,
        };

        self.total_requested.fetch_add(1, Ordering::Relaxed);
        self.requests.write().push(request.clone());

        info!(id = %id, event = %event_id, by = %requested_by, "Approval requested");
        let mut details = HashMap::new();
        details.insert("event_id".into(), event_id.to_string());
        self.bus.emit(
            SignalKind::ApprovalRequested,
            "approval_workflow",
            &id,
            requested_by,
            &format!("Review requested for '{}'", request.action),
            details,
        );

        Ok(request)
    }

    /// Resolve a pending request. Returns the `approved` flag on success.
    /// Unknown IDs are NotFound; an already-resolved request is an
    /// InvalidTransition (resolution is deliberately not idempotent).
    pub fn resolve_approval(
        &self,
        approval_id: &str,
        approved: bool,
        approver: &str,
        notes: Option<&str>,
    ) -> FanzResult<bool> {
        let mut requests = self.requests.write();
        let request = requests
            .iter_mut()
            .find(|r| r.id == approval_id)
            .ok_or_else(|| FanzError::not_found("approval request", approval_id))?;

        if request.status != ApprovalStatus::Pending {
            return Err(FanzError::InvalidTransition(format!(
                "Approval request '{}' already resolved ({:?})",
                approval_id, request.status
            )));
        }

        request.status = if approved { ApprovalStatus::Approved } else { ApprovalStatus::Denied };
        request.approver = Some(approver.into());
        request.resolved_at = Some(chrono::Utc::now().timestamp());
        request.notes = notes.map(|n| n.to_string());

        if approved {
            self.total_approved.fetch_add(1, Ordering::Relaxed);
            info!(id = %approval_id, approver = %approver, "Approval granted");
        } else {
            self.total_denied.fetch_add(1, Ordering::Relaxed);
            warn!(id = %approval_id, approver = %approver, "Approval denied");
        }

        let mut details = HashMap::new();
        details.insert("approved".into(), approved.to_string());
        let title = if approved { "Request approved" } else { "Request denied" };
        self.bus.emit(
            SignalKind::ApprovalResolved,
            "approval_workflow",
            approval_id,
            approver,
            title,
            details,
        );

        Ok(approved)
    }

    /// All requests still pending, in insertion order.
    pub fn pending(&self) -> Vec<ApprovalRequest> {
        self.requests
            .read()
            .iter()
            .filter(|r| r.status == ApprovalStatus::Pending)
            .cloned()
            .collect()
    }

    /// Look up any request by ID.
    pub fn get(&self, approval_id: &str) -> Option<ApprovalRequest> {
        self.requests.read().iter().find(|r| r.id == approval_id).cloned()
    }

    pub fn report(&self) -> ApprovalReport {
        ApprovalReport {
            total_requested: self.total_requested.load(Ordering::Relaxed),
            pending: self.pending().len() as u64,
            approved: self.total_approved.load(Ordering::Relaxed),
            denied: self.total_denied.load(Ordering::Relaxed),
        }
    }
}
