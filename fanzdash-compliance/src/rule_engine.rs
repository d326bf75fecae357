//! Rule Engine — classifies actions and content against the taxonomy
//!
//! Features:
//! - Single-pass evaluation of every rule over one lower-cased corpus
//! - Order-independent aggregation (union of kinds, max severity)
//! - Block precedence: a blocked action never also requires approval
//! - Mandatory-report rules fan out to the authority notifier
//! - Emits classified / blocked / escalation signals on the bus
//!
//! Classification never fails: malformed content is opaque text.

use crate::event_log::ComplianceLog;
use crate::taxonomy::ViolationTaxonomy;
use crate::types::{ComplianceEvent, ViolationKind};
use fanzdash_core::{RiskLevel, SignalBus, SignalKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stored content snippets are truncated to this many characters.
const SNIPPET_MAX_CHARS: usize = 240;

// ── Authority Notifier ───────────────────────────────────────────────────────

/// External reporting capability (NCMEC-style). Fire-and-forget: the
/// callee cannot fail the classification that triggered it.
pub trait AuthorityNotifier: Send + Sync {
    fn notify(&self, kind: ViolationKind, actor_id: &str, action: &str, content: Option<&str>);
}

/// Default notifier: records the report in the log stream and counts it.
/// Production wiring swaps in a real reporting client.
#[derive(Default)]
pub struct LoggedNotifier {
    total_reports: AtomicU64,
}

impl LoggedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_reports(&self) -> u64 {
        self.total_reports.load(Ordering::Relaxed)
    }
}

impl AuthorityNotifier for LoggedNotifier {
    fn notify(&self, kind: ViolationKind, actor_id: &str, action: &str, _content: Option<&str>) {
        self.total_reports.fetch_add(1, Ordering::Relaxed);
        warn!(kind = ?kind, actor = %actor_id, action = %action, "Mandatory authority report dispatched");
    }
}

// ── Rule Engine ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RuleEngineReport {
    pub rules_loaded: u64,
    pub total_classified: u64,
    pub total_blocked: u64,
    pub total_escalated: u64,
    pub total_approval_required: u64,
}

pub struct RuleEngine {
    taxonomy: ViolationTaxonomy,
    log: Arc<ComplianceLog>,
    bus: Arc<SignalBus>,
    notifier: Arc<dyn AuthorityNotifier>,
    next_event_id: AtomicU64,
    total_classified: AtomicU64,
    total_blocked: AtomicU64,
    total_escalated: AtomicU64,
    total_approval_required: AtomicU64,
}

impl RuleEngine {
    pub fn new(
        taxonomy: ViolationTaxonomy,
        log: Arc<ComplianceLog>,
        bus: Arc<SignalBus>,
        notifier: Arc<dyn AuthorityNotifier>,
    ) -> Self {
        Self {
            taxonomy,
            log,
            bus,
            notifier,
            next_event_id: AtomicU64::new(1),
            total_classified: AtomicU64::new(0),
            total_blocked: AtomicU64::new(0),
            total_escalated: AtomicU64::new(0),
            total_approval_required: AtomicU64::new(0),
        }
    }

    pub fn taxonomy(&self) -> &ViolationTaxonomy {
        &self.taxonomy
    }

    // ── Core Classify ───────────────────────────────────────────────────────

    /// Classify an action/content payload. Always succeeds; the result
    /// is recorded in the compliance log and announced on the bus.
    pub fn classify(
        &self,
        action: &str,
        actor_id: &str,
        content: Option<&str>,
        metadata: Option<&HashMap<String, String>>,
    ) -> ComplianceEvent {
        let corpus = build_corpus(action, content, metadata);

        // Aggregation is union + max + or, so the outcome is identical
        // for any rule iteration order.
        let fired: Vec<_> = self.taxonomy.rules().iter().filter(|r| r.fires(&corpus)).collect();

        let mut violations: Vec<ViolationKind> = fired.iter().map(|r| r.kind).collect();
        violations.sort();
        violations.dedup();

        let risk_level =
            fired.iter().map(|r| r.risk_level).max().unwrap_or(RiskLevel::Low);
        let blocked = fired.iter().any(|r| r.blocks_action);
        let approval_required = !blocked && fired.iter().any(|r| r.requires_approval);
        let escalated = risk_level.escalates();

        for rule in fired.iter().filter(|r| r.auto_report_to_authorities) {
            self.notifier.notify(rule.kind, actor_id, action, content);
        }

        let details = if fired.is_empty() {
            "No violations detected".to_string()
        } else {
            format!(
                "Matched {} rule(s): {:?}; risk {:?}; blocked={}; approval_required={}",
                fired.len(),
                violations,
                risk_level,
                blocked,
                approval_required
            )
        };

        let id = format!("evt-{}", self.next_event_id.fetch_add(1, Ordering::Relaxed));
        let event = ComplianceEvent {
            id: id.clone(),
            timestamp: chrono::Utc::now().timestamp(),
            actor_id: actor_id.into(),
            action: action.into(),
            content_snippet: content.map(truncate_snippet),
            risk_level,
            violations,
            blocked,
            approval_required,
            escalated,
            details,
        };

        self.total_classified.fetch_add(1, Ordering::Relaxed);
        if blocked {
            self.total_blocked.fetch_add(1, Ordering::Relaxed);
        }
        if escalated {
            self.total_escalated.fetch_add(1, Ordering::Relaxed);
        }
        if approval_required {
            self.total_approval_required.fetch_add(1, Ordering::Relaxed);
        }

        self.log.record(event.clone());

        debug!(
            id = %event.id,
            actor = %actor_id,
            action = %action,
            risk = ?event.risk_level,
            violations = event.violations.len(),
            "Event classified"
        );

        let mut sig_details = HashMap::new();
        sig_details.insert("risk_level".into(), format!("{:?}", event.risk_level));
        sig_details.insert("violations".into(), format!("{:?}", event.violations));
        self.bus.emit(
            SignalKind::EventClassified,
            "rule_engine",
            &event.id,
            actor_id,
            &format!("Classified '{}'", action),
            sig_details,
        );

        if event.blocked {
            warn!(id = %event.id, actor = %actor_id, action = %action, "Action blocked");
            self.bus.emit(
                SignalKind::ActionBlocked,
                "rule_engine",
                &event.id,
                actor_id,
                &format!("Blocked '{}'", action),
                HashMap::new(),
            );
        }
        if event.escalated {
            warn!(id = %event.id, actor = %actor_id, risk = ?event.risk_level, "Escalation");
            self.bus.emit(
                SignalKind::Escalation,
                "rule_engine",
                &event.id,
                actor_id,
                &format!("Escalated '{}'", action),
                HashMap::new(),
            );
        }

        event
    }

    pub fn report(&self) -> RuleEngineReport {
        RuleEngineReport {
            rules_loaded: self.taxonomy.len() as u64,
            total_classified: self.total_classified.load(Ordering::Relaxed),
            total_blocked: self.total_blocked.load(Ordering::Relaxed),
            total_escalated: self.total_escalated.load(Ordering::Relaxed),
            total_approval_required: self.total_approval_required.load(Ordering::Relaxed),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Concatenate action, content, and metadata (sorted key=value pairs,
/// so the corpus is deterministic) into one lower-cased search string.
fn build_corpus(
    action: &str,
    content: Option<&str>,
    metadata: Option<&HashMap<String, String>>,
) -> String {
    let mut parts = vec![action.to_string()];
    if let Some(c) = content {
        parts.push(c.to_string());
    }
    if let Some(m) = metadata {
        let mut pairs: Vec<_> = m.iter().collect();
        pairs.sort();
        for (k, v) in pairs {
            parts.push(format!("{}={}", k, v));
        }
    }
    parts.join(" ").to_lowercase()
}

fn truncate_snippet(content: &str) -> String {
    match content.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}
