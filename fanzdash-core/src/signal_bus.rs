//! # Signal Bus — fire-and-forget notifications between core layers
//!
//! Replaces the event-emitter side channel of the legacy console with an
//! explicit publish/subscribe abstraction. Every mutating core operation
//! announces itself here (classification, block, escalation, approval
//! traffic, crisis lifecycle), which doubles as the audit feed consumers
//! page through.
//!
//! Delivery semantics: synchronous broadcast, no acknowledgement, no
//! retry. A subscriber callback returns `()` and therefore cannot fail
//! the emitting operation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum signals retained before the oldest are pruned.
const MAX_SIGNAL_LOG: usize = 10_000;
/// Maximum concurrent subscribers.
const MAX_SUBSCRIBERS: usize = 128;

// ── Signal Types ─────────────────────────────────────────────────────────────

/// What happened. Determines routing to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SignalKind {
    /// A compliance check produced an event (always emitted).
    EventClassified,
    /// A classification blocked the originating action.
    ActionBlocked,
    /// A classification reached Critical or ImmediateBlock risk.
    Escalation,
    /// A human-review request was opened.
    ApprovalRequested,
    /// A pending approval was approved or denied.
    ApprovalResolved,
    /// A crisis was declared.
    CrisisDeclared,
    /// A crisis changed status.
    CrisisUpdated,
    /// A threat alert was created.
    AlertRaised,
    /// A threat alert was escalated into a crisis.
    AlertEscalated,
}

/// A signal flowing through the bus.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Signal {
    /// Unique signal ID (monotonic)
    pub id: u64,
    /// Unix timestamp (millis)
    pub timestamp_ms: i64,
    pub kind: SignalKind,
    /// Which component emitted this signal
    pub source: String,
    /// ID of the event/approval/crisis/alert the signal is about
    pub subject_id: String,
    /// Actor responsible for the underlying operation
    pub actor: String,
    /// Short human-readable title
    pub title: String,
    /// Structured detail payload
    pub details: HashMap<String, String>,
}

// ── Subscriber ───────────────────────────────────────────────────────────────

pub type SubscriberFn = Arc<dyn Fn(&Signal) + Send + Sync>;

struct Subscription {
    id: u64,
    name: String,
    filter_kind: Option<SignalKind>,
    callback: SubscriberFn,
}

// ── Signal Bus ───────────────────────────────────────────────────────────────

/// The bus connecting the compliance and crisis layers to their consumers.
pub struct SignalBus {
    subscriptions: RwLock<Vec<Subscription>>,
    signal_log: RwLock<Vec<Signal>>,
    next_signal_id: AtomicU64,
    next_sub_id: AtomicU64,
    total_published: AtomicU64,
    total_delivered: AtomicU64,
    total_dropped: AtomicU64,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            signal_log: RwLock::new(Vec::with_capacity(1024)),
            next_signal_id: AtomicU64::new(1),
            next_sub_id: AtomicU64::new(1),
            total_published: AtomicU64::new(0),
            total_delivered: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
        }
    }

    // ── Publishing ───────────────────────────────────────────────────────

    /// Publish a signal. Returns the assigned signal ID.
    pub fn publish(&self, mut signal: Signal) -> u64 {
        let id = self.next_signal_id.fetch_add(1, Ordering::Relaxed);
        signal.id = id;
        if signal.timestamp_ms == 0 {
            signal.timestamp_ms = chrono::Utc::now().timestamp_millis();
        }
        self.total_published.fetch_add(1, Ordering::Relaxed);

        debug!(
            id = id,
            kind = ?signal.kind,
            source = %signal.source,
            subject = %signal.subject_id,
            title = %signal.title,
            "Signal published"
        );

        let subs = self.subscriptions.read();
        for sub in subs.iter() {
            if sub.filter_kind.map_or(true, |k| k == signal.kind) {
                (sub.callback)(&signal);
                self.total_delivered.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut log = self.signal_log.write();
        if log.len() >= MAX_SIGNAL_LOG {
            let drain_count = MAX_SIGNAL_LOG / 10;
            log.drain(..drain_count);
            self.total_dropped.fetch_add(drain_count as u64, Ordering::Relaxed);
        }
        log.push(signal);

        id
    }

    /// Convenience: publish from a component with a detail map.
    pub fn emit(
        &self,
        kind: SignalKind,
        source: &str,
        subject_id: &str,
        actor: &str,
        title: &str,
        details: HashMap<String, String>,
    ) -> u64 {
        self.publish(Signal {
            id: 0,
            timestamp_ms: 0,
            kind,
            source: source.into(),
            subject_id: subject_id.into(),
            actor: actor.into(),
            title: title.into(),
            details,
        })
    }

    // ── Subscribing ──────────────────────────────────────────────────────

    /// Subscribe to signals, optionally to a single kind. Returns a
    /// subscription ID for later unsubscribe.
    pub fn subscribe(
        &self,
        name: &str,
        filter_kind: Option<SignalKind>,
        callback: SubscriberFn,
    ) -> u64 {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscriptions.write();
        if subs.len() >= MAX_SUBSCRIBERS {
            warn!(name = %name, "Max subscribers reached, dropping oldest");
            subs.remove(0);
        }
        subs.push(Subscription {
            id,
            name: name.into(),
            filter_kind,
            callback,
        });
        id
    }

    /// Remove a subscription by ID.
    pub fn unsubscribe(&self, sub_id: u64) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.id != sub_id);
        subs.len() < before
    }

    // ── Querying ─────────────────────────────────────────────────────────

    /// Most recent signals (up to `limit`), optionally filtered by kind.
    /// Newest first — this is the audit feed consumers page through.
    pub fn recent_signals(&self, limit: usize, kind: Option<SignalKind>) -> Vec<Signal> {
        let log = self.signal_log.read();
        log.iter()
            .rev()
            .filter(|s| kind.map_or(true, |k| s.kind == k))
            .take(limit)
            .cloned()
            .collect()
    }

    /// All retained signals about a specific subject.
    pub fn signals_for(&self, subject_id: &str) -> Vec<Signal> {
        let log = self.signal_log.read();
        log.iter()
            .filter(|s| s.subject_id == subject_id)
            .cloned()
            .collect()
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn total_published(&self) -> u64 {
        self.total_published.load(Ordering::Relaxed)
    }
    pub fn total_delivered(&self) -> u64 {
        self.total_delivered.load(Ordering::Relaxed)
    }
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }
    pub fn signal_log_size(&self) -> usize {
        self.signal_log.read().len()
    }
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }
    /// Names of the current subscribers, in registration order.
    pub fn subscriber_names(&self) -> Vec<String> {
        self.subscriptions.read().iter().map(|s| s.name.clone()).collect()
    }
}
