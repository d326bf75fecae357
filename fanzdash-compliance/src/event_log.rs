//! Compliance Event Log — bounded, time-ordered record of classifications
//!
//! Source of truth for status queries and audit. Retains the newest
//! 1000 events; beyond that the oldest entry is evicted first (FIFO).
//! Events are immutable after creation. No persistence: a process
//! restart loses the log, by design.

use crate::types::ComplianceEvent;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default retention cap.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ComplianceLogReport {
    pub total_recorded: u64,
    pub retained: u64,
    pub evicted: u64,
    pub blocked: u64,
    pub escalated: u64,
}

pub struct ComplianceLog {
    events: RwLock<Vec<ComplianceEvent>>,
    capacity: usize,
    total_recorded: AtomicU64,
    total_evicted: AtomicU64,
}

impl Default for ComplianceLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
            total_recorded: AtomicU64::new(0),
            total_evicted: AtomicU64::new(0),
        }
    }

    /// Append an event, evicting the oldest entry once at capacity.
    pub fn record(&self, event: ComplianceEvent) {
        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        let mut events = self.events.write();
        if events.len() >= self.capacity {
            events.remove(0);
            self.total_evicted.fetch_add(1, Ordering::Relaxed);
        }
        events.push(event);
    }

    /// Look up a retained event by ID.
    pub fn get(&self, id: &str) -> Option<ComplianceEvent> {
        self.events.read().iter().find(|e| e.id == id).cloned()
    }

    /// The most recent `limit` events, oldest of the slice first and
    /// newest last.
    pub fn recent(&self, limit: usize) -> Vec<ComplianceEvent> {
        let events = self.events.read();
        let start = events.len().saturating_sub(limit);
        events[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }

    pub fn total_evicted(&self) -> u64 {
        self.total_evicted.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> ComplianceLogReport {
        let events = self.events.read();
        ComplianceLogReport {
            total_recorded: self.total_recorded.load(Ordering::Relaxed),
            retained: events.len() as u64,
            evicted: self.total_evicted.load(Ordering::Relaxed),
            blocked: events.iter().filter(|e| e.blocked).count() as u64,
            escalated: events.iter().filter(|e| e.escalated).count() as u64,
        }
    }
}
