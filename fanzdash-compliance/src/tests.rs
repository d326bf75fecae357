#[cfg(test)]
mod tests {
    use crate::approval::ApprovalWorkflow;
    use crate::event_log::ComplianceLog;
    use crate::rule_engine::{AuthorityNotifier, RuleEngine};
    use crate::taxonomy::ViolationTaxonomy;
    use crate::types::*;
    use fanzdash_core::{FanzError, RiskLevel, SignalBus, SignalKind};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn engine() -> (RuleEngine, Arc<ComplianceLog>, Arc<SignalBus>) {
        let log = Arc::new(ComplianceLog::new());
        let bus = Arc::new(SignalBus::new());
        let notifier = Arc::new(crate::rule_engine::LoggedNotifier::new());
        let engine = RuleEngine::new(
            ViolationTaxonomy::builtin().unwrap(),
            log.clone(),
            bus.clone(),
            notifier,
        );
        (engine, log, bus)
    }

    fn dummy_event(id: &str) -> ComplianceEvent {
        ComplianceEvent {
            id: id.into(),
            timestamp: 100,
            actor_id: "user-1".into(),
            action: "upload".into(),
            content_snippet: None,
            risk_level: RiskLevel::Low,
            violations: vec![],
            blocked: false,
            approval_required: false,
            escalated: false,
            details: "test".into(),
        }
    }

    // ── Taxonomy ─────────────────────────────────────────────────────────

    #[test]
    fn test_builtin_taxonomy_loads() {
        let tax = ViolationTaxonomy::builtin().unwrap();
        assert!(!tax.is_empty());
        assert!(!tax.version().is_empty());
        for rule in tax.rules() {
            assert!(!rule.keywords.is_empty() || !rule.patterns.is_empty());
        }
    }

    #[test]
    fn test_taxonomy_rejects_rule_without_matchers() {
        let toml = r#"
            version = "t"
            [[rule]]
            kind = "CopyrightInfringement"
            risk_level = "Medium"
            requires_approval = true
            blocks_action = false
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
        "#;
        let err = ViolationTaxonomy::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, FanzError::Config(_)));
    }

    #[test]
    fn test_taxonomy_rejects_invalid_pattern() {
        let toml = r#"
            version = "t"
            [[rule]]
            kind = "CopyrightInfringement"
            risk_level = "Medium"
            patterns = ['[unclosed']
            requires_approval = true
            blocks_action = false
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
        "#;
        let err = ViolationTaxonomy::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, FanzError::Config(_)));
    }

    // ── Rule Engine ──────────────────────────────────────────────────────

    #[test]
    fn test_classify_clean_content() {
        let (engine, log, _bus) = engine();
        let event = engine.classify("upload", "user-1", Some("sunset photo set"), None);
        assert_eq!(event.risk_level, RiskLevel::Low);
        assert!(event.violations.is_empty());
        assert!(!event.blocked);
        assert!(!event.approval_required);
        assert!(!event.escalated);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_classify_csam_keyword_blocks_and_escalates() {
        let (engine, _log, bus) = engine();
        let event = engine.classify("upload", "user-9", Some("minor performer"), None);
        assert_eq!(event.risk_level, RiskLevel::ImmediateBlock);
        assert_eq!(event.violations, vec![ViolationKind::ChildExploitation]);
        assert!(event.blocked);
        assert!(!event.approval_required);
        assert!(event.escalated);

        assert_eq!(bus.recent_signals(10, Some(SignalKind::ActionBlocked)).len(), 1);
        assert_eq!(bus.recent_signals(10, Some(SignalKind::Escalation)).len(), 1);
    }

    #[test]
    fn test_block_takes_precedence_over_approval() {
        let (engine, _log, _bus) = engine();
        // Fires the 2257 rule (requires approval) and the child
        // exploitation rule (blocks) together.
        let event = engine.classify(
            "upload",
            "user-2",
            Some("unverified performer, possibly underage model"),
            None,
        );
        assert!(event.blocked);
        assert!(!event.approval_required);
        assert!(event.violations.contains(&ViolationKind::ChildExploitation));
        assert!(event.violations.contains(&ViolationKind::SectionComplianceViolation));
    }

    #[test]
    fn test_risk_level_is_max_of_fired_rules() {
        let (engine, _log, _bus) = engine();
        // Copyright (Medium) + 2257 (High), neither blocks.
        let event = engine.classify(
            "publish",
            "user-3",
            Some("stolen content from a shoot with no id on file"),
            None,
        );
        assert_eq!(event.risk_level, RiskLevel::High);
        assert!(event.approval_required);
        assert!(!event.blocked);
        assert!(!event.escalated);
        assert_eq!(
            event.violations,
            vec![ViolationKind::SectionComplianceViolation, ViolationKind::CopyrightInfringement]
        );
    }

    #[test]
    fn test_metadata_participates_in_matching() {
        let (engine, _log, _bus) = engine();
        let mut metadata = HashMap::new();
        metadata.insert("payout_note".into(), "cash out anonymously please".into());
        let event = engine.classify("withdraw", "user-4", None, Some(&metadata));
        assert_eq!(event.violations, vec![ViolationKind::MoneyLaundering]);
        assert_eq!(event.risk_level, RiskLevel::Critical);
        assert!(event.escalated);
    }

    #[test]
    fn test_classification_is_rule_order_independent() {
        let forward = r#"
            version = "t"
            [[rule]]
            kind = "CopyrightInfringement"
            risk_level = "Medium"
            keywords = ["pirated"]
            requires_approval = true
            blocks_action = false
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
            [[rule]]
            kind = "MoneyLaundering"
            risk_level = "Critical"
            keywords = ["structuring"]
            requires_approval = false
            blocks_action = true
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
        "#;
        let reversed = r#"
            version = "t"
            [[rule]]
            kind = "MoneyLaundering"
            risk_level = "Critical"
            keywords = ["structuring"]
            requires_approval = false
            blocks_action = true
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
            [[rule]]
            kind = "CopyrightInfringement"
            risk_level = "Medium"
            keywords = ["pirated"]
            requires_approval = true
            blocks_action = false
            legal_reference = "x"
            escalation_contact = "y"
            auto_report_to_authorities = false
        "#;

        let make = |toml: &str| {
            RuleEngine::new(
                ViolationTaxonomy::from_toml_str(toml).unwrap(),
                Arc::new(ComplianceLog::new()),
                Arc::new(SignalBus::new()),
                Arc::new(crate::rule_engine::LoggedNotifier::new()),
            )
        };

        let content = Some("pirated clip funded by structuring");
        let a = make(forward).classify("upload", "u", content, None);
        let b = make(reversed).classify("upload", "u", content, None);

        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.violations, b.violations);
        assert_eq!(a.blocked, b.blocked);
        assert_eq!(a.approval_required, b.approval_required);
        assert_eq!(a.escalated, b.escalated);
    }

    #[test]
    fn test_authority_notifier_fires_per_reportable_rule() {
        struct CountingNotifier(AtomicU64);
        impl AuthorityNotifier for CountingNotifier {
            fn notify(&self, _k: ViolationKind, _a: &str, _ac: &str, _c: Option<&str>) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let notifier = Arc::new(CountingNotifier(AtomicU64::new(0)));
        let engine = RuleEngine::new(
            ViolationTaxonomy::builtin().unwrap(),
            Arc::new(ComplianceLog::new()),
            Arc::new(SignalBus::new()),
            notifier.clone(),
        );

        // Child exploitation auto-reports; 2257 does not.
        engine.classify("upload", "user-9", Some("csam"), None);
        engine.classify("upload", "user-9", Some("no id on file"), None);
        assert_eq!(notifier.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_snippet_truncation() {
        let (engine, _log, _bus) = engine();
        let long_content = "a".repeat(600);
        let event = engine.classify("upload", "user-5", Some(&long_content), None);
        assert_eq!(event.content_snippet.unwrap().chars().count(), 240);
    }

    // ── Event Log ────────────────────────────────────────────────────────

    #[test]
    fn test_event_log_fifo_eviction_at_capacity() {
        let log = ComplianceLog::new();
        for i in 0..1001 {
            log.record(dummy_event(&format!("evt-{}", i)));
        }
        assert_eq!(log.len(), 1000);
        assert!(log.get("evt-0").is_none());
        assert!(log.get("evt-1").is_some());
        assert!(log.get("evt-1000").is_some());
        assert_eq!(log.total_evicted(), 1);
    }

    #[test]
    fn test_recent_returns_newest_last() {
        let log = ComplianceLog::new();
        for i in 0..20 {
            log.record(dummy_event(&format!("evt-{}", i)));
        }
        let recent = log.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, "evt-15");
        assert_eq!(recent[4].id, "evt-19");
    }

    // ── Approval Workflow ────────────────────────────────────────────────

    #[test]
    fn test_request_approval_for_unknown_event_fails() {
        let log = Arc::new(ComplianceLog::new());
        let wf = ApprovalWorkflow::new(log, Arc::new(SignalBus::new()));
        let err = wf.request_approval("evt-missing", "mod-1").unwrap_err();
        assert!(matches!(err, FanzError::NotFound { .. }));
    }

    #[test]
    fn test_approval_lifecycle() {
        let (engine, log, bus) = engine();
        let event = engine.classify("publish", "user-6", Some("no id on file"), None);
        assert!(event.approval_required);

        let wf = ApprovalWorkflow::new(log, bus.clone());
        let request = wf.request_approval(&event.id, "mod-1").unwrap();
        assert_eq!(request.status, ApprovalStatus::Pending);
        assert_eq!(wf.pending().len(), 1);

        let approved = wf.resolve_approval(&request.id, true, "admin-1", Some("verified")).unwrap();
        assert!(approved);
        assert!(wf.pending().is_empty());

        let resolved = wf.get(&request.id).unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Approved);
        assert_eq!(resolved.approver.as_deref(), Some("admin-1"));
        assert_eq!(bus.recent_signals(10, Some(SignalKind::ApprovalResolved)).len(), 1);
    }

    #[test]
    fn test_double_resolution_is_invalid_transition() {
        let (engine, log, bus) = engine();
        let event = engine.classify("publish", "user-7", Some("pirated"), None);

        let wf = ApprovalWorkflow::new(log, bus);
        let request = wf.request_approval(&event.id, "mod-1").unwrap();
        assert!(!wf.resolve_approval(&request.id, false, "admin-1", None).unwrap());

        let err = wf.resolve_approval(&request.id, true, "admin-2", None).unwrap_err();
        assert!(matches!(err, FanzError::InvalidTransition(_)));
    }

    #[test]
    fn test_resolve_unknown_approval_fails() {
        let wf = ApprovalWorkflow::new(Arc::new(ComplianceLog::new()), Arc::new(SignalBus::new()));
        let err = wf.resolve_approval("apr-missing", true, "admin-1", None).unwrap_err();
        assert!(matches!(err, FanzError::NotFound { .. }));
    }
}
