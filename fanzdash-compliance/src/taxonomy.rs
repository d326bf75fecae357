//! Violation Taxonomy — versioned rule table for the compliance engine
//!
//! Rules are data, not code: a TOML document (embedded builtin or an
//! operator-supplied file) is parsed into `RuleSpec`s and compiled into
//! `ViolationRule`s with ready regexes. All validation happens at load
//! time so classification itself can never fail:
//! - every rule carries at least one keyword or pattern
//! - every pattern must compile
//!
//! Keywords match as literal substrings of the lower-cased corpus;
//! patterns are regexes evaluated against the same corpus.

use crate::types::ViolationKind;
use fanzdash_core::{FanzError, FanzResult, RiskLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Builtin rule table, shipped with the crate as versioned data.
const BUILTIN_RULES: &str = include_str!("../config/violation_rules.toml");

// ── Rule Forms ───────────────────────────────────────────────────────────────

/// Serialized (TOML) form of a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub kind: ViolationKind,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    pub requires_approval: bool,
    pub blocks_action: bool,
    pub legal_reference: String,
    pub escalation_contact: String,
    pub auto_report_to_authorities: bool,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    version: String,
    #[serde(rename = "rule")]
    rules: Vec<RuleSpec>,
}

/// A compiled, immutable matching rule.
#[derive(Debug, Clone)]
pub struct ViolationRule {
    pub kind: ViolationKind,
    pub risk_level: RiskLevel,
    /// Lower-cased literal substrings
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
    pub requires_approval: bool,
    pub blocks_action: bool,
    pub legal_reference: String,
    pub escalation_contact: String,
    pub auto_report_to_authorities: bool,
}

impl ViolationRule {
    fn compile(spec: RuleSpec) -> FanzResult<Self> {
        if spec.keywords.is_empty() && spec.patterns.is_empty() {
            return Err(FanzError::Config(format!(
                "Rule {:?} has no keywords and no patterns",
                spec.kind
            )));
        }
        let mut patterns = Vec::with_capacity(spec.patterns.len());
        for p in &spec.patterns {
            let regex = Regex::new(p).map_err(|e| {
                FanzError::Config(format!("Rule {:?} pattern '{}' invalid: {}", spec.kind, p, e))
            })?;
            patterns.push(regex);
        }
        Ok(Self {
            kind: spec.kind,
            risk_level: spec.risk_level,
            keywords: spec.keywords.iter().map(|k| k.to_lowercase()).collect(),
            patterns,
            requires_approval: spec.requires_approval,
            blocks_action: spec.blocks_action,
            legal_reference: spec.legal_reference,
            escalation_contact: spec.escalation_contact,
            auto_report_to_authorities: spec.auto_report_to_authorities,
        })
    }

    /// A rule fires when any keyword is a substring of the corpus or any
    /// pattern matches it. The corpus is already lower-cased.
    pub fn fires(&self, corpus: &str) -> bool {
        self.keywords.iter().any(|kw| corpus.contains(kw.as_str()))
            || self.patterns.iter().any(|p| p.is_match(corpus))
    }
}

// ── Taxonomy ─────────────────────────────────────────────────────────────────

/// The full rule table, loaded once at startup and immutable afterwards.
#[derive(Debug)]
pub struct ViolationTaxonomy {
    version: String,
    rules: Vec<ViolationRule>,
}

impl ViolationTaxonomy {
    /// The rule table shipped with the crate.
    pub fn builtin() -> FanzResult<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Load a rule table from an operator-supplied TOML file.
    pub fn load(path: impl AsRef<Path>) -> FanzResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let taxonomy = Self::from_toml_str(&content)?;
        info!(
            path = %path.as_ref().display(),
            version = %taxonomy.version,
            rules = taxonomy.rules.len(),
            "Violation taxonomy loaded"
        );
        Ok(taxonomy)
    }

    /// Parse and compile a rule table from TOML text.
    pub fn from_toml_str(content: &str) -> FanzResult<Self> {
        let file: TaxonomyFile = toml::from_str(content)
            .map_err(|e| FanzError::Config(format!("Failed to parse rule table: {}", e)))?;
        if file.rules.is_empty() {
            return Err(FanzError::Config("Rule table contains no rules".into()));
        }
        let mut rules = Vec::with_capacity(file.rules.len());
        for spec in file.rules {
            rules.push(ViolationRule::compile(spec)?);
        }
        Ok(Self { version: file.version, rules })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[ViolationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
