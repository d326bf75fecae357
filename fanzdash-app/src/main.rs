use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fanzdash_compliance::approval::ApprovalWorkflow;
use fanzdash_compliance::event_log::ComplianceLog;
use fanzdash_compliance::rule_engine::{LoggedNotifier, RuleEngine};
use fanzdash_compliance::taxonomy::ViolationTaxonomy;
use fanzdash_core::{CrisisSeverity, FanzConfig, SignalBus};
use fanzdash_crisis::lifecycle::NewAlert;
use fanzdash_crisis::{CommandCenter, ConfidenceTier, CrisisManager, PlanCatalog, StaticMetrics};

#[derive(Parser, Debug)]
#[command(name = "fanzdash", version, about = "FanzDash — compliance and crisis core")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "fanzdash.toml")]
    config: String,

    /// Violation rule table path (overrides config; empty = builtin)
    #[arg(long, default_value = "")]
    rules: String,

    /// Response plan catalog path (overrides config; empty = builtin)
    #[arg(long, default_value = "")]
    plans: String,

    /// Log level (overrides config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Generate a default config file and exit
    #[arg(long)]
    generate_config: bool,

    /// Dry-run: load config and data tables, validate, print report, exit
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Generate Config ──────────────────────────────────────────────
    if cli.generate_config {
        let config = FanzConfig::default();
        config.save(&cli.config).map_err(|e| anyhow::anyhow!(e))?;
        println!("Default configuration written to {}", cli.config);
        return Ok(());
    }

    // ── Load Config ──────────────────────────────────────────────────
    let config = FanzConfig::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: {}, using defaults", e);
        FanzConfig::default()
    });

    let log_level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);

    // ── Tracing ──────────────────────────────────────────────────────
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("FanzDash core v{}", env!("CARGO_PKG_VERSION"));

    // ── Data Tables ──────────────────────────────────────────────────
    let rules_path = if !cli.rules.is_empty() {
        cli.rules.clone()
    } else {
        config.compliance.rules_path.clone()
    };
    let taxonomy = if rules_path.is_empty() {
        ViolationTaxonomy::builtin()?
    } else {
        ViolationTaxonomy::load(&rules_path)?
    };
    info!(version = %taxonomy.version(), rules = taxonomy.len(), "Violation taxonomy ready");

    let plans_path = if !cli.plans.is_empty() {
        cli.plans.clone()
    } else {
        config.crisis.plans_path.clone()
    };
    let plans = if plans_path.is_empty() {
        Arc::new(PlanCatalog::builtin()?)
    } else {
        Arc::new(PlanCatalog::load(&plans_path)?)
    };
    info!(version = %plans.version(), plans = plans.len(), "Response plan catalog ready");

    // ── Core Stack ───────────────────────────────────────────────────
    let bus = Arc::new(SignalBus::new());
    let log = Arc::new(ComplianceLog::with_capacity(config.compliance.event_log_capacity));
    let notifier = Arc::new(LoggedNotifier::new());
    let engine = Arc::new(RuleEngine::new(taxonomy, log.clone(), bus.clone(), notifier));
    let approvals = Arc::new(ApprovalWorkflow::new(log.clone(), bus.clone()));
    let crisis_manager = Arc::new(CrisisManager::new(plans, bus.clone()));
    let command_center = CommandCenter::new(
        crisis_manager.clone(),
        Arc::new(StaticMetrics),
        &config.rosters,
        config.crisis.backlog_alert_threshold,
    );
    info!("Core stack initialized");

    // ── Dry Run ──────────────────────────────────────────────────────
    if cli.dry_run {
        info!(
            rules = engine.report().rules_loaded,
            event_log_capacity = config.compliance.event_log_capacity,
            rosters = config.rosters.len(),
            "Dry-run complete. Configuration valid."
        );
        return Ok(());
    }

    // ── Demo Flow ────────────────────────────────────────────────────
    // A short end-to-end pass so the binary shows the core working:
    // classify traffic, run one approval, escalate one alert, snapshot.
    let clean = engine.classify("upload", "creator-101", Some("beach photo set"), None);
    info!(id = %clean.id, risk = ?clean.risk_level, "Clean upload classified");

    let flagged = engine.classify(
        "publish",
        "creator-102",
        Some("reposted set, performer has no id on file"),
        None,
    );
    if flagged.approval_required {
        let request = approvals.request_approval(&flagged.id, "mod-queue")?;
        approvals.resolve_approval(&request.id, false, "compliance-officer", Some("Records missing"))?;
    }

    let blocked = engine.classify("upload", "creator-103", Some("underage model content"), None);
    info!(id = %blocked.id, blocked = blocked.blocked, "Prohibited upload handled");

    let alert = crisis_manager.create_alert(NewAlert {
        category: "security".into(),
        severity: CrisisSeverity::High,
        title: "Credential stuffing against creator logins".into(),
        description: "Login failure spike from residential proxies".into(),
        source: "auth-monitor".into(),
        indicators: vec!["198.51.100.0/24".into()],
        affected_systems: vec!["login-gateway".into()],
        confidence: ConfidenceTier::High,
    });
    crisis_manager.escalate_to_crisis(&alert.id, "soc-analyst")?;

    // ── Snapshot ─────────────────────────────────────────────────────
    let snapshot = command_center.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    info!(
        classified = engine.report().total_classified,
        approvals = approvals.report().total_requested,
        crises = crisis_manager.report().total_declared,
        signals = bus.total_published(),
        "FanzDash demo flow complete"
    );

    Ok(())
}
