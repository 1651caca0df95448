use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use drisk_core::report::{PortfolioSummary, ProjectTrend, SprintExplanation, SprintRisk};
use drisk_core::{
    engineer_features, Actions, DataError, RiskEngine, RiskError, SimulationResult, SprintHistory,
    SprintRecord,
};
use drisk_model::ModelError;
use serde::Serialize;
use thiserror::Error;

pub mod config;

use config::{load_config, Config, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "drisk",
    version,
    about = "Early warning reports for sprint delivery risk",
    long_about = "drisk scores sprints with a trained delivery risk model.\n\n\
        Commands:\n  \
        summary   Portfolio overview, riskiest projects first\n  \
        trend     Predicted risk per sprint for one project\n  \
        score     Risk for a single sprint\n  \
        explain   Top risk drivers, change vs previous sprint, actions\n  \
        simulate  What-if: rescale raw metrics and rescore\n  \
        features  Engineered feature rows as JSON lines"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./drisk.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Portfolio summary over the latest sprint of every project
    Summary(SummaryArgs),
    /// Predicted risk trend for one project
    Trend(TrendArgs),
    /// Predicted risk for one sprint
    Score(SprintArgs),
    /// Explain the risk of one sprint
    Explain(ExplainArgs),
    /// Simulate interventions on one sprint
    Simulate(SimulateArgs),
    /// Dump engineered features as JSON lines
    Features(FeaturesArgs),
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Number of projects to list
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
struct TrendArgs {
    #[arg(long)]
    project: String,

    /// Change in percentage points that counts as a trend
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Debug, Args)]
struct SprintArgs {
    #[arg(long)]
    project: String,

    #[arg(long)]
    sprint: String,
}

#[derive(Debug, Args)]
struct ExplainArgs {
    #[command(flatten)]
    sprint: SprintArgs,

    /// Number of drivers to show
    #[arg(long)]
    top_k: Option<usize>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Project; without --sprint its latest sprint is used
    #[arg(long)]
    project: Option<String>,

    /// Sprint; without --project the first record in the history is used
    #[arg(long, requires = "project")]
    sprint: Option<String>,

    /// Proportional change to a raw field, e.g. dependency_blockers=-0.3
    #[arg(long = "action", value_name = "FIELD=DELTA", value_parser = parse_action, required = true)]
    actions: Vec<(String, f64)>,
}

#[derive(Debug, Args)]
struct FeaturesArgs {
    /// Restrict to one project
    #[arg(long)]
    project: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sprint history is empty")]
    EmptyHistory,
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

fn parse_action(raw: &str) -> Result<(String, f64), String> {
    let (field, delta) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=DELTA, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let delta: f64 = delta
        .trim()
        .parse()
        .map_err(|_| format!("invalid delta '{}' for {field}", delta.trim()))?;
    if !delta.is_finite() {
        return Err(format!("delta for {field} must be finite"));
    }
    Ok((field.to_string(), delta))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn main() {
    std::process::exit(run_cli());
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

struct Session {
    config: Config,
    engine: RiskEngine,
    history: SprintHistory,
}

impl Session {
    fn open(config: Config) -> Result<Self, CliError> {
        let engine =
            RiskEngine::from_artifacts(&config.model.artifact, &config.model.feature_schema)?
                .with_unknown_field_policy(config.analysis.unknown_action_fields);
        let history = SprintHistory::load(&config.data.history)?;
        Ok(Self {
            config,
            engine,
            history,
        })
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    // features needs no model
    if let Command::Features(args) = &cli.command {
        let history = SprintHistory::load(&config.data.history)?;
        return run_features(&history, args);
    }

    let session = Session::open(config)?;
    let analysis = &session.config.analysis;
    match &cli.command {
        Command::Summary(args) => {
            let limit = args.limit.unwrap_or(analysis.summary_limit);
            let summary = session
                .engine
                .portfolio_summary(&session.history, limit)?;
            emit(cli.json, &summary, render_summary)
        }
        Command::Trend(args) => {
            let threshold = args.threshold.unwrap_or(analysis.trend_threshold);
            let trend = session
                .engine
                .project_trend(&session.history, &args.project, threshold)?;
            emit(cli.json, &trend, render_trend)
        }
        Command::Score(args) => {
            let record = drisk_core::engine::find_sprint(
                &session.history,
                &args.project,
                &args.sprint,
            )?;
            let risk = session.engine.sprint_risk(record)?;
            emit(cli.json, &risk, render_risk)
        }
        Command::Explain(args) => {
            let top_k = args.top_k.unwrap_or(analysis.top_k);
            let explanation = session.engine.explain_sprint(
                &session.history,
                &args.sprint.project,
                &args.sprint.sprint,
                top_k,
            )?;
            emit(cli.json, &explanation, render_explanation)
        }
        Command::Simulate(args) => {
            let record = simulation_target(&session.history, args)?;
            let actions: Actions = args.actions.iter().cloned().collect();
            let result = session.engine.simulate(record, &actions)?;
            emit(cli.json, &result, |r| render_simulation(record, r))
        }
        Command::Features(_) => Ok(()),
    }
}

fn simulation_target<'h>(
    history: &'h SprintHistory,
    args: &SimulateArgs,
) -> Result<&'h SprintRecord, CliError> {
    match (&args.project, &args.sprint) {
        (Some(project), Some(sprint)) => {
            Ok(drisk_core::engine::find_sprint(history, project, sprint)?)
        }
        (Some(project), None) => history
            .latest_sprint(project)
            .ok_or_else(|| RiskError::ProjectNotFound(project.clone()).into()),
        (None, _) => history.first().ok_or(CliError::EmptyHistory),
    }
}

fn run_features(history: &SprintHistory, args: &FeaturesArgs) -> Result<(), CliError> {
    let records = history
        .records()
        .iter()
        .filter(|r| args.project.as_deref().map_or(true, |p| r.project_id == p));
    for record in records {
        println!(
            "{}",
            serde_json::to_string(&engineer_features(record).to_json())?
        );
    }
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl Fn(&T) -> String) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

fn render_summary(summary: &PortfolioSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total projects:      {}", summary.total_projects);
    let _ = writeln!(out, "High-risk sprints:   {}", summary.high_risk_sprints);
    match summary.observed_risk {
        Some(pct) => {
            let _ = writeln!(out, "Observed risk:       {pct:.1}%");
        }
        None => {
            let _ = writeln!(out, "Observed risk:       n/a");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>8} {:>10}  {}",
        "PROJECT", "SPRINT", "RISK", "SLIPPAGE", "BAND"
    );
    for p in &summary.projects {
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>7.1}% {:>10.1}  {}",
            p.project_id, p.latest_sprint, p.current_risk, p.milestone_slippage_days, p.band
        );
    }
    out
}

fn render_trend(trend: &ProjectTrend) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project {}", trend.project_id);
    let _ = writeln!(
        out,
        "{:>8} {:>8} {:>10} {:>8} {:>10}",
        "SPRINT", "RISK", "VELOCITY", "SCOPE", "SLIPPAGE"
    );
    for p in &trend.points {
        let _ = writeln!(
            out,
            "{:>8} {:>7.1}% {:>10.1} {:>8.1} {:>10.1}",
            p.sprint_id,
            p.predicted_risk,
            p.velocity_change_pct,
            p.scope_change_requests,
            p.milestone_slippage_days
        );
    }
    let _ = writeln!(out, "{} ({:+.1} pts)", trend.trend.label(), trend.change);
    out
}

fn render_risk(risk: &SprintRisk) -> String {
    format!(
        "{} sprint {}: {:.1}% ({})\n",
        risk.project_id, risk.sprint_id, risk.risk, risk.band
    )
}

fn render_explanation(e: &SprintExplanation) -> String {
    let mut out = render_risk(&e.risk);
    let _ = writeln!(out, "\nTop risk drivers:");
    for d in &e.drivers {
        let _ = writeln!(out, "  {:<28} {:+.4}", d.feature, d.value);
    }
    if let Some(prev) = &e.previous_sprint {
        let _ = writeln!(out, "\nChange since sprint {prev}:");
        for d in &e.changes {
            let _ = writeln!(out, "  {:<28} {:+.4}", d.feature, d.value);
        }
    }
    if !e.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommended actions:");
        for action in &e.recommendations {
            let _ = writeln!(out, "  - {action}");
        }
    }
    out
}

fn render_simulation(record: &SprintRecord, r: &SimulationResult) -> String {
    format!(
        "{} sprint {}: {:.1}% -> {:.1}% ({:+.1} pts)\n",
        record.project_id, record.sprint_id, r.baseline_risk, r.new_risk, r.risk_change
    )
}
