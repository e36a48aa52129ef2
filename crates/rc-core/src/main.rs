//! Riskcast Core - forecasting and scoring CLI
//!
//! The binary is a thin shell over the library:
//! - `forecast`: aggregate rows, estimate trends and breaches, score
//! - `score`: composite risk index from organization-level counts
//! - `check`: validate the effective policy
//! - `config`: show the effective policy or list presets
//!
//! Payloads go to stdout; logs and errors go to stderr.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rc_common::error::StructuredError;
use rc_common::{Error, OutputFormat, RunId, TimeSeriesPoint, SCHEMA_VERSION};
use rc_config::preset::list_presets;
use rc_config::{load_policy, LoadedPolicy, PresetName, ValidationError};
use rc_core::exit_codes::ExitCode;
use rc_core::logging::{event_names, init_logging, LogConfig, LogContext, LogFormat, Stage};
use rc_core::output::{ForecastOutput, ScoreOutput};
use rc_core::{
    build_insights, log_event, score, Accumulate, Bucketing, ForecastEngine, ForecastRequest,
    RiskInputs, TimeWindow,
};
use std::path::{Path, PathBuf};

/// Riskcast Core - trend, breach, and composite risk estimation
#[derive(Parser)]
#[command(name = "rc-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Policy file (overrides RC_POLICY and config directories)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Use a built-in preset instead of a policy file (balanced, sensitive, relaxed)
    #[arg(long, global = true, conflicts_with = "policy")]
    preset: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast trends and threshold breaches from a rows file
    Forecast(ForecastArgs),

    /// Compute the composite risk index from organization-level counts
    Score(ScoreArgs),

    /// Validate the effective policy
    Check,

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct ForecastArgs {
    /// JSON array of {timestamp, value, category} rows
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Organization the rows belong to
    #[arg(long, default_value = "default")]
    org: String,

    /// Bucket granularity
    #[arg(long, value_enum, default_value_t = BucketArg::Week)]
    bucket: BucketArg,

    /// Count rows per bucket instead of summing values
    #[arg(long)]
    count: bool,

    /// Zero-fill buckets with no rows (requires --from/--to)
    #[arg(long, requires = "from")]
    dense: bool,

    /// Window start (RFC 3339 or YYYY-MM-DD)
    #[arg(long, requires = "to", value_parser = parse_start)]
    from: Option<DateTime<Utc>>,

    /// Window end, inclusive (RFC 3339 or YYYY-MM-DD)
    #[arg(long, requires = "from", value_parser = parse_end)]
    to: Option<DateTime<Utc>>,

    /// Breach threshold for a category, as CATEGORY=VALUE (repeatable)
    #[arg(long = "threshold", value_parser = parse_threshold)]
    thresholds: Vec<(String, f64)>,

    /// JSON file with organization-level risk inputs for the composite index
    #[arg(long)]
    risk_inputs: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Incidents in the period
    #[arg(long)]
    incidents: u32,

    /// Percentage of controls tested effective (0-100)
    #[arg(long, allow_negative_numbers = true)]
    control_effectiveness: f64,

    /// Vendors rated high risk
    #[arg(long)]
    high_risk_vendors: u32,

    /// KRIs currently over threshold
    #[arg(long, default_value_t = 0)]
    kri_breaches: u32,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective policy
    Show,
    /// List built-in presets
    Presets,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BucketArg {
    Day,
    Week,
    Month,
}

impl From<BucketArg> for Bucketing {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Day => Bucketing::Day,
            BucketArg::Week => Bucketing::IsoWeek,
            BucketArg::Month => Bucketing::Month,
        }
    }
}

fn parse_date_or_datetime(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("expected RFC 3339 timestamp or YYYY-MM-DD, got '{}'", s))?;
    let naive = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    naive
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", s))
}

fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_or_datetime(s, false)
}

fn parse_end(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_or_datetime(s, true)
}

fn parse_threshold(s: &str) -> Result<(String, f64), String> {
    let (category, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=VALUE, got '{}'", s))?;
    let category = category.trim();
    if category.is_empty() {
        return Err("threshold category must not be empty".to_string());
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid threshold value '{}': {}", value, e))?;
    Ok((category.to_string(), value))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Ok
            };
            std::process::exit(code.as_i32());
        }
    };

    let base = LogConfig::from_env(None, cli.global.log_format);
    let level = base.level.adjusted(cli.global.verbose, cli.global.quiet);
    init_logging(&base.with_level(level));

    let exit_code = match &cli.command {
        Commands::Forecast(args) => run_forecast(&cli.global, args),
        Commands::Score(args) => run_score(&cli.global, args),
        Commands::Check => run_check(&cli.global),
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => run_config_show(&cli.global),
            ConfigCommands::Presets => run_config_presets(&cli.global),
        },
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Resolve and validate the policy, reporting failures in the requested format.
fn load_effective_policy(global: &GlobalOpts, ctx: &LogContext) -> Result<LoadedPolicy, ExitCode> {
    let preset = match global.preset.as_deref() {
        Some(name) => match PresetName::parse(name) {
            Some(preset) => Some(preset),
            None => {
                let err = ValidationError::UnknownPreset(name.to_string());
                output_error(global, &Error::from(err));
                return Err(ExitCode::ArgsError);
            }
        },
        None => None,
    };

    match load_policy(global.policy.as_deref(), preset) {
        Ok(loaded) => {
            log_event!(
                ctx,
                DEBUG,
                event_names::CONFIG_LOADED,
                Stage::Init,
                "policy loaded",
                source = loaded.snapshot.policy_source.as_str(),
                hash = loaded.snapshot.effective_hash.as_str()
            );
            Ok(loaded)
        }
        Err(e) => {
            log_event!(ctx, WARN, event_names::CONFIG_ERROR, Stage::Init, e.to_string());
            let code = ExitCode::for_validation_error(&e);
            output_error(global, &Error::from(e));
            Err(code)
        }
    }
}

/// Write an error to stderr: structured JSON for `--format json`, prose otherwise.
fn output_error(global: &GlobalOpts, error: &Error) {
    if global.format.is_machine() {
        eprintln!("{}", StructuredError::from(error).to_json_pretty());
    } else {
        eprintln!("{}", error.format_human());
    }
}

fn fail(global: &GlobalOpts, ctx: &LogContext, error: Error) -> ExitCode {
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "run failed",
        code = error.code()
    );
    output_error(global, &error);
    ExitCode::for_error(&error)
}

fn emit(global: &GlobalOpts, ctx: &LogContext, rendered: rc_common::Result<String>) -> bool {
    match rendered {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(e) => {
            log_event!(ctx, ERROR, event_names::INTERNAL_ERROR, Stage::Report, e.to_string());
            output_error(global, &e);
            false
        }
    }
}

fn read_file(path: &Path) -> rc_common::Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

// ============================================================================
// Commands
// ============================================================================

fn run_forecast(global: &GlobalOpts, args: &ForecastArgs) -> ExitCode {
    let run_id = RunId::new();
    let ctx = LogContext::new(run_id.to_string()).with_org_id(args.org.clone());
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "forecast started");

    let loaded = match load_effective_policy(global, &ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let rows = match read_file(&args.input).and_then(|raw| TimeSeriesPoint::parse_rows(&raw)) {
        Ok(rows) => rows,
        Err(e) => return fail(global, &ctx, e),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::INPUT_LOADED,
        Stage::Load,
        "rows loaded",
        rows = rows.len()
    );

    let mut request = ForecastRequest::new(args.org.as_str(), rows)
        .with_bucketing(args.bucket.into())
        .with_accumulate(if args.count {
            Accumulate::Count
        } else {
            Accumulate::Sum
        })
        .dense(args.dense);

    if let (Some(from), Some(to)) = (args.from, args.to) {
        match TimeWindow::new(from, to) {
            Ok(window) => request = request.with_window(window),
            Err(e) => return fail(global, &ctx, e),
        }
    }
    for (category, threshold) in &args.thresholds {
        request = request.with_threshold(category.clone(), *threshold);
    }
    if let Some(path) = &args.risk_inputs {
        match read_file(path).and_then(|raw| RiskInputs::parse_json(&raw)) {
            Ok(inputs) => request = request.with_risk_inputs(inputs),
            Err(e) => return fail(global, &ctx, e),
        }
    }

    let engine = ForecastEngine::new(loaded.policy.clone());
    let report = match engine.forecast(&request) {
        Ok(report) => report,
        Err(e) => return fail(global, &ctx, e),
    };
    let insights = build_insights(&report, &loaded.policy.insights);

    let output = ForecastOutput::new(run_id, loaded.snapshot, report, insights);
    let exit_code = output.exit_code();
    if !emit(global, &ctx, output.render(global.format)) {
        return ExitCode::InternalError;
    }

    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Report,
        "forecast finished",
        exit = exit_code.code_name()
    );
    exit_code
}

fn run_score(global: &GlobalOpts, args: &ScoreArgs) -> ExitCode {
    let run_id = RunId::new();
    let ctx = LogContext::new(run_id.to_string());

    let loaded = match load_effective_policy(global, &ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let inputs = RiskInputs {
        incident_count: args.incidents,
        control_effectiveness_pct: args.control_effectiveness,
        high_risk_vendor_count: args.high_risk_vendors,
        kri_breach_count: args.kri_breaches,
    };
    let composite = match score(&inputs, &loaded.policy.scoring) {
        Ok(composite) => composite,
        Err(e) => return fail(global, &ctx, e),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::SCORE_COMPUTED,
        Stage::Score,
        "risk index computed",
        risk_index = composite.overall_score
    );

    if emit(global, &ctx, ScoreOutput::new(run_id, composite).render(global.format)) {
        ExitCode::Ok
    } else {
        ExitCode::InternalError
    }
}

fn run_check(global: &GlobalOpts) -> ExitCode {
    let run_id = RunId::new();
    let ctx = LogContext::new(run_id.to_string());

    let loaded = match load_effective_policy(global, &ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let snapshot = &loaded.snapshot;

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "generated_at": Utc::now().to_rfc3339(),
                "status": "ok",
                "policy": snapshot,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string())
            );
        }
        OutputFormat::Summary => {
            println!("[{}] check: OK ({})", run_id, snapshot.policy_source);
        }
        OutputFormat::Md => {
            println!("# rc-core check");
            println!();
            println!("✓ policy: ok");
            println!("  Source: {}", snapshot.policy_source);
            match &snapshot.policy_path {
                Some(path) => println!("  Path: {}", path),
                None => println!("  Path: using built-in values"),
            }
            println!("  Hash: {}", snapshot.effective_hash);
        }
    }
    ExitCode::Ok
}

fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let run_id = RunId::new();
    let ctx = LogContext::new(run_id.to_string());

    let loaded = match load_effective_policy(global, &ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    match global.format {
        OutputFormat::Json => match loaded.policy.to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                output_error(global, &Error::from(e));
                return ExitCode::InternalError;
            }
        },
        OutputFormat::Summary => {
            let s = &loaded.snapshot.summary;
            println!(
                "[{}] policy {} from {}: threshold {}, window {}, breach cutoffs {:?}, horizon {}",
                run_id,
                loaded.policy.policy_id.as_deref().unwrap_or("unnamed"),
                loaded.snapshot.policy_source,
                s.trend_change_threshold,
                s.rolling_window,
                s.breach_cutoffs,
                s.max_horizon_days
            );
        }
        OutputFormat::Md => {
            let p = &loaded.policy;
            println!("# Effective policy");
            println!();
            println!("Source: {}", loaded.snapshot.policy_source);
            println!();
            println!("| Setting | Value |");
            println!("|---|---|");
            println!("| trend.change_threshold | {} |", p.trend.change_threshold);
            println!("| trend.rolling_window | {} |", p.trend.rolling_window);
            println!("| breach.max_horizon_days | {} |", p.breach.max_horizon_days);
            println!(
                "| breach cutoffs (critical/high/medium) | {}/{}/{} |",
                p.breach.critical_within_days, p.breach.high_within_days, p.breach.medium_within_days
            );
            println!("| scoring.categories | {} |", p.scoring.categories.join(", "));
            println!("| insights.min_confidence | {} |", p.insights.min_confidence);
            println!("| cache.ttl_seconds | {} |", p.cache.ttl_seconds);
        }
    }
    ExitCode::Ok
}

fn run_config_presets(global: &GlobalOpts) -> ExitCode {
    let presets = list_presets();
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "presets": presets,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string())
            );
        }
        OutputFormat::Summary => {
            let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
            println!("presets: {}", names.join(", "));
        }
        OutputFormat::Md => {
            println!("# Presets");
            println!();
            for preset in &presets {
                println!("- **{}**: {}", preset.name.as_str(), preset.description);
            }
        }
    }
    ExitCode::Ok
}
