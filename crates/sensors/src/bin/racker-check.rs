//! racker-check: evaluate rack descriptors against a state snapshot.
//!
//! Loads the descriptor root, evaluates one rack (or every rack) and prints
//! the result. Exit code is 0 when every checked rack is clear, 2 when any
//! rack is in alarm and 1 on errors, so it can drive shell scripts and
//! monitoring checks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{error, info, warn};

use racker_core::{Config, RackConfig};
use racker_sensors::layout::{RackLayout, StatusIndicator};
use racker_sensors::loader::{DescriptorLoader, LoadStatus, ModelStatus};
use racker_sensors::validation::{validate_rack, ValidationResult};
use racker_sensors::{evaluate_rack, AlarmTransition, RackAlarm, RackReport, StateLookup, StateSnapshot};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Rack sensor check: evaluates sensor expressions and reports rack alarms.
#[derive(Parser, Debug)]
#[command(name = "racker-check", version, about)]
struct Cli {
    /// Descriptor root containing `racks/` and `models/`. Overrides `RACKER_DATA_DIR`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Rack id to check. Checks every loaded rack when omitted.
    #[arg(long)]
    rack: Option<String>,

    /// JSON state snapshot: a map of entity id to `{"state": ..}` or a list of
    /// entity states. Overrides `RACKER_STATES_FILE`.
    #[arg(long)]
    states: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Validate descriptors instead of evaluating them.
    #[arg(long)]
    validate: bool,

    /// Keep running: hot-reload descriptors and re-evaluate periodically.
    #[arg(long)]
    watch: bool,

    /// Seconds between passes in watch mode.
    #[arg(long, env = "RACKER_CHECK_INTERVAL", default_value_t = 10)]
    interval: u64,
}

// ── Output ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CheckOutput {
    rack: String,
    evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: RackReport,
}

#[derive(Serialize)]
struct ValidateOutput {
    rack: String,
    #[serde(flatten)]
    result: ValidationResult,
}

fn print_text(rack_id: &str, rack: &RackConfig, report: &RackReport, loader: &DescriptorLoader, url_root: &str) {
    println!("{} [{}]", rack.name.as_deref().unwrap_or(rack_id), report.alarm);
    let layout = RackLayout::new(rack, url_root);

    for (equipment, eq_report) in rack.equipment.iter().zip(&report.equipment) {
        let status = match StatusIndicator::for_report(&eq_report.sensors) {
            None => "unmonitored",
            Some(indicator) if indicator.blink => "ALARM",
            Some(_) => "ok",
        };
        let image = match loader.model_status(&equipment.model) {
            ModelStatus::Ready(model) => layout.image_url(equipment, &model),
            ModelStatus::Failed(error) => error,
            ModelStatus::Loading => "Loading...".to_string(),
        };
        println!("  {:<12} {:<24} {}", status, eq_report.label, image);
        for line in eq_report.sensors.tooltip_lines() {
            println!("      {}", line);
        }
    }
}

/// Every checked rack goes into one JSON array so the output stays a single document.
fn print_json<T: Serialize>(outputs: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outputs)?);
    Ok(())
}

// ── Passes ──────────────────────────────────────────────────────────

fn selected_racks(cli: &Cli, loader: &DescriptorLoader) -> anyhow::Result<Vec<(String, RackConfig)>> {
    match &cli.rack {
        Some(id) => Ok(vec![(id.clone(), loader.rack(id)?)]),
        None => loader
            .catalog()
            .rack_ids()
            .into_iter()
            .map(|id| -> anyhow::Result<(String, RackConfig)> {
                let rack = loader.rack(&id)?;
                Ok((id, rack))
            })
            .collect(),
    }
}

fn load_states(config: &Config) -> anyhow::Result<Option<StateSnapshot>> {
    if !config.monitoring.enabled {
        return Ok(None);
    }
    match &config.monitoring.states_file {
        Some(path) => {
            let snapshot = StateSnapshot::load(path)
                .with_context(|| format!("failed to read state snapshot {}", path.display()))?;
            info!(path = %path.display(), entities = snapshot.len(), "loaded state snapshot");
            Ok(Some(snapshot))
        }
        None => {
            warn!("no state snapshot configured, every sensor reads nominal");
            Ok(None)
        }
    }
}

/// One evaluation pass over the selected racks. Returns the worst alarm.
fn check_pass(
    cli: &Cli,
    config: &Config,
    loader: &DescriptorLoader,
    previous: &mut HashMap<String, RackAlarm>,
) -> anyhow::Result<RackAlarm> {
    let states = load_states(config)?;
    let lookup = states.as_ref().map(|s| s as &dyn StateLookup);
    let evaluated_at = Utc::now();
    let mut worst = RackAlarm::Clear;
    let mut outputs = Vec::new();

    for (id, rack) in selected_racks(cli, loader)? {
        let report = evaluate_rack(&rack.equipment, lookup);
        let last = previous.insert(id.clone(), report.alarm).unwrap_or_default();
        match RackAlarm::transition(last, report.alarm) {
            Some(AlarmTransition::Raised) => {
                let offenders: Vec<&str> = report.alarming().map(|eq| eq.label.as_str()).collect();
                info!(rack = %id, equipment = ?offenders, "rack alarm raised");
            }
            Some(AlarmTransition::Cleared) => info!(rack = %id, "rack alarm cleared"),
            None => {}
        }

        if report.alarm.is_alarm() {
            worst = RackAlarm::Alarm;
        }
        match cli.format {
            OutputFormat::Text => print_text(&id, &rack, &report, loader, &config.descriptors.url_root),
            OutputFormat::Json => outputs.push(CheckOutput {
                rack: id,
                evaluated_at,
                report,
            }),
        }
    }
    if cli.format == OutputFormat::Json {
        print_json(&outputs)?;
    }
    Ok(worst)
}

fn validate_pass(cli: &Cli, loader: &DescriptorLoader) -> anyhow::Result<bool> {
    let catalog = loader.catalog();
    let mut all_valid = true;
    let mut outputs = Vec::new();

    for (id, rack) in selected_racks(cli, loader)? {
        let result = validate_rack(&rack, &catalog);
        all_valid &= result.valid;
        match cli.format {
            OutputFormat::Json => outputs.push(ValidateOutput { rack: id, result }),
            OutputFormat::Text => {
                println!("{}: {}", id, if result.valid { "valid" } else { "INVALID" });
                for e in &result.errors {
                    match &e.suggestion {
                        Some(s) => println!("  error   {}: {} ({})", e.path, e.message, s),
                        None => println!("  error   {}: {}", e.path, e.message),
                    }
                }
                for w in &result.warnings {
                    println!("  warning {}: {}", w.path, w.message);
                }
            }
        }
    }
    if cli.format == OutputFormat::Json {
        print_json(&outputs)?;
    }
    Ok(all_valid)
}

/// Explicit flags win over the (profiled) environment configuration.
fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(dir) = &cli.data_dir {
        config.descriptors.data_dir = dir.clone();
    }
    if let Some(states) = &cli.states {
        config.monitoring.states_file = Some(states.clone());
    }
    config
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = apply_overrides(&cli, Config::from_env());
    config.log_summary();

    let mut loader = DescriptorLoader::new(config.descriptors.data_dir.clone());
    let results = loader.load_all()?;
    for result in &results {
        if let LoadStatus::Failed { error } = &result.status {
            warn!(path = %result.path.display(), error = %error, "descriptor not loaded");
        }
    }

    if cli.validate {
        let valid = validate_pass(&cli, &loader)?;
        return Ok(if valid { ExitCode::SUCCESS } else { ExitCode::from(1) });
    }

    let mut previous = HashMap::new();
    if !cli.watch {
        let alarm = check_pass(&cli, &config, &loader, &mut previous)?;
        return Ok(exit_code(alarm));
    }

    loader.watch()?;
    let interval = Duration::from_secs(cli.interval.max(1));
    info!(interval_secs = interval.as_secs(), "racker-check watching");
    loop {
        if let Err(e) = check_pass(&cli, &config, &loader, &mut previous) {
            error!(error = %e, "check pass failed");
        }
        thread::sleep(interval);
    }
}

fn exit_code(alarm: RackAlarm) -> ExitCode {
    match alarm {
        RackAlarm::Clear => ExitCode::SUCCESS,
        RackAlarm::Alarm => ExitCode::from(2),
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    racker_core::config::load_dotenv();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "racker-check failed");
            ExitCode::from(1)
        }
    }
}
