//! pb-allocator CLI - compare participatory budgeting allocation methods
//!
//! Commands:
//! - `run` executes methods on a data directory and stores a results bundle
//! - `methods` and `metrics` list what can be selected
//! - `create-constraints` derives spending bounds from the group budgets

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod output;

pub use error::{CliError, CliResult};
pub use output::OutputFormat;

use crate::adapters::pabulib::{write_constraints, PabulibDirectory};
use crate::adapters::results::{FsResultsStore, LogCapture};
use crate::application::{RunComparisonCommand, RunComparisonHandler, METHODS};
use crate::config::{AppConfig, ConfigError, LogFormat, LoggingConfig, MethodParameters};
use crate::domain::metrics::METRICS;
use output::{print_output, ConstraintRow, MethodRow, MetricRow, OutcomeRow};

/// pb-allocator CLI application
#[derive(Parser)]
#[command(name = "pb-allocator")]
#[command(about = "Participatory budgeting allocation with per-district spending bounds", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run methods and compare them with metrics
    Run {
        /// Method to run (`all` to run every method)
        #[arg(short = 'm', long = "method")]
        methods: Vec<String>,

        /// Metric to compute on the outcomes (`all` for every metric)
        #[arg(short = 'c', long = "metric")]
        metrics: Vec<String>,

        /// Directory with the .pb files
        #[arg(short, long = "data")]
        data: PathBuf,

        /// Directory receiving one "YYYY-MM-DD HH:MM:SS" folder per run
        #[arg(short, long = "results")]
        results: PathBuf,

        /// Parameter to set (format group.name=value)
        #[arg(short = 'p', long = "parameter")]
        parameters: Vec<String>,

        /// JSON file with parameters
        #[arg(long)]
        parameters_file: Option<PathBuf>,
    },

    /// List available methods
    Methods,

    /// List available metrics
    Metrics,

    /// Write constraints.json with bounds as a fraction of each group's budget
    CreateConstraints {
        /// Fraction of the budget each group must at least spend
        budget_usage: f64,

        /// Directory with the .pb files
        data_dir: PathBuf,

        /// Fraction of the budget each group may at most spend
        #[arg(long)]
        upper: Option<f64>,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let config = AppConfig::load();
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let capture = LogCapture::new();
    init_tracing(&logging, cli.verbose, &capture);

    let config = config?;
    config.validate().map_err(ConfigError::from)?;

    match cli.command {
        Commands::Run {
            methods,
            metrics,
            data,
            results,
            parameters,
            parameters_file,
        } => {
            let command = RunCommand {
                methods,
                metrics,
                data,
                results,
                parameters,
                parameters_file,
            };
            execute_run(command, &config, capture, cli.output)
        }
        Commands::Methods => list_methods(cli.output),
        Commands::Metrics => list_metrics(cli.output),
        Commands::CreateConstraints {
            budget_usage,
            data_dir,
            upper,
        } => create_constraints(budget_usage, upper, &data_dir, &config, cli.output),
    }
}

/// Installs the stderr layer and the layer feeding `logs.txt`.
fn init_tracing(logging: &LoggingConfig, verbose: bool, capture: &LogCapture) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (text, json) = match logging.format {
        LogFormat::Text => (Some(fmt::layer().with_writer(io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(io::stderr))),
    };

    // already installed when embedded in a host process
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .with(fmt::layer().with_ansi(false).with_writer(capture.clone()))
        .try_init();
}

struct RunCommand {
    methods: Vec<String>,
    metrics: Vec<String>,
    data: PathBuf,
    results: PathBuf,
    parameters: Vec<String>,
    parameters_file: Option<PathBuf>,
}

fn execute_run(
    command: RunCommand,
    config: &AppConfig,
    capture: LogCapture,
    format: OutputFormat,
) -> CliResult<()> {
    require_dir(&command.data)?;
    require_dir(&command.results)?;

    let parameters =
        MethodParameters::load(command.parameters_file.as_deref(), &command.parameters)?;
    info!("Methods to run: {}", command.methods.join(", "));
    if !command.metrics.is_empty() {
        info!("Metrics to run: {}", command.metrics.join(", "));
    }
    tracing::debug!(?parameters, "With parameters");

    let source = PabulibDirectory::new(&command.data)
        .with_constraints_file(&config.paths.constraints_file);
    let handler = RunComparisonHandler::new(
        Arc::new(source),
        Arc::new(FsResultsStore::new(&command.results)),
    )
    .with_log_source(move || capture.contents());

    let outcome = handler.handle(RunComparisonCommand {
        methods: command.methods,
        metrics: command.metrics,
        parameters,
    })?;

    let rows = outcome
        .results
        .outcomes
        .iter()
        .map(|o| OutcomeRow {
            method: o.method.clone(),
            projects: o.selected_projects.len(),
            cost: o.cost,
            status: o.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            seconds: format!("{:.3}", o.time_seconds),
        })
        .collect();
    print_output(rows, format)?;
    info!(location = %outcome.location.display(), "Results saved");
    Ok(())
}

fn require_dir(path: &Path) -> CliResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::NotADirectory(path.to_path_buf()))
    }
}

fn list_methods(format: OutputFormat) -> CliResult<()> {
    let rows = METHODS
        .iter()
        .map(|m| MethodRow {
            name: m.name,
            description: m.description,
        })
        .collect();
    print_output(rows, format)
}

fn list_metrics(format: OutputFormat) -> CliResult<()> {
    let rows = METRICS
        .iter()
        .map(|m| MetricRow {
            name: m.name,
            description: m.description,
            binary: m.is_binary(),
        })
        .collect();
    print_output(rows, format)
}

fn create_constraints(
    budget_usage: f64,
    upper: Option<f64>,
    data_dir: &Path,
    config: &AppConfig,
    format: OutputFormat,
) -> CliResult<()> {
    require_dir(data_dir)?;
    check_fraction("budget_usage", budget_usage)?;
    if let Some(upper) = upper {
        check_fraction("upper", upper)?;
        if upper < budget_usage {
            return Err(CliError::InvalidArgument(format!(
                "upper ({upper}) is below budget_usage ({budget_usage})"
            )));
        }
    }

    let constraints =
        PabulibDirectory::new(data_dir).budget_usage_constraints(budget_usage, upper)?;
    let path = data_dir.join(&config.paths.constraints_file);
    write_constraints(&path, &constraints)?;
    info!(path = %path.display(), groups = constraints.len(), "Constraints written");

    let show = |bound: Option<u64>| bound.map_or_else(|| "-".to_string(), |b| b.to_string());
    let rows = constraints
        .iter()
        .map(|(group, bounds)| ConstraintRow {
            group: group.to_string(),
            lower_bound: show(bounds.lower_bound),
            upper_bound: show(bounds.upper_bound),
        })
        .collect();
    print_output(rows, format)
}

fn check_fraction(name: &str, value: f64) -> CliResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "{name} must be between 0 and 1, got {value}"
        )))
    }
}
