//! RunComparisonHandler - runs several allocation methods on one election,
//! scores them and persists the results bundle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::application::methods::{Method, MethodError, METHODS};
use crate::config::{ConfigError, MethodParameters};
use crate::domain::allocation::AllocationError;
use crate::domain::foundation::ErrorCode;
use crate::domain::metrics::{evaluate, find_metric, Metric, METRICS};
use crate::domain::results::{MethodOutcome, RunResults};
use crate::ports::{ElectionSource, LoadError, ResultsStore, StorageError};

/// Selects every method or every metric.
pub const ALL: &str = "all";

/// Command to compare methods on the loaded election.
#[derive(Debug, Clone, Default)]
pub struct RunComparisonCommand {
    /// Method names, or `all`.
    pub methods: Vec<String>,
    /// Metric names, or `all`.
    pub metrics: Vec<String>,
    pub parameters: MethodParameters,
}

/// Result of a successful comparison.
#[derive(Debug, Clone)]
pub struct RunComparisonResult {
    pub results: RunResults,
    /// Where the bundle was written.
    pub location: PathBuf,
}

/// Fatal conditions of a comparison run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No method selected")]
    NoMethods,

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric '{0}' compares two methods but only one is selected")]
    BinaryMetricNeedsTwoMethods(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Method(#[from] MethodError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RunError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RunError::NoMethods
            | RunError::UnknownMethod(_)
            | RunError::UnknownMetric(_)
            | RunError::BinaryMetricNeedsTwoMethods(_) => ErrorCode::ConfigurationInvalid,
            RunError::Config(ConfigError::ValidationFailed(_)) => ErrorCode::ValidationFailed,
            RunError::Config(_) => ErrorCode::ConfigurationInvalid,
            RunError::Load(_) => ErrorCode::LoadFailed,
            RunError::Method(MethodError::BudgetExceeded { .. }) => ErrorCode::BudgetExceeded,
            RunError::Method(MethodError::Allocation(AllocationError::InvalidState(_))) => {
                ErrorCode::InternalError
            }
            RunError::Method(_) => ErrorCode::OracleFailed,
            RunError::Storage(_) => ErrorCode::PersistenceFailed,
        }
    }
}

/// Methods named in `names`, in registry order.
pub fn resolve_methods(names: &[String]) -> Result<Vec<&'static Method>, RunError> {
    if let Some(unknown) = names
        .iter()
        .find(|n| n.as_str() != ALL && !METHODS.iter().any(|m| m.name == n.as_str()))
    {
        return Err(RunError::UnknownMethod(unknown.clone()));
    }
    let all = names.iter().any(|n| n == ALL);
    let methods: Vec<_> = METHODS
        .iter()
        .filter(|m| all || names.iter().any(|n| n == m.name))
        .collect();
    if methods.is_empty() {
        return Err(RunError::NoMethods);
    }
    Ok(methods)
}

/// Metrics named in `names`, in registry order.
///
/// With `all` and a single method only unary metrics are kept; naming a
/// binary metric explicitly with a single method is an error.
pub fn resolve_metrics(
    names: &[String],
    method_count: usize,
) -> Result<Vec<&'static Metric>, RunError> {
    if let Some(unknown) = names
        .iter()
        .find(|n| n.as_str() != ALL && find_metric(n).is_none())
    {
        return Err(RunError::UnknownMetric(unknown.clone()));
    }
    let all = names.iter().any(|n| n == ALL);
    let mut metrics = Vec::new();
    for metric in METRICS {
        let named = names.iter().any(|n| n == metric.name);
        if !(all || named) {
            continue;
        }
        if metric.is_binary() && method_count < 2 {
            if named {
                return Err(RunError::BinaryMetricNeedsTwoMethods(metric.name.to_string()));
            }
            continue;
        }
        metrics.push(metric);
    }
    Ok(metrics)
}

/// Handler for comparison runs.
pub struct RunComparisonHandler {
    source: Arc<dyn ElectionSource>,
    store: Arc<dyn ResultsStore>,
    log_source: Box<dyn Fn() -> String>,
}

impl RunComparisonHandler {
    pub fn new(source: Arc<dyn ElectionSource>, store: Arc<dyn ResultsStore>) -> Self {
        Self {
            source,
            store,
            log_source: Box::new(String::new),
        }
    }

    /// Reads the execution log persisted alongside the results.
    pub fn with_log_source(mut self, log_source: impl Fn() -> String + 'static) -> Self {
        self.log_source = Box::new(log_source);
        self
    }

    pub fn handle(&self, cmd: RunComparisonCommand) -> Result<RunComparisonResult, RunError> {
        // 1. Resolve names before touching the data
        let methods = resolve_methods(&cmd.methods)?;
        let metrics = resolve_metrics(&cmd.metrics, methods.len())?;
        cmd.parameters.validate().map_err(ConfigError::from)?;

        // 2. Load the election
        let election = self.source.load()?;
        info!(
            groups = election.group_count(),
            budget = election.total_budget(),
            "Election loaded"
        );

        // 3. Run every method in registry order
        let mut outcomes = Vec::with_capacity(methods.len());
        for method in &methods {
            info!("Running {}", method.description);
            let started = Instant::now();
            let run = method.run(&election, &cmd.parameters)?;
            let time_seconds = started.elapsed().as_secs_f64();
            let cost = election.cost_of(&run.selection);
            info!(
                method = method.name,
                seconds = time_seconds,
                cost,
                projects = run.selection.len(),
                "Method finished"
            );
            outcomes.push(MethodOutcome {
                method: method.name.to_string(),
                selected_projects: run.selection,
                cost,
                time_seconds,
                status: run.status,
            });
        }

        // 4. Score the outcomes
        let selections: Vec<_> = outcomes
            .iter()
            .map(|o| (o.method.clone(), o.selected_projects.clone()))
            .collect();
        let evaluation = evaluate(&election, &selections, &metrics);

        // 5. Persist
        let results = RunResults::new(
            &election,
            outcomes,
            evaluation,
            cmd.parameters.to_json()?,
        );
        let location = self.store.save(&results, &(self.log_source)())?;

        Ok(RunComparisonResult { results, location })
    }
}
