//! Output formatting for CLI

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

use super::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("No results");
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&data)?),
    }
    Ok(())
}

/// Print a single item; tables fall back to JSON
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?)
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
    }
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
pub struct MethodRow {
    #[tabled(rename = "Name")]
    pub name: &'static str,
    #[tabled(rename = "Description")]
    pub description: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Name")]
    pub name: &'static str,
    #[tabled(rename = "Description")]
    pub description: &'static str,
    #[tabled(rename = "Compares two methods")]
    pub binary: bool,
}

/// One selection in the run summary.
#[derive(Debug, Serialize, Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "Method")]
    pub method: String,
    #[tabled(rename = "Projects")]
    pub projects: usize,
    #[tabled(rename = "Cost")]
    pub cost: u64,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Seconds")]
    pub seconds: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConstraintRow {
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Lower bound")]
    pub lower_bound: String,
    #[tabled(rename = "Upper bound")]
    pub upper_bound: String,
}
