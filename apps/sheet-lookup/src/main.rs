mod config;
mod logging;
mod sheet;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dataset_lookup::{CellValue, DatasetLookup, FunctionRegistry, LookupError};
use futures::future::join_all;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::{AppConfig, CliOverrides};

/// Sheet Lookup - evaluate dataset lookup spreadsheet functions from the shell
#[derive(Parser)]
#[command(name = "sheet-lookup")]
#[command(about = "Evaluate dataset lookup spreadsheet functions from the shell")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lookup service base URL (overrides config)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single cell, e.g. `call GET A ind1 mod1`
    Call {
        function: String,
        args: Vec<String>,
    },
    /// Evaluate every line of a sheet file concurrently
    Sheet { file: PathBuf },
    /// Show the stored warning and last completion time
    Status,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref()
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // 1) defaults -> 2) YAML (if provided) -> 3) env (SHEET_LOOKUP__*) -> 4) CLI overrides
    let config = AppConfig::load(
        cli.config.as_deref(),
        &CliOverrides {
            api_base_url: cli.api_base_url.as_deref(),
        },
    )?;

    logging::init(&config.logging, cli.verbose);
    tracing::info!("sheet-lookup starting");

    match cli.command {
        Commands::Check => check_config(&config),
        Commands::Call { function, args } => call(&config, &function, &args).await,
        Commands::Sheet { file } => evaluate_sheet(&config, &file).await,
        Commands::Status => show_status(&config).await,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("checking configuration");
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn call(config: &AppConfig, function: &str, args: &[String]) -> Result<()> {
    let module = DatasetLookup::init(&config.lookup)?;

    let result = module.registry().invoke(function, args).await;
    println!("{}", render(&result));

    module.coordinator().drain().await;
    Ok(())
}

async fn evaluate_sheet(config: &AppConfig, file: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read sheet '{}'", file.display()))?;
    let cells = sheet::parse(&contents)?;
    tracing::info!(cells = cells.len(), "evaluating sheet");

    let module = DatasetLookup::init(&config.lookup)?;
    let results = join_all(
        cells
            .iter()
            .map(|cell| evaluate(module.registry(), cell)),
    )
    .await;

    for (cell, result) in cells.iter().zip(&results) {
        println!("{cell}\t{}", render(result));
    }

    module.coordinator().drain().await;
    Ok(())
}

async fn evaluate(
    registry: &FunctionRegistry,
    cell: &sheet::Cell,
) -> Result<CellValue, LookupError> {
    tracing::debug!(line = cell.line, function = %cell.function, "evaluating cell");
    registry.invoke(&cell.function, &cell.args).await
}

async fn show_status(config: &AppConfig) -> Result<()> {
    let module = DatasetLookup::init(&config.lookup)?;
    let status = module.status();

    match status.warning().await.context("failed to read warning record")? {
        Some(record) => println!(
            "warning: {} at {}",
            record.function,
            format_millis(record.timestamp)
        ),
        None => println!("warning: none"),
    }
    match status
        .last_completion()
        .await
        .context("failed to read completion timestamp")?
    {
        Some(millis) => println!("last completion: {}", format_millis(millis)),
        None => println!("last completion: never"),
    }
    Ok(())
}

fn render(result: &Result<CellValue, LookupError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(err) => format!("#ERROR: {err}"),
    }
}

fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| millis.to_string())
}
