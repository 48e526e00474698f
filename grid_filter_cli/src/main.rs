//! # Grid Filter CLI

use clap::Parser;
use grid_filter_cli::{parse_condition, render_rows, run, CliError, RunOptions};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "grid-filter", version)]
#[command(about = "Filter JSON rows with typed grid filter conditions", long_about = None)]
struct Cli {
    /// TOML filter configuration (fields and initial conditions)
    #[arg(short, long)]
    config: PathBuf,

    /// JSON file holding an array of rows
    #[arg(short, long)]
    rows: PathBuf,

    /// Saved query string to restore before applying --where conditions
    #[arg(short, long)]
    query: Option<String>,

    /// Condition as FIELD|COMPARATOR|INPUT, may be repeated
    #[arg(short = 'w', long = "where")]
    conditions: Vec<String>,

    /// Print the condition chips
    #[arg(short, long)]
    labels: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = execute(&cli) {
        eprintln!("Error: {}", err);
        process::exit(err.exit_code());
    }
}

fn execute(cli: &Cli) -> Result<(), CliError> {
    let conditions = cli
        .conditions
        .iter()
        .map(String::as_str)
        .map(parse_condition)
        .collect::<Result<Vec<_>, _>>()?;

    let result = run(&RunOptions {
        config: cli.config.clone(),
        rows: cli.rows.clone(),
        query: cli.query.clone(),
        conditions,
    })?;

    if cli.labels {
        for label in &result.labels {
            eprintln!("  [{}]", label);
        }
    }

    println!("{}", render_rows(&result.rows)?);
    eprintln!("{} of {} rows match", result.rows.len(), result.total);
    eprintln!("query: {}", result.query);

    Ok(())
}
