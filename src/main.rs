use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error};

use runbook::{Parameters, RunbookExecutor};

/// Run declaratively configured shell commands with validated parameters
#[derive(Parser)]
#[command(name = "runbook")]
#[command(about = "Execute commands declared in a runbook file", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a runbook and print the aggregate output as text
    Run {
        /// Path to the runbook file (YAML, or JSON with a .json extension)
        config: PathBuf,

        /// Parameter as name=value; repeat for multiple values
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },
    /// Execute a runbook and write the raw aggregate bytes to stdout
    Render {
        /// Path to the runbook file (YAML, or JSON with a .json extension)
        config: PathBuf,

        /// Parameter as name=value; repeat for multiple values
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { config, params } => run(config, params).await,
        Commands::Render { config, params } => render(config, params).await,
    };

    if let Err(e) = result {
        error!("fatal: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: PathBuf, params: Vec<String>) -> anyhow::Result<()> {
    let parameters = parse_parameters(&params)?;
    let executor = RunbookExecutor::new();

    match executor.execute(&config, &parameters).await {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(err) => {
            // Validation failures keep their machine-readable body on stdout.
            if let Some(body) = err.body() {
                println!("{}", body.to_json_string());
            }
            Err(err.into())
        }
    }
}

async fn render(config: PathBuf, params: Vec<String>) -> anyhow::Result<()> {
    let parameters = parse_parameters(&params)?;
    let executor = RunbookExecutor::new();

    let mut stdout = std::io::stdout().lock();
    executor.render(&config, &parameters, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}

fn parse_parameters(params: &[String]) -> anyhow::Result<Parameters> {
    let mut parameters = Parameters::new();
    for param in params {
        let (name, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("parameter '{param}' is not in name=value form"))?;
        parameters
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }
    debug!("parsed {} parameter name(s)", parameters.len());
    Ok(parameters)
}
