mod commands;
mod ui;

use clap::{Parser, Subcommand};
use commands::report::ReportFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Evaluate statistical formulas over Prometheus range queries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a range query and evaluate a formula over it
    Eval {
        /// PromQL range query
        #[arg(short, long)]
        metric_query: String,

        /// Formula, e.g. "max(mean(x))"; %s expands to the parameter name
        #[arg(short, long)]
        formula: String,

        /// Name the fetched matrix is bound to inside the formula
        #[arg(short, long, default_value = "x")]
        param: String,

        /// Window start; defaults to end minus the configured lookback
        #[arg(short, long)]
        start: Option<String>,

        /// Window end (unix seconds or RFC3339)
        #[arg(short, long)]
        end: String,

        /// Config file (YAML, TOML, or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prometheus address, overrides the config
        #[arg(long, env = "PROMETHEUS_ADDRESS")]
        prometheus: Option<String>,
    },

    /// Analyze benchmark records and print a report
    Report {
        /// Newline-delimited JSON records
        records_file: PathBuf,

        /// Config file (YAML, TOML, or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Cli)]
        format: ReportFormat,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a config file
    Validate {
        /// Path to config file
        config_file: PathBuf,
    },

    /// List available functions
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Eval {
            metric_query,
            formula,
            param,
            start,
            end,
            config,
            prometheus,
        } => {
            commands::eval::execute(commands::eval::EvalArgs {
                metric_query,
                formula,
                param,
                start,
                end,
                config,
                prometheus,
            })
            .await?;
        }

        Commands::Report {
            records_file,
            config,
            format,
            output,
        } => {
            commands::report::execute(records_file, config, format, output).await?;
        }

        Commands::Validate { config_file } => {
            commands::validate::execute(config_file).await?;
        }

        Commands::List => {
            commands::list::execute().await?;
        }
    }

    Ok(())
}
