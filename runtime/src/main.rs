// Copyright 2026 Pagesift Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pagesift::cli;
use pagesift::cli::run_cmd::RunOverrides;
use pagesift::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pagesift",
    about = "Pagesift — harvest headlines from rendered, paginated pages",
    version,
    after_help = "Run 'pagesift <command> --help' for details on each command.\nRun 'pagesift' with no command to harvest using ./config.json."
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest every seed and write the results file
    Run {
        /// Override the results file path
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Override the post-navigation settle delay in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,
        /// Print the run report as JSON when done
        #[arg(long)]
        json: bool,
    },
    /// Check environment and configuration
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "pagesift=debug"
    } else if cli.quiet {
        "pagesift=warn"
    } else {
        "pagesift=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        None => cli::run_cmd::run(&cli.config, &RunOverrides::default(), false).await,
        Some(Commands::Run {
            output,
            settle_ms,
            json,
        }) => {
            let overrides = RunOverrides { output, settle_ms };
            cli::run_cmd::run(&cli.config, &overrides, json).await
        }
        Some(Commands::Doctor) => cli::doctor::run(&cli.config).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pagesift", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
