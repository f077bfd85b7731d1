// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use harvest_runtime::cli;
use harvest_runtime::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Harvest — extract text from web pages with CSS selectors",
    version,
    after_help = "Run 'harvest <command> --help' for details on each command."
)]
struct Cli {
    /// Path to a JSON config file (defaults to $HARVEST_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP extraction service
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch one URL and print the matches for each selector
    Extract {
        /// Absolute URL to fetch
        url: String,
        /// CSS selector to apply. Can be repeated.
        #[arg(long = "selector", short = 's')]
        selectors: Vec<String>,
    },
    /// Show which fetch path a URL would take
    Classify {
        /// URL to classify
        url: String,
    },
    /// Check environment and print the effective configuration
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "harvest", &mut std::io::stdout());
        return Ok(());
    }

    cli::init_tracing(cli.verbose, cli.log_json)?;

    let result = match Config::load(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Serve { bind, port } => cli::serve::run(config, bind, port).await,
            Commands::Extract { url, selectors } => {
                cli::extract_cmd::run(&config, &url, selectors).await
            }
            Commands::Classify { url } => cli::classify_cmd::run(&config, &url, cli.json),
            Commands::Doctor => cli::doctor::run(&config),
            Commands::Completions { .. } => Ok(()),
        },
        Err(e) => Err(e),
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "error": true, "message": format!("{e:#}") })
            );
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
