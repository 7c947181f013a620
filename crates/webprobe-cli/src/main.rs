//! Webprobe CLI: run the page-object suite
//!
//! ## Usage
//!
//! ```bash
//! webprobe run --mock                          # Against the built-in mock site
//! webprobe run --base-url https://demo.guru99.com
//! webprobe run --filter login --format json    # Subset, JSON on stdout
//! webprobe list                                # Cases and dependencies
//! ```
//!
//! Exit codes: 0 when no case failed, 1 when a case failed, 2 on usage or
//! environment errors.

use clap::Parser;
use std::process::ExitCode;
use webprobe_cli::{logging, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every case passed or was skipped
fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    logging::init(verbosity, cli.log_json);

    let config = CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.clone().into());

    match cli.command {
        Commands::Run(args) => Ok(webprobe_cli::run(&config, &args)?.is_success()),
        Commands::List(args) => {
            webprobe_cli::list(&config, &args)?;
            Ok(true)
        }
    }
}
