//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Webprobe: page-object browser suite runner
#[derive(Parser, Debug)]
#[command(name = "webprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the suite
    Run(RunArgs),

    /// List cases in run order with their dependencies
    List(ListArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Suite configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Site root, overriding the configuration file
    #[arg(long, env = "WEBPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Run only cases whose id contains this pattern
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Skip remaining cases after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long, conflicts_with = "mock")]
    pub headed: bool,

    /// Run against the built-in mock of the demo site
    #[arg(long)]
    pub mock: bool,

    /// Wait timeout in milliseconds, overriding the configuration file
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Report format on stdout
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Output format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "webprobe",
                "-vv",
                "run",
                "--mock",
                "--filter",
                "login",
                "--fail-fast",
                "--format",
                "json",
                "--output",
                "report.json",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.mock);
            assert!(args.fail_fast);
            assert_eq!(args.filter.as_deref(), Some("login"));
            assert_eq!(args.format, FormatArg::Json);
            assert_eq!(args.output, Some(PathBuf::from("report.json")));
        }

        #[test]
        fn test_headed_conflicts_with_mock() {
            assert!(Cli::try_parse_from(["webprobe", "run", "--mock", "--headed"]).is_err());
        }

        #[test]
        fn test_list_defaults() {
            let cli = Cli::try_parse_from(["webprobe", "list", "-q"]).unwrap();
            assert!(cli.quiet);
            assert!(matches!(cli.command, Commands::List(ListArgs { format: FormatArg::Text })));
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["webprobe"]).is_err());
        }
    }
}
