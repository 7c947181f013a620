//! Command execution

use crate::commands::{ListArgs, RunArgs};
use crate::config::{resolve_suite_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, ProgressReporter};
use serde::Serialize;
use tracing::info;
use webprobe::{
    demo_suite, MockSessionFactory, MockSite, Orchestrator, SessionManager, SuiteConfig,
    SuiteReport,
};

/// One entry of `webprobe list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseListing {
    /// Case identifier
    pub id: String,
    /// Upstream cases
    pub depends_on: Vec<String>,
    /// Whether interaction failures become skips
    pub best_effort: bool,
}

/// Cases of the bundled suite in run order
pub fn case_listing() -> CliResult<Vec<CaseListing>> {
    let suite = demo_suite()?;
    Ok(suite
        .cases()
        .iter()
        .map(|case| CaseListing {
            id: case.id().to_string(),
            depends_on: case.dependencies().iter().map(|d| d.case.clone()).collect(),
            best_effort: case.is_best_effort(),
        })
        .collect())
}

/// Session backend selected by the flags
pub fn session_manager(args: &RunArgs, config: &SuiteConfig) -> CliResult<SessionManager> {
    if args.mock {
        let site = MockSite::demo(&config.base_url)?;
        return Ok(SessionManager::new(MockSessionFactory::new(site)));
    }
    chromium_sessions(config)
}

#[cfg(feature = "browser")]
fn chromium_sessions(config: &SuiteConfig) -> CliResult<SessionManager> {
    Ok(SessionManager::new(webprobe::ChromiumSessionFactory::new(
        config.driver.clone(),
    )))
}

#[cfg(not(feature = "browser"))]
fn chromium_sessions(_config: &SuiteConfig) -> CliResult<SessionManager> {
    Err(CliError::invalid_argument(
        "built without browser support; rebuild with --features browser or pass --mock",
    ))
}

/// Run the suite and print its report
pub fn run(cli: &CliConfig, args: &RunArgs) -> CliResult<SuiteReport> {
    let config = resolve_suite_config(args)?;
    let sessions = session_manager(args, &config)?;
    info!(base_url = %config.base_url, backend = sessions.backend(), "starting run");

    let mut orchestrator = Orchestrator::new(demo_suite()?, sessions, config);
    let format = OutputFormat::from(args.format);
    let mut reporter = ProgressReporter::new(
        cli.color.should_color(),
        cli.verbosity.is_quiet() || format == OutputFormat::Json,
    );

    reporter.start_spinner("running suite");
    let report = match &args.filter {
        Some(pattern) => orchestrator.run_filtered(pattern),
        None => orchestrator.run_suite(),
    };
    reporter.finish();

    let printer = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    printer
        .report(&report, format)
        .map_err(|e| CliError::invalid_argument(format!("cannot render report: {e}")))?;

    if let Some(path) = &args.output {
        report.write_json(path)?;
        info!(path = %path.display(), "report written");
    }
    Ok(report)
}

/// Print the case list
pub fn list(cli: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let cases = case_listing()?;
    match OutputFormat::from(args.format) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&cases)
                .map_err(|e| CliError::invalid_argument(e.to_string()))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let reporter = ProgressReporter::new(cli.color.should_color(), false);
            reporter.header("demo-site");
            for case in &cases {
                let mut line = case.id.clone();
                if !case.depends_on.is_empty() {
                    line.push_str(&format!("  (after {})", case.depends_on.join(", ")));
                }
                if case.best_effort {
                    line.push_str("  [best-effort]");
                }
                println!("  {line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use webprobe::CaseState;

    #[test]
    fn test_listing_order_and_dependencies() {
        let cases = case_listing().unwrap();
        assert_eq!(cases.len(), 14);
        assert_eq!(cases[0].id, "a1_user_registration");
        let logout = cases.iter().find(|c| c.id == "d_user_logout").unwrap();
        assert_eq!(logout.depends_on, vec!["a1_user_registration", "c_valid_login"]);
        assert!(cases.iter().any(|c| c.best_effort));
    }

    #[test]
    fn test_mock_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let args = RunArgs {
            mock: true,
            base_url: Some("https://demo.test".into()),
            filter: Some("m_textarea".into()),
            timeout: Some(500),
            output: Some(path.clone()),
            ..RunArgs::default()
        };
        let cli = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
        let report = run(&cli, &args).unwrap();
        assert_eq!(report.case("m_textarea").unwrap().state, CaseState::Passed);
        let written: SuiteReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.cases.len(), 14);
    }
}
