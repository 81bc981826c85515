// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line parsing and execution.

use crate::{ExpectedError, Result, exit_codes::XcresultSonarExitCode, output::OutputOpts};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, ValueEnum};
use sonar_formatter::{
    config::{FormatterConfig, ResolverKind},
    formatter::{FormatSummary, ReportFormatter},
    report_loader::{JsonReportLoader, LoadReport},
    resolver::resolver_for_config,
};
use sonar_generic::{SerializeError, TestExecutions};
use std::{io::Write, num::NonZeroUsize};
use tracing::{debug, info, warn};

/// Convert Xcode test results into a SonarQube generic test execution report.
///
/// Every test class in the report is mapped to the source file under the tests directory that
/// declares it. Classes that can't be found are written with an empty path.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::cli_styles(),
    max_term_width = 100,
)]
pub struct XcresultSonarApp {
    /// Path to the test result bundle, or to its JSON export
    #[arg(long, value_name = "PATH")]
    xcresult_path: Utf8PathBuf,

    /// Path to the directory containing test sources
    #[arg(long, value_name = "PATH")]
    tests_path: Utf8PathBuf,

    /// Where to write the report [default: standard output]
    #[arg(long, value_name = "PATH")]
    output_path: Option<Utf8PathBuf>,

    #[clap(flatten)]
    formatter: FormatterOpts,

    #[clap(flatten)]
    output: OutputOpts,
}

impl XcresultSonarApp {
    /// Installs the stderr logger configured by the output options.
    pub fn init_output(&self) {
        self.output.init_logger();
    }

    /// Executes the app, writing the report to `stdout` unless `--output-path` is set.
    ///
    /// Returns the exit code.
    pub fn exec(self, stdout: &mut impl Write) -> Result<i32> {
        let mut config =
            FormatterConfig::from_sources(&self.tests_path, self.formatter.config_file.as_deref())?;
        self.formatter.apply_to(&mut config);
        debug!(
            "using config: {config:?}, resolving test files with the `{}` resolver",
            config.resolver
        );

        let report = JsonReportLoader.load(&self.xcresult_path)?;
        let resolver = resolver_for_config(&config, &self.tests_path)?;
        let formatter = ReportFormatter::new(&config, resolver)?;

        let (executions, summary) = formatter.format(&report);
        report_summary(&summary);

        match &self.output_path {
            Some(output_path) => write_to_file(&executions, output_path)?,
            None => executions
                .serialize(&mut *stdout)
                .and_then(|()| stdout.flush().map_err(SerializeError::from))
                .map_err(|err| ExpectedError::WriteStdoutError { err })?,
        }

        Ok(XcresultSonarExitCode::OK)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Formatter options")]
struct FormatterOpts {
    /// How test classes are mapped to source files [default: index]
    #[arg(long, value_enum, value_name = "STRATEGY")]
    resolver: Option<ResolverKindOpt>,

    /// Config file [default: <tests-path>/.config/xcresult-sonar.toml if present]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Number of worker threads [default: number of CPUs]
    #[arg(long, short = 'j', value_name = "N", env = "XCRESULT_SONAR_THREADS")]
    threads: Option<NonZeroUsize>,
}

impl FormatterOpts {
    fn apply_to(&self, config: &mut FormatterConfig) {
        if let Some(resolver) = self.resolver {
            config.resolver = resolver.into();
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads.get());
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ResolverKindOpt {
    /// Scan the tests directory once and index every class declaration
    Index,

    /// Run `find` and `grep` over the tests directory for each test class
    Search,
}

impl From<ResolverKindOpt> for ResolverKind {
    fn from(opt: ResolverKindOpt) -> Self {
        match opt {
            ResolverKindOpt::Index => ResolverKind::Index,
            ResolverKindOpt::Search => ResolverKind::Search,
        }
    }
}

fn report_summary(summary: &FormatSummary) {
    if summary.dropped_files() > 0 {
        warn!(
            "{} of {} test files could not be formatted and were left out of the report",
            summary.dropped_files(),
            summary.input_files,
        );
    }
    info!(
        "formatted {} test cases in {} files ({} without a source file)",
        summary.test_cases,
        summary.output_files,
        summary.unresolved.len(),
    );
}

fn write_to_file(executions: &TestExecutions, output_path: &Utf8Path) -> Result<()> {
    AtomicFile::new(output_path, OverwriteBehavior::AllowOverwrite)
        .write(|file| executions.serialize(file))
        .map_err(|err| ExpectedError::WriteOutputFileError {
            path: output_path.to_owned(),
            err,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use clap::CommandFactory;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use xcresult_model::{CombinedStatus, Module, RepeatableTest, Report, TestDuration, TestFile};

    static EXPECTED_OUTPUT: &str = indoc! {r#"
        <testExecutions version="1">
            <file path="">
                <testCase name="test_missing" duration="3"/>
            </file>
            <file path="./Login/LoginTests.swift">
                <testCase name="test_login" duration="1500">
                    <failure message="Test message missing"/>
                </testCase>
                <testCase name="test_logout" duration="0"/>
            </file>
        </testExecutions>
    "#};

    struct Fixture {
        dir: Utf8TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = camino_tempfile::Builder::new()
                .prefix("xcresult-sonar-cli-")
                .tempdir()
                .expect("tempdir created");

            let tests_dir = dir.path().join("Tests/Login");
            fs::create_dir_all(&tests_dir).expect("created tests dir");
            fs::write(
                tests_dir.join("LoginTests.swift"),
                "final class LoginTests: XCTestCase {}\n",
            )
            .expect("wrote test source");

            let report = Report::new([Module::new(
                "AppTests",
                [
                    TestFile::with_tests(
                        "LoginTests",
                        [
                            RepeatableTest::succeeded("test_logout"),
                            RepeatableTest::new("test_login", CombinedStatus::Failure)
                                .with_duration(TestDuration::seconds(1.5)),
                        ],
                    ),
                    TestFile::with_tests(
                        "AMissingTests",
                        [RepeatableTest::succeeded("test_missing")
                            .with_duration(TestDuration::milliseconds(3.9))],
                    ),
                ],
            )]);
            let bundle_dir = dir.path().join("Run.xcresult");
            fs::create_dir_all(&bundle_dir).expect("created bundle dir");
            fs::write(
                bundle_dir.join("report.json"),
                serde_json::to_string_pretty(&report).expect("report serializes"),
            )
            .expect("wrote report");

            Self { dir }
        }

        fn args(&self, extra: &[&str]) -> Vec<String> {
            let mut args = vec![
                "xcresult-sonar".to_owned(),
                "--xcresult-path".to_owned(),
                self.dir.path().join("Run.xcresult").into_string(),
                "--tests-path".to_owned(),
                self.dir.path().join("Tests").into_string(),
            ];
            args.extend(extra.iter().map(|arg| (*arg).to_owned()));
            args
        }
    }

    fn run(args: Vec<String>) -> (Result<i32>, String) {
        let app = XcresultSonarApp::try_parse_from(args).expect("arguments are valid");
        let mut stdout = Vec::new();
        let result = app.exec(&mut stdout);
        (result, String::from_utf8(stdout).expect("stdout is UTF-8"))
    }

    #[test]
    fn verify_app() {
        XcresultSonarApp::command().debug_assert();
    }

    #[test]
    fn writes_report_to_stdout() {
        let fixture = Fixture::new();
        let (result, stdout) = run(fixture.args(&[]));
        assert_eq!(result.expect("run succeeds"), XcresultSonarExitCode::OK);
        assert_eq!(stdout, EXPECTED_OUTPUT);
    }

    #[cfg(unix)]
    #[test]
    fn search_resolver_matches_index_resolver() {
        let fixture = Fixture::new();
        let (result, stdout) = run(fixture.args(&["--resolver", "search", "-j", "2"]));
        assert_eq!(result.expect("run succeeds"), XcresultSonarExitCode::OK);
        assert_eq!(stdout, EXPECTED_OUTPUT);
    }

    #[test]
    fn writes_report_to_output_path() {
        let fixture = Fixture::new();
        let output_path = fixture.dir.path().join("sonar.xml");
        fs::write(&output_path, "stale contents").expect("wrote stale file");

        let (result, stdout) = run(fixture.args(&["--output-path", output_path.as_str()]));
        assert_eq!(result.expect("run succeeds"), XcresultSonarExitCode::OK);
        assert_eq!(stdout, "");
        assert_eq!(
            fs::read_to_string(&output_path).expect("output written"),
            EXPECTED_OUTPUT
        );
    }

    #[test]
    fn config_file_overrides_missing_message() {
        let fixture = Fixture::new();
        let config_file = fixture.dir.path().join("custom.toml");
        fs::write(&config_file, "missing-message = \"no details\"\n").expect("wrote config");

        let (result, stdout) = run(fixture.args(&["--config-file", config_file.as_str()]));
        assert_eq!(result.expect("run succeeds"), XcresultSonarExitCode::OK);
        assert!(
            stdout.contains(r#"<failure message="no details"/>"#),
            "custom message used: {stdout}"
        );
    }

    #[test]
    fn missing_tests_path_is_a_setup_error() {
        let fixture = Fixture::new();
        let args = vec![
            "xcresult-sonar".to_owned(),
            "--xcresult-path".to_owned(),
            fixture.dir.path().join("Run.xcresult").into_string(),
            "--tests-path".to_owned(),
            fixture.dir.path().join("NoSuchDir").into_string(),
        ];
        let (result, stdout) = run(args);
        let error = result.expect_err("missing tests path fails");
        assert!(
            matches!(error, ExpectedError::ResolverBuildError { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), XcresultSonarExitCode::SETUP_ERROR);
        assert_eq!(stdout, "");
    }

    #[test]
    fn missing_report_is_a_setup_error() {
        let fixture = Fixture::new();
        let args = vec![
            "xcresult-sonar".to_owned(),
            "--xcresult-path".to_owned(),
            fixture.dir.path().join("Missing.xcresult").into_string(),
            "--tests-path".to_owned(),
            fixture.dir.path().join("Tests").into_string(),
        ];
        let (result, _) = run(args);
        let error = result.expect_err("missing report fails");
        assert!(
            matches!(error, ExpectedError::ReportLoadError { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), XcresultSonarExitCode::SETUP_ERROR);
    }

    #[test]
    fn unwritable_output_path_is_a_write_error() {
        let fixture = Fixture::new();
        let output_path = fixture.dir.path().join("no-such-dir/sonar.xml");
        let (result, _) = run(fixture.args(&["--output-path", output_path.as_str()]));
        let error = result.expect_err("unwritable output path fails");
        assert_eq!(
            error.process_exit_code(),
            XcresultSonarExitCode::WRITE_OUTPUT_ERROR
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_stdout_is_a_write_error() {
        let fixture = Fixture::new();
        let app = XcresultSonarApp::try_parse_from(fixture.args(&[])).expect("arguments are valid");
        let error = app.exec(&mut BrokenPipe).expect_err("writing fails");
        assert!(
            matches!(error, ExpectedError::WriteStdoutError { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(
            error.process_exit_code(),
            XcresultSonarExitCode::WRITE_OUTPUT_ERROR
        );
    }
}
