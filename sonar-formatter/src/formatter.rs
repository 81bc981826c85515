// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembling a generic test execution report from a parsed test report.

use crate::{
    concurrent::WorkerPool,
    config::FormatterConfig,
    errors::{FormatFileError, WorkerPoolBuildError},
    mapper::map_test_case,
    resolver::{ResolvePath, report_path},
};
use sonar_generic::{FileEntry, SerializeError, TestExecutions};
use tracing::{debug, warn};
use xcresult_model::{Report, TestFile};

/// Converts [`Report`]s into [`TestExecutions`].
pub struct ReportFormatter {
    resolver: Box<dyn ResolvePath>,
    pool: WorkerPool,
    missing_message: String,
}

impl ReportFormatter {
    /// Creates a new formatter using `resolver` to locate test files.
    pub fn new(
        config: &FormatterConfig,
        resolver: Box<dyn ResolvePath>,
    ) -> Result<Self, WorkerPoolBuildError> {
        Ok(Self {
            resolver,
            pool: WorkerPool::new(config.threads)?,
            missing_message: config.missing_message.clone(),
        })
    }

    /// Builds the generic test execution report for `report`.
    ///
    /// Files are sorted by name, and test cases within each file are sorted by name, so the
    /// output does not depend on the order of the input or on thread scheduling.
    ///
    /// Files whose class could not be found are kept with an empty path. Files for which
    /// resolution failed outright are left out of the output.
    pub fn format(&self, report: &Report) -> (TestExecutions, FormatSummary) {
        let mut files: Vec<&TestFile> = report.files().collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        let formatted = self
            .pool
            .concurrent_map(&files, |file| self.format_file(file));

        let mut summary = FormatSummary {
            input_files: files.len(),
            ..FormatSummary::default()
        };
        let mut executions = TestExecutions::new();
        for FormattedFile {
            class_name,
            entry,
            unresolved,
        } in formatted
        {
            if unresolved {
                // Warn here rather than in the workers, so warnings come out in file order.
                warn!("can't find file for class {class_name}");
                summary.unresolved.push(class_name);
            }
            executions.add_file(entry);
        }
        summary.output_files = executions.files.len();
        summary.test_cases = executions.test_case_count();

        (executions, summary)
    }

    /// Builds the report for `report` and serializes it to a string.
    pub fn format_to_string(&self, report: &Report) -> Result<(String, FormatSummary), SerializeError> {
        let (executions, summary) = self.format(report);
        Ok((executions.to_string()?, summary))
    }

    fn format_file(&self, file: &TestFile) -> Result<FormattedFile, FormatFileError> {
        debug!("formatting {}", file.name);

        let mut tests: Vec<_> = file.repeatable_tests.iter().collect();
        tests.sort_by(|a, b| a.name.cmp(&b.name));

        let path = self
            .resolver
            .resolve(&file.name)
            .map_err(|err| FormatFileError::new(&file.name, err))?;

        let mut entry = FileEntry::new(path.as_deref().map(report_path).unwrap_or_default());
        entry.add_test_cases(
            tests
                .into_iter()
                .map(|test| map_test_case(test, &self.missing_message)),
        );

        Ok(FormattedFile {
            class_name: file.name.clone(),
            entry,
            unresolved: path.is_none(),
        })
    }
}

struct FormattedFile {
    class_name: String,
    entry: FileEntry,
    unresolved: bool,
}

/// Statistics about a formatter run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSummary {
    /// The number of test files in the input report.
    pub input_files: usize,

    /// The number of files written to the output.
    ///
    /// Smaller than `input_files` if some files failed to format.
    pub output_files: usize,

    /// The number of test cases written to the output.
    pub test_cases: usize,

    /// Class names for which no source file was found, in output order.
    pub unresolved: Vec<String>,
}

impl FormatSummary {
    /// Returns the number of files that were dropped because formatting them failed.
    pub fn dropped_files(&self) -> usize {
        self.input_files - self.output_files
    }
}
