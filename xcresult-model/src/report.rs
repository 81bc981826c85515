// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestDuration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The root of a parsed test result bundle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The test modules (targets) that ran, in bundle order.
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Report {
    /// Creates a new report from the given modules.
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Self {
        Self {
            modules: modules.into_iter().collect(),
        }
    }

    /// Iterates over every test file of every module, in bundle order.
    pub fn files(&self) -> impl Iterator<Item = &TestFile> + '_ {
        self.modules.iter().flat_map(|module| module.files.iter())
    }

    /// Returns the total number of repeatable tests in this report.
    pub fn test_count(&self) -> usize {
        self.files().map(|file| file.repeatable_tests.len()).sum()
    }
}

/// A test module, typically a test target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// The name of the module.
    pub name: String,

    /// The test files contained in this module.
    #[serde(default)]
    pub files: Vec<TestFile>,
}

impl Module {
    /// Creates a new module.
    pub fn new(name: impl Into<String>, files: impl IntoIterator<Item = TestFile>) -> Self {
        Self {
            name: name.into(),
            files: files.into_iter().collect(),
        }
    }
}

/// A test file.
///
/// The name is the logical name reported by the test runner, which is the name of the test
/// class rather than a path on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFile {
    /// The logical name of the file, i.e. the test class name.
    pub name: String,

    /// The tests declared in this file.
    #[serde(default)]
    pub repeatable_tests: Vec<RepeatableTest>,
}

impl TestFile {
    /// Creates a new test file without any tests.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repeatable_tests: Vec::new(),
        }
    }

    /// Creates a new test file with the given tests.
    pub fn with_tests(
        name: impl Into<String>,
        repeatable_tests: impl IntoIterator<Item = RepeatableTest>,
    ) -> Self {
        Self {
            name: name.into(),
            repeatable_tests: repeatable_tests.into_iter().collect(),
        }
    }
}

/// A single named test, with all of its executions folded together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatableTest {
    /// The name of the test, e.g. `test_login()`.
    pub name: String,

    /// The status across all executions of the test.
    pub combined_status: CombinedStatus,

    /// The time taken by all executions of the test.
    #[serde(default)]
    pub total_duration: TestDuration,

    /// The failure or skip message, if the test runner reported one.
    #[serde(default)]
    pub message: Option<String>,
}

impl RepeatableTest {
    /// Creates a new test with a zero duration and no message.
    pub fn new(name: impl Into<String>, combined_status: CombinedStatus) -> Self {
        Self {
            name: name.into(),
            combined_status,
            total_duration: TestDuration::zero(),
            message: None,
        }
    }

    /// A test whose every execution succeeded.
    pub fn succeeded(name: impl Into<String>) -> Self {
        Self::new(name, CombinedStatus::Success)
    }

    /// A test whose every execution failed.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CombinedStatus::Failure).with_message(message)
    }

    /// A skipped test.
    pub fn skipped(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CombinedStatus::Skipped).with_message(message)
    }

    /// A test that failed while being expected to fail.
    pub fn expected_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CombinedStatus::ExpectedFailure).with_message(message)
    }

    /// A test that failed on some executions and succeeded on others.
    pub fn mixed_failed_succeeded(name: impl Into<String>) -> Self {
        Self::new(name, CombinedStatus::Mixed)
    }

    /// Sets the message for this test.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the total duration for this test.
    pub fn with_duration(mut self, total_duration: TestDuration) -> Self {
        self.total_duration = total_duration;
        self
    }
}

/// The outcome of a test after considering all of its executions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombinedStatus {
    /// Every execution succeeded.
    Success,
    /// Every execution failed.
    Failure,
    /// The test was skipped.
    Skipped,
    /// The test failed, and was expected to.
    ExpectedFailure,
    /// Some executions failed and some succeeded.
    Mixed,
}

impl CombinedStatus {
    /// All statuses, in declaration order.
    pub const ALL: [CombinedStatus; 5] = [
        CombinedStatus::Success,
        CombinedStatus::Failure,
        CombinedStatus::Skipped,
        CombinedStatus::ExpectedFailure,
        CombinedStatus::Mixed,
    ];

    /// Returns the serialized name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            CombinedStatus::Success => "success",
            CombinedStatus::Failure => "failure",
            CombinedStatus::Skipped => "skipped",
            CombinedStatus::ExpectedFailure => "expectedFailure",
            CombinedStatus::Mixed => "mixed",
        }
    }
}

impl fmt::Display for CombinedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
