// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{SerializeError, serialize::serialize_executions};
use std::io;

/// The only version of the generic test execution format.
pub const SCHEMA_VERSION: u32 = 1;

/// The root element of a generic test execution report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestExecutions {
    /// The schema version, serialized as the `version` attribute.
    pub version: u32,

    /// The test files in this report, in document order.
    pub files: Vec<FileEntry>,
}

impl TestExecutions {
    /// Creates a new, empty `TestExecutions` at [`SCHEMA_VERSION`].
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            files: vec![],
        }
    }

    /// Adds a file to the end of this report.
    pub fn add_file(&mut self, file: FileEntry) -> &mut Self {
        self.files.push(file);
        self
    }

    /// Returns the number of test cases across all files.
    pub fn test_case_count(&self) -> usize {
        self.files.iter().map(|file| file.test_cases.len()).sum()
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_executions(self, writer)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|utf8_err| io::Error::new(io::ErrorKind::InvalidData, utf8_err).into())
    }
}

impl Default for TestExecutions {
    fn default() -> Self {
        Self::new()
    }
}

/// A single test source file and the test cases it contains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// The path to the file, relative to the project the report is uploaded for.
    ///
    /// May be empty if the file could not be located.
    pub path: String,

    /// The test cases declared in this file.
    pub test_cases: Vec<TestCase>,
}

impl FileEntry {
    /// Creates a new `FileEntry` without any test cases.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            test_cases: vec![],
        }
    }

    /// Adds a test case to this file.
    pub fn add_test_case(&mut self, test_case: TestCase) -> &mut Self {
        self.test_cases.push(test_case);
        self
    }

    /// Adds several test cases to this file.
    pub fn add_test_cases(&mut self, test_cases: impl IntoIterator<Item = TestCase>) -> &mut Self {
        self.test_cases.extend(test_cases);
        self
    }
}

/// Represents a single test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    /// The name of the test case.
    pub name: String,

    /// The time taken by the test case, in whole milliseconds.
    ///
    /// The format does not forbid negative values, so they are carried through as-is.
    pub duration_ms: i64,

    /// The outcome of the test case.
    pub status: TestCaseStatus,
}

impl TestCase {
    /// Creates a new test case.
    pub fn new(name: impl Into<String>, duration_ms: i64, status: TestCaseStatus) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            status,
        }
    }
}

/// The outcome of a test case.
///
/// A case is either passed (no child element), skipped, or failed, never both skipped and failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestCaseStatus {
    /// The test passed, or has an outcome the format has no element for.
    Passed,

    /// The test was skipped.
    Skipped {
        /// The skip message.
        message: String,
    },

    /// The test failed.
    Failure {
        /// The failure message.
        message: String,
    },
}

impl TestCaseStatus {
    /// Creates a skipped status with the given message.
    pub fn skipped(message: impl Into<String>) -> Self {
        TestCaseStatus::Skipped {
            message: message.into(),
        }
    }

    /// Creates a failure status with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        TestCaseStatus::Failure {
            message: message.into(),
        }
    }

    /// Returns the skip message if this status is [`TestCaseStatus::Skipped`].
    pub fn skipped_message(&self) -> Option<&str> {
        match self {
            TestCaseStatus::Skipped { message } => Some(message),
            _ => None,
        }
    }

    /// Returns the failure message if this status is [`TestCaseStatus::Failure`].
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            TestCaseStatus::Failure { message } => Some(message),
            _ => None,
        }
    }
}
