// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `xcresult-sonar` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum XcresultSonarExitCode {}

impl XcresultSonarExitCode {
    /// No errors occurred and the report was written.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up the run: invalid configuration, a missing tests
    /// directory, or a report that could not be loaded.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing the report to stdout or to the output file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
