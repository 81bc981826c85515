// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping individual tests to generic test execution cases.

use sonar_generic::{TestCase, TestCaseStatus};
use xcresult_model::{CombinedStatus, RepeatableTest, TestDuration};

/// The message used by default when a failed or skipped test carries none.
pub const DEFAULT_MISSING_MESSAGE: &str = "Test message missing";

/// Converts a single test into a test case.
///
/// This never fails: every status maps to some case, and every duration maps to some number of
/// milliseconds.
pub fn map_test_case(test: &RepeatableTest, missing_message: &str) -> TestCase {
    TestCase::new(
        test.name.clone(),
        duration_millis(&test.total_duration),
        map_status(test, missing_message),
    )
}

/// Converts a duration to whole milliseconds, truncating toward zero.
///
/// Zero and negative durations are passed through. Non-finite values become zero.
pub fn duration_millis(duration: &TestDuration) -> i64 {
    let millis = duration.as_millis_f64();
    if millis.is_finite() {
        // `as` truncates toward zero, and saturates at the bounds of i64.
        millis as i64
    } else {
        0
    }
}

fn map_status(test: &RepeatableTest, missing_message: &str) -> TestCaseStatus {
    match test.combined_status {
        CombinedStatus::Failure => TestCaseStatus::failure(message_or(test, missing_message)),
        CombinedStatus::Skipped => TestCaseStatus::skipped(message_or(test, missing_message)),
        // The format has no representation for these, so they are reported as plain cases.
        CombinedStatus::Success | CombinedStatus::ExpectedFailure | CombinedStatus::Mixed => {
            TestCaseStatus::Passed
        }
    }
}

fn message_or<'a>(test: &'a RepeatableTest, missing_message: &'a str) -> &'a str {
    match test.message.as_deref() {
        Some(message) if !message.is_empty() => message,
        _ => missing_message,
    }
}
