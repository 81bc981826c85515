// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate SonarQube generic test execution reports in Rust.
//!
//! The format is documented as the "generic test execution report format": a `testExecutions`
//! root containing one `file` element per test source file, each containing `testCase` elements.

mod errors;
mod executions;
mod serialize;

pub use errors::*;
pub use executions::*;
