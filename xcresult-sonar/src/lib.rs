// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Convert Xcode test results into SonarQube generic test execution reports.
//!
//! Run `xcresult-sonar --help` for usage.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::XcresultSonarExitCode;
