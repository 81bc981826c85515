// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core logic for converting parsed Xcode test reports into SonarQube generic test execution
//! reports.
//!
//! The entry point is [`formatter::ReportFormatter`], which takes a
//! [`Report`](xcresult_model::Report), locates the source file for every test class through a
//! [`resolver::ResolvePath`] implementation, and produces
//! [`TestExecutions`](sonar_generic::TestExecutions).

pub mod concurrent;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod mapper;
pub mod report_loader;
pub mod resolver;
pub mod source_index;
#[cfg(test)]
mod test_helpers;
