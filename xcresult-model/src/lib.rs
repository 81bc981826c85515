// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured access to parsed Xcode test results.
//!
//! A [`Report`] is what a test-result bundle looks like after it has been parsed: modules, the
//! test files (classes) inside each module, and the tests inside each file with their retries
//! folded into a single [`CombinedStatus`].
//!
//! This crate only describes the data. Producing it from an `.xcresult` bundle is the job of an
//! external parser; the model is serde-compatible so that such a parser can hand it over as JSON.

#![warn(missing_docs)]

mod duration;
mod report;

pub use duration::*;
pub use report::*;
