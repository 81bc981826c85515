// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use thiserror::Error;

/// An error that occurs while serializing [`TestExecutions`](crate::TestExecutions).
///
/// Returned by [`TestExecutions::serialize`](crate::TestExecutions::serialize) and
/// [`TestExecutions::to_string`](crate::TestExecutions::to_string).
#[derive(Debug, Error)]
#[error("error serializing generic test execution report")]
pub struct SerializeError {
    #[from]
    inner: io::Error,
}
