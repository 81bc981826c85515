// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{exit_codes::XcresultSonarExitCode, output::NO_HEADING_TARGET};
use camino::Utf8PathBuf;
use owo_colors::{OwoColorize, Stream};
use sonar_formatter::errors::{
    ConfigParseError, ReportLoadError, ResolverBuildError, WorkerPoolBuildError,
};
use sonar_generic::SerializeError;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error: one caused by the environment or by user input, not by a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("report load error")]
    ReportLoadError {
        #[from]
        err: ReportLoadError,
    },
    #[error("resolver build error")]
    ResolverBuildError {
        #[from]
        err: ResolverBuildError,
    },
    #[error("worker pool build error")]
    WorkerPoolBuildError {
        #[from]
        err: WorkerPoolBuildError,
    },
    #[error("error writing report to stdout")]
    WriteStdoutError {
        #[source]
        err: SerializeError,
    },
    #[error("error writing report to file")]
    WriteOutputFileError {
        path: Utf8PathBuf,
        #[source]
        err: atomicwrites::Error<SerializeError>,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::ReportLoadError { .. }
            | Self::ResolverBuildError { .. }
            | Self::WorkerPoolBuildError { .. } => XcresultSonarExitCode::SETUP_ERROR,
            Self::WriteStdoutError { .. } | Self::WriteOutputFileError { .. } => {
                XcresultSonarExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr, along with every error in its source chain.
    pub fn display_to_stderr(&self) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::ReportLoadError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::ResolverBuildError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::WorkerPoolBuildError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::WriteStdoutError { err } => {
                tracing::error!("failed to write report to stdout");
                Some(err as &dyn Error)
            }
            Self::WriteOutputFileError { path, err } => {
                tracing::error!(
                    "failed to write report to `{}`",
                    path.if_supports_color(Stream::Stderr, |x| x.bold())
                );
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
