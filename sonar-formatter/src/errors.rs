// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the formatter.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{io, string::FromUtf8Error};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// The number of threads was set to zero.
    #[error("`threads` must be at least 1")]
    ZeroThreads,
}

/// The root of the source tree could not be used.
#[derive(Debug, Error)]
pub enum SourceRootError {
    /// The root could not be read.
    #[error("failed to read source root `{root}`")]
    Unreadable {
        /// The root that was requested.
        root: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The root exists but is not a directory.
    #[error("source root `{root}` is not a directory")]
    NotADirectory {
        /// The root that was requested.
        root: Utf8PathBuf,
    },
}

/// An error that occurred while building a [`SourceIndex`](crate::source_index::SourceIndex).
#[derive(Debug, Error)]
pub enum IndexBuildError {
    /// The root of the source tree could not be used.
    #[error(transparent)]
    Root(#[from] SourceRootError),

    /// The class declaration pattern failed to compile.
    #[error("invalid class declaration pattern")]
    InvalidPattern(#[source] regex::Error),
}

/// An error that occurred while creating a path resolver.
#[derive(Debug, Error)]
pub enum ResolverBuildError {
    /// Building the source index failed.
    #[error("failed to build source index")]
    Index(#[from] IndexBuildError),

    /// The root of the source tree could not be used.
    #[error(transparent)]
    Root(#[from] SourceRootError),
}

/// An error that occurred while resolving the path for a single class.
///
/// Not finding a class is not an error: resolvers return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The search command could not be executed.
    #[error("failed to execute `{command}`")]
    CommandExec {
        /// The command that was run.
        command: String,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The search command produced output that is not valid UTF-8.
    #[error("output of `{command}` is not valid UTF-8")]
    CommandOutputInvalidUtf8 {
        /// The command that was run.
        command: String,

        /// The underlying error.
        #[source]
        err: FromUtf8Error,
    },
}

/// An error that occurred while transforming a single test file.
#[derive(Debug, Error)]
#[error("failed to format test file `{file_name}`")]
pub struct FormatFileError {
    file_name: String,
    #[source]
    err: ResolveError,
}

impl FormatFileError {
    pub(crate) fn new(file_name: impl Into<String>, err: ResolveError) -> Self {
        Self {
            file_name: file_name.into(),
            err,
        }
    }

    /// Returns the name of the test file that failed.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// An error that occurred while loading a report.
#[derive(Debug, Error)]
pub enum ReportLoadError {
    /// The report file could not be read.
    #[error("failed to read report at `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The report file could not be parsed.
    #[error("failed to parse report at `{path}`")]
    Parse {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: serde_path_to_error::Error<serde_json::Error>,
    },
}

/// An error that occurred while building the worker pool.
#[derive(Debug, Error)]
#[error("failed to build worker pool with {threads} threads")]
pub struct WorkerPoolBuildError {
    threads: usize,
    #[source]
    err: rayon::ThreadPoolBuildError,
}

impl WorkerPoolBuildError {
    pub(crate) fn new(threads: usize, err: rayon::ThreadPoolBuildError) -> Self {
        Self { threads, err }
    }
}
