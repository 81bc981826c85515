// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formatter configuration.
//!
//! Configuration is layered: the embedded `default-config.toml` is read first, then an optional
//! user file on top of it. Command-line overrides are applied by the caller on the resulting
//! [`FormatterConfig`].

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use itertools::Itertools;
use serde::Deserialize;
use std::{collections::BTreeSet, fmt};
use tracing::warn;

/// Configuration for a formatter run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatterConfig {
    /// How test class names are mapped to source files.
    pub resolver: ResolverKind,

    /// The extension of test source files, without the leading dot.
    pub source_extension: String,

    /// The message emitted for failed or skipped tests without a message of their own.
    pub missing_message: String,

    /// The number of worker threads, or `None` to use the available parallelism.
    pub threads: Option<usize>,
}

impl FormatterConfig {
    /// The path, relative to the tests directory, where the config file is looked up by default.
    pub const CONFIG_PATH: &'static str = ".config/xcresult-sonar.toml";

    /// Contains the default config as a TOML file.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config, layering `config_file` (or, if not specified, the file at
    /// [`Self::CONFIG_PATH`] under `tests_path` if it exists) on top of the default config.
    ///
    /// Unknown keys are reported as warnings.
    pub fn from_sources(
        tests_path: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = tests_path.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (deserialized, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warn!(
                "ignoring unknown config keys in `{config_file}`: {}",
                unknown.iter().join(", ")
            );
        }

        deserialized
            .into_config()
            .map_err(|kind| ConfigParseError::new(&config_file, kind))
    }

    /// Returns the default config, without reading any files.
    pub fn default_config() -> Self {
        let (deserialized, unknown) =
            Self::build_and_deserialize_config(&Self::make_default_config())
                .expect("default config is always valid");

        // Make sure there aren't any unknown keys in the default config, since it is
        // embedded/shipped with this binary.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.iter().join(", ")
            );
        }

        deserialized
            .into_config()
            .expect("default config is always valid")
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(FormatterConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: FormatterConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // Both serde_path_to_error and the config crate report the key. Drop the key from
                // the config error to avoid printing it twice.
                let path = error.path().clone();
                let config_error = error.into_inner();
                let error = match config_error {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FormatterConfigDeserialize {
    resolver: ResolverKind,
    source_extension: String,
    missing_message: String,
    #[serde(default)]
    threads: Option<usize>,
}

impl FormatterConfigDeserialize {
    fn into_config(self) -> Result<FormatterConfig, ConfigParseErrorKind> {
        let Self {
            resolver,
            source_extension,
            missing_message,
            threads,
        } = self;

        if threads == Some(0) {
            return Err(ConfigParseErrorKind::ZeroThreads);
        }

        Ok(FormatterConfig {
            resolver,
            // Accept both "swift" and ".swift".
            source_extension: source_extension.trim_start_matches('.').to_owned(),
            missing_message,
            threads,
        })
    }
}

/// The strategy used to map test class names to source files.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// Scan the source tree once and index every class declaration.
    Index,

    /// Search the source tree with external tools, once per class.
    Search,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Index => f.write_str("index"),
            ResolverKind::Search => f.write_str("search"),
        }
    }
}
