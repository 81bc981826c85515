// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading parsed test reports.

use crate::errors::ReportLoadError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;
use xcresult_model::Report;

/// Produces a [`Report`] from a test result bundle.
pub trait LoadReport {
    /// Loads the report for the bundle at `path`.
    fn load(&self, path: &Utf8Path) -> Result<Report, ReportLoadError>;
}

/// Loads reports that were exported as JSON by an external bundle parser.
///
/// `path` may either be the JSON file itself, or a bundle directory containing
/// [`JsonReportLoader::REPORT_FILE_NAME`].
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonReportLoader;

impl JsonReportLoader {
    /// The name of the exported report inside a bundle directory.
    pub const REPORT_FILE_NAME: &'static str = "report.json";

    fn report_file(path: &Utf8Path) -> Utf8PathBuf {
        if path.is_dir() {
            path.join(Self::REPORT_FILE_NAME)
        } else {
            path.to_owned()
        }
    }
}

impl LoadReport for JsonReportLoader {
    fn load(&self, path: &Utf8Path) -> Result<Report, ReportLoadError> {
        let report_file = Self::report_file(path);
        debug!("loading report from `{report_file}`");

        let contents = fs::read_to_string(&report_file).map_err(|err| ReportLoadError::Read {
            path: report_file.clone(),
            err,
        })?;
        let mut deserializer = serde_json::Deserializer::from_str(&contents);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| ReportLoadError::Parse {
            path: report_file,
            err,
        })
    }
}
