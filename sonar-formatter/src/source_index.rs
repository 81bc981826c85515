// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An index from class names to the source files that declare them.

use crate::errors::{IndexBuildError, SourceRootError};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::{collections::HashMap, fs};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Matches `class Foo` declarations, capturing the class name.
pub(crate) const CLASS_DECLARATION_PATTERN: &str = r"class\s+([A-Za-z_][A-Za-z_0-9]*)";

/// A best-effort mapping from class names to source file paths, relative to a root directory.
///
/// The index is built once by scanning the tree, and is read-only afterwards.
#[derive(Clone, Debug)]
pub struct SourceIndex {
    root: Utf8PathBuf,
    classes: HashMap<String, Utf8PathBuf>,
}

impl SourceIndex {
    /// Scans `root` recursively for files with the given extension, and indexes every class
    /// declared in them.
    ///
    /// Hidden files and directories are skipped. Entries that cannot be read are skipped with a
    /// warning; only a root that cannot be opened at all fails the scan.
    ///
    /// Directory entries are visited in file name order. If several files declare a class with
    /// the same name, the last one visited wins.
    pub fn build(root: &Utf8Path, extension: &str) -> Result<Self, IndexBuildError> {
        check_source_root(root)?;
        let pattern = Regex::new(CLASS_DECLARATION_PATTERN).map_err(IndexBuildError::InvalidPattern)?;

        let mut classes = HashMap::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!("error while scanning `{root}`, skipping entry: {error}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = match Utf8Path::from_path(entry.path()) {
                Some(path) => path,
                None => {
                    warn!(
                        "skipping non-UTF-8 path `{}`",
                        entry.path().display()
                    );
                    continue;
                }
            };
            if path.extension() != Some(extension) {
                continue;
            }

            let contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(error) => {
                    warn!("failed to read `{path}`, skipping: {error}");
                    continue;
                }
            };

            let relative_path = match path.strip_prefix(root) {
                Ok(relative_path) => relative_path,
                Err(_) => {
                    // walkdir only yields paths under the root.
                    warn!("`{path}` is not under `{root}`, skipping");
                    continue;
                }
            };

            for captures in pattern.captures_iter(&contents) {
                let class_name = &captures[1];
                if let Some(previous) =
                    classes.insert(class_name.to_owned(), relative_path.to_owned())
                {
                    debug!(
                        "class `{class_name}` is declared in both `{previous}` and \
                         `{relative_path}`, using the latter"
                    );
                }
            }
        }

        debug!("indexed {} classes under `{root}`", classes.len());
        Ok(Self {
            root: root.to_owned(),
            classes,
        })
    }

    /// Returns the root this index was built from.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the path of the file declaring `class_name`, relative to the root.
    pub fn get(&self, class_name: &str) -> Option<&Utf8Path> {
        self.classes.get(class_name).map(|path| path.as_path())
    }

    /// Returns the number of indexed classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no classes were found.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Checks that `root` exists and is a directory that can be opened.
pub(crate) fn check_source_root(root: &Utf8Path) -> Result<(), SourceRootError> {
    let metadata = fs::metadata(root).map_err(|err| SourceRootError::Unreadable {
        root: root.to_owned(),
        err,
    })?;
    if !metadata.is_dir() {
        return Err(SourceRootError::NotADirectory {
            root: root.to_owned(),
        });
    }
    fs::read_dir(root).map_err(|err| SourceRootError::Unreadable {
        root: root.to_owned(),
        err,
    })?;
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
