// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping test class names to source file paths.
//!
//! Two strategies are provided behind the [`ResolvePath`] trait: [`IndexResolver`] looks names up
//! in a [`SourceIndex`] built ahead of time, and [`SearchResolver`] runs an external search for
//! each name.

use crate::{
    config::{FormatterConfig, ResolverKind},
    errors::{ResolveError, ResolverBuildError},
    source_index::{SourceIndex, check_source_root},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fmt, io, sync::Arc};
use tracing::{debug, trace};

/// Resolves a test class name to the file declaring it.
///
/// Implementations must be safe to call concurrently from several worker threads.
pub trait ResolvePath: Send + Sync {
    /// Returns the path of the file declaring `class_name`, relative to the source root, or
    /// `Ok(None)` if no such file was found.
    ///
    /// Errors are reserved for failures of the lookup mechanism itself.
    fn resolve(&self, class_name: &str) -> Result<Option<Utf8PathBuf>, ResolveError>;
}

/// Creates the resolver selected by `config` for the source tree at `tests_path`.
pub fn resolver_for_config(
    config: &FormatterConfig,
    tests_path: &Utf8Path,
) -> Result<Box<dyn ResolvePath>, ResolverBuildError> {
    let resolver: Box<dyn ResolvePath> = match config.resolver {
        ResolverKind::Index => {
            let index = SourceIndex::build(tests_path, &config.source_extension)?;
            Box::new(IndexResolver::new(Arc::new(index)))
        }
        ResolverKind::Search => Box::new(SearchResolver::new(
            tests_path,
            &config.source_extension,
            Arc::new(DuctCommandRunner),
        )?),
    };
    Ok(resolver)
}

/// Renders a path relative to the source root the way it is written into reports: with a
/// leading `./` and forward slashes.
pub fn report_path(relative_path: &Utf8Path) -> String {
    if relative_path.is_absolute() {
        return relative_path.to_string();
    }
    let mut out = String::from(".");
    for component in relative_path.components() {
        out.push('/');
        out.push_str(component.as_str());
    }
    out
}

/// Resolves class names through a pre-built [`SourceIndex`].
#[derive(Clone, Debug)]
pub struct IndexResolver {
    index: Arc<SourceIndex>,
}

impl IndexResolver {
    /// Creates a new resolver backed by `index`.
    pub fn new(index: Arc<SourceIndex>) -> Self {
        Self { index }
    }
}

impl ResolvePath for IndexResolver {
    fn resolve(&self, class_name: &str) -> Result<Option<Utf8PathBuf>, ResolveError> {
        Ok(self.index.get(class_name).map(|path| path.to_owned()))
    }
}

/// Runs an external command and returns its standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, returning the captured standard output.
    ///
    /// A non-zero exit status is not an error: search tools use it to signal "no match".
    fn run(&self, program: &str, args: &[String]) -> io::Result<Vec<u8>>;
}

/// A [`CommandRunner`] that spawns processes through [`duct`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DuctCommandRunner;

impl CommandRunner for DuctCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<Vec<u8>> {
        let expression = duct::cmd(program, args.iter().map(String::as_str));
        trace!("executing command: {:?}", expression);
        let output = expression
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()?;
        if !output.status.success() {
            debug!(
                "`{program}` exited with {}, stderr: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output.stdout)
    }
}

/// Resolves class names by searching the source tree with `find` and `grep`, once per name.
pub struct SearchResolver {
    root: Utf8PathBuf,
    extension: String,
    runner: Arc<dyn CommandRunner>,
}

impl SearchResolver {
    /// Creates a new resolver searching files with `extension` under `root`.
    pub fn new(
        root: &Utf8Path,
        extension: &str,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ResolverBuildError> {
        check_source_root(root)?;
        Ok(Self {
            root: root.to_owned(),
            extension: extension.to_owned(),
            runner,
        })
    }

    fn search_args(&self, class_name: &str) -> Vec<String> {
        // Match the declaration as a whole word, so that `FooTests` doesn't match
        // `class FooTestsHelper`.
        let pattern = format!(
            "class[[:space:]]+{}([^A-Za-z_0-9]|$)",
            regex::escape(class_name)
        );
        // Walk the same files as `SourceIndex::build`: follow a symlinked root (-H), prune hidden
        // entries below it, and only look at regular files.
        let mut args = vec!["-H".to_owned(), self.root.to_string()];
        args.extend(
            [
                "-mindepth", "1", "-name", ".*", "-prune", "-o", "-type", "f", "-name",
            ]
            .map(str::to_owned),
        );
        args.push(format!("*.{}", self.extension));
        args.extend(["-exec", "grep", "-l", "-E"].map(str::to_owned));
        args.push(pattern);
        args.extend(["{}", "+"].map(str::to_owned));
        args
    }
}

impl fmt::Debug for SearchResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResolver")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl ResolvePath for SearchResolver {
    fn resolve(&self, class_name: &str) -> Result<Option<Utf8PathBuf>, ResolveError> {
        let args = self.search_args(class_name);
        let command = || format!("find {}", shell_words::join(&args));

        let stdout = self
            .runner
            .run("find", &args)
            .map_err(|err| ResolveError::CommandExec {
                command: command(),
                err,
            })?;
        let stdout = String::from_utf8(stdout).map_err(|err| {
            ResolveError::CommandOutputInvalidUtf8 {
                command: command(),
                err,
            }
        })?;

        let Some(first_match) = stdout.lines().map(str::trim).find(|line| !line.is_empty()) else {
            return Ok(None);
        };

        let found = Utf8Path::new(first_match);
        match found.strip_prefix(&self.root) {
            Ok(relative_path) => Ok(Some(relative_path.to_owned())),
            Err(_) => {
                debug!("search result `{found}` is not under `{}`", self.root);
                Ok(Some(found.to_owned()))
            }
        }
    }
}
