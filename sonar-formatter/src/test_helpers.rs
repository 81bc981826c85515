// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::concurrent::WorkerPool;
use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use std::{
    fs, io,
    sync::{Arc, Mutex},
};
use xcresult_model::{Module, RepeatableTest, Report, TestFile};

/// A source file to create in a fixture tree.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SourceFile<'a> {
    pub(crate) relative_path: &'a str,
    pub(crate) contents: &'a str,
}

impl<'a> SourceFile<'a> {
    pub(crate) fn new(relative_path: &'a str, contents: &'a str) -> Self {
        Self {
            relative_path,
            contents,
        }
    }
}

pub(crate) fn temp_source_dir() -> Utf8TempDir {
    camino_tempfile::Builder::new()
        .prefix("xcresult-sonar-tests-")
        .tempdir()
        .expect("tempdir created")
}

/// Creates a temporary source tree containing `files`, writing them in parallel.
pub(crate) fn create_source_tree<'a>(files: impl IntoIterator<Item = SourceFile<'a>>) -> Utf8TempDir {
    let dir = temp_source_dir();
    let files: Vec<_> = files.into_iter().collect();
    let created = WorkerPool::new(None)
        .expect("pool built")
        .concurrent_map(&files, |file| write_source_file(dir.path(), file));
    assert_eq!(created.len(), files.len(), "all fixture files created");
    dir
}

/// Creates one `<Class>.swift` file declaring `class <Class> { }` for every file in `report`.
pub(crate) fn create_class_files(report: &Report) -> Utf8TempDir {
    let sources: Vec<_> = report
        .files()
        .map(|file| {
            (
                format!("{}.swift", file.name),
                format!("class {} {{ }}\n", file.name),
            )
        })
        .collect();
    create_source_tree(
        sources
            .iter()
            .map(|(path, contents)| SourceFile::new(path, contents)),
    )
}

fn write_source_file(root: &Utf8Path, file: &SourceFile<'_>) -> io::Result<()> {
    let path = root.join(file.relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, file.contents)
}

/// Three modules of three files each. The first file holds one test of every status.
pub(crate) fn scenario_report() -> Report {
    let module_a = Module::new(
        "Module_a",
        [
            TestFile::with_tests(
                "ClassName_a_a",
                [
                    RepeatableTest::failed("test_failure", "Failure message"),
                    RepeatableTest::succeeded("test_success"),
                    RepeatableTest::mixed_failed_succeeded("test_mixedFailureAndSuccess"),
                    RepeatableTest::skipped("test_skipped", "Skip message"),
                    RepeatableTest::expected_failed("test_expecting_fail", "Failure message"),
                ],
            ),
            TestFile::new("ClassName_a_b"),
            TestFile::new("ClassName_a_c"),
        ],
    );
    let module_b = Module::new(
        "Module_b",
        [
            TestFile::new("ClassName_b_a"),
            TestFile::new("ClassName_b_b"),
            TestFile::new("ClassName_b_c"),
        ],
    );
    let module_c = Module::new(
        "Module_c",
        [
            TestFile::new("ClassName_c_a"),
            TestFile::new("ClassName_c_b"),
            TestFile::new("ClassName_c_c"),
        ],
    );

    // Modules out of order, to check that output doesn't depend on input order.
    Report::new([module_c, module_a, module_b])
}

/// A single module with `file_count + 1` empty test files.
pub(crate) fn large_report(file_count: usize) -> Report {
    // Interleave the files so that input order differs from sorted order.
    let (even, odd): (Vec<_>, Vec<_>) = (0..=file_count).partition(|idx| idx % 2 == 0);
    let files = odd
        .into_iter()
        .rev()
        .chain(even)
        .map(|idx| TestFile::new(format!("TestClass_{idx}")));
    Report::new([Module::new("Module", files)])
}

/// Captures formatted `tracing` output in memory.
#[derive(Clone, Debug, Default)]
pub(crate) struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Runs `f` with a subscriber writing into this buffer installed for the current thread.
    pub(crate) fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().expect("lock not poisoned")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .expect("lock not poisoned")
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
