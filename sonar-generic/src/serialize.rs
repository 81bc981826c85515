// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize `TestExecutions`.

use crate::{FileEntry, SerializeError, TestCase, TestCaseStatus, TestExecutions};
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, Event},
};
use std::io;

static TEST_EXECUTIONS_TAG: &str = "testExecutions";
static FILE_TAG: &str = "file";
static TEST_CASE_TAG: &str = "testCase";
static SKIPPED_TAG: &str = "skipped";
static FAILURE_TAG: &str = "failure";

pub(crate) fn serialize_executions(
    executions: &TestExecutions,
    mut writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 4);

    serialize_executions_impl(executions, &mut xml_writer)?;

    // Add a trailing newline.
    writer.write_all(b"\n")?;
    Ok(())
}

fn serialize_executions_impl(
    executions: &TestExecutions,
    writer: &mut Writer<impl io::Write>,
) -> io::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let TestExecutions { version, files } = executions;

    let mut root_tag = BytesStart::new(TEST_EXECUTIONS_TAG);
    root_tag.push_attribute(("version", version.to_string().as_str()));

    if files.is_empty() {
        return writer.write_event(Event::Empty(root_tag));
    }

    writer.write_event(Event::Start(root_tag))?;
    for file in files {
        serialize_file(file, writer)?;
    }
    serialize_end_tag(TEST_EXECUTIONS_TAG, writer)
}

fn serialize_file(file: &FileEntry, writer: &mut Writer<impl io::Write>) -> io::Result<()> {
    let FileEntry { path, test_cases } = file;

    let mut file_tag = BytesStart::new(FILE_TAG);
    file_tag.push_attribute(("path", path.as_str()));

    if test_cases.is_empty() {
        return writer.write_event(Event::Empty(file_tag));
    }

    writer.write_event(Event::Start(file_tag))?;
    for test_case in test_cases {
        serialize_test_case(test_case, writer)?;
    }
    serialize_end_tag(FILE_TAG, writer)
}

fn serialize_test_case(test_case: &TestCase, writer: &mut Writer<impl io::Write>) -> io::Result<()> {
    let TestCase {
        name,
        duration_ms,
        status,
    } = test_case;

    let mut test_case_tag = BytesStart::new(TEST_CASE_TAG);
    test_case_tag.extend_attributes([
        ("name", name.as_str()),
        ("duration", duration_ms.to_string().as_str()),
    ]);

    match status {
        TestCaseStatus::Passed => writer.write_event(Event::Empty(test_case_tag)),
        TestCaseStatus::Skipped { message } => {
            writer.write_event(Event::Start(test_case_tag))?;
            serialize_status(message, SKIPPED_TAG, writer)?;
            serialize_end_tag(TEST_CASE_TAG, writer)
        }
        TestCaseStatus::Failure { message } => {
            writer.write_event(Event::Start(test_case_tag))?;
            serialize_status(message, FAILURE_TAG, writer)?;
            serialize_end_tag(TEST_CASE_TAG, writer)
        }
    }
}

fn serialize_status(
    message: &str,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> io::Result<()> {
    let mut tag = BytesStart::new(tag_name);
    tag.push_attribute(("message", message));
    writer.write_event(Event::Empty(tag))
}

fn serialize_end_tag(tag_name: &'static str, writer: &mut Writer<impl io::Write>) -> io::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}
