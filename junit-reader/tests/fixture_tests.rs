// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use junit_reader::{ReadReportError, ResultDir};
use pretty_assertions::assert_eq;

fn fixtures_dir() -> &'static Utf8Path {
    Utf8Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

#[test]
fn read_fixture_dir() {
    let dir = ResultDir::read(fixtures_dir()).expect("fixtures are readable");

    let file_names: Vec<_> = dir
        .files()
        .iter()
        .map(|file| file.path.file_name().expect("file name"))
        .collect();
    assert_eq!(file_names, vec!["a-results.xml", "b-results.xml"]);

    let names: Vec<_> = dir
        .testcases()
        .map(|(_, _, case)| case.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "DataShardTest.Upsert",
            "DataShardTest.Split",
            "DataShardTest.Muted",
            "KqpJoin.Simple",
            "KqpJoin.Skipped",
        ]
    );

    let (_, _, muted) = dir.testcases().nth(2).expect("muted case exists");
    assert_eq!(muted.property("mute"), Some("muted_ya.txt"));
    assert!(muted.skipped.is_some());

    let (_, _, simple) = dir.testcases().nth(3).expect("simple case exists");
    assert_eq!(simple.time.as_deref(), Some("abc"));
}

#[test]
fn read_single_file() {
    let dir = ResultDir::read(&fixtures_dir().join("nested/b-results.xml"))
        .expect("single file is readable");
    assert_eq!(dir.testcases().count(), 2);
}

#[test]
fn missing_dir_is_empty() {
    let temp = Utf8TempDir::new().expect("temp dir created");
    let dir = ResultDir::read(&temp.path().join("does-not-exist")).expect("missing dir is ok");
    assert_eq!(dir.files().len(), 0);
}

#[test]
fn malformed_file_is_fatal() {
    let temp = Utf8TempDir::new().expect("temp dir created");
    let path = temp.path().join("broken.xml");
    std::fs::write(&path, "<testsuite><testcase></testsuite>").expect("write succeeds");

    let err = ResultDir::read(temp.path()).expect_err("malformed XML is an error");
    match err {
        ReadReportError::Parse { path: err_path, .. } => assert_eq!(err_path, path),
        other => panic!("unexpected error: {other}"),
    }
}
