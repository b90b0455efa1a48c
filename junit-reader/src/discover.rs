// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discover and read the JUnit files under a result directory.

use crate::{Report, ReadReportError, TestCase, TestSuite};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use tracing::debug;
use walkdir::WalkDir;

/// A JUnit file found under a result directory, along with its parsed contents.
#[derive(Clone, Debug)]
pub struct ReportFile {
    /// The path to the file.
    pub path: Utf8PathBuf,

    /// The parsed report.
    pub report: Report,
}

/// All the JUnit files under a single result directory.
#[derive(Clone, Debug, Default)]
pub struct ResultDir {
    files: Vec<ReportFile>,
}

impl ResultDir {
    /// Reads every `*.xml` file under `dir`, recursively, in sorted path order.
    ///
    /// `dir` may also point at a single file. A directory that does not exist holds no results:
    /// this happens when a test step was skipped entirely.
    pub fn read(dir: &Utf8Path) -> Result<Self, ReadReportError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err)
                    if err.depth() == 0
                        && err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) =>
                {
                    debug!("result directory `{dir}` does not exist, treating it as empty");
                    return Ok(Self::default());
                }
                Err(err) => {
                    return Err(ReadReportError::Walk {
                        dir: dir.to_owned(),
                        err,
                    });
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = Utf8PathBuf::try_from(entry.into_path())
                .map_err(|err| ReadReportError::NonUtf8Path {
                    path: err.into_path_buf(),
                })?;
            if path.extension() != Some("xml") {
                continue;
            }

            files.push(read_report_file(path)?);
        }

        debug!("read {} JUnit files from `{dir}`", files.len());
        Ok(Self { files })
    }

    /// Returns the files that were read.
    pub fn files(&self) -> &[ReportFile] {
        &self.files
    }

    /// Iterates over every test case in every file, in discovery order.
    pub fn testcases(&self) -> impl Iterator<Item = (&Utf8Path, &TestSuite, &TestCase)> + '_ {
        self.files.iter().flat_map(|file| {
            file.report
                .testcases()
                .map(move |(suite, case)| (file.path.as_path(), suite, case))
        })
    }
}

fn read_report_file(path: Utf8PathBuf) -> Result<ReportFile, ReadReportError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => return Err(ReadReportError::Read { path, err }),
    };
    match Report::parse(&contents) {
        Ok(report) => Ok(ReportFile { path, report }),
        Err(err) => Err(ReadReportError::Parse { path, err }),
    }
}
