// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use summary_core::errors::{ConfigParseError, GenerateError, WriteReportError};
use thiserror::Error;
use tracing::error;

/// Documented exit codes for `junit-summary` failures.
///
/// A summary of failing tests is not itself a failure: the verdict is written to the status
/// report file, and the process exits with [`Self::OK`]. Unexpected failures always result in
/// exit code 1.
pub enum SummaryExitCode {}

impl SummaryExitCode {
    /// No errors occurred and the summary was written.
    pub const OK: i32 = 0;

    /// The positional arguments did not form `TITLE HTML_OUT PATH` triples.
    pub const INVALID_ARGUMENTS: i32 = 2;

    /// A user issue happened while setting up, such as an invalid config file.
    pub const SETUP_ERROR: i32 = 96;

    /// Reading test results or the summary links failed.
    pub const READ_INPUT_FAILED: i32 = 104;

    /// Writing a report or an output file failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("invalid argument count")]
    InvalidArgumentCount { count: usize },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("generate error")]
    GenerateError {
        #[from]
        err: GenerateError,
    },
    #[error("failed to read summary links")]
    ReadSummaryLinks {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to write output")]
    WriteOutput {
        #[from]
        err: WriteReportError,
    },
}

impl ExpectedError {
    pub(crate) fn read_summary_links(path: Utf8PathBuf, err: std::io::Error) -> Self {
        Self::ReadSummaryLinks { path, err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgumentCount { .. } => SummaryExitCode::INVALID_ARGUMENTS,
            Self::ConfigParseError { .. } => SummaryExitCode::SETUP_ERROR,
            Self::GenerateError {
                err: GenerateError::ReadResults { .. },
            }
            | Self::ReadSummaryLinks { .. } => SummaryExitCode::READ_INPUT_FAILED,
            Self::GenerateError { .. } | Self::WriteOutput { .. } => {
                SummaryExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::InvalidArgumentCount { count } => {
                error!(
                    "expected `TITLE HTML_OUT PATH` triples, but got {} positional arguments",
                    count.style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!("{err}");
                err.source()
            }
            Self::GenerateError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ReadSummaryLinks { path, err } => {
                error!(
                    "failed to read summary links from `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::WriteOutput { err } => {
                error!("{err}");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
