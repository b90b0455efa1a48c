// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while summarizing test results.

use camino::Utf8PathBuf;
use config::ConfigError;
use junit_reader::ReadReportError;
use std::{error::Error, fmt};
use thiserror::Error;

/// Why an elapsed time could not be used.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElapsedParseErrorKind {
    /// The `time` attribute was absent.
    Missing,

    /// The `time` attribute was not a number.
    Invalid,

    /// The `time` attribute was negative, infinite or NaN.
    OutOfRange,
}

impl fmt::Display for ElapsedParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("time attribute is missing"),
            Self::Invalid => f.write_str("time attribute is not a number"),
            Self::OutOfRange => f.write_str("time attribute is not a finite, non-negative number"),
        }
    }
}

/// A diagnostic produced when a test case's elapsed time can't be parsed.
///
/// This is never fatal: the elapsed time is treated as zero.
#[derive(Clone, Debug, Error)]
#[error(
    "unable to cast elapsed time for {classname}::{name}: {kind} (value: {})",
    .value.as_deref().unwrap_or("<missing>")
)]
pub struct ElapsedParseError {
    classname: String,
    name: String,
    value: Option<String>,
    kind: ElapsedParseErrorKind,
}

impl ElapsedParseError {
    pub(crate) fn new(
        classname: &str,
        name: &str,
        value: Option<String>,
        kind: ElapsedParseErrorKind,
    ) -> Self {
        Self {
            classname: classname.to_owned(),
            name: name.to_owned(),
            value,
            kind,
        }
    }
}

/// An error that occurred while parsing the configuration.
#[derive(Debug, Error)]
#[error("failed to parse config at `{}`", .config_file.as_deref().map_or("<default>", |f| f.as_str()))]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Option<Utf8PathBuf>,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: Option<Utf8PathBuf>, err: ConfigError) -> Self {
        Self { config_file, err }
    }
}

/// An error that occurred while parsing ownership rules.
#[derive(Debug, Error)]
#[error("invalid ownership pattern `{pattern}` on line {line}")]
pub struct OwnershipParseError {
    line: usize,
    pattern: String,
    #[source]
    err: globset::Error,
}

impl OwnershipParseError {
    pub(crate) fn new(line: usize, pattern: impl Into<String>, err: globset::Error) -> Self {
        Self {
            line,
            pattern: pattern.into(),
            err,
        }
    }
}

/// An error returned by a [`HistoryProvider`](crate::history::HistoryProvider).
///
/// History is best-effort: callers log these and carry on without it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    /// The history file could not be read.
    #[error("failed to read test history from `{path}`")]
    Read {
        /// The history file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The history response could not be deserialized.
    #[error("failed to deserialize test history from {origin}")]
    Deserialize {
        /// Where the history came from.
        origin: String,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// The query could not be serialized.
    #[error("failed to serialize test history query")]
    Serialize {
        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// The history service could not be reached or returned an error.
    #[error("failed to fetch test history from `{url}`")]
    Http {
        /// The URL that was queried.
        url: String,

        /// The underlying error.
        #[source]
        err: Box<ureq::Error>,
    },
}

/// An error that occurred while writing a report file.
#[derive(Debug, Error)]
#[error("failed to write {kind} to `{path}`")]
pub struct WriteReportError {
    kind: &'static str,
    path: Utf8PathBuf,
    #[source]
    err: std::io::Error,
}

impl WriteReportError {
    /// Creates a new error for the given kind of report.
    pub fn new(kind: &'static str, path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            kind,
            path: path.into(),
            err,
        }
    }
}

/// An error that occurred while generating the summary.
///
/// Both variants are fatal: a missing result or report would leave dangling links behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// Reading the results for a group failed.
    #[error("failed to read results for `{title}`")]
    ReadResults {
        /// The title of the group.
        title: String,

        /// The underlying error.
        #[source]
        err: ReadReportError,
    },

    /// Writing the detailed report for a group failed.
    #[error(transparent)]
    WriteReport(#[from] WriteReportError),
}

/// Displays an error along with its chain of sources, on separate lines.
#[derive(Debug)]
pub struct DisplayErrorChain<E>(E);

impl<E: Error> DisplayErrorChain<E> {
    /// Wraps an error for display.
    pub fn new(error: E) -> Self {
        Self(error)
    }
}

impl<E: Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, "\n  caused by: {err}")?;
            source = err.source();
        }
        Ok(())
    }
}
