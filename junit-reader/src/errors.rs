// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// An error that occurs while parsing a [`Report`](crate::Report).
///
/// Returned by [`Report::parse`](crate::Report::parse).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input is not well-formed XML.
    #[error("error parsing JUnit report")]
    Xml {
        /// The underlying error.
        #[from]
        inner: quick_xml::Error,
    },

    /// The input ended while an element was still open, as with a partially written file.
    #[error("JUnit report ends inside unclosed element `<{element}>`")]
    Truncated {
        /// The innermost open element.
        element: String,
    },
}

/// An error that occurs while reading the reports in a result directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadReportError {
    /// Walking the result directory failed.
    #[error("error walking result directory `{dir}`")]
    Walk {
        /// The directory being walked.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: walkdir::Error,
    },

    /// A path under the result directory is not valid UTF-8.
    #[error("path under result directory is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A report file could not be read.
    #[error("error reading JUnit report `{path}`")]
    Read {
        /// The report file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// A report file could not be parsed.
    #[error("error parsing JUnit report `{path}`")]
    Parse {
        /// The report file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: ParseError,
    },
}
