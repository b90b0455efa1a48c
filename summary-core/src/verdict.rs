// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The overall verdict, and the status message posted alongside it.

use crate::summary::{MuteNote, SummaryTable};
use std::fmt;

/// The color of the status message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommentColor {
    /// Everything passed.
    Green,

    /// Something failed, but it will be retried or does not block.
    Yellow,

    /// Something failed and blocks the run.
    Red,
}

impl CommentColor {
    /// Returns the color as written to the color file.
    pub fn as_str(self) -> &'static str {
        match self {
            CommentColor::Green => "green",
            CommentColor::Yellow => "yellow",
            CommentColor::Red => "red",
        }
    }
}

impl fmt::Display for CommentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The overall result of the run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// The run succeeded, or its failures are not blocking.
    Success,

    /// The run failed.
    Failure,
}

impl Verdict {
    /// Computes the verdict for a summary.
    pub fn from_summary(summary: &SummaryTable, is_ignored: bool) -> Self {
        if summary.is_failed() && !is_ignored {
            Verdict::Failure
        } else {
            Verdict::Success
        }
    }

    /// Returns the verdict as written to the status report file.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Success => "success",
            Verdict::Failure => "failure",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status message: a color and the lines of markdown to post.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusMessage {
    /// The color of the message.
    pub color: CommentColor,

    /// The lines of the message.
    pub lines: Vec<String>,
}

impl StatusMessage {
    /// Returns the message as text, with every line terminated by a newline.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Composes the status message for a summary.
///
/// `links` are auxiliary links, already normalized with [`normalize_links`].
pub fn compose(
    summary: &SummaryTable,
    links: &[String],
    is_last_retry: bool,
    is_ignored: bool,
) -> StatusMessage {
    let (color, mut message) = if !summary.is_failed() {
        (CommentColor::Green, "Tests successful.".to_owned())
    } else {
        let (color, message) = if is_ignored {
            (
                CommentColor::Yellow,
                "Some tests failed, follow the links below. This fail is not in blocking policy yet",
            )
        } else if is_last_retry {
            (
                CommentColor::Red,
                "Some tests failed, follow the links below.",
            )
        } else {
            (
                CommentColor::Yellow,
                "Some tests failed, follow the links below.",
            )
        };
        (color, message.to_owned())
    };
    if summary.is_failed() && !is_last_retry {
        message.push_str(" Going to retry failed tests...");
    }

    let mut lines = vec![message];
    if !is_last_retry {
        lines.extend(["", "<details>", ""].map(str::to_owned));
    }
    if !links.is_empty() {
        lines.push(String::new());
        lines.push(links.join(" | "));
    }
    lines.extend(summary.render(MuteNote::Footnote));
    if !is_last_retry {
        lines.extend(["", "</details>", ""].map(str::to_owned));
    } else {
        lines.push(String::new());
    }

    StatusMessage { color, lines }
}

/// Normalizes the contents of a summary links file.
///
/// Each line is `<ordering token> <markdown link>`. Lines are sorted by their raw text, then the
/// ordering token is dropped. Blank lines are skipped, and a line with no ordering token is
/// kept as is.
pub fn normalize_links(contents: &str) -> Vec<String> {
    let mut raw: Vec<&str> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    raw.sort_unstable();
    raw.into_iter()
        .map(|line| match line.split_once(' ') {
            Some((_, link)) => link.trim().to_owned(),
            None => line.trim().to_owned(),
        })
        .collect()
}
