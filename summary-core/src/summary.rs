// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-group aggregation and the markdown summary table.

use crate::outcome::{TestOutcome, TestStatus};
use camino::Utf8PathBuf;

/// Per-status test counts.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusCounts {
    counts: [usize; TestStatus::COUNT],
}

impl StatusCounts {
    /// Returns the number of tests with the given status.
    pub fn get(&self, status: TestStatus) -> usize {
        self.counts[status.index()]
    }

    /// Returns the total number of tests counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    fn increment(&mut self, status: TestStatus) {
        self.counts[status.index()] += 1;
    }
}

/// Where the detailed report for a line was written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportLink {
    /// The path of the report, relative to the public directory.
    pub reference: Utf8PathBuf,

    /// The URL at which the report is published.
    pub url: String,
}

/// The outcomes for one group of tests, e.g. one build configuration.
#[derive(Clone, Debug)]
pub struct AggregateLine {
    title: String,
    outcomes: Vec<TestOutcome>,
    counts: StatusCounts,
    is_failed: bool,
    report: Option<ReportLink>,
}

impl AggregateLine {
    /// Creates a new, empty line.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            outcomes: Vec::new(),
            counts: StatusCounts::default(),
            is_failed: false,
            report: None,
        }
    }

    /// Adds an outcome to this line, updating the counts and the failure flag.
    pub fn add(&mut self, outcome: TestOutcome) -> &mut Self {
        let status = outcome.status();
        self.is_failed |= status.is_blocking();
        self.counts.increment(status);
        self.outcomes.push(outcome);
        self
    }

    /// Records where the detailed report for this line lives.
    pub fn set_report(&mut self, reference: impl Into<Utf8PathBuf>, url: impl Into<String>) {
        self.report = Some(ReportLink {
            reference: reference.into(),
            url: url.into(),
        });
    }

    /// The title of this line.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The outcomes in this line, in the order they were added.
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// The per-status counts.
    pub fn counts(&self) -> &StatusCounts {
        &self.counts
    }

    /// The number of tests in this line.
    pub fn test_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if any test in this line has a blocking status.
    pub fn is_failed(&self) -> bool {
        self.is_failed
    }

    /// The report link, if one was set.
    pub fn report(&self) -> Option<&ReportLink> {
        self.report.as_ref()
    }
}

/// How the note explaining muted tests is rendered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MuteNote {
    /// A markdown footnote reference in the header, with the footnote below the table.
    Footnote,

    /// An inline superscript link in the header.
    Inline,
}

/// An ordered collection of lines, rendered as a markdown table.
#[derive(Clone, Debug)]
pub struct SummaryTable {
    lines: Vec<AggregateLine>,
    is_failed: bool,
    is_retry: bool,
    mute_rules_url: String,
}

impl SummaryTable {
    /// Creates a new table.
    ///
    /// `is_retry` only affects wording: counts in a retry cover the retried tests only.
    pub fn new(is_retry: bool, mute_rules_url: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            is_failed: false,
            is_retry,
            mute_rules_url: mute_rules_url.into(),
        }
    }

    /// Adds a line. Its outcomes are not modified afterwards.
    pub fn add_line(&mut self, line: AggregateLine) -> &mut Self {
        self.is_failed |= line.is_failed();
        self.lines.push(line);
        self
    }

    /// The lines in this table, in the order they were added.
    pub fn lines(&self) -> &[AggregateLine] {
        &self.lines
    }

    /// Returns true if any line is failed.
    pub fn is_failed(&self) -> bool {
        self.is_failed
    }

    /// Returns true if this table summarizes a retry.
    pub fn is_retry(&self) -> bool {
        self.is_retry
    }

    /// Renders this table as markdown, one string per line.
    pub fn render(&self, mute_note: MuteNote) -> Vec<String> {
        let note = match mute_note {
            MuteNote::Footnote => "[^1]".to_owned(),
            MuteNote::Inline => format!(
                "<sup>[?]({} \"All mute rules are defined here\")</sup>",
                self.mute_rules_url
            ),
        };

        let need_title_column = self.lines.len() > 1;

        let mut header = Vec::with_capacity(7);
        if need_title_column {
            header.push(String::new());
        }
        header.extend(
            ["TESTS", "PASSED", "ERRORS", "FAILED", "SKIPPED"]
                .into_iter()
                .map(str::to_owned),
        );
        header.push(format!("MUTED{note}"));

        let mut separator = Vec::with_capacity(header.len());
        if need_title_column {
            separator.push(":---".to_owned());
        }
        separator.resize(header.len(), "---:".to_owned());

        let mut result = vec![render_row(&header), render_row(&separator)];

        for line in &self.lines {
            let url = line.report().map(|report| report.url.as_str());
            let counts = line.counts();

            let mut row = Vec::with_capacity(header.len());
            if need_title_column {
                row.push(line.title().to_owned());
            }

            let retry_suffix = if self.is_retry {
                " (only retried tests)"
            } else {
                ""
            };
            row.push(render_count(
                line.test_count(),
                retry_suffix,
                url.map(str::to_owned),
            ));
            for status in [
                TestStatus::Pass,
                TestStatus::Error,
                TestStatus::Fail,
                TestStatus::Skip,
                TestStatus::Mute,
            ] {
                row.push(render_count(
                    counts.get(status),
                    "",
                    url.map(|url| format!("{url}#{status}")),
                ));
            }

            result.push(render_row(&row));
        }

        if mute_note == MuteNote::Footnote {
            result.push(String::new());
            result.push(format!(
                "[^1]: All mute rules are defined [here]({}).",
                self.mute_rules_url
            ));
        }

        result
    }
}

fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn render_count(value: usize, suffix: &str, url: Option<String>) -> String {
    match url {
        Some(url) if value > 0 => format!("[{value}{suffix}]({url})"),
        _ => format!("{value}{suffix}"),
    }
}
