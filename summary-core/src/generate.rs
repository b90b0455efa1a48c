// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generating the summary table and detailed reports for groups of results.

use crate::{
    errors::GenerateError,
    html::{HtmlParams, write_html},
    listing::{Enrichment, render_listing},
    outcome::TestOutcome,
    summary::{AggregateLine, SummaryTable},
};
use camino::{Utf8Path, Utf8PathBuf};
use junit_reader::ResultDir;
use tracing::{debug, info};

/// One group of results: a line in the summary table and one detailed report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultGroup {
    /// The title of the line.
    pub title: String,

    /// Where the detailed report is written. Relative paths are relative to the public
    /// directory.
    pub html_path: Utf8PathBuf,

    /// The directory holding the JUnit files for this group.
    pub result_dir: Utf8PathBuf,
}

impl ResultGroup {
    /// Creates a new group.
    pub fn new(
        title: impl Into<String>,
        html_path: impl Into<Utf8PathBuf>,
        result_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            html_path: html_path.into(),
            result_dir: result_dir.into(),
        }
    }
}

/// Options for [`generate_summary`].
#[derive(Clone, Copy)]
pub struct GenerateOptions<'a> {
    /// The directory published at `public_dir_url`.
    pub public_dir: &'a Utf8Path,

    /// The URL the public directory is published at.
    pub public_dir_url: &'a str,

    /// True if this run only retries previously failed tests.
    pub is_retry: bool,

    /// The URL of the mute rules linked from the table.
    pub mute_rules_url: &'a str,

    /// Display parameters for the detailed reports.
    pub html: HtmlParams<'a>,

    /// Owners and history for the detailed reports.
    pub enrichment: Enrichment<'a>,
}

/// Reads every group, writes a detailed report for each, and returns the summary table.
///
/// Lines are added in the order of `groups`. Reading or writing failures abort the summary.
pub fn generate_summary(
    groups: &[ResultGroup],
    options: &GenerateOptions<'_>,
) -> Result<SummaryTable, GenerateError> {
    let mut table = SummaryTable::new(options.is_retry, options.mute_rules_url);

    for group in groups {
        let results =
            ResultDir::read(&group.result_dir).map_err(|err| GenerateError::ReadResults {
                title: group.title.clone(),
                err,
            })?;

        let mut line = AggregateLine::new(&group.title);
        for (_, _, case) in results.testcases() {
            let outcome = TestOutcome::classify(case);
            debug!("{outcome}");
            line.add(outcome);
        }

        let reference = report_reference(&group.html_path, options.public_dir);
        let report_url = format!("{}/{}", options.public_dir_url, reference);
        let listing = render_listing(line.outcomes(), &options.enrichment);
        write_html(&listing, &options.html, &options.public_dir.join(&reference))?;

        info!(
            "{}: {} tests, report written to {}",
            group.title,
            line.test_count(),
            report_url
        );
        line.set_report(reference, report_url);
        table.add_line(line);
    }

    Ok(table)
}

/// Returns the path of a report relative to the public directory.
fn report_reference(html_path: &Utf8Path, public_dir: &Utf8Path) -> Utf8PathBuf {
    if html_path.is_absolute() {
        if let Some(relative) = pathdiff::diff_utf8_paths(html_path, public_dir) {
            return relative;
        }
    }
    html_path.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/public/try_1/ya-test.html", "/public", "try_1/ya-test.html"; "absolute inside")]
    #[test_case("/elsewhere/report.html", "/public", "../elsewhere/report.html"; "absolute outside")]
    #[test_case("try_1/ya-test.html", "/public", "try_1/ya-test.html"; "relative")]
    fn reference(html_path: &str, public_dir: &str, expected: &str) {
        assert_eq!(
            report_reference(Utf8Path::new(html_path), Utf8Path::new(public_dir)),
            expected
        );
    }
}
