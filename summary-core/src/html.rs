// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The detailed HTML report for one group of tests.

use crate::{
    errors::WriteReportError,
    listing::{StatusBucket, TestListing},
    outcome::{LogKind, TestOutcome},
};
use camino::Utf8Path;
use std::fmt;
use swrite::{SWrite, swrite, swriteln};

/// Display parameters for the report.
#[derive(Copy, Clone, Debug)]
pub struct HtmlParams<'a> {
    /// The build preset, e.g. `relwithdebinfo`.
    pub build_preset: &'a str,

    /// The build flags that reproduce the preset locally.
    pub build_preset_params: &'a str,

    /// The branch the tests ran on.
    pub branch: &'a str,
}

static STYLE: &str = "\
body { font-family: sans-serif; font-size: 14px; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 2px 6px; text-align: left; vertical-align: top; }
pre { margin: 0; max-height: 20em; overflow: auto; }
.passed { color: #1a7f37; }
.failed { color: #cf222e; }";

/// Renders the listing as a self-contained HTML document.
pub fn render_html(listing: &TestListing, params: &HtmlParams<'_>) -> String {
    let mut out = String::new();
    swriteln!(out, "<!DOCTYPE html>");
    swriteln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">");
    swriteln!(out, "<title>Test results</title>");
    swriteln!(out, "<style>\n{STYLE}\n</style>\n</head>\n<body>");

    swriteln!(
        out,
        "<p>Build preset: <code>{}</code>, branch: <code>{}</code></p>",
        Escaped(params.build_preset),
        Escaped(params.branch),
    );
    swriteln!(
        out,
        "<p>To reproduce locally: <code>./ya make -A {}</code></p>",
        Escaped(params.build_preset_params),
    );

    if listing.buckets.is_empty() {
        swriteln!(out, "<p>No tests were run.</p>");
    }

    swriteln!(out, "<ul>");
    for bucket in &listing.buckets {
        swriteln!(
            out,
            "<li><a href=\"#{status}\">{status}</a> ({})</li>",
            bucket.tests.len(),
            status = bucket.status,
        );
    }
    swriteln!(out, "</ul>");

    for bucket in &listing.buckets {
        render_bucket(&mut out, listing, bucket);
    }

    swriteln!(out, "</body>\n</html>");
    out
}

fn render_bucket(out: &mut String, listing: &TestListing, bucket: &StatusBucket) {
    let with_history = bucket.status.wants_history();

    swriteln!(
        out,
        "<h2 id=\"{status}\">{status} ({})</h2>",
        bucket.tests.len(),
        status = bucket.status,
    );
    swrite!(out, "<table>\n<tr><th>Test</th><th>Elapsed</th><th>Owners</th>");
    if bucket.has_any_log {
        swrite!(out, "<th>Logs</th>");
    }
    if with_history {
        swrite!(out, "<th>Recent runs</th>");
    }
    swriteln!(out, "<th>Details</th></tr>");

    for test in &bucket.tests {
        swrite!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            Escaped(&test.full_name()),
            test.elapsed_display(),
            Escaped(&owners_cell(listing, test)),
        );
        if bucket.has_any_log {
            swrite!(out, "<td>");
            render_logs(out, test);
            swrite!(out, "</td>");
        }
        if with_history {
            swrite!(out, "<td>");
            render_history(out, listing, test);
            swrite!(out, "</td>");
        }
        match test.failure_detail() {
            Some(detail) => swrite!(out, "<td><pre>{}</pre></td>", Escaped(detail)),
            None => swrite!(out, "<td></td>"),
        }
        swriteln!(out, "</tr>");
    }
    swriteln!(out, "</table>");
}

fn owners_cell(listing: &TestListing, test: &TestOutcome) -> String {
    let separator = listing.owner_separator.as_str();
    if separator.is_empty() {
        return test.owners().to_owned();
    }
    test.owners().replace(separator, " ")
}

fn render_logs(out: &mut String, test: &TestOutcome) {
    let mut first = true;
    for kind in LogKind::ALL {
        let Some(url) = test.log_references().get(&kind) else {
            continue;
        };
        if !first {
            swrite!(out, " ");
        }
        first = false;
        swrite!(
            out,
            "<a href=\"{}\">{}</a>",
            Escaped(url),
            kind.label()
        );
    }
}

fn render_history(out: &mut String, listing: &TestListing, test: &TestOutcome) {
    let Some(runs) = listing.history.get(&test.full_name()) else {
        return;
    };
    swrite!(out, "{}/{} passed", test.recent_pass_count(), runs.len());
    for run in runs {
        let class = if run.is_passed() { "passed" } else { "failed" };
        swrite!(
            out,
            " <span class=\"{class}\">{}</span>",
            Escaped(&run.status)
        );
    }
}

/// Writes the report to `path`, creating parent directories as needed.
pub fn write_html(
    listing: &TestListing,
    params: &HtmlParams<'_>,
    path: &Utf8Path,
) -> Result<(), WriteReportError> {
    let contents = render_html(listing, params);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|err| WriteReportError::new("detailed report", path, err))?;
    }
    std::fs::write(path, contents)
        .map_err(|err| WriteReportError::new("detailed report", path, err))
}

/// Escapes text for HTML element content and attribute values.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(idx) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..idx])?;
            let escaped = match rest.as_bytes()[idx] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            };
            f.write_str(escaped)?;
            rest = &rest[idx + 1..];
        }
        f.write_str(rest)
    }
}
