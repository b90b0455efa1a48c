// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, SummaryExitCode,
    output::{OutputContext, OutputOpts, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;
use summary_core::{
    config::SummaryConfig,
    errors::WriteReportError,
    generate::{GenerateOptions, ResultGroup, generate_summary},
    history::HistoryContext,
    html::HtmlParams,
    listing::Enrichment,
    ownership::{CodeOwners, OwnershipLookup},
    summary::{MuteNote, SummaryTable},
    verdict::{Verdict, compose, normalize_links},
};
use tracing::{debug, info};

/// The environment variable naming the GitHub step summary file.
static STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Summarize JUnit test results.
///
/// Positional arguments are `TITLE HTML_OUT PATH` triples: one line of the summary table per
/// triple, with the detailed report for it written to HTML_OUT.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct JunitSummaryApp {
    /// Directory published at --public-dir-url
    #[arg(long, alias = "public_dir", value_name = "DIR")]
    public_dir: Utf8PathBuf,

    /// URL the public directory is published at
    #[arg(long, alias = "public_dir_url", value_name = "URL")]
    public_dir_url: String,

    /// File with auxiliary links, one `<ordering token> <markdown link>` per line
    #[arg(long, alias = "summary_links", value_name = "PATH")]
    summary_links: Utf8PathBuf,

    /// Build preset the tests were built with
    #[arg(
        long,
        alias = "build_preset",
        default_value = "default-linux-x86-64-relwithdebinfo"
    )]
    build_preset: String,

    /// Branch the tests ran on
    #[arg(long, default_value = "main")]
    branch: String,

    /// Write the verdict (`success` or `failure`) to this file
    #[arg(long, alias = "status_report_file", value_name = "PATH")]
    status_report_file: Option<Utf8PathBuf>,

    /// Whether this run only retries previously failed tests (0 or 1)
    #[arg(long, alias = "is_retry", value_name = "0|1", value_parser = clap::value_parser!(u8).range(0..=1))]
    is_retry: u8,

    /// Whether this is the last retry (0 or 1)
    #[arg(long, alias = "is_last_retry", value_name = "0|1", value_parser = clap::value_parser!(u8).range(0..=1))]
    is_last_retry: u8,

    /// Whether failures are outside the blocking policy (0 or 1)
    #[arg(long, alias = "is_test_result_ignored", value_name = "0|1", value_parser = clap::value_parser!(u8).range(0..=1))]
    is_test_result_ignored: u8,

    /// Write the status message color to this file
    #[arg(long, alias = "comment_color_file", value_name = "PATH")]
    comment_color_file: Utf8PathBuf,

    /// Write the status message text to this file
    #[arg(long, alias = "comment_text_file", value_name = "PATH")]
    comment_text_file: Utf8PathBuf,

    /// Config file layered on top of the defaults
    #[arg(long, value_name = "PATH", env = "JUNIT_SUMMARY_CONFIG")]
    config: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,

    /// TITLE HTML_OUT PATH triples
    #[arg(required = true, num_args = 1.., value_name = "TITLE HTML_OUT PATH")]
    groups: Vec<String>,
}

impl JunitSummaryApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code.
    pub fn exec(self) -> Result<i32, ExpectedError> {
        let groups = result_groups(&self.groups)?;

        let config = SummaryConfig::from_sources(self.config.as_deref())?;
        let mute_rules_url = config.mute_rules.url(
            std::env::var("GITHUB_SERVER_URL").ok().as_deref(),
            std::env::var("GITHUB_REPOSITORY").ok().as_deref(),
        );

        let ownership = CodeOwners::load(&config.ownership.rules_file);
        let provider = config.history.provider();
        let enrichment = Enrichment {
            ownership: ownership.as_ref().map(|o| o as &dyn OwnershipLookup),
            owner_separator: &config.ownership.separator,
            history: Some(HistoryContext {
                provider: provider.as_ref(),
                build_type: &self.build_preset,
                branch: &self.branch,
            }),
            window: config.history.window,
        };
        let options = GenerateOptions {
            public_dir: &self.public_dir,
            public_dir_url: &self.public_dir_url,
            is_retry: self.is_retry != 0,
            mute_rules_url: &mute_rules_url,
            html: HtmlParams {
                build_preset: &self.build_preset,
                build_preset_params: config.build_preset_params(&self.build_preset),
                branch: &self.branch,
            },
            enrichment,
        };

        let summary = generate_summary(&groups, &options)?;

        let step_summary = std::env::var(STEP_SUMMARY_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .map(Utf8PathBuf::from);
        write_step_summary(&summary, step_summary.as_deref())?;

        let is_ignored = self.is_test_result_ignored != 0;
        let verdict = Verdict::from_summary(&summary, is_ignored);

        let links = std::fs::read_to_string(&self.summary_links)
            .map_err(|err| ExpectedError::read_summary_links(self.summary_links.clone(), err))?;
        let message = compose(
            &summary,
            &normalize_links(&links),
            self.is_last_retry != 0,
            is_ignored,
        );

        write_file("comment color", &self.comment_color_file, message.color.as_str())?;
        write_file("comment text", &self.comment_text_file, &message.text())?;
        if let Some(path) = &self.status_report_file {
            write_file("verdict", path, verdict.as_str())?;
        }

        info!("verdict: {verdict}, message color: {}", message.color);
        Ok(SummaryExitCode::OK)
    }
}

fn result_groups(args: &[String]) -> Result<Vec<ResultGroup>, ExpectedError> {
    if args.len() % 3 != 0 {
        return Err(ExpectedError::InvalidArgumentCount { count: args.len() });
    }
    Ok(args
        .chunks_exact(3)
        .map(|triple| ResultGroup::new(&triple[0], &triple[1], &triple[2]))
        .collect())
}

/// Appends the summary table to the step summary file if there is one, otherwise prints it.
fn write_step_summary(
    summary: &SummaryTable,
    step_summary: Option<&Utf8Path>,
) -> Result<(), WriteReportError> {
    let mut text = summary.render(MuteNote::Footnote).join("\n");
    text.push_str("\n\n");

    match step_summary {
        Some(path) => {
            debug!("appending summary to `{path}`");
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(text.as_bytes()))
                .map_err(|err| WriteReportError::new("step summary", path, err))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| WriteReportError::new("step summary", "<stdout>", err))
        }
    }
}

fn write_file(kind: &'static str, path: &Utf8Path, contents: &str) -> Result<(), WriteReportError> {
    std::fs::write(path, contents).map_err(|err| WriteReportError::new(kind, path, err))
}
