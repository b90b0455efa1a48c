// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifying raw JUnit test cases into outcomes.

use crate::errors::{ElapsedParseError, ElapsedParseErrorKind};
use junit_reader::TestCase;
use std::{collections::BTreeMap, fmt};
use tracing::warn;

/// The status of a single test, after classification.
///
/// Variants are declared in severity order: the derived `Ord` puts better statuses first.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum TestStatus {
    /// The test passed.
    Pass,

    /// The test failed (a `<failure>` marker).
    Fail,

    /// The test errored (an `<error>` marker).
    Error,

    /// The test was skipped.
    Skip,

    /// The test failed or was skipped, but a mute rule applies to it.
    Mute,
}

impl TestStatus {
    /// The number of statuses.
    pub const COUNT: usize = 5;

    /// All statuses, in severity order.
    pub const ALL: [TestStatus; Self::COUNT] = [
        TestStatus::Pass,
        TestStatus::Fail,
        TestStatus::Error,
        TestStatus::Skip,
        TestStatus::Mute,
    ];

    /// The order in which statuses are listed in detailed reports: most actionable first.
    pub const LISTING_ORDER: [TestStatus; Self::COUNT] = [
        TestStatus::Error,
        TestStatus::Fail,
        TestStatus::Skip,
        TestStatus::Mute,
        TestStatus::Pass,
    ];

    /// Returns the display name of this status, also used as an anchor in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Error => "ERROR",
            TestStatus::Skip => "SKIP",
            TestStatus::Mute => "MUTE",
        }
    }

    /// Returns true if a test with this status should fail the run.
    ///
    /// Muted tests are known, accepted failures: they are reported separately but never block.
    pub fn is_blocking(self) -> bool {
        matches!(self, TestStatus::Fail | TestStatus::Error)
    }

    /// Returns true if recent history is looked up for tests with this status.
    pub fn wants_history(self) -> bool {
        matches!(self, TestStatus::Fail | TestStatus::Mute)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of log a test case may link to.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogKind {
    /// The main test log (`url:Log`).
    Log,

    /// The lowercase variant of the test log (`url:log`).
    LowerLog,

    /// A directory with all the logs (`url:logsdir`).
    LogsDir,

    /// Captured standard output (`url:stdout`).
    Stdout,

    /// Captured standard error (`url:stderr`).
    Stderr,
}

impl LogKind {
    /// All log kinds, in display order.
    pub const ALL: [LogKind; 5] = [
        LogKind::Log,
        LogKind::LowerLog,
        LogKind::LogsDir,
        LogKind::Stdout,
        LogKind::Stderr,
    ];

    /// The label shown for links of this kind.
    pub fn label(self) -> &'static str {
        match self {
            LogKind::Log => "Log",
            LogKind::LowerLog => "log",
            LogKind::LogsDir => "logsdir",
            LogKind::Stdout => "stdout",
            LogKind::Stderr => "stderr",
        }
    }

    /// The name of the JUnit property that carries the URL.
    pub fn property_name(self) -> &'static str {
        match self {
            LogKind::Log => "url:Log",
            LogKind::LowerLog => "url:log",
            LogKind::LogsDir => "url:logsdir",
            LogKind::Stdout => "url:stdout",
            LogKind::Stderr => "url:stderr",
        }
    }
}

/// The property that marks a test as muted.
pub static MUTE_PROPERTY: &str = "mute";

/// A single classified test.
///
/// The classification itself is immutable. Owners and the recent pass count are decorations
/// filled in later by the ownership and history passes.
#[derive(Clone, Debug, PartialEq)]
pub struct TestOutcome {
    classname: String,
    name: String,
    status: TestStatus,
    elapsed: f64,
    log_references: BTreeMap<LogKind, String>,
    failure_detail: Option<String>,
    recent_pass_count: usize,
    owners: String,
}

impl TestOutcome {
    /// Creates a new outcome with no timing, logs or decorations.
    pub fn new(classname: impl Into<String>, name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            classname: classname.into(),
            name: name.into(),
            status,
            elapsed: 0.0,
            log_references: BTreeMap::new(),
            failure_detail: None,
            recent_pass_count: 0,
            owners: String::new(),
        }
    }

    /// Classifies a raw test case, logging a warning if its time can't be parsed.
    pub fn classify(case: &TestCase) -> Self {
        Self::classify_with(case, |err| warn!("{err}"))
    }

    /// Classifies a raw test case, passing any diagnostics to `on_warning`.
    ///
    /// The status follows a fixed precedence: failure, then error, then the mute property, then
    /// skip. A muted test stays muted even if it also carries a skip marker.
    pub fn classify_with(case: &TestCase, mut on_warning: impl FnMut(&ElapsedParseError)) -> Self {
        let classname = case.classname.clone().unwrap_or_default();
        let name = case.name.clone();

        let (status, failure_detail) = if let Some(failure) = &case.failure {
            (TestStatus::Fail, failure.text.clone())
        } else if let Some(error) = &case.error {
            (TestStatus::Error, error.text.clone())
        } else if case.property(MUTE_PROPERTY).is_some() {
            (
                TestStatus::Mute,
                case.skipped.as_ref().and_then(|skipped| skipped.text.clone()),
            )
        } else if let Some(skipped) = &case.skipped {
            (TestStatus::Skip, skipped.text.clone())
        } else {
            (TestStatus::Pass, None)
        };

        let log_references = LogKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let url = case.property(kind.property_name())?;
                (!url.is_empty()).then(|| (kind, url.to_owned()))
            })
            .collect();

        let elapsed = match parse_elapsed(case.time.as_deref()) {
            Ok(elapsed) => elapsed,
            Err(kind) => {
                on_warning(&ElapsedParseError::new(
                    &classname,
                    &name,
                    case.time.clone(),
                    kind,
                ));
                0.0
            }
        };

        Self {
            classname,
            name,
            status,
            elapsed,
            log_references,
            failure_detail,
            recent_pass_count: 0,
            owners: String::new(),
        }
    }

    /// Sets the elapsed time in seconds. Non-finite or negative values become 0.
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = if elapsed.is_finite() && elapsed >= 0.0 {
            elapsed
        } else {
            0.0
        };
        self
    }

    /// Adds a log reference. Empty URLs are ignored.
    pub fn with_log(mut self, kind: LogKind, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.log_references.insert(kind, url);
        }
        self
    }

    /// Sets the failure detail.
    pub fn with_failure_detail(mut self, detail: impl Into<String>) -> Self {
        self.failure_detail = Some(detail.into());
        self
    }

    /// The classname of this test.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// The name of this test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full name of this test, `classname/name`, unique within a run.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.classname, self.name)
    }

    /// The status of this test.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// The time this test took, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The elapsed time in a human-readable form, e.g. `2m 3.500s` or `0.250s`.
    pub fn elapsed_display(&self) -> String {
        let minutes = (self.elapsed / 60.0).floor();
        let seconds = self.elapsed - minutes * 60.0;
        if minutes > 0.0 {
            format!("{minutes}m {seconds:.3}s")
        } else {
            format!("{seconds:.3}s")
        }
    }

    /// Links to logs for this test, keyed by kind.
    pub fn log_references(&self) -> &BTreeMap<LogKind, String> {
        &self.log_references
    }

    /// The text attached to the marker that determined the status, if any.
    pub fn failure_detail(&self) -> Option<&str> {
        self.failure_detail.as_deref()
    }

    /// The number of recent runs of this test that passed.
    pub fn recent_pass_count(&self) -> usize {
        self.recent_pass_count
    }

    /// The owners of this test, joined into a single string.
    pub fn owners(&self) -> &str {
        &self.owners
    }

    pub(crate) fn set_recent_pass_count(&mut self, count: usize) {
        self.recent_pass_count = count;
    }

    pub(crate) fn set_owners(&mut self, owners: String) {
        self.owners = owners;
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<138} {}", self.full_name(), self.status)
    }
}

/// Parses a JUnit `time` attribute into a finite, non-negative number of seconds.
pub fn parse_elapsed(time: Option<&str>) -> Result<f64, ElapsedParseErrorKind> {
    let time = time.ok_or(ElapsedParseErrorKind::Missing)?;
    let elapsed: f64 = time
        .trim()
        .parse()
        .map_err(|_| ElapsedParseErrorKind::Invalid)?;
    if !elapsed.is_finite() || elapsed < 0.0 {
        return Err(ElapsedParseErrorKind::OutOfRange);
    }
    Ok(elapsed)
}
