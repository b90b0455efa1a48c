// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recent run history for failing and muted tests.
//!
//! History is a decoration: it never changes classification or counts. Any error while
//! fetching it is logged and the merge carries on with no history at all.

use crate::{
    errors::{DisplayErrorChain, HistoryError},
    outcome::TestOutcome,
};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, warn};

/// The status string that counts as a pass in history records.
pub static PASSED_STATUS: &str = "passed";

/// One recorded run of a test.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RunRecord {
    /// The recorded status, e.g. `passed` or `failure`.
    pub status: String,

    /// Any other fields the history store returns, such as the run date.
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl RunRecord {
    /// Creates a record with just a status.
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            details: BTreeMap::new(),
        }
    }

    /// Returns true if this run passed.
    pub fn is_passed(&self) -> bool {
        self.status == PASSED_STATUS
    }
}

/// Recent runs keyed by full test name, most recent first.
///
/// Keyed by an ordered map so that the result does not depend on fetch order.
pub type HistoryMap = BTreeMap<String, Vec<RunRecord>>;

/// A request for history.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryQuery<'a> {
    /// The full names of the tests to look up.
    pub full_names: &'a [String],

    /// The maximum number of runs per test.
    pub window: usize,

    /// The build configuration, e.g. `relwithdebinfo`.
    pub build_type: &'a str,

    /// The branch runs were recorded on.
    pub branch: &'a str,
}

/// A source of recent run outcomes.
pub trait HistoryProvider {
    /// Fetches up to `query.window` recent runs for each test in the query.
    fn fetch(&self, query: &HistoryQuery<'_>) -> Result<HistoryMap, HistoryError>;
}

/// A provider that never has any history.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHistory;

impl HistoryProvider for NoHistory {
    fn fetch(&self, _query: &HistoryQuery<'_>) -> Result<HistoryMap, HistoryError> {
        Ok(HistoryMap::new())
    }
}

/// A provider backed by a JSON file of the form `{"full/name": [{"status": "passed"}, ...]}`.
#[derive(Clone, Debug)]
pub struct JsonFileHistory {
    path: Utf8PathBuf,
}

impl JsonFileHistory {
    /// Creates a new provider reading from `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryProvider for JsonFileHistory {
    fn fetch(&self, query: &HistoryQuery<'_>) -> Result<HistoryMap, HistoryError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|err| HistoryError::Read {
            path: self.path.clone(),
            err,
        })?;
        let all: HistoryMap =
            serde_json::from_str(&contents).map_err(|err| HistoryError::Deserialize {
                origin: format!("`{}`", self.path),
                err,
            })?;
        Ok(restrict_to_query(all, query))
    }
}

/// A provider that POSTs the query as JSON to a history service.
///
/// The service responds with the same shape that [`JsonFileHistory`] reads.
#[derive(Clone, Debug)]
pub struct HttpHistory {
    url: String,
    timeout: Duration,
}

impl HttpHistory {
    /// Creates a new provider. `timeout` bounds the entire request.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl HistoryProvider for HttpHistory {
    fn fetch(&self, query: &HistoryQuery<'_>) -> Result<HistoryMap, HistoryError> {
        let body = serde_json::to_string(query).map_err(|err| HistoryError::Serialize { err })?;
        let http_error = |err| HistoryError::Http {
            url: self.url.clone(),
            err: Box::new(err),
        };

        debug!(
            "fetching history for {} tests from {}",
            query.full_names.len(),
            self.url
        );
        let mut response = ureq::post(self.url.as_str())
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(http_error)?;
        let text = response.body_mut().read_to_string().map_err(http_error)?;

        let all: HistoryMap =
            serde_json::from_str(&text).map_err(|err| HistoryError::Deserialize {
                origin: format!("`{}`", self.url),
                err,
            })?;
        Ok(restrict_to_query(all, query))
    }
}

fn restrict_to_query(mut all: HistoryMap, query: &HistoryQuery<'_>) -> HistoryMap {
    query
        .full_names
        .iter()
        .filter_map(|name| {
            let mut runs = all.remove(name)?;
            runs.truncate(query.window);
            Some((name.clone(), runs))
        })
        .collect()
}

/// Where and how to look up history.
#[derive(Clone, Copy)]
pub struct HistoryContext<'a> {
    /// The history source.
    pub provider: &'a dyn HistoryProvider,

    /// The build configuration.
    pub build_type: &'a str,

    /// The branch.
    pub branch: &'a str,
}

/// Looks up recent runs for failed and muted tests, and sets their recent pass counts.
///
/// Returns the history that was found. If the provider fails, the error is logged and an empty
/// map is returned: history never aborts a summary.
pub fn merge_history(
    outcomes: &mut [TestOutcome],
    window: usize,
    context: &HistoryContext<'_>,
) -> HistoryMap {
    let full_names: Vec<String> = outcomes
        .iter()
        .filter(|outcome| outcome.status().wants_history())
        .map(TestOutcome::full_name)
        .collect();
    if full_names.is_empty() {
        return HistoryMap::new();
    }

    let query = HistoryQuery {
        full_names: &full_names,
        window,
        build_type: context.build_type,
        branch: context.branch,
    };
    let history = match context.provider.fetch(&query) {
        Ok(history) => history,
        Err(err) => {
            warn!(
                "continuing without test history: {}",
                DisplayErrorChain::new(err)
            );
            return HistoryMap::new();
        }
    };

    for outcome in outcomes
        .iter_mut()
        .filter(|outcome| outcome.status().wants_history())
    {
        if let Some(runs) = history.get(&outcome.full_name()) {
            let passed = runs.iter().filter(|run| run.is_passed()).count();
            outcome.set_recent_pass_count(passed);
        }
    }

    history
}
