// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-status test listing shown in detailed reports.

use crate::{
    history::{HistoryContext, HistoryMap, merge_history},
    outcome::{TestOutcome, TestStatus},
    ownership::{OwnershipLookup, joined_owners},
};

/// The default separator between owners of a test.
pub static DEFAULT_OWNER_SEPARATOR: &str = ";;";

/// The tests with a single status.
#[derive(Clone, Debug)]
pub struct StatusBucket {
    /// The status shared by every test in this bucket.
    pub status: TestStatus,

    /// The tests, sorted by full name.
    pub tests: Vec<TestOutcome>,

    /// True if any test in this bucket links to a log.
    pub has_any_log: bool,
}

/// Tests grouped by status, in listing order, plus any history that was found for them.
#[derive(Clone, Debug)]
pub struct TestListing {
    /// Non-empty buckets in [`TestStatus::LISTING_ORDER`].
    pub buckets: Vec<StatusBucket>,

    /// Recent runs of failed and muted tests.
    pub history: HistoryMap,

    /// The separator the owners of each test were joined with.
    pub owner_separator: String,
}

impl TestListing {
    /// Returns the bucket for `status`, if it has any tests.
    pub fn bucket(&self, status: TestStatus) -> Option<&StatusBucket> {
        self.buckets.iter().find(|bucket| bucket.status == status)
    }
}

/// Optional decorations applied while building a listing.
#[derive(Clone, Copy)]
pub struct Enrichment<'a> {
    /// Resolves test owners from their class names.
    pub ownership: Option<&'a dyn OwnershipLookup>,

    /// The separator between owners.
    pub owner_separator: &'a str,

    /// Where to look up recent runs.
    pub history: Option<HistoryContext<'a>>,

    /// The maximum number of recent runs per test.
    pub window: usize,
}

impl Enrichment<'_> {
    /// No owners and no history.
    pub fn none() -> Self {
        Self {
            ownership: None,
            owner_separator: DEFAULT_OWNER_SEPARATOR,
            history: None,
            window: 0,
        }
    }
}

/// Groups outcomes by status, resolves owners and merges history for failed and muted tests.
///
/// Within a bucket tests are ordered by full name. The recent pass count is filled in but does
/// not affect ordering.
pub fn render_listing(outcomes: &[TestOutcome], enrichment: &Enrichment<'_>) -> TestListing {
    let mut outcomes = outcomes.to_vec();

    if let Some(ownership) = enrichment.ownership {
        for outcome in &mut outcomes {
            let owners = ownership.owners_of(outcome.classname());
            outcome.set_owners(joined_owners(&owners, enrichment.owner_separator));
        }
    }

    let history = match &enrichment.history {
        Some(context) => merge_history(&mut outcomes, enrichment.window, context),
        None => HistoryMap::new(),
    };

    let mut by_status: [Vec<TestOutcome>; TestStatus::COUNT] = Default::default();
    for outcome in outcomes {
        by_status[outcome.status().index()].push(outcome);
    }

    let buckets = TestStatus::LISTING_ORDER
        .into_iter()
        .filter_map(|status| {
            let mut tests = std::mem::take(&mut by_status[status.index()]);
            if tests.is_empty() {
                return None;
            }
            tests.sort_by_cached_key(TestOutcome::full_name);
            let has_any_log = tests
                .iter()
                .any(|test| !test.log_references().is_empty());
            Some(StatusBucket {
                status,
                tests,
                has_any_log,
            })
        })
        .collect();

    TestListing {
        buckets,
        history,
        owner_separator: enrichment.owner_separator.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        history::test_helpers::FakeHistory,
        outcome::LogKind,
        ownership::{Owner, OwnerKind},
    };
    use pretty_assertions::assert_eq;
    use test_strategy::proptest;

    struct FixedOwners;

    impl OwnershipLookup for FixedOwners {
        fn owners_of(&self, path: &str) -> Vec<Owner> {
            if path.starts_with("ydb/core") {
                vec![
                    Owner::new(OwnerKind::Team, "@ydb-platform/core"),
                    Owner::new(OwnerKind::Username, "@oncall"),
                ]
            } else {
                Vec::new()
            }
        }
    }

    fn names(bucket: &StatusBucket) -> Vec<String> {
        bucket.tests.iter().map(TestOutcome::full_name).collect()
    }

    #[test]
    fn buckets_in_listing_order() {
        let outcomes = vec![
            TestOutcome::new("b", "pass", TestStatus::Pass),
            TestOutcome::new("b", "fail", TestStatus::Fail),
            TestOutcome::new("a", "pass", TestStatus::Pass),
            TestOutcome::new("a", "mute", TestStatus::Mute),
            TestOutcome::new("a", "error", TestStatus::Error),
        ];
        let listing = render_listing(&outcomes, &Enrichment::none());

        let statuses: Vec<_> = listing.buckets.iter().map(|b| b.status).collect();
        assert_eq!(
            statuses,
            vec![
                TestStatus::Error,
                TestStatus::Fail,
                TestStatus::Mute,
                TestStatus::Pass
            ]
        );
        assert!(listing.bucket(TestStatus::Skip).is_none());
        assert_eq!(
            names(listing.bucket(TestStatus::Pass).unwrap()),
            vec!["a/pass", "b/pass"]
        );
        assert!(listing.history.is_empty());
    }

    #[test]
    fn has_any_log_per_bucket() {
        let outcomes = vec![
            TestOutcome::new("a", "x", TestStatus::Fail).with_log(LogKind::Stdout, "https://s/out"),
            TestOutcome::new("a", "y", TestStatus::Fail),
            TestOutcome::new("a", "z", TestStatus::Pass),
        ];
        let listing = render_listing(&outcomes, &Enrichment::none());
        assert!(listing.bucket(TestStatus::Fail).unwrap().has_any_log);
        assert!(!listing.bucket(TestStatus::Pass).unwrap().has_any_log);
    }

    #[test]
    fn owners_and_history() {
        let outcomes = vec![
            TestOutcome::new("ydb/core/kqp", "Join", TestStatus::Fail),
            TestOutcome::new("ydb/core/kqp", "Agg", TestStatus::Fail),
            TestOutcome::new("cloud/nbs", "Read", TestStatus::Mute),
            TestOutcome::new("ydb/core/tx", "Commit", TestStatus::Pass),
        ];
        let provider = FakeHistory::with(&[
            ("ydb/core/kqp/Join", "passed passed passed"),
            ("ydb/core/kqp/Agg", "failure"),
            ("cloud/nbs/Read", "mute passed"),
        ]);
        let ownership = FixedOwners;
        let enrichment = Enrichment {
            ownership: Some(&ownership),
            owner_separator: DEFAULT_OWNER_SEPARATOR,
            history: Some(HistoryContext {
                provider: &provider,
                build_type: "relwithdebinfo",
                branch: "main",
            }),
            window: 5,
        };
        let listing = render_listing(&outcomes, &enrichment);

        // Sorted by name even though `Join` has more recent passes.
        let failed = listing.bucket(TestStatus::Fail).unwrap();
        assert_eq!(names(failed), vec!["ydb/core/kqp/Agg", "ydb/core/kqp/Join"]);
        assert_eq!(failed.tests[0].recent_pass_count(), 0);
        assert_eq!(failed.tests[1].recent_pass_count(), 3);
        assert_eq!(
            failed.tests[0].owners(),
            "TEAM:@ydb-platform/core;;USERNAME:@oncall"
        );

        let muted = listing.bucket(TestStatus::Mute).unwrap();
        assert_eq!(muted.tests[0].recent_pass_count(), 1);
        assert_eq!(muted.tests[0].owners(), "");

        assert_eq!(listing.history.len(), 3);
        assert_eq!(
            provider.queries.borrow().as_slice(),
            &[vec![
                "ydb/core/kqp/Join".to_owned(),
                "ydb/core/kqp/Agg".to_owned(),
                "cloud/nbs/Read".to_owned(),
            ]]
        );
    }

    #[test]
    fn history_failure_keeps_listing() {
        let outcomes = vec![TestOutcome::new("a", "fail", TestStatus::Fail)];
        let provider = FakeHistory::failing();
        let enrichment = Enrichment {
            history: Some(HistoryContext {
                provider: &provider,
                build_type: "relwithdebinfo",
                branch: "main",
            }),
            window: 5,
            ..Enrichment::none()
        };
        let listing = render_listing(&outcomes, &enrichment);
        assert_eq!(listing.buckets.len(), 1);
        assert_eq!(listing.buckets[0].tests[0].recent_pass_count(), 0);
        assert!(listing.history.is_empty());
    }

    #[proptest]
    fn listing_preserves_outcomes(statuses: Vec<(TestStatus, u8)>) {
        let outcomes: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(idx, (status, class))| {
                TestOutcome::new(format!("class{class}"), format!("test{idx}"), *status)
            })
            .collect();
        let listing = render_listing(&outcomes, &Enrichment::none());

        let total: usize = listing.buckets.iter().map(|b| b.tests.len()).sum();
        assert_eq!(total, outcomes.len());
        for bucket in &listing.buckets {
            assert!(!bucket.tests.is_empty());
            assert!(bucket.tests.iter().all(|t| t.status() == bucket.status));
            let names = names(bucket);
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        }
    }
}
