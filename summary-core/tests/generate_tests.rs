// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use indoc::{formatdoc, indoc};
use pretty_assertions::assert_eq;
use summary_core::{
    errors::GenerateError,
    generate::{GenerateOptions, ResultGroup, generate_summary},
    history::{HistoryContext, JsonFileHistory},
    html::HtmlParams,
    listing::Enrichment,
    outcome::TestStatus,
    ownership::CodeOwners,
    summary::MuteNote,
    verdict::{CommentColor, Verdict, compose, normalize_links},
};

static MUTE_URL: &str = "https://github.com/ydb-platform/ydb/tree/main/.github/config/muted_ya.txt";

static PARAMS: HtmlParams<'static> = HtmlParams {
    build_preset: "relwithdebinfo",
    build_preset_params: "--build \"relwithdebinfo\"",
    branch: "main",
};

fn write(path: &Utf8Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Seven passing tests, one failure and one muted test, split over two files.
fn write_results(dir: &Utf8Path) {
    let passing: String = (1..=7)
        .map(|idx| {
            format!(
                "<testcase classname=\"ydb/core/tx\" name=\"Commit{idx}\" time=\"0.{idx}\"/>\n"
            )
        })
        .collect();
    write(
        &dir.join("tx/junit.xml"),
        &formatdoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites>
            <testsuite name="tx">
            {passing}
            </testsuite>
            </testsuites>
        "#},
    );
    write(
        &dir.join("kqp/junit.xml"),
        indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuite name="kqp">
              <testcase classname="ydb/core/kqp/ut" name="KqpJoin.Simple" time="75.5">
                <properties>
                  <property name="url:log" value="https://logs/join"/>
                </properties>
                <failure message="assertion">expected 1, got 2</failure>
              </testcase>
              <testcase classname="ydb/core/kqp/ut" name="KqpAgg.Flaky" time="bogus">
                <properties>
                  <property name="mute" value="yes"/>
                </properties>
                <skipped>muted</skipped>
              </testcase>
            </testsuite>
        "#},
    );
    // Not a JUnit file.
    write(&dir.join("kqp/stderr.txt"), "not xml");
}

fn options<'a>(public_dir: &'a Utf8Path, enrichment: Enrichment<'a>) -> GenerateOptions<'a> {
    GenerateOptions {
        public_dir,
        public_dir_url: "https://public",
        is_retry: false,
        mute_rules_url: MUTE_URL,
        html: PARAMS,
        enrichment,
    }
}

#[test]
fn summary_of_mixed_results() {
    let temp = Utf8TempDir::new().unwrap();
    let results = temp.path().join("results");
    let public = temp.path().join("public");
    write_results(&results);

    let groups = vec![ResultGroup::new("Tests", "ya-test.html", &results)];
    let table = generate_summary(&groups, &options(&public, Enrichment::none())).unwrap();

    let line = &table.lines()[0];
    assert_eq!(line.test_count(), 9);
    assert_eq!(line.counts().get(TestStatus::Pass), 7);
    assert_eq!(line.counts().get(TestStatus::Fail), 1);
    assert_eq!(line.counts().get(TestStatus::Mute), 1);
    assert_eq!(line.counts().total(), 9);
    assert!(table.is_failed());
    assert_eq!(line.report().unwrap().url, "https://public/ya-test.html");

    assert_eq!(
        table.render(MuteNote::Inline).join("\n"),
        indoc! {r#"
            | TESTS | PASSED | ERRORS | FAILED | SKIPPED | MUTED<sup>[?](https://github.com/ydb-platform/ydb/tree/main/.github/config/muted_ya.txt "All mute rules are defined here")</sup> |
            | ---: | ---: | ---: | ---: | ---: | ---: |
            | [9](https://public/ya-test.html) | [7](https://public/ya-test.html#PASS) | 0 | [1](https://public/ya-test.html#FAIL) | 0 | [1](https://public/ya-test.html#MUTE) |"#}
    );

    assert_eq!(Verdict::from_summary(&table, false), Verdict::Failure);
    assert_eq!(Verdict::from_summary(&table, true), Verdict::Success);

    let message = compose(&table, &[], true, false);
    assert_eq!(message.color, CommentColor::Red);
    assert_eq!(message.lines[0], "Some tests failed, follow the links below.");

    let html = std::fs::read_to_string(public.join("ya-test.html")).unwrap();
    assert!(html.contains("<h2 id=\"FAIL\">FAIL (1)</h2>"));
    assert!(html.contains("<h2 id=\"MUTE\">MUTE (1)</h2>"));
    assert!(html.contains("<h2 id=\"PASS\">PASS (7)</h2>"));
    assert!(html.contains("1m 15.500s"));
    assert!(html.contains("expected 1, got 2"));
}

#[test]
fn multiple_groups_with_owners_and_history() {
    let temp = Utf8TempDir::new().unwrap();
    let results = temp.path().join("results");
    let public = temp.path().join("public");
    write_results(&results);

    let history_path = temp.path().join("history.json");
    write(
        &history_path,
        r#"{
            "ydb/core/kqp/ut/KqpJoin.Simple": [
                {"status": "passed"}, {"status": "failure"}, {"status": "passed"}
            ],
            "ydb/core/tx/Commit1": [{"status": "passed"}]
        }"#,
    );
    let provider = JsonFileHistory::new(history_path);
    let owners = CodeOwners::parse("/ydb/core/kqp/ @ydb-platform/qp\n").unwrap();
    let enrichment = Enrichment {
        ownership: Some(&owners),
        history: Some(HistoryContext {
            provider: &provider,
            build_type: "relwithdebinfo",
            branch: "main",
        }),
        window: 5,
        ..Enrichment::none()
    };

    let groups = vec![
        ResultGroup::new("kqp", public.join("try_1/kqp.html"), results.join("kqp")),
        ResultGroup::new("tx", "try_1/tx.html", results.join("tx")),
        ResultGroup::new("skipped step", "try_1/none.html", results.join("missing")),
    ];
    let table = generate_summary(&groups, &options(&public, enrichment)).unwrap();

    let titles: Vec<_> = table.lines().iter().map(|line| line.title()).collect();
    assert_eq!(titles, vec!["kqp", "tx", "skipped step"]);
    assert!(table.lines()[0].is_failed());
    assert!(!table.lines()[1].is_failed());
    assert_eq!(table.lines()[2].test_count(), 0);
    assert_eq!(
        table.lines()[0].report().unwrap().reference,
        "try_1/kqp.html"
    );

    let rendered = table.render(MuteNote::Footnote);
    assert_eq!(rendered[0], "|  | TESTS | PASSED | ERRORS | FAILED | SKIPPED | MUTED[^1] |");
    assert_eq!(rendered[1], "| :--- | ---: | ---: | ---: | ---: | ---: | ---: |");
    assert_eq!(
        rendered[4],
        "| skipped step | 0 | 0 | 0 | 0 | 0 | 0 |"
    );

    let html = std::fs::read_to_string(public.join("try_1/kqp.html")).unwrap();
    assert!(html.contains("TEAM:@ydb-platform/qp"));
    assert!(html.contains("2/3 passed"));
    assert!(public.join("try_1/none.html").exists());
}

#[test]
fn retry_message() {
    let temp = Utf8TempDir::new().unwrap();
    let results = temp.path().join("results");
    let public = temp.path().join("public");
    write_results(&results);

    let groups = vec![ResultGroup::new("Tests", "ya-test.html", results.join("kqp"))];
    let mut options = options(&public, Enrichment::none());
    options.is_retry = true;
    let table = generate_summary(&groups, &options).unwrap();

    let links = normalize_links("2 [Test history](https://history)\n1 [Logs](https://logs)\n");
    let message = compose(&table, &links, false, false);
    assert_eq!(message.color, CommentColor::Yellow);
    assert_eq!(
        message.text(),
        indoc! {"
            Some tests failed, follow the links below. Going to retry failed tests...

            <details>


            [Logs](https://logs) | [Test history](https://history)
            | TESTS | PASSED | ERRORS | FAILED | SKIPPED | MUTED[^1] |
            | ---: | ---: | ---: | ---: | ---: | ---: |
            | [2 (only retried tests)](https://public/ya-test.html) | 0 | 0 | [1](https://public/ya-test.html#FAIL) | 0 | [1](https://public/ya-test.html#MUTE) |

            [^1]: All mute rules are defined [here](https://github.com/ydb-platform/ydb/tree/main/.github/config/muted_ya.txt).

            </details>

        "}
    );
}

#[test]
fn malformed_results_are_fatal() {
    let temp = Utf8TempDir::new().unwrap();
    let results = temp.path().join("results");
    let public = temp.path().join("public");
    write(&results.join("junit.xml"), "<testsuite><testcase name=\"a\"></testsuite>");

    let groups = vec![ResultGroup::new("Tests", "ya-test.html", &results)];
    let err = generate_summary(&groups, &options(&public, Enrichment::none())).unwrap_err();
    assert!(
        matches!(&err, GenerateError::ReadResults { title, .. } if title == "Tests"),
        "unexpected error: {err}"
    );
    assert!(!public.join("ya-test.html").exists());
}
