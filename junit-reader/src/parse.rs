// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse a `Report` out of JUnit XML.

use crate::{Marker, ParseError, Property, Report, TestCase, TestSuite};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

static TESTSUITE_TAG: &[u8] = b"testsuite";
static TESTCASE_TAG: &[u8] = b"testcase";
static PROPERTIES_TAG: &[u8] = b"properties";
static PROPERTY_TAG: &[u8] = b"property";
static FAILURE_TAG: &[u8] = b"failure";
static ERROR_TAG: &[u8] = b"error";
static SKIPPED_TAG: &[u8] = b"skipped";

pub(crate) fn parse_report(input: &str) -> Result<Report, ParseError> {
    let mut reader = Reader::from_str(input);
    let mut parser = ReportParser::default();
    // quick-xml checks end tag names but not elements left open at EOF.
    let mut open = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                open.push(start.name().as_ref().to_vec());
                parser.start(&start, false)?;
            }
            Event::Empty(start) => parser.start(&start, true)?,
            Event::End(end) => {
                open.pop();
                parser.end(end.name().as_ref());
            }
            Event::Text(text) => parser.text(&text.unescape()?),
            Event::CData(cdata) => parser.text(&String::from_utf8_lossy(&cdata.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(element) = open.last() {
        return Err(ParseError::Truncated {
            element: String::from_utf8_lossy(element).into_owned(),
        });
    }

    Ok(parser.finish())
}

#[derive(Copy, Clone, Debug)]
enum MarkerKind {
    Failure,
    Error,
    Skipped,
}

#[derive(Debug)]
struct OpenMarker {
    kind: MarkerKind,
    marker: Marker,
    // Elements nested inside the marker; their text is not part of the marker body.
    nested: usize,
}

#[derive(Debug, Default)]
struct ReportParser {
    report: Report,
    suite: Option<TestSuite>,
    case: Option<TestCase>,
    marker: Option<OpenMarker>,
    in_properties: bool,
}

impl ReportParser {
    fn start(&mut self, start: &BytesStart<'_>, is_empty: bool) -> quick_xml::Result<()> {
        if let Some(open) = &mut self.marker {
            if !is_empty {
                open.nested += 1;
            }
            return Ok(());
        }

        let name = start.name();
        let name = name.as_ref();

        if name == TESTSUITE_TAG {
            // Nested suites are flattened.
            self.close_suite();
            let mut suite = TestSuite::default();
            suite.name = attribute(start, b"name")?;
            if is_empty {
                self.report.testsuites.push(suite);
            } else {
                self.suite = Some(suite);
            }
        } else if name == TESTCASE_TAG {
            let case = TestCase {
                name: attribute(start, b"name")?.unwrap_or_default(),
                classname: attribute(start, b"classname")?,
                time: attribute(start, b"time")?,
                ..Default::default()
            };
            if is_empty {
                self.suite_mut().testcases.push(case);
            } else {
                self.case = Some(case);
            }
        } else if name == PROPERTIES_TAG {
            self.in_properties = !is_empty;
        } else if name == PROPERTY_TAG && self.in_properties {
            let property = Property::new(
                attribute(start, b"name")?.unwrap_or_default(),
                attribute(start, b"value")?.unwrap_or_default(),
            );
            match &mut self.case {
                Some(case) => case.properties.push(property),
                None => self.suite_mut().properties.push(property),
            }
        } else if let Some(kind) = marker_kind(name) {
            if self.case.is_none() {
                return Ok(());
            }
            let marker = Marker {
                message: attribute(start, b"message")?,
                ty: attribute(start, b"type")?,
                text: None,
            };
            let open = OpenMarker {
                kind,
                marker,
                nested: 0,
            };
            if is_empty {
                self.close_marker(open);
            } else {
                self.marker = Some(open);
            }
        }

        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        if let Some(open) = &mut self.marker {
            if open.nested > 0 {
                open.nested -= 1;
                return;
            }
            if let Some(open) = self.marker.take() {
                self.close_marker(open);
            }
            return;
        }

        if name == TESTCASE_TAG {
            if let Some(case) = self.case.take() {
                self.suite_mut().testcases.push(case);
            }
        } else if name == PROPERTIES_TAG {
            self.in_properties = false;
        } else if name == TESTSUITE_TAG {
            self.close_suite();
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(open) = &mut self.marker {
            if open.nested == 0 {
                open.marker
                    .text
                    .get_or_insert_with(String::new)
                    .push_str(text);
            }
        }
    }

    fn close_marker(&mut self, open: OpenMarker) {
        let Some(case) = &mut self.case else {
            return;
        };
        let OpenMarker {
            kind, mut marker, ..
        } = open;
        if marker.text.as_deref().is_some_and(str::is_empty) {
            marker.text = None;
        }
        // Only the first marker of each kind counts.
        let slot = match kind {
            MarkerKind::Failure => &mut case.failure,
            MarkerKind::Error => &mut case.error,
            MarkerKind::Skipped => &mut case.skipped,
        };
        if slot.is_none() {
            *slot = Some(marker);
        }
    }

    fn close_suite(&mut self) {
        if let Some(suite) = self.suite.take() {
            self.report.testsuites.push(suite);
        }
    }

    fn suite_mut(&mut self) -> &mut TestSuite {
        // Test cases outside of any suite get an anonymous one.
        self.suite.get_or_insert_with(TestSuite::default)
    }

    fn finish(mut self) -> Report {
        if let Some(case) = self.case.take() {
            self.suite_mut().testcases.push(case);
        }
        self.close_suite();
        self.report
    }
}

fn marker_kind(name: &[u8]) -> Option<MarkerKind> {
    if name == FAILURE_TAG {
        Some(MarkerKind::Failure)
    } else if name == ERROR_TAG {
        Some(MarkerKind::Error)
    } else if name == SKIPPED_TAG {
        Some(MarkerKind::Skipped)
    } else {
        None
    }
}

fn attribute(start: &BytesStart<'_>, key: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_testsuites_root() {
        let input = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites>
                <testsuite name="ydb/core/kqp/ut">
                    <testcase classname="ydb/core/kqp/ut" name="KqpSuite.Passing" time="1.5"/>
                    <testcase classname="ydb/core/kqp/ut" name="KqpSuite.Failing" time="0.25">
                        <failure message="assert">expected 1, got 2</failure>
                        <properties>
                            <property name="url:log" value="https://logs/1"/>
                            <property name="url:stdout" value=""/>
                        </properties>
                    </testcase>
                </testsuite>
            </testsuites>
        "#};

        let report = parse_report(input).expect("report parses");
        assert_eq!(report.testsuites.len(), 1);
        let suite = &report.testsuites[0];
        assert_eq!(suite.name.as_deref(), Some("ydb/core/kqp/ut"));
        assert_eq!(suite.testcases.len(), 2);

        let passing = &suite.testcases[0];
        assert_eq!(passing.name, "KqpSuite.Passing");
        assert_eq!(passing.time.as_deref(), Some("1.5"));
        assert!(passing.failure.is_none());

        let failing = &suite.testcases[1];
        assert_eq!(
            failing.failure,
            Some(Marker {
                message: Some("assert".to_owned()),
                ty: None,
                text: Some("expected 1, got 2".to_owned()),
            })
        );
        assert_eq!(failing.property("url:log"), Some("https://logs/1"));
        assert_eq!(failing.property("url:stdout"), Some(""));
        assert_eq!(failing.property("url:stderr"), None);
    }

    #[test]
    fn parse_testsuite_root_with_all_markers() {
        let input = indoc! {r#"
            <testsuite name="suite">
                <testcase classname="a" name="muted">
                    <skipped><![CDATA[muted by rule]]></skipped>
                    <properties><property name="mute" value=""/></properties>
                </testcase>
                <testcase classname="a" name="both">
                    <error>first error</error>
                    <error>second error</error>
                    <failure/>
                </testcase>
            </testsuite>
        "#};

        let report = parse_report(input).expect("report parses");
        let cases: Vec<_> = report.testcases().map(|(_, case)| case).collect();
        assert_eq!(cases.len(), 2);

        assert_eq!(
            cases[0].skipped.as_ref().and_then(|m| m.text.as_deref()),
            Some("muted by rule")
        );
        assert_eq!(cases[0].property("mute"), Some(""));

        assert_eq!(
            cases[1].error.as_ref().and_then(|m| m.text.as_deref()),
            Some("first error"),
            "only the first error marker is kept"
        );
        assert_eq!(cases[1].failure, Some(Marker::default()));
    }

    #[test]
    fn marker_text_skips_nested_elements() {
        let input = indoc! {r#"
            <testsuite>
                <testcase classname="a" name="b">
                    <failure>outer<detail>inner</detail></failure>
                </testcase>
            </testsuite>
        "#};

        let report = parse_report(input).expect("report parses");
        let (_, case) = report.testcases().next().expect("one test case");
        assert_eq!(
            case.failure.as_ref().and_then(|m| m.text.as_deref()),
            Some("outer")
        );
    }

    #[test]
    fn suite_properties_are_not_case_properties() {
        let input = indoc! {r#"
            <testsuite name="s">
                <properties><property name="mute" value="1"/></properties>
                <testcase classname="a" name="b"/>
            </testsuite>
        "#};

        let report = parse_report(input).expect("report parses");
        let suite = &report.testsuites[0];
        assert_eq!(suite.properties, vec![Property::new("mute", "1")]);
        assert_eq!(suite.testcases[0].property("mute"), None);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        parse_report("<testsuite><testcase></testsuite>").expect_err("mismatched end tag");
    }

    #[test]
    fn report_cut_off_inside_marker_is_an_error() {
        let input = r#"<testsuite><testcase classname="c" name="x" time="1"><failure message="boom">partial stack"#;
        let err = Report::parse(input).expect_err("unclosed failure");
        assert!(
            matches!(&err, ParseError::Truncated { element } if element == "failure"),
            "{err:?}"
        );
    }

    #[test]
    fn report_cut_off_inside_testcase_is_an_error() {
        let input = indoc! {r#"
            <testsuites>
                <testsuite name="s">
                    <testcase classname="c" name="x" time="1">
                        <properties><property name="mute" value="1"/></properties>
        "#};
        let err = Report::parse(input).expect_err("unclosed testcase");
        assert!(
            matches!(&err, ParseError::Truncated { element } if element == "testcase"),
            "{err:?}"
        );
    }

    #[test]
    fn report_cut_off_after_last_suite_is_an_error() {
        let input = r#"<testsuites><testsuite name="s"><testcase classname="c" name="x"/></testsuite>"#;
        let err = Report::parse(input).expect_err("unclosed testsuites");
        assert!(
            matches!(&err, ParseError::Truncated { element } if element == "testsuites"),
            "{err:?}"
        );
    }
}
