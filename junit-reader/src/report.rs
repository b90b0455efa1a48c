// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::ParseError, parse::parse_report};

/// The root of a JUnit report: either a `<testsuites>` element or a lone `<testsuite>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The test suites contained in this report, in document order.
    pub testsuites: Vec<TestSuite>,
}

impl Report {
    /// Parses a report from a string.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_report(input)
    }

    /// Iterates over every test case in every suite, in document order.
    pub fn testcases(&self) -> impl Iterator<Item = (&TestSuite, &TestCase)> + '_ {
        self.testsuites
            .iter()
            .flat_map(|suite| suite.testcases.iter().map(move |case| (suite, case)))
    }
}

/// Represents a single `<testsuite>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestSuite {
    /// The `name` attribute, if present.
    pub name: Option<String>,

    /// Suite-level properties.
    pub properties: Vec<Property>,

    /// The test cases in this suite.
    pub testcases: Vec<TestCase>,
}

/// Represents a single `<testcase>` record as written in the XML.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestCase {
    /// The `name` attribute.
    pub name: String,

    /// The `classname` attribute.
    ///
    /// Together with `name`, this identifies a test.
    pub classname: Option<String>,

    /// The raw `time` attribute, unparsed.
    ///
    /// Producers write all sorts of things here, so interpretation is left to the consumer.
    pub time: Option<String>,

    /// The first `<failure>` child, if any.
    pub failure: Option<Marker>,

    /// The first `<error>` child, if any.
    pub error: Option<Marker>,

    /// The first `<skipped>` child, if any.
    pub skipped: Option<Marker>,

    /// Properties attached to this test case.
    pub properties: Vec<Property>,
}

impl TestCase {
    /// Creates a new test case with no markers and no properties.
    pub fn new(classname: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classname: Some(classname.into()),
            ..Default::default()
        }
    }

    /// Returns the value of the first property called `key`.
    ///
    /// A property that is present with an empty value returns `Some("")`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == key)
            .map(|property| property.value.as_str())
    }

    /// Sets the raw time attribute.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = Some(time.into());
        self
    }

    /// Sets the failure marker.
    pub fn set_failure(&mut self, marker: Marker) -> &mut Self {
        self.failure = Some(marker);
        self
    }

    /// Sets the error marker.
    pub fn set_error(&mut self, marker: Marker) -> &mut Self {
        self.error = Some(marker);
        self
    }

    /// Sets the skip marker.
    pub fn set_skipped(&mut self, marker: Marker) -> &mut Self {
        self.skipped = Some(marker);
        self
    }

    /// Adds a property.
    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }
}

/// A `<failure>`, `<error>` or `<skipped>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marker {
    /// The `message` attribute.
    pub message: Option<String>,

    /// The `type` attribute.
    pub ty: Option<String>,

    /// The text content of the element, if non-empty.
    pub text: Option<String>,
}

impl Marker {
    /// Creates a marker with the given text body.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// A `<property name="..." value="..."/>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T, U> From<(T, U)> for Property
where
    T: Into<String>,
    U: Into<String>,
{
    fn from((k, v): (T, U)) -> Self {
        Property::new(k, v)
    }
}
