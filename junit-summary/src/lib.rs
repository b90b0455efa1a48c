// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarize JUnit test results for CI.
//!
//! `junit-summary` reads groups of JUnit XML results, writes a markdown summary table to the
//! GitHub step summary, a detailed HTML report per group, and the color, text and verdict of
//! the status message posted for the run.

mod dispatch;
mod errors;
mod output;

pub use dispatch::JunitSummaryApp;
pub use errors::{ExpectedError, SummaryExitCode};
pub use output::{OutputContext, StderrStyles};
