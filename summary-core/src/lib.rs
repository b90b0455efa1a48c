// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for junit-summary.
//!
//! Test cases read with [`junit_reader`] are classified into [`outcome::TestOutcome`]s,
//! aggregated per group into a [`summary::SummaryTable`], listed per status in an HTML report,
//! and turned into a [`verdict::Verdict`] and a [`verdict::StatusMessage`].
//!
//! Owners and recent history are decorations: failing to resolve them never changes counts or
//! the verdict.

pub mod config;
pub mod errors;
pub mod generate;
pub mod history;
pub mod html;
pub mod listing;
pub mod outcome;
pub mod ownership;
pub mod summary;
pub mod verdict;
