// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports in Rust.
//!
//! Unlike a serializer's data model, the records produced here are *raw*: a test case may carry
//! a failure, an error and a skip marker at the same time, and properties are kept exactly as
//! written. Deciding what a record means is left to the consumer.

mod discover;
mod errors;
mod parse;
mod report;

pub use discover::*;
pub use errors::*;
pub use report::*;
