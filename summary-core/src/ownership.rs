// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test ownership, resolved from codeowners-style rules.
//!
//! Each non-comment line of the rules file is a pattern followed by zero or more owners:
//!
//! ```text
//! # Query processor
//! /ydb/core/kqp/        @ydb-platform/qp
//! *.py                  @ydb-platform/ci jane@example.com
//! ```
//!
//! For a given path, the last matching rule wins.

use crate::errors::{DisplayErrorChain, OwnershipParseError};
use camino::Utf8Path;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use tracing::{debug, warn};

/// The kind of an owner.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum OwnerKind {
    /// A team, written `@org/team`.
    Team,

    /// A user, written `@user`.
    Username,

    /// An email address.
    Email,
}

impl OwnerKind {
    /// The label used when rendering owners.
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Team => "TEAM",
            OwnerKind::Username => "USERNAME",
            OwnerKind::Email => "EMAIL",
        }
    }

    fn classify(token: &str) -> Option<Self> {
        if let Some(handle) = token.strip_prefix('@') {
            match handle.split_once('/') {
                Some((org, team)) if !org.is_empty() && !team.is_empty() => Some(OwnerKind::Team),
                Some(_) => None,
                None if !handle.is_empty() => Some(OwnerKind::Username),
                None => None,
            }
        } else {
            let (local, domain) = token.split_once('@')?;
            (!local.is_empty() && domain.contains('.')).then_some(OwnerKind::Email)
        }
    }
}

/// A single owner of a path.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Owner {
    /// The kind of owner.
    pub kind: OwnerKind,

    /// The owner as written in the rules, e.g. `@ydb-platform/qp`.
    pub name: String,
}

impl Owner {
    /// Creates a new owner.
    pub fn new(kind: OwnerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.name)
    }
}

/// Resolves the owners of a repository-relative path.
pub trait OwnershipLookup {
    /// Returns the owners of `path`, in the order they were declared.
    fn owners_of(&self, path: &str) -> Vec<Owner>;
}

/// Ownership rules parsed from a codeowners-style file.
#[derive(Clone, Debug)]
pub struct CodeOwners {
    globs: GlobSet,
    // Maps each glob in `globs` to the index of the rule it came from.
    glob_rules: Vec<usize>,
    rules: Vec<Vec<Owner>>,
}

impl CodeOwners {
    /// Parses rules from the contents of a rules file.
    pub fn parse(contents: &str) -> Result<Self, OwnershipParseError> {
        let mut builder = GlobSetBuilder::new();
        let mut glob_rules = Vec::new();
        let mut rules = Vec::new();

        for (line_idx, line) in contents.lines().enumerate() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            };
            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else {
                continue;
            };

            let rule_idx = rules.len();
            for glob in pattern_to_globs(pattern) {
                let glob = GlobBuilder::new(&glob)
                    .literal_separator(true)
                    .build()
                    .map_err(|err| OwnershipParseError::new(line_idx + 1, pattern, err))?;
                builder.add(glob);
                glob_rules.push(rule_idx);
            }

            let owners = tokens
                .filter_map(|token| match OwnerKind::classify(token) {
                    Some(kind) => Some(Owner::new(kind, token)),
                    None => {
                        debug!("line {}: ignoring unrecognized owner `{token}`", line_idx + 1);
                        None
                    }
                })
                .collect();
            rules.push(owners);
        }

        let globs = builder
            .build()
            .map_err(|err| OwnershipParseError::new(0, "<all rules>", err))?;
        Ok(Self {
            globs,
            glob_rules,
            rules,
        })
    }

    /// Reads rules from `path`.
    ///
    /// Ownership is a decoration, so a missing or invalid file produces a warning and `None`.
    pub fn load(path: &Utf8Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("continuing without test owners: failed to read `{path}`: {err}");
                return None;
            }
        };
        match Self::parse(&contents) {
            Ok(owners) => Some(owners),
            Err(err) => {
                warn!(
                    "continuing without test owners: {}",
                    DisplayErrorChain::new(err)
                );
                None
            }
        }
    }

    /// The number of rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl OwnershipLookup for CodeOwners {
    fn owners_of(&self, path: &str) -> Vec<Owner> {
        let path = path.trim_start_matches('/');
        self.globs
            .matches(path)
            .into_iter()
            .map(|glob_idx| self.glob_rules[glob_idx])
            .max()
            .map(|rule_idx| self.rules[rule_idx].clone())
            .unwrap_or_default()
    }
}

/// Joins owners into a single string, e.g. `TEAM:@org/qp;;USERNAME:@jane`.
pub fn joined_owners(owners: &[Owner], separator: &str) -> String {
    owners
        .iter()
        .map(|owner| owner.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn pattern_to_globs(pattern: &str) -> Vec<String> {
    let (pattern, dir_only) = match pattern.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };
    // A leading slash, or a slash anywhere else, anchors the pattern at the repository root.
    let (pattern, anchored) = match pattern.strip_prefix('/') {
        Some(stripped) => (stripped, true),
        None => (pattern, pattern.contains('/')),
    };

    let base = if pattern.is_empty() {
        "**".to_owned()
    } else if anchored {
        pattern.to_owned()
    } else {
        format!("**/{pattern}")
    };

    if dir_only {
        vec![format!("{base}/**")]
    } else {
        vec![base.clone(), format!("{base}/**")]
    }
}
