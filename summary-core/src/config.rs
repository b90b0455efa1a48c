// Copyright (c) The junit-summary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration, layered from built-in defaults and an optional TOML file.

use crate::{
    errors::ConfigParseError,
    history::{HistoryProvider, HttpHistory, JsonFileHistory, NoHistory},
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, warn};

/// The build flags shown for presets that aren't configured.
pub static UNKNOWN_BUILD_PRESET_PARAMS: &str = "--build unknown_build_type";

/// The server used for links when `GITHUB_SERVER_URL` isn't set.
pub static DEFAULT_SERVER_URL: &str = "https://github.com";

/// Summary configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SummaryConfig {
    /// Test history lookup.
    pub history: HistoryConfig,

    /// Test ownership.
    pub ownership: OwnershipConfig,

    /// Where mute rules are published.
    pub mute_rules: MuteRulesConfig,

    /// Build flags for each build preset.
    pub build_presets: BTreeMap<String, String>,
}

impl SummaryConfig {
    /// The default configuration, embedded at build time.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the configuration, layering `config_file` (if any) on top of the defaults.
    ///
    /// Unknown keys are reported as warnings.
    pub fn from_sources(config_file: Option<&Utf8Path>) -> Result<Self, ConfigParseError> {
        let mut builder =
            Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(config_file) = config_file {
            debug!("reading config from `{config_file}`");
            builder = builder.add_source(File::new(config_file.as_str(), FileFormat::Toml));
        }

        let to_error = |err| ConfigParseError::new(config_file.map(Utf8Path::to_owned), err);
        let config = builder.build().map_err(to_error)?;

        let mut unknown = Vec::new();
        let config: SummaryConfig = serde_ignored::deserialize(config, |path| {
            unknown.push(path.to_string());
        })
        .map_err(to_error)?;

        if !unknown.is_empty() {
            warn!(
                "ignoring unknown configuration keys in `{}`: {}",
                config_file.map_or("<default>", |f| f.as_str()),
                unknown.join(", "),
            );
        }
        Ok(config)
    }

    /// Returns the build flags that reproduce `preset` locally.
    pub fn build_preset_params(&self, preset: &str) -> &str {
        self.build_presets
            .get(preset)
            .map_or(UNKNOWN_BUILD_PRESET_PARAMS, String::as_str)
    }
}

/// History lookup configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HistoryConfig {
    /// The number of recent runs looked up per test.
    pub window: usize,

    /// The maximum time spent fetching history.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// A history service to query.
    #[serde(default)]
    pub url: Option<String>,

    /// A JSON file to read history from. Ignored if `url` is set.
    #[serde(default)]
    pub file: Option<Utf8PathBuf>,
}

impl HistoryConfig {
    /// Returns the configured history provider.
    pub fn provider(&self) -> Box<dyn HistoryProvider> {
        match (&self.url, &self.file) {
            (Some(url), _) => Box::new(HttpHistory::new(url.clone(), self.timeout)),
            (None, Some(file)) => Box::new(JsonFileHistory::new(file.clone())),
            (None, None) => Box::new(NoHistory),
        }
    }
}

/// Ownership configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OwnershipConfig {
    /// The codeowners-style rules file, relative to the repository root.
    pub rules_file: Utf8PathBuf,

    /// The separator between owners of a test.
    pub separator: String,
}

/// Where mute rules are published.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MuteRulesConfig {
    /// The path to the rules within the repository.
    pub path: String,

    /// The repository, e.g. `ydb-platform/ydb`.
    pub repository: String,

    /// The branch the rules are read from.
    pub branch: String,
}

impl MuteRulesConfig {
    /// Returns the URL of the mute rules.
    ///
    /// `server_url` and `repository` override the server and the configured repository, and are
    /// typically read from `GITHUB_SERVER_URL` and `GITHUB_REPOSITORY`.
    pub fn url(&self, server_url: Option<&str>, repository: Option<&str>) -> String {
        let server_url = server_url.unwrap_or(DEFAULT_SERVER_URL);
        let repository = repository.unwrap_or(&self.repository);
        format!(
            "{}/{}/tree/{}/{}",
            server_url.trim_end_matches('/'),
            repository,
            self.branch,
            self.path.trim_start_matches('/'),
        )
    }
}
