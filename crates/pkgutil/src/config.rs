// pkginit: Requirement resolution for package scaffolding.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The `pkginit.json` configuration file.

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{common::CONFIG_JSON, platform::PlatformFilter, stability::Stability};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_stability: Option<Stability>,

    /// Prefer stable versions even when a looser minimum stability is set.
    #[serde(default)]
    pub prefer_stable: bool,

    /// Per-package minimum stability overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stability_flags: BTreeMap<String, Stability>,

    /// Vendors whose chosen constraint is reused for their other packages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adopt_vendors: Option<Vec<String>>,

    #[serde(default)]
    pub ignore_platform_reqs: IgnorePlatformReqs,

    /// Installed platform packages, e.g. `"php": "8.2.0"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub platform: BTreeMap<String, String>,

    /// Repositories, highest priority first unless a priority is given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryConfig>,

    /// Require the exact version found instead of a caret constraint.
    #[serde(default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

/// `true`, `false`, or a list of platform package names to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnorePlatformReqs {
    All(bool),
    Named(Vec<String>),
}

impl Default for IgnorePlatformReqs {
    fn default() -> Self {
        IgnorePlatformReqs::All(false)
    }
}

impl IgnorePlatformReqs {
    pub fn to_filter(&self) -> PlatformFilter {
        match self {
            IgnorePlatformReqs::All(true) => PlatformFilter::IgnoreAll,
            IgnorePlatformReqs::All(false) => PlatformFilter::IgnoreNone,
            IgnorePlatformReqs::Named(names) => PlatformFilter::from_names(names.iter().cloned()),
        }
    }
}

pub fn read_config_file(path: &Path) -> anyhow::Result<InitConfig> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let reader = BufReader::new(file);
    let config: InitConfig = serde_json_lenient::from_reader(reader)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;
    Ok(config)
}

/// Reads `pkginit.json` from `dir`, falling back to `fallback` (the global
/// config) and then to the defaults when neither file exists.
pub fn read_config_in_dir(dir: &Path, fallback: Option<&Path>) -> anyhow::Result<InitConfig> {
    let local = dir.join(CONFIG_JSON);
    if local.exists() {
        log::debug!("Reading configuration from {}", local.display());
        return read_config_file(&local);
    }
    match fallback {
        Some(global) if global.exists() => {
            log::debug!("Reading configuration from {}", global.display());
            read_config_file(global)
        }
        _ => Ok(InitConfig::default()),
    }
}
