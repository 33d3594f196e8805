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

//! Effective settings: command line flags over `pkginit.json` over defaults.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use anyhow::Context;
use pkgresolve::registry::{IndexRepository, RepositorySet};
use pkgutil::{
    common::DEFAULT_ADOPT_VENDORS,
    config::{InitConfig, RepositoryConfig, read_config_file, read_config_in_dir},
    pkginit_dir,
    platform::PlatformFilter,
    stability::Stability,
};

use crate::cli::ResolutionFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `None` when neither the flags nor the config file set one.
    pub minimum_stability: Option<Stability>,
    pub prefer_stable: bool,
    pub stability_flags: BTreeMap<String, Stability>,
    pub platform_filter: PlatformFilter,
    pub platform: BTreeMap<String, String>,
    pub adoptable_vendors: BTreeSet<String>,
    pub repositories: Vec<RepositoryConfig>,
    pub fixed: bool,
}

impl Settings {
    /// Reads the config file named by `--config`, or `pkginit.json` in the
    /// working directory, or the global config, and applies `flags` on top.
    pub fn load(flags: &ResolutionFlags) -> anyhow::Result<Settings> {
        let config = match &flags.config {
            Some(path) => read_config_file(path)?,
            None => {
                let cwd = std::env::current_dir().context("failed to get current directory")?;
                read_config_in_dir(&cwd, Some(&pkginit_dir::config_json()?))?
            }
        };
        let default_index = pkginit_dir::default_index_file()?;
        Ok(Settings::merge(config, flags, default_index))
    }

    fn merge(config: InitConfig, flags: &ResolutionFlags, default_index: PathBuf) -> Settings {
        let platform_filter = if flags.ignore_platform_reqs {
            PlatformFilter::IgnoreAll
        } else if !flags.ignore_platform_req.is_empty() {
            PlatformFilter::from_names(flags.ignore_platform_req.iter().cloned())
        } else {
            config.ignore_platform_reqs.to_filter()
        };

        let adoptable_vendors = if !flags.adopt_vendors.is_empty() {
            flags.adopt_vendors.iter().cloned().collect()
        } else if let Some(vendors) = config.adopt_vendors {
            vendors.into_iter().collect()
        } else {
            DEFAULT_ADOPT_VENDORS.iter().map(|v| v.to_string()).collect()
        };

        let repositories = if !flags.repositories.is_empty() {
            flags
                .repositories
                .iter()
                .map(|(name, path)| RepositoryConfig {
                    name: name.clone(),
                    path: path.clone(),
                    priority: None,
                })
                .collect()
        } else if !config.repositories.is_empty() {
            config.repositories
        } else {
            vec![RepositoryConfig {
                name: "default".to_string(),
                path: default_index,
                priority: None,
            }]
        };

        let mut stability_flags = config.stability_flags;
        stability_flags.extend(flags.stability_flags.iter().cloned());
        let mut platform = config.platform;
        platform.extend(flags.platform.iter().cloned());

        Settings {
            minimum_stability: flags.minimum_stability.or(config.minimum_stability),
            prefer_stable: flags.prefer_stable || config.prefer_stable,
            stability_flags,
            platform_filter,
            platform,
            adoptable_vendors,
            repositories,
            fixed: flags.fixed || config.fixed,
        }
    }

    /// The stability candidates should preferably have: `stable` when
    /// stable versions are preferred, the minimum stability otherwise.
    pub fn preferred_stability(&self, minimum_stability: Stability) -> Stability {
        if self.prefer_stable {
            Stability::Stable
        } else {
            minimum_stability
        }
    }

    /// Opens every configured repository index.
    pub fn repository_set(&self, minimum_stability: Stability) -> anyhow::Result<RepositorySet> {
        let mut set = RepositorySet::new(minimum_stability)
            .with_stability_flags(&self.stability_flags)
            .with_platform(&self.platform);
        for repo in &self.repositories {
            let index = IndexRepository::open(repo.name.clone(), &repo.path)
                .with_context(|| format!("failed to load repository `{}`", repo.name))?;
            set.add_repository(Box::new(index), repo.priority);
        }
        Ok(set)
    }
}
