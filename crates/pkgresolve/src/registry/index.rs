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

use std::{
    collections::{BTreeMap, HashMap},
    io::BufRead,
    path::Path,
    rc::Rc,
};

use anyhow::Context;
use pkgutil::{
    stability::Stability,
    version::{parse_branch_version, parse_version},
};
use semver::Version;
use serde::Deserialize;

use super::{Abandoned, PackageVersion, Repository};

/// One line of an index file.
#[derive(Debug, Deserialize)]
struct IndexEntryJSON {
    name: String,
    version: String,
    /// Overrides the stability derived from the version.
    #[serde(default)]
    stability: Option<Stability>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    abandoned: AbandonedJSON,
    #[serde(default)]
    require: BTreeMap<String, String>,
    #[serde(default)]
    provide: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AbandonedJSON {
    Flag(bool),
    Replacement(String),
}

impl Default for AbandonedJSON {
    fn default() -> Self {
        AbandonedJSON::Flag(false)
    }
}

impl From<AbandonedJSON> for Abandoned {
    fn from(value: AbandonedJSON) -> Self {
        match value {
            AbandonedJSON::Flag(false) => Abandoned::No,
            AbandonedJSON::Flag(true) => Abandoned::Yes,
            AbandonedJSON::Replacement(r) if r.is_empty() => Abandoned::Yes,
            AbandonedJSON::Replacement(r) => Abandoned::ReplacedBy(r),
        }
    }
}

impl TryFrom<IndexEntryJSON> for PackageVersion {
    type Error = anyhow::Error;

    fn try_from(entry: IndexEntryJSON) -> Result<Self, Self::Error> {
        let (version, derived) = match parse_version(&entry.version) {
            Some(version) => {
                let stability = Stability::of_pre_release(&version.pre);
                (version, stability)
            }
            None => {
                let version = parse_branch_version(&entry.version)
                    .with_context(|| format!("`{}` is not a valid version", entry.version))?;
                (version, Stability::Dev)
            }
        };
        if !entry.name.contains('/') {
            anyhow::bail!("`{}` is not a `vendor/name` package name", entry.name);
        }
        Ok(PackageVersion {
            stability: entry.stability.unwrap_or(derived),
            name: entry.name,
            version,
            pretty_version: entry.version,
            description: entry.description,
            abandoned: entry.abandoned.into(),
            require: entry.require,
            provide: entry.provide,
        })
    }
}

/// A repository read from an index file, one JSON object per line:
///
/// ```json
/// {"name": "acme/core", "version": "2.0.0", "description": "...", "require": {"php": "^8.1"}}
/// ```
pub struct IndexRepository {
    name: String,
    #[allow(clippy::type_complexity)]
    packages: HashMap<String, Rc<BTreeMap<Version, Rc<PackageVersion>>>>,
}

impl IndexRepository {
    pub fn open(name: impl Into<String>, path: &Path) -> anyhow::Result<Self> {
        let name = name.into();
        log::debug!("Reading repository {} from {}", name, path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open index file `{}`", path.display()))?;
        Self::from_reader(name, std::io::BufReader::new(file))
    }

    /// Reads index lines from `reader`. Malformed lines are skipped with a
    /// warning.
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead) -> anyhow::Result<Self> {
        let name = name.into();
        let mut packages: HashMap<String, BTreeMap<Version, Rc<PackageVersion>>> = HashMap::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: IndexEntryJSON = match serde_json_lenient::from_str(&line) {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Error when reading line {} of {}: {}", lineno + 1, name, e);
                    continue;
                }
            };
            let version: PackageVersion = match entry.try_into() {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("Error when reading line {} of {}: {}", lineno + 1, name, e);
                    continue;
                }
            };
            packages
                .entry(version.name.to_lowercase())
                .or_default()
                .insert(version.version.clone(), Rc::new(version));
        }
        log::debug!("Repository {} knows {} packages", name, packages.len());
        Ok(IndexRepository {
            name,
            packages: packages.into_iter().map(|(k, v)| (k, Rc::new(v))).collect(),
        })
    }
}

impl Repository for IndexRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn all_versions_of(&self, name: &str) -> Option<Rc<BTreeMap<Version, Rc<PackageVersion>>>> {
        self.packages.get(&name.to_lowercase()).cloned()
    }

    fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.packages.keys().cloned().collect();
        names.sort();
        names
    }
}
