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

//! The repository set: prioritized repositories plus the platform, acting as
//! the candidate pool and search backend of the resolver.

use std::{collections::BTreeMap, rc::Rc};

use indexmap::IndexMap;
use pkgutil::{
    common::PLATFORM_REPOSITORY,
    fuzzy_match::{fuzzy_match, similar_names},
    platform::{PlatformFilter, is_platform_package},
    stability::Stability,
    version::{VersionConstraint, parse_version},
};
use semver::Version;

use super::{
    Candidate, CandidatePool, CandidateQuery, PackageDescriptor, PackageVersion, PlatformMismatch,
    Repository, SearchBackend, SearchMatch, describe_providers,
};

/// How many similar names are offered when a lookup fails.
const SIMILAR_NAMES_LIMIT: usize = 5;

struct PrioritizedRepository {
    priority: i32,
    repository: Box<dyn Repository>,
}

#[derive(Debug, Clone)]
struct PlatformPackage {
    pretty_version: String,
    version: Version,
}

pub struct RepositorySet {
    /// Highest priority first.
    repositories: Vec<PrioritizedRepository>,
    minimum_stability: Stability,
    stability_flags: BTreeMap<String, Stability>,
    platform: BTreeMap<String, PlatformPackage>,
}

impl RepositorySet {
    pub fn new(minimum_stability: Stability) -> Self {
        RepositorySet {
            repositories: vec![],
            minimum_stability,
            stability_flags: BTreeMap::new(),
            platform: BTreeMap::new(),
        }
    }

    /// Per-package minimum stabilities, replacing the global one for the
    /// named packages.
    pub fn with_stability_flags<'a>(
        mut self,
        flags: impl IntoIterator<Item = (&'a String, &'a Stability)>,
    ) -> Self {
        self.stability_flags
            .extend(flags.into_iter().map(|(k, v)| (k.to_lowercase(), *v)));
        self
    }

    /// The installed platform packages (`php`, `ext-*`, ...) and their
    /// versions. Unparseable versions are skipped with a warning.
    pub fn with_platform<'a>(
        mut self,
        platform: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (name, pretty_version) in platform {
            match parse_version(pretty_version) {
                Some(version) => {
                    self.platform.insert(
                        name.to_lowercase(),
                        PlatformPackage {
                            pretty_version: pretty_version.clone(),
                            version,
                        },
                    );
                }
                None => log::warn!(
                    "Ignoring platform package {} with invalid version {}",
                    name,
                    pretty_version
                ),
            }
        }
        self
    }

    /// Adds a repository. Without an explicit priority, a repository ranks
    /// below every repository added before it.
    pub fn add_repository(&mut self, repository: Box<dyn Repository>, priority: Option<i32>) -> &mut Self {
        let priority = priority.unwrap_or_else(|| {
            self.repositories
                .iter()
                .map(|r| r.priority)
                .min()
                .map_or(0, |lowest| lowest.saturating_sub(1))
        });
        log::debug!(
            "Adding repository {} with priority {}",
            repository.name(),
            priority
        );
        self.repositories.push(PrioritizedRepository {
            priority,
            repository,
        });
        // stable, so equal priorities keep insertion order
        self.repositories.sort_by(|a, b| b.priority.cmp(&a.priority));
        self
    }

    pub fn repository_names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.repository.name()).collect()
    }

    fn all_names(&self) -> Vec<String> {
        let mut names: IndexMap<String, ()> = IndexMap::new();
        for repo in &self.repositories {
            for name in repo.repository.package_names() {
                names.insert(name, ());
            }
        }
        names.into_keys().collect()
    }

    /// The latest version of `name` in the repository canonical for it.
    fn latest_version(&self, name: &str) -> Option<Rc<PackageVersion>> {
        self.repositories
            .iter()
            .find_map(|r| r.repository.get_latest_version(name))
    }

    fn acceptable_stability(&self, name: &str) -> Stability {
        self.stability_flags
            .get(name)
            .copied()
            .unwrap_or(self.minimum_stability)
    }

    fn platform_candidate(&self, name: &str, constraint: Option<&VersionConstraint>) -> Option<Candidate> {
        let installed = self.platform.get(name)?;
        if constraint.is_some_and(|c| !c.matches(&installed.version)) {
            return None;
        }
        Some(Candidate {
            name: name.to_string(),
            pretty_name: name.to_string(),
            version: installed.version.clone(),
            pretty_version: installed.pretty_version.clone(),
            stability: Stability::of_pre_release(&installed.version.pre),
            repository: PLATFORM_REPOSITORY.to_string(),
            require: BTreeMap::new(),
        })
    }
}

fn to_candidate(version: &PackageVersion, repo: &PrioritizedRepository) -> Candidate {
    Candidate {
        name: version.name.to_lowercase(),
        pretty_name: version.name.clone(),
        version: version.version.clone(),
        pretty_version: version.pretty_version.clone(),
        stability: version.stability,
        repository: repo.repository.name().to_string(),
        require: version.require.clone(),
    }
}

/// Picks between the best candidate so far and a new one.
///
/// Candidates at or above the preferred stability beat those below it.
/// Below it, the more stable one wins. Otherwise the higher version wins and
/// ties keep the earlier candidate.
fn pick_better(best: Candidate, candidate: Candidate, preferred: Stability) -> Candidate {
    if candidate.stability < preferred {
        if best.stability > candidate.stability {
            return best;
        }
        if candidate.stability > best.stability {
            return candidate;
        }
    } else if best.stability < preferred {
        return candidate;
    }
    if candidate.version > best.version {
        candidate
    } else {
        best
    }
}

impl CandidatePool for RepositorySet {
    fn find_best_candidate(&self, query: &CandidateQuery<'_>) -> Option<Candidate> {
        let name = query.name.to_lowercase();
        if is_platform_package(&name) {
            return self.platform_candidate(&name, query.constraint);
        }

        let minimum = if query.allowance.unacceptable_stabilities {
            Stability::Dev
        } else {
            self.acceptable_stability(&name)
        };

        let mut best: Option<Candidate> = None;
        for repo in &self.repositories {
            let Some(versions) = repo.repository.all_versions_of(&name) else {
                continue;
            };
            if versions.is_empty() {
                continue;
            }
            for version in versions.values() {
                if version.stability < minimum {
                    continue;
                }
                if query.constraint.is_some_and(|c| !c.matches(&version.version)) {
                    continue;
                }
                let candidate = to_candidate(version, repo);
                if !self
                    .platform_mismatches(&candidate, query.platform_filter)
                    .is_empty()
                {
                    continue;
                }
                best = Some(match best {
                    None => candidate,
                    Some(best) => pick_better(best, candidate, query.preferred_stability),
                });
            }
            // the first repository that knows the name is canonical for it
            if !query.allowance.shadowed_repositories {
                break;
            }
        }
        best
    }

    fn providers_of(&self, name: &str) -> Vec<PackageDescriptor> {
        describe_providers(
            self.repositories
                .iter()
                .flat_map(|r| r.repository.providers_of(name)),
        )
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        similar_names(name, self.all_names(), SIMILAR_NAMES_LIMIT)
    }

    fn minimum_stability(&self) -> Stability {
        self.minimum_stability
    }

    fn platform_mismatches(&self, candidate: &Candidate, filter: &PlatformFilter) -> Vec<PlatformMismatch> {
        if filter.is_ignore_all() {
            return vec![];
        }
        candidate
            .require
            .iter()
            .filter(|(requirement, _)| is_platform_package(requirement) && !filter.is_ignored(requirement))
            .filter_map(|(requirement, constraint)| {
                let installed = self.platform.get(&requirement.to_lowercase());
                let satisfied = match (installed, VersionConstraint::parse(constraint)) {
                    (Some(installed), Ok(c)) => c.matches(&installed.version),
                    (Some(_), Err(e)) => {
                        log::debug!(
                            "Cannot check {} {} of {}: {}",
                            requirement,
                            constraint,
                            candidate.name,
                            e
                        );
                        true
                    }
                    (None, _) => false,
                };
                (!satisfied).then(|| PlatformMismatch {
                    requirement: requirement.clone(),
                    constraint: constraint.clone(),
                    installed: installed.map(|p| p.pretty_version.clone()),
                })
            })
            .collect()
    }

    fn platform_version(&self, name: &str) -> Option<Version> {
        self.platform
            .get(&name.to_lowercase())
            .map(|p| p.version.clone())
    }
}

impl SearchBackend for RepositorySet {
    /// Fuzzy name matches first, then packages whose description mentions
    /// the term.
    fn search(&self, term: &str) -> Vec<SearchMatch> {
        let term = term.trim();
        if term.is_empty() {
            return vec![];
        }
        let names = self.all_names();
        let mut matches: IndexMap<String, SearchMatch> = IndexMap::new();
        let mut add = |name: &str, version: &PackageVersion| {
            matches.entry(name.to_string()).or_insert_with(|| SearchMatch {
                name: version.name.clone(),
                description: version.description.clone(),
                abandoned: version.abandoned.clone(),
            });
        };

        for name in fuzzy_match(term, &names).unwrap_or_default() {
            if let Some(latest) = self.latest_version(&name) {
                add(&name, &latest);
            }
        }
        let needle = term.to_lowercase();
        for name in &names {
            if let Some(latest) = self.latest_version(name)
                && latest.description.to_lowercase().contains(&needle)
            {
                add(name, &latest);
            }
        }
        matches.into_values().collect()
    }

    fn has_providers(&self, name: &str) -> bool {
        self.repositories
            .iter()
            .any(|r| !r.repository.providers_of(name).is_empty())
    }
}
