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

pub mod index;
#[cfg(test)]
pub mod mock;
pub mod set;

use std::{
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

pub use index::*;
use pkgutil::{platform::PlatformFilter, stability::Stability, version::VersionConstraint};
use semver::Version;
pub use set::*;

/// Whether a package was abandoned by its maintainers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Abandoned {
    #[default]
    No,
    Yes,
    /// Abandoned in favour of another package.
    ReplacedBy(String),
}

impl Abandoned {
    /// The warning to show next to an abandoned package.
    pub fn notice(&self) -> Option<String> {
        match self {
            Abandoned::No => None,
            Abandoned::Yes => Some("Abandoned. No replacement was suggested.".to_string()),
            Abandoned::ReplacedBy(replacement) => {
                Some(format!("Abandoned. Use {replacement} instead."))
            }
        }
    }
}

/// One published version of a package, as a repository knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    /// The name as published; lookups are case-insensitive.
    pub name: String,
    pub version: Version,
    pub pretty_version: String,
    pub stability: Stability,
    pub description: String,
    pub abandoned: Abandoned,
    /// Raw requirement constraints, including platform requirements.
    pub require: BTreeMap<String, String>,
    /// Virtual packages this version provides.
    pub provide: BTreeMap<String, String>,
}

pub trait Repository {
    fn name(&self) -> &str;

    /// All versions of a package, keyed by version. `name` is lowercase.
    fn all_versions_of(&self, name: &str) -> Option<Rc<BTreeMap<Version, Rc<PackageVersion>>>>;

    /// Lowercase names of all packages in the repository.
    fn package_names(&self) -> Vec<String>;

    fn get_latest_version(&self, name: &str) -> Option<Rc<PackageVersion>> {
        let all_versions = self.all_versions_of(name)?;
        all_versions.values().last().cloned()
    }

    /// Versions of other packages that declare they provide `name`.
    fn providers_of(&self, name: &str) -> Vec<Rc<PackageVersion>> {
        let mut providers = vec![];
        for package in self.package_names() {
            let Some(versions) = self.all_versions_of(&package) else {
                continue;
            };
            providers.extend(
                versions
                    .values()
                    .filter(|v| v.provide.keys().any(|p| p.eq_ignore_ascii_case(name)))
                    .cloned(),
            );
        }
        providers
    }
}

impl<R> Repository for &R
where
    R: Repository + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn all_versions_of(&self, name: &str) -> Option<Rc<BTreeMap<Version, Rc<PackageVersion>>>> {
        (**self).all_versions_of(name)
    }

    fn package_names(&self) -> Vec<String> {
        (**self).package_names()
    }

    fn get_latest_version(&self, name: &str) -> Option<Rc<PackageVersion>> {
        (**self).get_latest_version(name)
    }

    fn providers_of(&self, name: &str) -> Vec<Rc<PackageVersion>> {
        (**self).providers_of(name)
    }
}

/// A version selected as the best match for a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub pretty_name: String,
    pub version: Version,
    pub pretty_version: String,
    pub stability: Stability,
    pub repository: String,
    pub require: BTreeMap<String, String>,
}

/// Relaxations of the normal lookup rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Allowance {
    /// Accept versions below the minimum stability.
    pub unacceptable_stabilities: bool,
    /// Look past the highest-priority repository that knows the name.
    pub shadowed_repositories: bool,
}

impl Allowance {
    pub const NORMAL: Allowance = Allowance {
        unacceptable_stabilities: false,
        shadowed_repositories: false,
    };
    pub const UNACCEPTABLE_STABILITIES: Allowance = Allowance {
        unacceptable_stabilities: true,
        shadowed_repositories: false,
    };
    pub const SHADOWED_REPOSITORIES: Allowance = Allowance {
        unacceptable_stabilities: false,
        shadowed_repositories: true,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateQuery<'a> {
    pub name: &'a str,
    pub constraint: Option<&'a VersionConstraint>,
    pub preferred_stability: Stability,
    pub platform_filter: &'a PlatformFilter,
    pub allowance: Allowance,
}

/// A package that provides a virtual package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub description: String,
}

/// A platform requirement of a candidate that the platform does not meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMismatch {
    pub requirement: String,
    pub constraint: String,
    /// The installed version, or `None` when the platform lacks it.
    pub installed: Option<String>,
}

impl std::fmt::Display for PlatformMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.installed {
            Some(installed) => write!(
                f,
                "requires {} {} which does not match your installed version {}",
                self.requirement, self.constraint, installed
            ),
            None => write!(
                f,
                "requires {} {} which is missing from your platform",
                self.requirement, self.constraint
            ),
        }
    }
}

/// The pool of candidate versions the resolver looks up.
pub trait CandidatePool {
    /// The best version of `query.name`, or `None` if nothing qualifies.
    fn find_best_candidate(&self, query: &CandidateQuery<'_>) -> Option<Candidate>;

    /// Packages declaring that they provide `name`.
    fn providers_of(&self, name: &str) -> Vec<PackageDescriptor>;

    /// Known names lexically close to `name`, most similar first.
    fn similar_names(&self, name: &str) -> Vec<String>;

    /// The minimum stability in effect, for diagnostics.
    fn minimum_stability(&self) -> Stability;

    /// The unmet platform requirements of `candidate` under `filter`.
    fn platform_mismatches(&self, candidate: &Candidate, filter: &PlatformFilter)
    -> Vec<PlatformMismatch>;

    /// The installed version of a platform package.
    fn platform_version(&self, name: &str) -> Option<Version>;
}

/// A package found by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub name: String,
    pub description: String,
    pub abandoned: Abandoned,
}

/// The package search backend driving the interactive collector.
pub trait SearchBackend {
    fn search(&self, term: &str) -> Vec<SearchMatch>;

    fn has_providers(&self, name: &str) -> bool;
}

/// Distinct provider descriptors, in the order first seen.
pub(crate) fn describe_providers(providers: impl IntoIterator<Item = Rc<PackageVersion>>) -> Vec<PackageDescriptor> {
    let mut seen = BTreeSet::new();
    providers
        .into_iter()
        .filter(|p| seen.insert(p.name.to_lowercase()))
        .map(|p| PackageDescriptor {
            name: p.name.clone(),
            description: p.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_abandoned_notice() {
        assert_eq!(Abandoned::No.notice(), None);
        assert_eq!(
            Abandoned::Yes.notice().as_deref(),
            Some("Abandoned. No replacement was suggested.")
        );
        assert_eq!(
            Abandoned::ReplacedBy("acme/new".into()).notice().as_deref(),
            Some("Abandoned. Use acme/new instead.")
        );
    }

    #[test]
    fn test_allowance_default() {
        assert_eq!(Allowance::default(), Allowance::NORMAL);
    }

    #[test]
    fn test_platform_mismatch_display() {
        let missing = PlatformMismatch {
            requirement: "ext-intl".into(),
            constraint: "*".into(),
            installed: None,
        };
        assert_eq!(
            missing.to_string(),
            "requires ext-intl * which is missing from your platform"
        );
        let old = PlatformMismatch {
            requirement: "php".into(),
            constraint: "^8.3".into(),
            installed: Some("8.2.0".into()),
        };
        assert_eq!(
            old.to_string(),
            "requires php ^8.3 which does not match your installed version 8.2.0"
        );
    }
}
