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

//! Interactive collection of `name constraint` requirements.

use std::collections::{BTreeSet, HashSet};

use pkgutil::{platform::PlatformFilter, stability::Stability, version::VersionConstraint};

use crate::{
    adoption::VendorAdoptionTable,
    prompt::{PackageChoice, Prompter},
    registry::{Abandoned, CandidatePool, SearchBackend},
    resolver::{ResolutionOutcome, VersionResolver},
};

/// One collected requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub package_name: String,
    pub constraint: String,
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.package_name, self.constraint)
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub preferred_stability: Stability,
    pub platform_filter: PlatformFilter,
    /// Vendors whose packages adopt the last constraint of the same vendor.
    pub adoptable_vendors: BTreeSet<String>,
}

pub struct RequirementCollector<'a, S: SearchBackend + ?Sized, P: CandidatePool + ?Sized> {
    search: &'a S,
    resolver: VersionResolver<'a, P>,
    config: CollectorConfig,
}

impl<'a, S: SearchBackend + ?Sized, P: CandidatePool + ?Sized> RequirementCollector<'a, S, P> {
    pub fn new(search: &'a S, resolver: VersionResolver<'a, P>, config: CollectorConfig) -> Self {
        RequirementCollector {
            search,
            resolver,
            config,
        }
    }

    /// Asks for packages until an empty search term and returns them in the
    /// order chosen.
    ///
    /// `existing` holds names already required (by earlier collections too)
    /// and is extended with every package collected here. `adoption` is
    /// updated with each vendor's latest constraint.
    pub fn collect(
        &self,
        prompter: &mut dyn Prompter,
        existing: &mut HashSet<String>,
        adoption: &mut VendorAdoptionTable,
    ) -> anyhow::Result<Vec<Requirement>> {
        let mut requirements = vec![];
        loop {
            let Some(term) = prompter.search_term()? else {
                break;
            };
            let term = term.trim().to_string();
            if term.is_empty() {
                break;
            }

            let Some(package) = self.pick_package(prompter, &term, existing)? else {
                continue;
            };

            let Some(constraint) = self.determine_constraint(prompter, &package, adoption)? else {
                continue;
            };

            let requirement = Requirement {
                package_name: package,
                constraint,
            };
            log::info!("Requiring {}", requirement);
            existing.insert(requirement.package_name.clone());
            adoption.record(&requirement.package_name, &requirement.constraint);
            requirements.push(requirement);
        }
        Ok(requirements)
    }

    /// Searches for `term` and lets the user pick one match. `None` means
    /// search again.
    fn pick_package(
        &self,
        prompter: &mut dyn Prompter,
        term: &str,
        existing: &HashSet<String>,
    ) -> anyhow::Result<Option<String>> {
        let matches: Vec<_> = self
            .search
            .search(term)
            .into_iter()
            .filter(|m| !existing.contains(&m.name))
            .collect();
        log::debug!("Search for {} found {} new packages", term, matches.len());
        if matches.is_empty() {
            return Ok(None);
        }
        if matches.iter().any(|m| m.name == term) {
            return Ok(Some(term.to_string()));
        }

        let mut choices: Vec<PackageChoice> = vec![];
        if self.search.has_providers(term) {
            choices.push(PackageChoice {
                name: term.to_string(),
                description: String::new(),
                abandoned: Abandoned::No,
            });
        }
        choices.extend(matches.into_iter().map(|m| PackageChoice {
            name: m.name,
            description: m.description,
            abandoned: m.abandoned,
        }));

        let chosen = prompter
            .choose_package(term, &choices)?
            .and_then(|i| choices.get(i))
            .map(|c| c.name.clone());
        Ok(chosen)
    }

    /// The constraint to require `package` with. `None` means resolution
    /// failed and was reported.
    fn determine_constraint(
        &self,
        prompter: &mut dyn Prompter,
        package: &str,
        adoption: &VendorAdoptionTable,
    ) -> anyhow::Result<Option<String>> {
        let mut error = None;
        let explicit = loop {
            let answer = prompter.version_constraint(package, error.as_ref())?;
            let answer = answer.as_deref().map(str::trim).unwrap_or_default();
            if answer.is_empty() {
                break None;
            }
            match VersionConstraint::parse(answer) {
                Ok(_) => break Some(answer.to_string()),
                Err(e) => error = Some(e),
            }
        };
        if explicit.is_some() {
            return Ok(explicit);
        }

        if let Some(adopted) = adoption.adopted_constraint(package, &self.config.adoptable_vendors) {
            log::debug!("{} adopts {} from its vendor", package, adopted);
            prompter.using_version(package, adopted);
            return Ok(Some(adopted.to_string()));
        }

        let outcome = self.resolver.resolve(
            package,
            None,
            self.config.preferred_stability,
            &self.config.platform_filter,
            &mut *prompter,
        );
        match outcome {
            ResolutionOutcome::Resolved { constraint, .. }
            | ResolutionOutcome::ProvidedOnly { constraint, .. } => {
                prompter.using_version(package, &constraint);
                Ok(Some(constraint))
            }
            ResolutionOutcome::Failed(e) => {
                log::warn!("Could not resolve {}: {}", package, e);
                prompter.resolution_failed(package, &e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, collections::VecDeque};

    use pkgutil::version::ConstraintError;
    use semver::Version;

    use super::*;
    use crate::{
        prompt::ProvidedConstraintPrompt,
        registry::{
            Candidate, CandidateQuery, PackageDescriptor, PlatformMismatch, RepositorySet, SearchMatch,
            mock::{MockRepository, create_mock_version},
        },
        resolver::ResolverError,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Choices(Vec<String>),
        Using(String, String),
        Failed(String),
        InvalidConstraint(String),
    }

    #[derive(Default)]
    struct ScriptedPrompter {
        terms: VecDeque<&'static str>,
        /// Names to pick; `None` declines the selection.
        picks: VecDeque<Option<&'static str>>,
        constraints: VecDeque<&'static str>,
        events: Vec<Event>,
    }

    impl ProvidedConstraintPrompt for ScriptedPrompter {
        fn provided_constraint(
            &mut self,
            _name: &str,
            _providers: &[PackageDescriptor],
            _error: Option<&ConstraintError>,
        ) -> Option<String> {
            None
        }
    }

    impl Prompter for ScriptedPrompter {
        fn search_term(&mut self) -> anyhow::Result<Option<String>> {
            Ok(self.terms.pop_front().map(str::to_string))
        }

        fn choose_package(&mut self, _term: &str, choices: &[PackageChoice]) -> anyhow::Result<Option<usize>> {
            self.events
                .push(Event::Choices(choices.iter().map(|c| c.to_string()).collect()));
            let pick = self.picks.pop_front().flatten();
            Ok(pick.and_then(|name| choices.iter().position(|c| c.name == name)))
        }

        fn version_constraint(
            &mut self,
            package: &str,
            error: Option<&ConstraintError>,
        ) -> anyhow::Result<Option<String>> {
            if error.is_some() {
                self.events.push(Event::InvalidConstraint(package.to_string()));
            }
            Ok(self.constraints.pop_front().map(str::to_string))
        }

        fn framework_constraint(&mut self, _package: &str, _choices: &[String]) -> anyhow::Result<Option<usize>> {
            Ok(None)
        }

        fn using_version(&mut self, package: &str, constraint: &str) {
            self.events
                .push(Event::Using(package.to_string(), constraint.to_string()));
        }

        fn resolution_failed(&mut self, package: &str, _error: &ResolverError) {
            self.events.push(Event::Failed(package.to_string()));
        }
    }

    fn config(adoptable: &[&str]) -> CollectorConfig {
        CollectorConfig {
            preferred_stability: Stability::Stable,
            platform_filter: PlatformFilter::IgnoreNone,
            adoptable_vendors: adoptable.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn repository_set() -> RepositorySet {
        let mut repo = MockRepository::new("main");
        repo.add_package("acme/core", "1.9.0")
            .add_package("acme/core", "2.0.0")
            .add_package("acme/core-utils", "0.3.1")
            .add_package("acme/widgets", "1.0.0")
            .add_package("acme/beta-lib", "1.0.0-beta")
            .add_abandoned(
                "acme/core-legacy",
                "1.0.0",
                Abandoned::ReplacedBy("acme/core".into()),
            );
        let mut set = RepositorySet::new(Stability::Stable);
        set.add_repository(Box::new(repo), None);
        set
    }

    #[test_log::test]
    fn test_collect_exact_and_chosen() {
        let set = repository_set();
        let collector = RequirementCollector::new(&set, VersionResolver::new(&set), config(&[]));
        let mut prompter = ScriptedPrompter {
            terms: ["acme/core", "core", "  "].into(),
            picks: [Some("acme/core-utils")].into(),
            constraints: ["", "^0.3"].into(),
            ..Default::default()
        };
        let mut existing = HashSet::new();
        let mut adoption = VendorAdoptionTable::new();
        let requirements = collector
            .collect(&mut prompter, &mut existing, &mut adoption)
            .unwrap();

        assert_eq!(
            requirements.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            vec!["acme/core ^2.0", "acme/core-utils ^0.3"]
        );
        assert!(existing.contains("acme/core"));
        assert!(existing.contains("acme/core-utils"));
        assert_eq!(adoption.get("acme"), Some("^0.3"));

        // the second search no longer offers acme/core
        let Event::Choices(choices) = &prompter.events[1] else {
            panic!("unexpected events {:?}", prompter.events);
        };
        assert!(!choices.iter().any(|c| c == "acme/core"));
        assert!(choices.contains(&"acme/core-legacy Abandoned. Use acme/core instead.".to_string()));
        assert_eq!(
            prompter.events[0],
            Event::Using("acme/core".into(), "^2.0".into())
        );
    }

    #[test]
    fn test_collect_reprompts_on_invalid_constraint_and_failure() {
        let set = repository_set();
        let collector = RequirementCollector::new(&set, VersionResolver::new(&set), config(&[]));
        let mut prompter = ScriptedPrompter {
            terms: ["acme/beta-lib", "acme/widgets", "nothing-like-this", ""].into(),
            constraints: ["", "not a constraint", "~1.0"].into(),
            ..Default::default()
        };
        let mut existing = HashSet::new();
        let mut adoption = VendorAdoptionTable::new();
        let requirements = collector
            .collect(&mut prompter, &mut existing, &mut adoption)
            .unwrap();

        assert_eq!(
            requirements,
            vec![Requirement {
                package_name: "acme/widgets".into(),
                constraint: "~1.0".into(),
            }]
        );
        assert_eq!(
            prompter.events,
            vec![
                Event::Failed("acme/beta-lib".into()),
                Event::InvalidConstraint("acme/widgets".into()),
            ]
        );
        assert!(!existing.contains("acme/beta-lib"));
    }

    /// Answers every lookup of `acme/core` and counts them.
    struct CountingPool {
        lookups: Cell<usize>,
    }

    impl CandidatePool for CountingPool {
        fn find_best_candidate(&self, query: &CandidateQuery<'_>) -> Option<Candidate> {
            self.lookups.set(self.lookups.get() + 1);
            (query.name == "acme/core").then(|| Candidate {
                name: "acme/core".into(),
                pretty_name: "acme/core".into(),
                version: Version::new(2, 0, 0),
                pretty_version: "2.0.0".into(),
                stability: Stability::Stable,
                repository: "main".into(),
                require: Default::default(),
            })
        }

        fn providers_of(&self, _name: &str) -> Vec<PackageDescriptor> {
            vec![]
        }

        fn similar_names(&self, _name: &str) -> Vec<String> {
            vec![]
        }

        fn minimum_stability(&self) -> Stability {
            Stability::Stable
        }

        fn platform_mismatches(&self, _: &Candidate, _: &PlatformFilter) -> Vec<PlatformMismatch> {
            vec![]
        }

        fn platform_version(&self, _name: &str) -> Option<Version> {
            None
        }
    }

    struct FixedSearch;

    impl SearchBackend for FixedSearch {
        fn search(&self, term: &str) -> Vec<SearchMatch> {
            vec![SearchMatch {
                name: term.to_string(),
                description: String::new(),
                abandoned: Abandoned::No,
            }]
        }

        fn has_providers(&self, _name: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_vendor_adoption_skips_resolver() {
        let pool = CountingPool {
            lookups: Cell::new(0),
        };
        let collector = RequirementCollector::new(
            &FixedSearch,
            VersionResolver::new(&pool),
            config(&["acme"]),
        );
        let mut prompter = ScriptedPrompter {
            terms: ["acme/core", "acme/widgets"].into(),
            ..Default::default()
        };
        let mut existing = HashSet::new();
        let mut adoption = VendorAdoptionTable::new();
        let requirements = collector
            .collect(&mut prompter, &mut existing, &mut adoption)
            .unwrap();

        assert_eq!(
            requirements.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            vec!["acme/core ^2.0", "acme/widgets ^2.0"]
        );
        assert_eq!(pool.lookups.get(), 1);
    }

    #[test]
    fn test_non_adoptable_vendor_is_resolved() {
        let pool = CountingPool {
            lookups: Cell::new(0),
        };
        let collector =
            RequirementCollector::new(&FixedSearch, VersionResolver::new(&pool), config(&[]));
        let mut prompter = ScriptedPrompter {
            terms: ["acme/core", "acme/core"].into(),
            ..Default::default()
        };
        let mut existing = HashSet::new();
        let mut adoption = VendorAdoptionTable::new();
        let requirements = collector
            .collect(&mut prompter, &mut existing, &mut adoption)
            .unwrap();
        // FixedSearch ignores `existing`, but the collector filters it out
        assert_eq!(requirements.len(), 1);
        assert_eq!(pool.lookups.get(), 1);
    }

    #[test]
    fn test_provider_choice_is_offered() {
        let mut provider = create_mock_version("acme/psr-logger", "1.0.0", []);
        provider.description = "Implements psr/log-implementation".into();
        provider
            .provide
            .insert("psr/log-implementation".into(), "1.0".into());
        let mut repo = MockRepository::new("main");
        repo.add_version(provider);
        let mut set = RepositorySet::new(Stability::Stable);
        set.add_repository(Box::new(repo), None);
        let collector = RequirementCollector::new(&set, VersionResolver::new(&set), config(&[]));

        let mut prompter = ScriptedPrompter {
            // matches the provider by description, not by name
            terms: ["psr/log-implementation", "psr/log-implementation"].into(),
            picks: [None, Some("psr/log-implementation")].into(),
            ..Default::default()
        };
        let mut existing = HashSet::new();
        let mut adoption = VendorAdoptionTable::new();
        let requirements = collector
            .collect(&mut prompter, &mut existing, &mut adoption)
            .unwrap();
        assert_eq!(
            requirements.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            vec!["psr/log-implementation *"]
        );
        let Event::Choices(choices) = &prompter.events[0] else {
            panic!("unexpected events {:?}", prompter.events);
        };
        assert_eq!(choices[0], "psr/log-implementation");
        assert_eq!(adoption.get("psr"), Some("*"));
    }
}
