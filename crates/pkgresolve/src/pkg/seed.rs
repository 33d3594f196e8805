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

use anyhow::Context;
use pkgutil::{
    package_name::PackageName,
    platform::PlatformFilter,
    stability::Stability,
    version::{major_span_choices, parse_version},
};

use super::require::Requirement;
use crate::{
    adoption::VendorAdoptionTable,
    prompt::Prompter,
    registry::CandidatePool,
    resolver::{ResolutionOutcome, VersionResolver},
};

/// The answer that declines seeding.
pub const DECLINE_CHOICE: &str = "no";

/// Offers to require a framework package on one to three of its latest major
/// versions, before any free-form collection.
///
/// The chosen constraint is also recorded for the package's vendor, so the
/// vendor's other packages adopt it.
pub fn seed_framework<P: CandidatePool + ?Sized>(
    pool: &P,
    package: &PackageName,
    preferred_stability: Stability,
    platform_filter: &PlatformFilter,
    prompter: &mut dyn Prompter,
    adoption: &mut VendorAdoptionTable,
) -> anyhow::Result<Option<Requirement>> {
    let name = package.to_string();
    let outcome = VersionResolver::new(pool).fixed(true).resolve(
        &name,
        None,
        preferred_stability,
        platform_filter,
        &mut *prompter,
    );
    let latest = match outcome {
        ResolutionOutcome::Resolved { constraint, .. } => constraint,
        ResolutionOutcome::ProvidedOnly { .. } => {
            anyhow::bail!("{} has no published versions to seed from", name)
        }
        ResolutionOutcome::Failed(e) => {
            return Err(e).with_context(|| format!("failed to find the latest version of {name}"));
        }
    };
    let major = parse_version(&latest)
        .with_context(|| format!("the latest version of {name}, {latest}, is not a release"))?
        .major;
    log::debug!("Latest version of {} is {} (major {})", name, latest, major);

    let mut choices = major_span_choices(major);
    choices.push(DECLINE_CHOICE.to_string());
    let Some(choice) = prompter
        .framework_constraint(&name, &choices)?
        .and_then(|i| choices.get(i))
    else {
        return Ok(None);
    };
    if choice == DECLINE_CHOICE {
        return Ok(None);
    }

    adoption.record(&name, choice);
    Ok(Some(Requirement {
        package_name: name,
        constraint: choice.clone(),
    }))
}

#[cfg(test)]
mod test {
    use pkgutil::version::ConstraintError;

    use super::*;
    use crate::{
        prompt::{PackageChoice, ProvidedConstraintPrompt},
        registry::{PackageDescriptor, RepositorySet, mock::MockRepository},
        resolver::ResolverError,
    };

    struct FrameworkOnly {
        pick: Option<usize>,
        offered: Vec<String>,
    }

    impl ProvidedConstraintPrompt for FrameworkOnly {
        fn provided_constraint(
            &mut self,
            _name: &str,
            _providers: &[PackageDescriptor],
            _error: Option<&ConstraintError>,
        ) -> Option<String> {
            None
        }
    }

    impl Prompter for FrameworkOnly {
        fn search_term(&mut self) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn choose_package(&mut self, _: &str, _: &[PackageChoice]) -> anyhow::Result<Option<usize>> {
            Ok(None)
        }

        fn version_constraint(
            &mut self,
            _: &str,
            _: Option<&ConstraintError>,
        ) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn framework_constraint(&mut self, _package: &str, choices: &[String]) -> anyhow::Result<Option<usize>> {
            self.offered = choices.to_vec();
            Ok(self.pick)
        }

        fn resolution_failed(&mut self, _: &str, _: &ResolverError) {}
    }

    fn framework_set() -> RepositorySet {
        let mut repo = MockRepository::new("main");
        repo.add_package("illuminate/support", "10.48.0")
            .add_package("illuminate/support", "11.9.2");
        let mut set = RepositorySet::new(Stability::Stable);
        set.add_repository(Box::new(repo), None);
        set
    }

    fn seed(set: &RepositorySet, prompter: &mut FrameworkOnly, adoption: &mut VendorAdoptionTable) -> anyhow::Result<Option<Requirement>> {
        seed_framework(
            set,
            &"illuminate/support".parse().unwrap(),
            Stability::Stable,
            &PlatformFilter::IgnoreNone,
            prompter,
            adoption,
        )
    }

    #[test]
    fn test_seed_framework() {
        let set = framework_set();
        let mut prompter = FrameworkOnly {
            pick: Some(1),
            offered: vec![],
        };
        let mut adoption = VendorAdoptionTable::new();
        let seeded = seed(&set, &mut prompter, &mut adoption).unwrap();
        assert_eq!(
            prompter.offered,
            vec!["^9.0|^10.0|^11.0", "^10.0|^11.0", "^11.0", "no"]
        );
        assert_eq!(
            seeded.map(|r| r.to_string()).as_deref(),
            Some("illuminate/support ^10.0|^11.0")
        );
        assert_eq!(adoption.get("illuminate"), Some("^10.0|^11.0"));
    }

    #[test]
    fn test_decline_seed() {
        let set = framework_set();
        let mut adoption = VendorAdoptionTable::new();
        for pick in [Some(3), None] {
            let mut prompter = FrameworkOnly {
                pick,
                offered: vec![],
            };
            assert_eq!(seed(&set, &mut prompter, &mut adoption).unwrap(), None);
        }
        assert!(adoption.is_empty());
    }

    #[test]
    fn test_seed_missing_framework() {
        let set = RepositorySet::new(Stability::Stable);
        let mut prompter = FrameworkOnly {
            pick: Some(0),
            offered: vec![],
        };
        let mut adoption = VendorAdoptionTable::new();
        let err = seed(&set, &mut prompter, &mut adoption).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to find the latest version of illuminate/support"
        );
        assert!(err.downcast_ref::<ResolverError>().is_some());
    }
}
