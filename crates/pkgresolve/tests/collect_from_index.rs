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

use std::collections::{BTreeMap, HashSet, VecDeque};

use expect_test::expect;
use pkgresolve::{
    adoption::VendorAdoptionTable,
    pkg::{
        require::{CollectorConfig, RequirementCollector},
        seed::seed_framework,
    },
    prompt::{PackageChoice, Prompter, ProvidedConstraintPrompt},
    registry::{IndexRepository, PackageDescriptor, RepositorySet},
    resolver::{ResolverError, VersionResolver},
};
use pkgutil::{platform::PlatformFilter, stability::Stability, version::ConstraintError};

const PUBLIC_INDEX: &str = r#"{"name": "illuminate/support", "version": "10.48.0", "require": {"php": "^8.1"}}
{"name": "illuminate/support", "version": "11.9.2", "require": {"php": "^8.2"}}
{"name": "illuminate/console", "version": "11.9.2", "require": {"php": "^8.2"}}
{"name": "acme/http", "version": "2.3.1", "description": "HTTP client", "require": {"php": "^8.1", "ext-curl": "*"}}
{"name": "acme/queue", "version": "0.7.0", "description": "Queue worker", "require": {"php": "^8.4"}}
{"name": "acme/internal", "version": "3.0.0"}
"#;

const PRIVATE_INDEX: &str = r#"{"name": "acme/internal", "version": "4.0.0-alpha1"}
"#;

#[derive(Default)]
struct Script {
    framework_pick: Option<usize>,
    terms: VecDeque<&'static str>,
    constraints: VecDeque<&'static str>,
    failures: Vec<String>,
    used: Vec<String>,
}

impl ProvidedConstraintPrompt for Script {
    fn provided_constraint(
        &mut self,
        _name: &str,
        _providers: &[PackageDescriptor],
        _error: Option<&ConstraintError>,
    ) -> Option<String> {
        None
    }
}

impl Prompter for Script {
    fn search_term(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.terms.pop_front().map(str::to_string))
    }

    fn choose_package(&mut self, _term: &str, _choices: &[PackageChoice]) -> anyhow::Result<Option<usize>> {
        Ok(Some(0))
    }

    fn version_constraint(
        &mut self,
        _package: &str,
        _error: Option<&ConstraintError>,
    ) -> anyhow::Result<Option<String>> {
        Ok(self.constraints.pop_front().map(str::to_string))
    }

    fn framework_constraint(&mut self, _package: &str, _choices: &[String]) -> anyhow::Result<Option<usize>> {
        Ok(self.framework_pick)
    }

    fn using_version(&mut self, package: &str, constraint: &str) {
        self.used.push(format!("{package} {constraint}"));
    }

    fn resolution_failed(&mut self, _package: &str, error: &ResolverError) {
        self.failures.push(error.to_string());
    }
}

fn repository_set(dir: &tempfile::TempDir) -> RepositorySet {
    let public = dir.path().join("public.index");
    let private = dir.path().join("private.index");
    std::fs::write(&public, PUBLIC_INDEX).unwrap();
    std::fs::write(&private, PRIVATE_INDEX).unwrap();

    let platform = BTreeMap::from([
        ("php".to_string(), "8.3.4".to_string()),
        ("ext-curl".to_string(), "8.3.4".to_string()),
    ]);
    let mut set = RepositorySet::new(Stability::Stable).with_platform(&platform);
    set.add_repository(
        Box::new(IndexRepository::open("private", &private).unwrap()),
        Some(10),
    )
    .add_repository(
        Box::new(IndexRepository::open("public", &public).unwrap()),
        None,
    );
    set
}

#[test_log::test]
fn seed_then_collect_from_index_files() {
    let dir = tempfile::tempdir().unwrap();
    let set = repository_set(&dir);
    let filter = PlatformFilter::IgnoreNone;

    let mut script = Script {
        framework_pick: Some(2),
        terms: [
            "illuminate/console",
            "acme/http",
            "acme/queue",
            "acme/internal",
            "",
        ]
        .into(),
        ..Default::default()
    };
    let mut adoption = VendorAdoptionTable::new();
    let seeded = seed_framework(
        &set,
        &"illuminate/support".parse().unwrap(),
        Stability::Stable,
        &filter,
        &mut script,
        &mut adoption,
    )
    .unwrap()
    .unwrap();

    let mut existing = HashSet::from([seeded.package_name.clone()]);
    let collector = RequirementCollector::new(
        &set,
        VersionResolver::new(&set),
        CollectorConfig {
            preferred_stability: Stability::Stable,
            platform_filter: filter.clone(),
            adoptable_vendors: ["illuminate".to_string()].into(),
        },
    );
    let collected = collector
        .collect(&mut script, &mut existing, &mut adoption)
        .unwrap();

    let mut all = vec![seeded];
    all.extend(collected);
    expect![[r#"
        [
            "illuminate/support ^11.0",
            "illuminate/console ^11.0",
            "acme/http ^2.3",
        ]
    "#]]
    .assert_debug_eq(&all.iter().map(|r| r.to_string()).collect::<Vec<_>>());

    expect![[r#"
        [
            "package acme/queue has requirements incompatible with your platform: found acme/queue 0.7.0 from public\n  - requires php ^8.4 which does not match your installed version 8.3.4",
            "package acme/internal exists in private and public; private has the higher priority and is canonical for it, but its versions do not match your minimum stability",
        ]
    "#]]
    .assert_debug_eq(&script.failures);
    assert_eq!(
        script.used,
        vec!["illuminate/console ^11.0", "acme/http ^2.3"]
    );
}

#[test]
fn ignoring_platform_requirements_allows_incompatible_packages() {
    let dir = tempfile::tempdir().unwrap();
    let set = repository_set(&dir);
    let mut script = Script {
        terms: ["acme/queue", "ext-intl"].into(),
        ..Default::default()
    };
    let collector = RequirementCollector::new(
        &set,
        VersionResolver::new(&set),
        CollectorConfig {
            preferred_stability: Stability::Stable,
            platform_filter: PlatformFilter::from_names(["php"]),
            adoptable_vendors: Default::default(),
        },
    );
    let collected = collector
        .collect(&mut script, &mut HashSet::new(), &mut VendorAdoptionTable::new())
        .unwrap();
    assert_eq!(
        collected.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        vec!["acme/queue ^0.7.0"]
    );
}
