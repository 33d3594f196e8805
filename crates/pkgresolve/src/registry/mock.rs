//! A mock repository for testing purposes; currently only available in tests

use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use pkgutil::{
    stability::Stability,
    version::{parse_branch_version, parse_version},
};
use semver::Version;

use super::{Abandoned, PackageVersion, Repository};

/// A mock repository, primarily used in tests.
pub struct MockRepository {
    name: String,
    packages: HashMap<String, Rc<BTreeMap<Version, Rc<PackageVersion>>>>,
}

impl MockRepository {
    pub fn new(name: &str) -> Self {
        MockRepository {
            name: name.to_string(),
            packages: HashMap::new(),
        }
    }

    /// Add a version to the mock repository. Only available when the mock
    /// repository is not used, since modifying a [`Rc`] is only possible when
    /// it is not shared.
    pub fn add_version(&mut self, version: PackageVersion) -> &mut Self {
        let entry = self.packages.entry(version.name.to_lowercase()).or_default();
        Rc::get_mut(entry)
            .expect("This mock repository is already shared")
            .insert(version.version.clone(), Rc::new(version));
        self
    }

    pub fn add_package_full<'a>(
        &mut self,
        name: &'a str,
        version: &'a str,
        require: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        let version = create_mock_version(name, version, require);
        self.add_version(version)
    }

    pub fn add_package(&mut self, name: &str, version: &str) -> &mut Self {
        self.add_package_full(name, version, [])
    }

    /// Add a package version that provides the virtual package `provides`.
    pub fn add_provider(&mut self, name: &str, version: &str, provides: &str) -> &mut Self {
        let mut v = create_mock_version(name, version, []);
        v.provide.insert(provides.to_string(), "*".to_string());
        self.add_version(v)
    }

    pub fn add_abandoned(&mut self, name: &str, version: &str, abandoned: Abandoned) -> &mut Self {
        let mut v = create_mock_version(name, version, []);
        v.abandoned = abandoned;
        self.add_version(v)
    }
}

impl Repository for MockRepository {
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

pub fn create_mock_version<'a>(
    name: &'a str,
    version: &'a str,
    require: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> PackageVersion {
    let parsed = parse_version(version)
        .or_else(|| parse_branch_version(version))
        .unwrap();
    PackageVersion {
        name: name.to_string(),
        stability: Stability::of_pre_release(&parsed.pre),
        version: parsed,
        pretty_version: version.to_string(),
        description: format!("The {name} package"),
        abandoned: Abandoned::No,
        require: require
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        provide: BTreeMap::new(),
    }
}
