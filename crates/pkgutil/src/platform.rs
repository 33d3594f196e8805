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

//! Platform packages and the filter deciding which platform requirements
//! are ignored.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static PLATFORM_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:php(?:-64bit|-ipv6|-zts|-debug)?|hhvm|(?:ext|lib)-[a-z0-9](?:[_.-]?[a-z0-9]+)*|composer(?:-(?:plugin|runtime)-api)?)$",
    )
    .expect("platform package pattern is valid")
});

/// Whether `name` refers to the runtime platform (the interpreter, one of
/// its extensions or libraries, or the package manager itself) rather than
/// to an installable package.
pub fn is_platform_package(name: &str) -> bool {
    PLATFORM_PACKAGE.is_match(&name.to_ascii_lowercase())
}

/// Which platform requirements to disregard for one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    IgnoreNone,
    IgnoreAll,
    /// Names to ignore. An entry containing `*` is a wildcard pattern, e.g.
    /// `ext-*`.
    IgnoreNamed(BTreeSet<String>),
}

impl PlatformFilter {
    /// Builds a filter from a list of names; an empty list ignores nothing.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.trim().is_empty())
            .collect();
        if names.is_empty() {
            PlatformFilter::IgnoreNone
        } else {
            PlatformFilter::IgnoreNamed(names)
        }
    }

    /// Whether requirements on `package_name` are disregarded. Ignoring all
    /// platform requirements never covers an installable package.
    pub fn is_ignored(&self, package_name: &str) -> bool {
        match self {
            PlatformFilter::IgnoreNone => false,
            PlatformFilter::IgnoreAll => is_platform_package(package_name),
            PlatformFilter::IgnoreNamed(names) => {
                names.contains(package_name)
                    || names
                        .iter()
                        .filter(|n| n.contains('*'))
                        .any(|pattern| wildcard_matches(pattern, package_name))
            }
        }
    }

    pub fn is_ignore_all(&self) -> bool {
        matches!(self, PlatformFilter::IgnoreAll)
    }
}

fn wildcard_matches(pattern: &str, name: &str) -> bool {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}
