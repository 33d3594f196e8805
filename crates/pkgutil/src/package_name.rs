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

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.-]+/[a-z0-9_.-]+$").expect("package name pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "the package name `{0}` is invalid, it should be lowercase and have a vendor name, a forward slash, and a package name, matching: [a-z0-9_.-]+/[a-z0-9_.-]+"
)]
pub struct PackageNameError(pub String);

/// A `vendor/name` package name.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName {
    pub vendor: String,
    pub name: String,
}

impl std::fmt::Debug for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.vendor, self.name)
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.vendor, self.name)
    }
}

impl FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !PACKAGE_NAME.is_match(s) {
            return Err(PackageNameError(s.to_string()));
        }
        match s.split_once('/') {
            Some((vendor, name)) => Ok(PackageName {
                vendor: vendor.to_string(),
                name: name.to_string(),
            }),
            None => Err(PackageNameError(s.to_string())),
        }
    }
}

impl TryFrom<String> for PackageName {
    type Error = PackageNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageName> for String {
    fn from(value: PackageName) -> Self {
        value.to_string()
    }
}

/// The vendor part of `vendor/name`, if both parts are present.
///
/// Unlike [`PackageName`], this accepts any spelling, since it is applied to
/// whatever the user or a search backend produced.
pub fn vendor_of(package: &str) -> Option<&str> {
    match package.split_once('/') {
        Some((vendor, name)) if !vendor.is_empty() && !name.is_empty() => Some(vendor),
        _ => None,
    }
}
