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

use std::collections::BTreeSet;

use indexmap::IndexMap;
use pkgutil::package_name::vendor_of;

/// The last constraint chosen per vendor. Packages of an adoptable vendor
/// reuse it instead of being resolved, keeping vendors released in lockstep
/// on one version line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorAdoptionTable {
    constraints: IndexMap<String, String>,
}

impl VendorAdoptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `constraint` for the vendor of `package`. Names without a
    /// vendor and empty constraints are not recorded.
    pub fn record(&mut self, package: &str, constraint: &str) {
        let constraint = constraint.trim();
        if constraint.is_empty() {
            return;
        }
        if let Some(vendor) = vendor_of(package) {
            log::debug!("Vendor {} now uses {}", vendor, constraint);
            self.constraints
                .insert(vendor.to_string(), constraint.to_string());
        }
    }

    /// The constraint `package` may adopt, if its vendor is adoptable and
    /// has one recorded.
    pub fn adopted_constraint(&self, package: &str, adoptable: &BTreeSet<String>) -> Option<&str> {
        let vendor = vendor_of(package)?;
        if !adoptable.contains(vendor) {
            return None;
        }
        self.get(vendor)
    }

    pub fn get(&self, vendor: &str) -> Option<&str> {
        self.constraints
            .get(vendor)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constraints
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
