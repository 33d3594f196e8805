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

//! The questions the collector and the resolver ask.
//!
//! Nothing in this crate talks to a terminal; the binary supplies a prompter
//! and tests supply scripted ones.

use pkgutil::version::ConstraintError;

use crate::{
    registry::{Abandoned, PackageDescriptor},
    resolver::ResolverError,
};

/// Asks for the constraint of a package that only exists as something other
/// packages provide.
pub trait ProvidedConstraintPrompt {
    /// `None` or an empty answer stands for `*`. `error` is set when the
    /// previous answer was not a valid constraint.
    fn provided_constraint(
        &mut self,
        name: &str,
        providers: &[PackageDescriptor],
        error: Option<&ConstraintError>,
    ) -> Option<String>;
}

/// Answers every question with nothing, as in non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl ProvidedConstraintPrompt for NoPrompt {
    fn provided_constraint(
        &mut self,
        _name: &str,
        _providers: &[PackageDescriptor],
        _error: Option<&ConstraintError>,
    ) -> Option<String> {
        None
    }
}

/// One entry of the package selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChoice {
    pub name: String,
    pub description: String,
    pub abandoned: Abandoned,
}

impl PackageChoice {
    pub fn notice(&self) -> Option<String> {
        self.abandoned.notice()
    }
}

impl std::fmt::Display for PackageChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(notice) = self.notice() {
            write!(f, " {notice}")?;
        }
        Ok(())
    }
}

pub trait Prompter: ProvidedConstraintPrompt {
    /// The next search term; `None` or an empty term ends the collection.
    fn search_term(&mut self) -> anyhow::Result<Option<String>>;

    /// Index of the chosen package, or `None` to search again.
    fn choose_package(&mut self, term: &str, choices: &[PackageChoice]) -> anyhow::Result<Option<usize>>;

    /// The constraint to require `package` with; empty means "determine
    /// automatically". `error` is set when the previous answer was invalid.
    fn version_constraint(
        &mut self,
        package: &str,
        error: Option<&ConstraintError>,
    ) -> anyhow::Result<Option<String>>;

    /// Index into `choices` for a framework package, or `None` to skip it.
    fn framework_constraint(&mut self, package: &str, choices: &[String]) -> anyhow::Result<Option<usize>>;

    /// Called with an automatically determined constraint.
    fn using_version(&mut self, _package: &str, _constraint: &str) {}

    fn resolution_failed(&mut self, package: &str, error: &ResolverError);
}
