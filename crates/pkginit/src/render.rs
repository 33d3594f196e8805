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

use colored::Colorize;
use pkgresolve::{prompt::PackageChoice, registry::PackageDescriptor, resolver::ResolverError};

/// What the user can change to make a failed lookup succeed.
pub fn remedy(error: &ResolverError) -> Option<String> {
    match error {
        ResolverError::PlatformIncompatible { details, .. }
        | ResolverError::PlatformIncompatibleAnyStability { details, .. } => {
            let names = details
                .iter()
                .map(|d| format!("--ignore-platform-req={}", d.requirement))
                .collect::<Vec<_>>();
            Some(format!(
                "make sure your platform matches, or skip the check with {} or --ignore-platform-reqs",
                names.join(" ")
            ))
        }
        ResolverError::ShadowedByHigherPriorityRepo {
            canonical_repository,
            ..
        } => Some(format!(
            "lower the priority of {canonical_repository}, or lower your minimum stability"
        )),
        ResolverError::StabilityTooStrict { name, .. } => Some(format!(
            "lower your minimum stability, or require {name} with an explicit constraint such as `^1.0@beta`"
        )),
        ResolverError::NotFound { .. } => Some("check the spelling of the package name".to_string()),
        ResolverError::InconsistentIndex { .. } => {
            Some("rebuild the repository index".to_string())
        }
    }
}

/// A resolver failure with its remedy, as printed for a skipped package.
pub fn failure(package: &str, error: &ResolverError) -> String {
    let mut out = format!(
        "{}: could not require {}: {}",
        "warning".yellow().bold(),
        package,
        error
    );
    if let Some(remedy) = remedy(error) {
        out.push_str(&format!("\n{}: {}", "hint".cyan().bold(), remedy));
    }
    out
}

/// One line of the package selection list.
pub fn choice(choice: &PackageChoice) -> String {
    match choice.notice() {
        Some(notice) => format!("{} {}", choice.name, notice.yellow().bold()),
        None => choice.name.clone(),
    }
}

pub fn providers(name: &str, providers: &[PackageDescriptor]) -> String {
    let mut out = format!(
        "Package {} does not exist but is provided by {} packages:",
        name,
        providers.len()
    );
    for p in providers {
        out.push_str(&format!("\n  - {}", p.name));
        if !p.description.is_empty() {
            out.push_str(&format!(": {}", p.description));
        }
    }
    out
}
