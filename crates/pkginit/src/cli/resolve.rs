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

use anyhow::Context;
use pkgresolve::{
    prompt::{NoPrompt, ProvidedConstraintPrompt},
    resolver::{ResolutionOutcome, VersionResolver},
};
use pkgutil::{
    cli::UniversalFlags, common::dialoguer_ctrlc_handler, package_name::PackageName,
    stability::Stability, version::VersionConstraint,
};

use super::ResolutionFlags;
use crate::{prompt::DialoguerPrompter, render, settings::Settings};

#[derive(Debug, clap::Parser)]
pub struct ResolveSubcommand {
    /// Packages to resolve, as `vendor/name` or `vendor/name:constraint`
    #[clap(required = true, value_name = "PACKAGE")]
    pub packages: Vec<PackageArg>,

    #[clap(flatten)]
    pub resolution: ResolutionFlags,
}

/// A package named on the command line, optionally with the constraint to
/// keep if a version is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArg {
    pub name: PackageName,
    pub constraint: Option<String>,
}

impl FromStr for PackageArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, constraint) = match s.split_once([':', '=', ' ']) {
            Some((name, constraint)) => (name, Some(constraint.trim())),
            None => (s, None),
        };
        let name: PackageName = name.parse()?;
        let constraint = match constraint {
            Some(c) => {
                VersionConstraint::parse(c).with_context(|| format!("invalid constraint for {name}"))?;
                Some(c.to_string())
            }
            None => None,
        };
        Ok(PackageArg { name, constraint })
    }
}

pub fn resolve_cli(cli: UniversalFlags, cmd: ResolveSubcommand) -> anyhow::Result<i32> {
    let settings = Settings::load(&cmd.resolution)?;
    let minimum_stability = settings.minimum_stability.unwrap_or(Stability::Stable);
    let preferred_stability = settings.preferred_stability(minimum_stability);
    let set = settings.repository_set(minimum_stability)?;
    let resolver = VersionResolver::new(&set).fixed(settings.fixed);

    let mut prompt: Box<dyn ProvidedConstraintPrompt> = if cli.no_interaction {
        Box::new(NoPrompt)
    } else {
        ctrlc::set_handler(dialoguer_ctrlc_handler)?;
        Box::new(DialoguerPrompter::new(cli.quiet))
    };

    let mut failed = 0;
    for arg in &cmd.packages {
        let name = arg.name.to_string();
        let _span = tracing::info_span!("resolve", package = %name).entered();
        match resolver.resolve(
            &name,
            arg.constraint.as_deref(),
            preferred_stability,
            &settings.platform_filter,
            &mut *prompt,
        ) {
            ResolutionOutcome::Resolved { name, constraint }
            | ResolutionOutcome::ProvidedOnly { name, constraint } => {
                println!("{name} {constraint}");
            }
            ResolutionOutcome::Failed(e) => {
                eprintln!("{}", render::failure(&name, &e));
                failed += 1;
            }
        }
    }
    if failed > 0 {
        log::debug!("{} of {} packages could not be resolved", failed, cmd.packages.len());
        return Ok(1);
    }
    Ok(0)
}
