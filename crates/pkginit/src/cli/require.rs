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

use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, bail};
use pkgresolve::{
    adoption::VendorAdoptionTable,
    pkg::{
        require::{CollectorConfig, Requirement, RequirementCollector},
        seed::seed_framework,
    },
    resolver::VersionResolver,
};
use pkgutil::{
    cli::UniversalFlags, common::dialoguer_ctrlc_handler, package_name::PackageName,
    stability::Stability,
};
use serde_json::{Map, Value};

use super::ResolutionFlags;
use crate::{prompt::DialoguerPrompter, settings::Settings};

pub const REQUIRE: &str = "require";
pub const REQUIRE_DEV: &str = "require-dev";

#[derive(Debug, clap::Parser)]
pub struct RequireSubcommand {
    #[clap(flatten)]
    pub resolution: ResolutionFlags,

    /// Framework package to offer first, on one of its latest major versions
    #[clap(long, value_name = "PACKAGE")]
    pub seed: Option<PackageName>,

    /// Write the requirements to a file instead of stdout
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only collect `require`, not `require-dev`
    #[clap(long)]
    pub no_dev: bool,
}

pub fn require_cli(cli: UniversalFlags, cmd: RequireSubcommand) -> anyhow::Result<i32> {
    if cli.no_interaction {
        bail!("`pkginit require` is interactive, use `pkginit resolve` with --no-interaction");
    }
    ctrlc::set_handler(dialoguer_ctrlc_handler)?;

    let settings = Settings::load(&cmd.resolution)?;
    let mut prompter = DialoguerPrompter::new(cli.quiet);
    let minimum_stability = match settings.minimum_stability {
        Some(s) => s,
        None => prompter.minimum_stability()?.unwrap_or(Stability::Stable),
    };
    let preferred_stability = settings.preferred_stability(minimum_stability);
    let set = settings.repository_set(minimum_stability)?;
    log::debug!(
        "Minimum stability {}, preferred stability {}, repositories {:?}",
        minimum_stability,
        preferred_stability,
        set.repository_names()
    );

    let mut adoption = VendorAdoptionTable::new();
    let mut existing = HashSet::new();
    let mut sections: Vec<(&str, Vec<Requirement>)> = vec![];

    let mut require = vec![];
    if let Some(seed) = &cmd.seed {
        let _span = tracing::info_span!("seed", package = %seed).entered();
        if let Some(seeded) = seed_framework(
            &set,
            seed,
            preferred_stability,
            &settings.platform_filter,
            &mut prompter,
            &mut adoption,
        )? {
            existing.insert(seeded.package_name.clone());
            require.push(seeded);
        }
    }
    sections.push((REQUIRE, require));
    if !cmd.no_dev {
        sections.push((REQUIRE_DEV, vec![]));
    }

    let collector = RequirementCollector::new(
        &set,
        VersionResolver::new(&set).fixed(settings.fixed),
        CollectorConfig {
            preferred_stability,
            platform_filter: settings.platform_filter.clone(),
            adoptable_vendors: settings.adoptable_vendors.clone(),
        },
    );
    for (section, requirements) in sections.iter_mut() {
        let _span = tracing::info_span!("collect", section = *section).entered();
        let prompt = format!("Would you like to define your dependencies ({section}) interactively?");
        if !asks_to_collect(requirements) || prompter.confirm(&prompt, true)? {
            requirements.extend(collector.collect(&mut prompter, &mut existing, &mut adoption)?);
        }
    }

    let text = serde_json::to_string_pretty(&manifest(&sections))?;
    match &cmd.output {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write `{}`", path.display()))?,
        None => println!("{text}"),
    }
    Ok(0)
}

/// A section that already holds requirements, such as the seeded framework,
/// goes straight to collection.
fn asks_to_collect(requirements: &[Requirement]) -> bool {
    requirements.is_empty()
}

/// The collected requirements as manifest sections, in collection order.
pub fn manifest(sections: &[(&str, Vec<Requirement>)]) -> Value {
    let mut out = Map::new();
    for (section, requirements) in sections {
        let deps = requirements
            .iter()
            .map(|r| (r.package_name.clone(), Value::String(r.constraint.clone())))
            .collect::<Map<_, _>>();
        out.insert(section.to_string(), Value::Object(deps));
    }
    Value::Object(out)
}
