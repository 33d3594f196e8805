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
use pkgresolve::registry::{SearchBackend, SearchMatch};
use pkgutil::{cli::UniversalFlags, stability::Stability};

use super::ResolutionFlags;
use crate::settings::Settings;

#[derive(Debug, clap::Parser)]
pub struct SearchSubcommand {
    /// Text to look for in package names and descriptions
    pub term: String,

    #[clap(flatten)]
    pub resolution: ResolutionFlags,
}

pub fn search_cli(cli: UniversalFlags, cmd: SearchSubcommand) -> anyhow::Result<i32> {
    let settings = Settings::load(&cmd.resolution)?;
    let set = settings.repository_set(settings.minimum_stability.unwrap_or(Stability::Stable))?;
    let matches = set.search(&cmd.term);
    if matches.is_empty() {
        if !cli.quiet {
            eprintln!("No packages found matching {}", cmd.term);
        }
        return Ok(1);
    }
    for m in &matches {
        println!("{}", format_match(m));
    }
    Ok(0)
}

fn format_match(m: &SearchMatch) -> String {
    let mut line = m.name.clone();
    if let Some(notice) = m.abandoned.notice() {
        line.push_str(&format!(" {}", notice.yellow().bold()));
    }
    if !m.description.is_empty() {
        line.push_str(&format!(" {}", m.description));
    }
    line
}
