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

pub const CONFIG_JSON: &str = "pkginit.json";

/// Vendors whose packages are usually released in lockstep.
pub const DEFAULT_ADOPT_VENDORS: &[&str] = &["illuminate", "symfony"];

/// The repository name reported for candidates taken from the platform.
pub const PLATFORM_REPOSITORY: &str = "platform";

pub fn dialoguer_ctrlc_handler() {
    // Fix cursor disappears after ctrc+c
    // https://github.com/console-rs/dialoguer/issues/77
    let term = dialoguer::console::Term::stderr();
    let _ = term.show_cursor();
    std::process::exit(1);
}
