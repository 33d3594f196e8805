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

use std::path::PathBuf;

use anyhow::Context;

pub const PKGINIT_HOME_ENV: &str = "PKGINIT_HOME";

/// `$PKGINIT_HOME`, or `~/.pkginit` when it is not set.
pub fn home() -> anyhow::Result<PathBuf> {
    if let Ok(pkginit_home) = std::env::var(PKGINIT_HOME_ENV) {
        return Ok(PathBuf::from(pkginit_home));
    }

    let h = home::home_dir().context("failed to get home directory")?;
    Ok(h.join(".pkginit"))
}

pub fn index() -> anyhow::Result<PathBuf> {
    Ok(home()?.join("index"))
}

/// The repository index used when no repository is configured.
pub fn default_index_file() -> anyhow::Result<PathBuf> {
    Ok(index()?.join("packages.index"))
}

pub fn config_json() -> anyhow::Result<PathBuf> {
    Ok(home()?.join("config.json"))
}

#[test]
fn test_pkginit_dir() {
    use expect_test::expect;

    let home = home().unwrap();
    let dirs = [
        home.clone(),
        index().unwrap(),
        default_index_file().unwrap(),
        config_json().unwrap(),
    ];
    let dirs = dirs
        .iter()
        .map(|p| {
            p.strip_prefix(&home)
                .unwrap()
                .to_str()
                .unwrap()
                .replace(['\\', '/'], "|")
        })
        .collect::<Vec<_>>();
    expect![[r#"
        [
            "",
            "index",
            "index|packages.index",
            "config.json",
        ]
    "#]]
    .assert_debug_eq(&dirs);
}
