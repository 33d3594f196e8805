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

pub mod require;
pub mod resolve;
pub mod search;

pub use require::*;
pub use resolve::*;
pub use search::*;

use std::path::PathBuf;

use anyhow::Context;
use pkgutil::{cli::UniversalFlags, stability::Stability};

#[derive(Debug, clap::Parser)]
#[clap(
    name = "pkginit",
    about = "Find the version constraints to require packages with."
)]
pub struct PkgInitCli {
    #[clap(subcommand)]
    pub subcommand: PkgInitSubcommands,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum PkgInitSubcommands {
    /// Interactively collect the requirements of a new package
    Require(RequireSubcommand),
    /// Determine the constraint to require packages with
    Resolve(ResolveSubcommand),
    /// Search the configured repositories
    Search(SearchSubcommand),
}

/// Options shared by every command that looks up packages. Each one
/// overrides the matching `pkginit.json` setting.
#[derive(Debug, clap::Parser, Clone, Default)]
pub struct ResolutionFlags {
    /// Minimum stability of required packages; a comma separated list
    /// selects the loosest level given
    #[clap(long, value_parser = parse_stability_list)]
    pub minimum_stability: Option<Stability>,

    /// Prefer stable versions even when the minimum stability allows others
    #[clap(long)]
    pub prefer_stable: bool,

    /// Ignore all platform requirements (php, ext-*, lib-*)
    #[clap(long)]
    pub ignore_platform_reqs: bool,

    /// Ignore one platform requirement; `*` matches any characters, e.g. `ext-*`
    #[clap(long = "ignore-platform-req", value_name = "NAME", conflicts_with = "ignore_platform_reqs")]
    pub ignore_platform_req: Vec<String>,

    /// Require the exact versions found instead of caret constraints
    #[clap(long)]
    pub fixed: bool,

    /// Add a repository index, highest priority first
    #[clap(long = "repository", value_name = "NAME=PATH", value_parser = parse_key_value::<PathBuf>)]
    pub repositories: Vec<(String, PathBuf)>,

    /// Minimum stability for a single package
    #[clap(long = "stability-flag", value_name = "PACKAGE=LEVEL", value_parser = parse_key_value::<Stability>)]
    pub stability_flags: Vec<(String, Stability)>,

    /// Installed platform package version, e.g. `php=8.3.4`
    #[clap(long = "platform", value_name = "NAME=VERSION", value_parser = parse_key_value::<String>)]
    pub platform: Vec<(String, String)>,

    /// Vendor whose packages share the constraint chosen for the first of them
    #[clap(long = "adopt-vendor", value_name = "VENDOR")]
    pub adopt_vendors: Vec<String>,

    /// Configuration file to use instead of `pkginit.json`
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_stability_list(s: &str) -> anyhow::Result<Stability> {
    let levels = Stability::normalize_list(&s.replace(char::is_whitespace, ""))?;
    Stability::loosest(levels).context("no stability given")
}

fn parse_key_value<T>(s: &str) -> anyhow::Result<(String, T)>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("expected `KEY=VALUE`, found `{s}`"))?;
    if key.trim().is_empty() {
        anyhow::bail!("missing key in `{s}`");
    }
    let value = value
        .trim()
        .parse()
        .with_context(|| format!("invalid value in `{s}`"))?;
    Ok((key.trim().to_string(), value))
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use expect_test::expect;

    use super::*;

    #[test]
    fn test_parse_resolution_flags() {
        let cli = PkgInitCli::try_parse_from([
            "pkginit",
            "resolve",
            "acme/http",
            "--minimum-stability",
            "beta, rc",
            "--repository",
            "private=/srv/private.index",
            "--stability-flag",
            "acme/http=dev",
            "--platform",
            "php=8.3.4",
            "--ignore-platform-req",
            "ext-*",
            "-v",
        ])
        .unwrap();
        assert!(cli.flags.verbose);
        let PkgInitSubcommands::Resolve(cmd) = cli.subcommand else {
            panic!("expected resolve");
        };
        expect![[r#"
            ResolutionFlags {
                minimum_stability: Some(
                    Beta,
                ),
                prefer_stable: false,
                ignore_platform_reqs: false,
                ignore_platform_req: [
                    "ext-*",
                ],
                fixed: false,
                repositories: [
                    (
                        "private",
                        "/srv/private.index",
                    ),
                ],
                stability_flags: [
                    (
                        "acme/http",
                        Dev,
                    ),
                ],
                platform: [
                    (
                        "php",
                        "8.3.4",
                    ),
                ],
                adopt_vendors: [],
                config: None,
            }
        "#]]
        .assert_debug_eq(&cmd.resolution);
    }

    #[test]
    fn test_reject_invalid_flags() {
        let err = parse_stability_list("stable,nightly").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid stability `nightly`, must be one of: dev, alpha, beta, rc, stable"
        );
        assert!(parse_key_value::<Stability>("acme/http").is_err());
        assert!(parse_key_value::<Stability>("=dev").is_err());
        assert!(
            PkgInitCli::try_parse_from([
                "pkginit",
                "search",
                "http",
                "--ignore-platform-reqs",
                "--ignore-platform-req",
                "php",
            ])
            .is_err()
        );
    }
}
