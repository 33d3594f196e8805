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

//! Package stability levels.

use std::str::FromStr;

use semver::Prerelease;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stability of a published version.
///
/// Levels are ordered from the most permissive (`dev`) to the most
/// restrictive (`stable`), so `a >= b` reads as "`a` is at least as stable
/// as `b`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    Rc,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stability `{token}`, must be one of: dev, alpha, beta, rc, stable")]
pub struct InvalidStability {
    pub token: String,
}

impl Stability {
    pub const ALL: [Stability; 5] = [
        Stability::Dev,
        Stability::Alpha,
        Stability::Beta,
        Stability::Rc,
        Stability::Stable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::Rc => "rc",
            Stability::Stable => "stable",
        }
    }

    /// Maps free-text input to a stability level. Surrounding whitespace and
    /// case are ignored; anything else must be one of the five levels.
    pub fn normalize(input: &str) -> Result<Self, InvalidStability> {
        let token = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == token)
            .ok_or(InvalidStability {
                token: input.trim().to_string(),
            })
    }

    /// Validates a comma-separated list of levels. The first invalid token
    /// rejects the whole input.
    pub fn normalize_list(input: &str) -> Result<Vec<Self>, InvalidStability> {
        input.split(',').map(Self::normalize).collect()
    }

    /// The most permissive level among `levels`.
    pub fn loosest(levels: impl IntoIterator<Item = Stability>) -> Option<Stability> {
        levels.into_iter().min()
    }

    /// Derives the stability of a version from its pre-release part.
    ///
    /// `1.0.0` is stable, `1.0.0-RC1` is rc, `2.0.0-beta.2` and `2.0.0-b2`
    /// are beta, `0.1.0-alpha` and `0.1.0-a1` are alpha. Anything ending in
    /// `dev` or using an unknown modifier is dev. `patch`, `pl` and `p`
    /// modifiers are stable.
    pub fn of_pre_release(pre: &Prerelease) -> Self {
        if pre.is_empty() {
            return Stability::Stable;
        }
        let pre = pre.as_str().to_ascii_lowercase();
        if pre.ends_with("dev") {
            return Stability::Dev;
        }
        let modifier: String = pre.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        match modifier.as_str() {
            "stable" | "patch" | "pl" | "p" => Stability::Stable,
            "rc" => Stability::Rc,
            "beta" | "b" => Stability::Beta,
            "alpha" | "a" => Stability::Alpha,
            _ => Stability::Dev,
        }
    }
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stability {
    type Err = InvalidStability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for Stability {
    type Error = InvalidStability;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<Stability> for String {
    fn from(value: Stability) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_accepts_any_case_and_whitespace() {
        for (input, expected) in [
            ("dev", Stability::Dev),
            ("  Alpha", Stability::Alpha),
            ("BETA  ", Stability::Beta),
            ("\tRC\n", Stability::Rc),
            ("rc", Stability::Rc),
            (" Stable ", Stability::Stable),
        ] {
            assert_eq!(Stability::normalize(input), Ok(expected), "input {input:?}");
        }
    }

    #[test]
    fn normalize_rejects_unknown_tokens() {
        for input in ["", "   ", "nightly", "release", "st able", "dev,beta"] {
            let err = Stability::normalize(input).unwrap_err();
            assert_eq!(err.token, input.trim());
        }
    }

    #[test]
    fn normalize_list_stops_at_first_invalid_token() {
        assert_eq!(
            Stability::normalize_list("dev, Beta ,rc"),
            Ok(vec![Stability::Dev, Stability::Beta, Stability::Rc])
        );
        let err = Stability::normalize_list("beta, nightly, bogus").unwrap_err();
        assert_eq!(err.token, "nightly");
        assert!(Stability::normalize_list("beta,,rc").is_err());
    }

    #[test]
    fn ordering_goes_from_dev_to_stable() {
        assert!(Stability::Dev < Stability::Alpha);
        assert!(Stability::Alpha < Stability::Beta);
        assert!(Stability::Beta < Stability::Rc);
        assert!(Stability::Rc < Stability::Stable);
        assert_eq!(
            Stability::loosest([Stability::Rc, Stability::Beta, Stability::Stable]),
            Some(Stability::Beta)
        );
        assert_eq!(Stability::loosest([]), None);
    }

    #[test]
    fn stability_of_pre_release() {
        let of = |v: &str| Stability::of_pre_release(&semver::Version::parse(v).unwrap().pre);
        assert_eq!(of("1.0.0"), Stability::Stable);
        assert_eq!(of("1.0.0-RC1"), Stability::Rc);
        assert_eq!(of("2.0.0-beta.2"), Stability::Beta);
        assert_eq!(of("2.0.0-b2"), Stability::Beta);
        assert_eq!(of("0.1.0-alpha"), Stability::Alpha);
        assert_eq!(of("0.1.0-a1"), Stability::Alpha);
        assert_eq!(of("1.0.0-dev"), Stability::Dev);
        assert_eq!(of("1.0.0-beta1-dev"), Stability::Dev);
        assert_eq!(of("1.0.0-patch1"), Stability::Stable);
        assert_eq!(of("1.0.0-snapshot"), Stability::Dev);
    }

    #[test]
    fn serde_uses_normalized_names() {
        let s: Stability = serde_json_lenient::from_str("\"RC\"").unwrap();
        assert_eq!(s, Stability::Rc);
        assert!(serde_json_lenient::from_str::<Stability>("\"gamma\"").is_err());
        assert_eq!(String::from(Stability::Beta), "beta");
    }
}
