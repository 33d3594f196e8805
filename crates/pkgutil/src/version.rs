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

//! Version utilities
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version, VersionReq};
use thiserror::Error;

use crate::stability::Stability;

/// Parses a published version string.
///
/// Accepts a leading `v`, one to three numeric components (missing ones are
/// zero), a fourth component only when it is zero, and an optional
/// `-pre` / `+build` suffix. Branch names such as `dev-main` are not
/// releases and yield `None`; see [`parse_branch_version`].
pub fn parse_version(pretty: &str) -> Option<Version> {
    let s = pretty.trim();
    let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
    let (core, build) = match s.split_once('+') {
        Some((core, build)) => (core, Some(build)),
        None => (s, None),
    };
    let (numbers, pre) = match core.split_once('-') {
        Some((numbers, pre)) => (numbers, Some(pre)),
        None => (core, None),
    };

    let parts: Vec<&str> = numbers.split('.').collect();
    if parts.len() > 4
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    if parts.len() == 4 && parts[3].parse::<u64>().ok()? != 0 {
        return None;
    }
    let component = |i: usize| -> Option<u64> { parts.get(i).map_or(Some(0), |p| p.parse().ok()) };

    let mut version = Version::new(component(0)?, component(1)?, component(2)?);
    if let Some(pre) = pre {
        if pre.is_empty() {
            return None;
        }
        version.pre = Prerelease::new(&pre.to_ascii_lowercase()).ok()?;
    }
    if let Some(build) = build {
        version.build = BuildMetadata::new(build).ok()?;
    }
    Some(version)
}

/// Stands in for the open components of a `1.x-dev` style branch.
const BRANCH_WILDCARD: u64 = 9999999;

/// Parses a development branch into the version it sorts as.
///
/// `1.x-dev` becomes `1.9999999.9999999-dev` and `2.1.x-dev` becomes
/// `2.1.9999999-dev`, so numbered branches sort above the releases they
/// lead to. Named branches such as `dev-main` become `0.0.0-dev-main` and
/// sort below every release.
pub fn parse_branch_version(pretty: &str) -> Option<Version> {
    let s = pretty.trim();
    if let Some(branch) = s.strip_prefix("dev-") {
        let ident: String = branch
            .chars()
            .map(|c| match c {
                'a'..='z' | '0'..='9' | '-' => c,
                'A'..='Z' => c.to_ascii_lowercase(),
                _ => '-',
            })
            .collect();
        if ident.trim_matches('-').is_empty() {
            return None;
        }
        let mut version = Version::new(0, 0, 0);
        version.pre = Prerelease::new(&format!("dev-{ident}")).ok()?;
        return Some(version);
    }

    let numbers = s
        .strip_suffix(".x-dev")
        .or_else(|| s.strip_suffix(".X-dev"))?;
    let numbers = numbers.strip_prefix(['v', 'V']).unwrap_or(numbers);
    let parts = numbers
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let mut version = match parts[..] {
        [major] => Version::new(major, BRANCH_WILDCARD, BRANCH_WILDCARD),
        [major, minor] => Version::new(major, minor, BRANCH_WILDCARD),
        _ => return None,
    };
    version.pre = Prerelease::new("dev").ok()?;
    Some(version)
}

/// Whether `version` is the sort key of a named branch like `dev-main`.
fn is_named_branch(version: &Version) -> bool {
    version.major == 0
        && version.minor == 0
        && version.patch == 0
        && version.pre.as_str().starts_with("dev-")
}

/// The constraint to suggest when requiring `version` without an explicit
/// constraint.
///
/// `2.1.1` becomes `^2.1`, which allows upgrading through minor versions.
/// Before `1.0.0` the patch level is kept (`0.3.1` becomes `^0.3.1`). A
/// pre-release gets its stability appended (`^1.0@beta`). Dev versions are
/// required verbatim.
pub fn recommended_constraint(version: &Version, pretty_version: &str, stability: Stability) -> String {
    if stability == Stability::Dev {
        return pretty_version.to_string();
    }
    let mut constraint = if version.major == 0 {
        format!("^0.{}.{}", version.minor, version.patch)
    } else {
        format!("^{}.{}", version.major, version.minor)
    };
    if stability != Stability::Stable {
        constraint.push('@');
        constraint.push_str(stability.as_str());
    }
    constraint
}

/// Caret constraints spanning up to three majors ending at `latest_major`,
/// widest first: `^9.0|^10.0|^11.0`, `^10.0|^11.0`, `^11.0`.
pub fn major_span_choices(latest_major: u64) -> Vec<String> {
    (0..=2u64)
        .rev()
        .filter(|span| *span <= latest_major)
        .map(|span| {
            ((latest_major - span)..=latest_major)
                .map(|major| format!("^{major}.0"))
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("the version constraint is empty")]
    Empty,
    #[error("could not parse version constraint `{constraint}`: {reason}")]
    Invalid { constraint: String, reason: String },
}

/// A version constraint as written in a manifest: alternatives separated by
/// `|` or `||`, each a list of comparators separated by commas or spaces,
/// optionally followed by an `@stability` flag.
///
/// An alternative may also be a hyphen range (`1.0 - 2.0`), a branch
/// (`dev-main`, `1.x-dev`), or carry `!=` exclusions (`>=1.0 !=1.5.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pretty: String,
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alternative {
    req: VersionReq,
    /// Versions ruled out with `!=`.
    excluded: Vec<Version>,
}

impl Alternative {
    fn any() -> Self {
        Alternative {
            req: VersionReq::STAR,
            excluded: vec![],
        }
    }

    fn matches(&self, version: &Version) -> bool {
        if self.excluded.iter().any(|e| same_release(e, version)) {
            return false;
        }
        if is_named_branch(version) {
            return self.req == VersionReq::STAR || self.req.matches(version);
        }
        if self.req.matches(version) {
            return true;
        }
        // compare pre-releases by their release triple too
        !version.pre.is_empty()
            && self
                .req
                .matches(&Version::new(version.major, version.minor, version.patch))
    }
}

fn same_release(a: &Version, b: &Version) -> bool {
    a.major == b.major && a.minor == b.minor && a.patch == b.patch && a.pre == b.pre
}

impl VersionConstraint {
    pub fn parse(input: &str) -> Result<Self, ConstraintError> {
        let pretty = input.trim();
        if pretty.is_empty() {
            return Err(ConstraintError::Empty);
        }
        let invalid = |reason: String| ConstraintError::Invalid {
            constraint: pretty.to_string(),
            reason,
        };

        let mut alternatives = vec![];
        for alternative in pretty.split("||").flat_map(|a| a.split('|')) {
            let mut alternative = alternative.trim();
            if let Some((rest, flag)) = alternative.rsplit_once('@') {
                Stability::normalize(flag).map_err(|e| invalid(e.to_string()))?;
                alternative = rest.trim();
                if alternative.is_empty() {
                    alternatives.push(Alternative::any());
                    continue;
                }
            }
            if alternative.is_empty() {
                return Err(invalid("empty alternative".into()));
            }
            alternatives.push(parse_alternative(alternative).map_err(invalid)?);
        }
        Ok(VersionConstraint {
            pretty: pretty.to_string(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative.
    ///
    /// Pre-releases are compared by their release triple as well, so `^2.0`
    /// accepts `2.0.0-beta1`. Whether a pre-release is acceptable at all is
    /// decided by stability, not by the constraint. Named branches only
    /// match themselves and `*`.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|a| a.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.pretty
    }
}

fn parse_alternative(alternative: &str) -> Result<Alternative, String> {
    if let Some(branch) = parse_branch_version(alternative) {
        return Ok(Alternative {
            req: exact(&branch).map_err(|e| e.to_string())?,
            excluded: vec![],
        });
    }
    if let Some((from, to)) = alternative.split_once(" - ") {
        return Ok(Alternative {
            req: hyphen_range(from.trim(), to.trim())?,
            excluded: vec![],
        });
    }

    let (comparators, excluded) = comparators_of(alternative);
    let excluded = excluded
        .iter()
        .map(|e| parse_version(e).ok_or_else(|| format!("`{e}` is not a version")))
        .collect::<Result<Vec<_>, _>>()?;
    let req = if comparators.is_empty() {
        VersionReq::STAR
    } else {
        VersionReq::parse(&comparators).map_err(|e| e.to_string())?
    };
    Ok(Alternative { req, excluded })
}

fn exact(version: &Version) -> Result<VersionReq, semver::Error> {
    VersionReq::parse(&format!("={version}"))
}

/// `1.0 - 2.0` includes every `2.0.x`; `1.0.0 - 2.1.0` stops at `2.1.0`.
fn hyphen_range(from: &str, to: &str) -> Result<VersionReq, String> {
    let lower = parse_version(from).ok_or_else(|| format!("`{from}` is not a version"))?;
    let upper = parse_version(to).ok_or_else(|| format!("`{to}` is not a version"))?;
    let given = to
        .trim_start_matches(['v', 'V'])
        .split(['-', '+'])
        .next()
        .map_or(0, |numbers| numbers.split('.').count());
    let upper = match given {
        1 => format!("<{}.0.0", upper.major + 1),
        2 => format!("<{}.{}.0", upper.major, upper.minor + 1),
        _ => format!("<={upper}"),
    };
    VersionReq::parse(&format!(">={lower}, {upper}")).map_err(|e| e.to_string())
}

/// Rewrites `>= 1.0 <2.0` or `>=v1.0,<2.0` into the comma separated form
/// semver understands. Versions excluded with `!=` are returned apart.
fn comparators_of(alternative: &str) -> (String, Vec<String>) {
    let mut comparators: Vec<String> = vec![];
    let mut excluded = vec![];
    let mut pending_op = String::new();
    for token in alternative
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| "<>=!^~".contains(c)) {
            pending_op.push_str(token);
            continue;
        }
        let op_len = token
            .find(|c: char| !"<>=!^~".contains(c))
            .unwrap_or(token.len());
        let (op, rest) = token.split_at(op_len);
        let op = format!("{}{op}", std::mem::take(&mut pending_op));
        if op == "!=" {
            excluded.push(rest.to_string());
            continue;
        }
        let rest = match rest.strip_prefix(['v', 'V']) {
            Some(stripped) if stripped.starts_with(|c: char| c.is_ascii_digit()) => stripped,
            _ => rest,
        };
        comparators.push(format!("{op}{rest}"));
    }
    (comparators.join(", "), excluded)
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pretty)
    }
}
