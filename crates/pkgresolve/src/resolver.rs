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

//! Finds the constraint to require a single package with.

use pkgutil::{
    platform::PlatformFilter,
    stability::Stability,
    version::{VersionConstraint, recommended_constraint},
};
use thiserror::Error;

use crate::{
    prompt::ProvidedConstraintPrompt,
    registry::{Allowance, Candidate, CandidatePool, PlatformMismatch},
};

pub mod env;

use self::env::{PlatformMode, ResolverEnv};

/// The version a failed lookup did find, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSummary {
    pub name: String,
    pub pretty_version: String,
    pub stability: Stability,
    pub repository: String,
}

impl From<&Candidate> for CandidateSummary {
    fn from(c: &Candidate) -> Self {
        CandidateSummary {
            name: c.pretty_name.clone(),
            pretty_version: c.pretty_version.clone(),
            stability: c.stability,
            repository: c.repository.clone(),
        }
    }
}

impl std::fmt::Display for CandidateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} from {}", self.name, self.pretty_version, self.repository)
    }
}

fn list_mismatches(details: &[PlatformMismatch]) -> String {
    details.iter().map(|d| format!("\n  - {d}")).collect()
}

fn stability_note(also: &bool, candidate: &CandidateSummary, minimum: &Stability) -> String {
    if *also {
        format!(
            "\nadditionally, it was only found with a stability of {} while your minimum stability is {}",
            candidate.stability, minimum
        )
    } else {
        String::new()
    }
}

/// Why a package could not be resolved. Every cause is distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error(
        "package {name} has requirements incompatible with your platform: found {candidate}{}",
        list_mismatches(.details)
    )]
    PlatformIncompatible {
        name: String,
        candidate: CandidateSummary,
        details: Vec<PlatformMismatch>,
    },
    #[error(
        "package {name} exists in {canonical_repository} and {shadowed_repository}; \
         {canonical_repository} has the higher priority and is canonical for it, \
         but its versions do not match your minimum stability"
    )]
    ShadowedByHigherPriorityRepo {
        name: String,
        canonical_repository: String,
        shadowed_repository: String,
    },
    #[error("could not find a version of package {name} matching your minimum stability ({minimum_stability})")]
    StabilityTooStrict {
        name: String,
        minimum_stability: Stability,
    },
    #[error(
        "could not find package {name} in any version matching your platform: found {candidate}{}{}",
        list_mismatches(.details),
        stability_note(.also_stability_mismatch, .candidate, .minimum_stability)
    )]
    PlatformIncompatibleAnyStability {
        name: String,
        candidate: CandidateSummary,
        details: Vec<PlatformMismatch>,
        also_stability_mismatch: bool,
        minimum_stability: Stability,
    },
    #[error(
        "could not find package {name}, although the repository search lists it; the repository index is inconsistent"
    )]
    InconsistentIndex { name: String },
    #[error("could not find a matching version of package {name} with minimum stability {minimum_stability}")]
    NotFound {
        name: String,
        minimum_stability: Stability,
    },
}

/// The result of resolving one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A concrete version was found; `name` is its published spelling.
    Resolved { name: String, constraint: String },
    /// No installable version, but the package is ignored on the platform or
    /// provided by other packages.
    ProvidedOnly { name: String, constraint: String },
    Failed(ResolverError),
}

impl ResolutionOutcome {
    /// The `(name, constraint)` to require, unless resolution failed.
    pub fn requirement(&self) -> Option<(&str, &str)> {
        match self {
            ResolutionOutcome::Resolved { name, constraint }
            | ResolutionOutcome::ProvidedOnly { name, constraint } => Some((name, constraint)),
            ResolutionOutcome::Failed(_) => None,
        }
    }
}

pub struct VersionResolver<'a, P: CandidatePool + ?Sized> {
    pool: &'a P,
    fixed: bool,
}

impl<'a, P: CandidatePool + ?Sized> VersionResolver<'a, P> {
    pub fn new(pool: &'a P) -> Self {
        VersionResolver { pool, fixed: false }
    }

    /// Require exact pretty versions instead of caret constraints.
    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Resolves `name`, keeping `explicit` as the constraint if a version is
    /// found. Never prints; the same inputs give the same outcome.
    pub fn resolve(
        &self,
        name: &str,
        explicit: Option<&str>,
        preferred_stability: Stability,
        platform_filter: &PlatformFilter,
        prompt: &mut dyn ProvidedConstraintPrompt,
    ) -> ResolutionOutcome {
        let mut env = ResolverEnv::new(self.pool, preferred_stability, platform_filter);
        match self.resolve_in(&mut env, name, explicit, prompt, true) {
            ResolutionOutcome::Failed(ResolverError::NotFound {
                minimum_stability, ..
            }) => ResolutionOutcome::Failed(ResolverError::NotFound {
                name: name.to_string(),
                minimum_stability,
            }),
            outcome => outcome,
        }
    }

    fn resolve_in(
        &self,
        env: &mut ResolverEnv<'_, P>,
        name: &str,
        explicit: Option<&str>,
        prompt: &mut dyn ProvidedConstraintPrompt,
        may_substitute: bool,
    ) -> ResolutionOutcome {
        if let Some(candidate) = env.best_candidate(name, PlatformMode::AsGiven, Allowance::NORMAL) {
            let constraint = match explicit {
                Some(explicit) => explicit.to_string(),
                None => self.recommended_constraint_for(&candidate),
            };
            return ResolutionOutcome::Resolved {
                name: candidate.pretty_name,
                constraint,
            };
        }
        match self.diagnose(env, name, prompt) {
            Diagnosis::Outcome(outcome) => outcome,
            Diagnosis::Similar(similar) if may_substitute => {
                log::info!("Package {} not found, trying {} instead", name, similar);
                self.resolve_in(env, &similar, explicit, prompt, false)
            }
            Diagnosis::Similar(_) => self.not_found(name),
        }
    }

    /// Works out why `name` has no installable version, in a fixed order of
    /// precedence.
    fn diagnose(
        &self,
        env: &mut ResolverEnv<'_, P>,
        name: &str,
        prompt: &mut dyn ProvidedConstraintPrompt,
    ) -> Diagnosis {
        let filter = env.platform_filter();
        let minimum_stability = self.pool.minimum_stability();

        // platform packages only exist in the installed version, so an
        // ignored one is taken at its word
        if filter.is_ignored(name) {
            return Diagnosis::Outcome(ResolutionOutcome::ProvidedOnly {
                name: name.to_string(),
                constraint: "*".to_string(),
            });
        }

        let providers = self.pool.providers_of(name);
        if !providers.is_empty() {
            let constraint = ask_provided_constraint(prompt, name, &providers);
            return Diagnosis::Outcome(ResolutionOutcome::ProvidedOnly {
                name: name.to_string(),
                constraint,
            });
        }

        if !filter.is_ignore_all()
            && let Some(candidate) = env.best_candidate(name, PlatformMode::IgnoreAll, Allowance::NORMAL)
        {
            return Diagnosis::Outcome(ResolutionOutcome::Failed(
                ResolverError::PlatformIncompatible {
                    name: name.to_string(),
                    details: self.pool.platform_mismatches(&candidate, filter),
                    candidate: (&candidate).into(),
                },
            ));
        }

        if let Some(candidate) = env.best_candidate(
            name,
            PlatformMode::AsGiven,
            Allowance::UNACCEPTABLE_STABILITIES,
        ) {
            let error = match env.best_candidate(
                name,
                PlatformMode::AsGiven,
                Allowance::SHADOWED_REPOSITORIES,
            ) {
                Some(shadowed) if shadowed.repository != candidate.repository => {
                    ResolverError::ShadowedByHigherPriorityRepo {
                        name: name.to_string(),
                        canonical_repository: candidate.repository,
                        shadowed_repository: shadowed.repository,
                    }
                }
                _ => ResolverError::StabilityTooStrict {
                    name: name.to_string(),
                    minimum_stability,
                },
            };
            return Diagnosis::Outcome(ResolutionOutcome::Failed(error));
        }

        if !filter.is_ignore_all()
            && let Some(candidate) = env.best_candidate(
                name,
                PlatformMode::IgnoreAll,
                Allowance::UNACCEPTABLE_STABILITIES,
            )
        {
            let also_stability_mismatch = env
                .best_candidate(name, PlatformMode::IgnoreAll, Allowance::NORMAL)
                .is_none();
            return Diagnosis::Outcome(ResolutionOutcome::Failed(
                ResolverError::PlatformIncompatibleAnyStability {
                    name: name.to_string(),
                    details: self.pool.platform_mismatches(&candidate, filter),
                    candidate: (&candidate).into(),
                    also_stability_mismatch,
                    minimum_stability,
                },
            ));
        }

        let similar = self.pool.similar_names(name);
        if similar.iter().any(|s| s == name) {
            return Diagnosis::Outcome(ResolutionOutcome::Failed(
                ResolverError::InconsistentIndex {
                    name: name.to_string(),
                },
            ));
        }
        match similar.into_iter().next() {
            Some(top) => Diagnosis::Similar(top),
            None => Diagnosis::Outcome(self.not_found(name)),
        }
    }

    fn not_found(&self, name: &str) -> ResolutionOutcome {
        ResolutionOutcome::Failed(ResolverError::NotFound {
            name: name.to_string(),
            minimum_stability: self.pool.minimum_stability(),
        })
    }

    fn recommended_constraint_for(&self, candidate: &Candidate) -> String {
        if self.fixed {
            return candidate.pretty_version.clone();
        }
        // bundled extensions share the interpreter's version
        if candidate.name.starts_with("ext-")
            && self.pool.platform_version("php").as_ref() == Some(&candidate.version)
        {
            return "*".to_string();
        }
        recommended_constraint(
            &candidate.version,
            &candidate.pretty_version,
            candidate.stability,
        )
    }
}

enum Diagnosis {
    Outcome(ResolutionOutcome),
    /// Nothing is wrong with the name except that it may be a typo of this one.
    Similar(String),
}

/// Asks until the answer is empty or a valid constraint.
fn ask_provided_constraint(
    prompt: &mut dyn ProvidedConstraintPrompt,
    name: &str,
    providers: &[crate::registry::PackageDescriptor],
) -> String {
    let mut error = None;
    loop {
        let answer = prompt.provided_constraint(name, providers, error.as_ref());
        let answer = answer.as_deref().map(str::trim).unwrap_or_default();
        if answer.is_empty() {
            return "*".to_string();
        }
        match VersionConstraint::parse(answer) {
            Ok(_) => return answer.to_string(),
            Err(e) => {
                log::debug!("Invalid constraint for {}: {}", name, e);
                error = Some(e);
            }
        }
    }
}
