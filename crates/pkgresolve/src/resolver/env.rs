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

use std::collections::HashMap;

use pkgutil::{platform::PlatformFilter, stability::Stability};

use crate::registry::{Allowance, Candidate, CandidatePool, CandidateQuery};

/// Which platform filter a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformMode {
    /// The filter the resolution was started with.
    AsGiven,
    IgnoreAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    name: String,
    allowance: Allowance,
    platform: PlatformMode,
}

/// The lookup state of one resolution, including its typo fallback.
pub struct ResolverEnv<'a, P: CandidatePool + ?Sized> {
    pool: &'a P,
    preferred_stability: Stability,
    platform_filter: &'a PlatformFilter,
    ignore_all: PlatformFilter,
    cache: HashMap<LookupKey, Option<Candidate>>,
}

impl<'a, P: CandidatePool + ?Sized> ResolverEnv<'a, P> {
    pub fn new(pool: &'a P, preferred_stability: Stability, platform_filter: &'a PlatformFilter) -> Self {
        ResolverEnv {
            pool,
            preferred_stability,
            platform_filter,
            ignore_all: PlatformFilter::IgnoreAll,
            cache: HashMap::new(),
        }
    }

    pub fn platform_filter(&self) -> &'a PlatformFilter {
        self.platform_filter
    }

    /// The best candidate for `name` under the given modes, looked up at most
    /// once per resolution.
    pub fn best_candidate(
        &mut self,
        name: &str,
        platform: PlatformMode,
        allowance: Allowance,
    ) -> Option<Candidate> {
        let key = LookupKey {
            name: name.to_lowercase(),
            allowance,
            platform,
        };
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Reusing lookup of {} ({:?}, {:?})", name, platform, allowance);
            return cached.clone();
        }

        let filter = match platform {
            PlatformMode::AsGiven => self.platform_filter,
            PlatformMode::IgnoreAll => &self.ignore_all,
        };
        let found = self.pool.find_best_candidate(&CandidateQuery {
            name,
            constraint: None,
            preferred_stability: self.preferred_stability,
            platform_filter: filter,
            allowance,
        });
        log::debug!(
            "Lookup of {} ({:?}, {:?}): {}",
            name,
            platform,
            allowance,
            found
                .as_ref()
                .map_or("nothing".to_string(), |c| format!("{} {}", c.pretty_name, c.pretty_version))
        );
        self.cache.insert(key, found.clone());
        found
    }
}
