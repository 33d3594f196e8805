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

//! Terminal prompts, all written to stderr so stdout only carries results.

use colored::Colorize;
use dialoguer::{Confirm, Input, Select, console::Term};
use pkgresolve::{
    prompt::{PackageChoice, Prompter, ProvidedConstraintPrompt},
    registry::PackageDescriptor,
    resolver::ResolverError,
};
use pkgutil::{stability::Stability, version::ConstraintError};

use crate::render;

pub struct DialoguerPrompter {
    term: Term,
    quiet: bool,
}

impl DialoguerPrompter {
    pub fn new(quiet: bool) -> Self {
        DialoguerPrompter {
            term: Term::stderr(),
            quiet,
        }
    }

    fn line(&self, message: impl std::fmt::Display) {
        if let Err(e) = self.term.write_line(&message.to_string()) {
            log::warn!("failed to write to the terminal: {}", e);
        }
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact_on(&self.term)?)
    }

    /// Asks for a comma separated list of stability levels until every
    /// token is valid. An empty answer keeps the default.
    pub fn minimum_stability(&self) -> anyhow::Result<Option<Stability>> {
        let mut error = None;
        loop {
            if let Some(e) = error.take() {
                self.line(format!("{}: {}", "error".red().bold(), e));
            }
            let answer: String = Input::new()
                .with_prompt("Minimum stability (dev, alpha, beta, rc, stable; comma separated)")
                .allow_empty(true)
                .interact_text_on(&self.term)?;
            let answer = answer.replace(char::is_whitespace, "");
            if answer.is_empty() {
                return Ok(None);
            }
            match Stability::normalize_list(&answer) {
                Ok(levels) => return Ok(Stability::loosest(levels)),
                Err(e) => error = Some(e),
            }
        }
    }

    fn ask(&self, prompt: &str, error: Option<&ConstraintError>) -> anyhow::Result<String> {
        if let Some(e) = error {
            self.line(format!("{}: {}", "error".red().bold(), e));
        }
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)?)
    }
}

impl ProvidedConstraintPrompt for DialoguerPrompter {
    fn provided_constraint(
        &mut self,
        name: &str,
        providers: &[PackageDescriptor],
        error: Option<&ConstraintError>,
    ) -> Option<String> {
        if error.is_none() {
            self.line(render::providers(name, providers));
        }
        match self.ask(
            "Which version constraint would you like to use? (leave empty for *)",
            error,
        ) {
            Ok(answer) => Some(answer),
            Err(e) => {
                log::warn!("failed to read a constraint for {}: {}", name, e);
                None
            }
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn search_term(&mut self) -> anyhow::Result<Option<String>> {
        let term: String = Input::new()
            .with_prompt("Search for a package")
            .allow_empty(true)
            .interact_text_on(&self.term)?;
        Ok(Some(term.trim().to_string()).filter(|t| !t.is_empty()))
    }

    fn choose_package(&mut self, term: &str, choices: &[PackageChoice]) -> anyhow::Result<Option<usize>> {
        let prompt = format!(
            "Found {} packages matching {}",
            choices.len().to_string().green(),
            term.green()
        );
        let items = choices.iter().map(render::choice).collect::<Vec<_>>();
        Ok(Select::new()
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .max_length(10)
            .interact_on_opt(&self.term)?)
    }

    fn version_constraint(
        &mut self,
        _package: &str,
        error: Option<&ConstraintError>,
    ) -> anyhow::Result<Option<String>> {
        let answer = self.ask(
            "Enter the version constraint to require (or leave empty to determine a version automatically)",
            error,
        )?;
        Ok(Some(answer))
    }

    fn framework_constraint(&mut self, package: &str, choices: &[String]) -> anyhow::Result<Option<usize>> {
        Ok(Select::new()
            .with_prompt(format!("Which versions of {} would you like to require?", package.green()))
            .items(choices)
            .default(0)
            .interact_on_opt(&self.term)?)
    }

    fn using_version(&mut self, package: &str, constraint: &str) {
        if !self.quiet {
            self.line(format!("Using version {} for {}", constraint.green(), package.green()));
        }
    }

    fn resolution_failed(&mut self, package: &str, error: &ResolverError) {
        self.line(render::failure(package, error));
    }
}
