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

#![warn(clippy::clone_on_ref_ptr)]

use std::{any::Any, io::IsTerminal};

use clap::Parser;
use cli::PkgInitSubcommands;

mod cli;
mod prompt;
mod render;
mod settings;

use colored::*;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging and tracing-related functionality.
///
/// - `RUST_LOG` filters regular log output, printed to stderr. Without it the
///   default level is `WARN`, or `DEBUG` with `--verbose`.
/// - `PKGINIT_TRACE` enables Chrome tracing output with its value as filter.
/// - `--trace` does the same as `PKGINIT_TRACE=trace`, but writes to
///   `trace.json`. `PKGINIT_TRACE` takes precedence when both are given.
///
/// Records emitted through `log` by the library crates are forwarded to the
/// same subscriber. Returns a boxed guard that keeps the tracing system alive.
fn init_tracing(trace_flag: bool, verbose: bool) -> Box<dyn Any> {
    // usage example: only show debug logs for the resolver
    // env RUST_LOG=pkgresolve::resolver=debug cargo run -- resolve acme/http

    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let pkginit_tracing_env = std::env::var("PKGINIT_TRACE").ok();
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    let fmt = if !log_env_set {
        fmt.with_target(false).without_time().boxed()
    } else {
        fmt.compact().boxed()
    };

    // Trace spans in Chrome format
    let chrome_trace = if let Some(env) = pkginit_tracing_env.as_deref() {
        let chrome_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy(env);
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .include_args(true)
            .build();

        Some((chrome_filter.and_then(layer), guard))
    } else if trace_flag {
        let chrome_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy("");
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .include_args(true)
            .file("trace.json")
            .build();

        Some((chrome_filter.and_then(layer), guard))
    } else {
        None
    };

    let (chrome_layer, chrome_guard) = chrome_trace.unzip();

    let fmt_layer = fmt.with_filter(filter);
    // `try_init` also installs the `log` bridge
    if let Err(e) = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(chrome_layer)
        .try_init()
    {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }

    Box::new(chrome_guard)
}

pub fn main() {
    let cli = cli::PkgInitCli::parse();
    let flags = cli.flags;

    let _trace_guard = init_tracing(flags.trace, flags.verbose);

    use PkgInitSubcommands::*;
    let res = match cli.subcommand {
        Require(r) => cli::require_cli(flags, r),
        Resolve(r) => cli::resolve_cli(flags, r),
        Search(s) => cli::search_cli(flags, s),
    };

    drop(_trace_guard);

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            std::process::exit(-1);
        }
    }
}
