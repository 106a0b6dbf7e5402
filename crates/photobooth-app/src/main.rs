// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// photobooth-crop — trims the latest booth snapshot to a 95x140 portrait.
//
// Entry point. Initialises logging, parses arguments, runs a single crop, and
// turns any failure into a plain-language message and an exit code.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use photobooth_core::human_errors::humanize_error;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit with 1 so that 2-4 stay reserved for crop failures.
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match cli::run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "crop failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
