//! py-etch CLI - API reference generator for Python packages.
//!
//! This is the main entry point. It parses arguments, initializes logging,
//! runs a generation pass and maps its outcome to the exit status: zero when
//! every module was documented and the navigation (if enabled) was merged,
//! one otherwise.

mod cli;
mod logger;

use anyhow::Result;
use clap::Parser;
use py_etch::{EtchBuilder, EtchPrinter};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet);

    let mut config = args.load_config()?;
    if config.repo_url.is_none() {
        config.repo_url = cli::detect_repo_url(&config.source_root);
        match config.repo_url {
            Some(ref url) => tracing::debug!(url = %url, "detected repository"),
            None => tracing::debug!("no GitHub remote found, source links disabled"),
        }
    }

    let output = EtchBuilder::from_config(config).build()?;

    if !args.quiet {
        EtchPrinter::new(&output, true).print_to_stdout();
    }

    if output.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
