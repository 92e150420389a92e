//! vaultscan - inventory certificates and raw storage across a Vault
//! namespace tree.
//!
//! ```bash
//! export VAULT_ADDR=https://vault.example.com:8200 VAULT_TOKEN=...
//! vaultscan certs --threshold 14d --output certs.csv
//! vaultscan raw --prefix logical
//! vaultscan --json mounts --engine pki
//! ```
//!
//! Exit status: 0 when nothing is expiring within the threshold, 1 when at
//! least one certificate is, 2 when the scan could not start or its report
//! could not be written.

mod cli;
mod commands;
mod config;
mod domain;
mod services;
#[cfg(test)]
mod testing;
mod vault;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays clean for summaries and `--json`.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("vaultscan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match commands::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
