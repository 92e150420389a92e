//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `scan.rs`: certs/raw/mounts/namespaces scans.
//!
//! ## Principles
//! - Resolve configuration and preconditions before any traversal.
//! - Delegate traversal and reporting to `services/*`.
//! - Map the scan outcome to the process exit status here.

pub mod scan;

pub use scan::handle_scan_commands;

use crate::cli::Cli;
use crate::config::{load_file_config, resolve};
use crate::domain::models::ScanSummary;
use crate::vault::{capabilities_self, HttpVault, VaultApi};
use std::process::ExitCode;

/// Exit status for a finished scan: 1 when anything matched the threshold.
pub fn exit_code(summary: &ScanSummary) -> ExitCode {
    if summary.matches > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Warns early when the token is denied on the listing endpoints. Never fatal.
fn preflight(api: &dyn VaultApi) {
    match capabilities_self(api, &["sys/namespaces", "sys/mounts"]) {
        Ok(caps) => {
            for (path, granted) in caps {
                if granted.iter().any(|c| c == "deny") {
                    tracing::warn!(path = %path, "token is denied here, scan will be partial");
                }
            }
        }
        Err(e) => tracing::debug!(error = %e, "capability preflight unavailable"),
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let file = load_file_config(cli.config.as_deref())?;
    let settings = resolve(cli, file)?;
    let vault = HttpVault::new(&settings.connection)?;
    preflight(&vault);
    let summary = handle_scan_commands(cli, &settings, &vault)?;
    Ok(exit_code(&summary))
}
