//! Run configuration: CLI/env values layered over an optional TOML file and
//! built-in defaults.

use crate::cli::{Cli, Commands};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_THRESHOLD: &str = "30d";
pub const DEFAULT_SENTINEL: &str = "oidc_tokens/";
pub const DEFAULT_RAW_BASE_PATH: &str = "sys/raw";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum PreconditionError {
    #[error("vault address is required (--addr or VAULT_ADDR)")]
    MissingAddress,
    #[error("vault token is required (--token or VAULT_TOKEN)")]
    MissingToken,
    #[error("invalid threshold '{0}': expected <n>d, <n>h, <n>m, <n>s or a number of days")]
    InvalidThreshold(String),
    #[error("cannot read config {path}: {reason}")]
    Config { path: String, reason: String },
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub threshold: Option<String>,
    pub sentinel: Option<String>,
    pub raw_base_path: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub insecure: bool,
}

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub addr: String,
    pub token: String,
    pub insecure: bool,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub max_depth: Option<usize>,
    pub threshold: Duration,
    /// Threshold as the operator wrote it, for log lines.
    pub threshold_label: String,
    pub sentinel: String,
    pub raw_base_path: String,
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/vaultscan/config.toml"))
}

/// Reads `explicit`, or the default location when it exists. A missing
/// default file is not an error; a missing explicit one is.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig, PreconditionError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(FileConfig::default()),
        },
    };
    let config_err = |reason: String| PreconditionError::Config {
        path: path.display().to_string(),
        reason,
    };
    let raw = std::fs::read_to_string(&path).map_err(|e| config_err(e.to_string()))?;
    toml::from_str(&raw).map_err(|e| config_err(e.to_string()))
}

pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Settings, PreconditionError> {
    let addr = cli
        .addr
        .clone()
        .filter(|a| !a.trim().is_empty())
        .ok_or(PreconditionError::MissingAddress)?;
    let token = cli
        .token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or(PreconditionError::MissingToken)?;

    let cli_threshold = match &cli.command {
        Commands::Certs { threshold, .. } => threshold.clone(),
        _ => None,
    };
    let threshold_label = cli_threshold
        .or(file.threshold)
        .unwrap_or_else(|| DEFAULT_THRESHOLD.to_string());
    let threshold = parse_threshold(&threshold_label)?;

    let connect_timeout = cli
        .connect_timeout_secs
        .or(file.connect_timeout_secs)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
    let timeout = cli
        .timeout_secs
        .or(file.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Settings {
        connection: ConnectionSettings {
            addr,
            token,
            insecure: cli.insecure || file.insecure,
            connect_timeout: Duration::from_secs(connect_timeout),
            timeout: Duration::from_secs(timeout),
        },
        max_depth: cli.max_depth.or(file.max_depth),
        threshold,
        threshold_label,
        sentinel: file
            .sentinel
            .unwrap_or_else(|| DEFAULT_SENTINEL.to_string()),
        raw_base_path: file
            .raw_base_path
            .unwrap_or_else(|| DEFAULT_RAW_BASE_PATH.to_string()),
    })
}

/// Parses `14d`, `36h`, `90m`, `3600s`, or a bare number of days.
pub fn parse_threshold(raw: &str) -> Result<Duration, PreconditionError> {
    let s = raw.trim();
    let invalid = || PreconditionError::InvalidThreshold(raw.to_string());
    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c.to_ascii_lowercase()),
        Some(_) => (s, 'd'),
        None => return Err(invalid()),
    };
    let n: u64 = digits.trim().parse().map_err(|_| invalid())?;
    let secs = match unit {
        'd' => n.checked_mul(86_400),
        'h' => n.checked_mul(3_600),
        'm' => n.checked_mul(60),
        's' => Some(n),
        _ => None,
    }
    .ok_or_else(invalid)?;
    Ok(Duration::from_secs(secs))
}
