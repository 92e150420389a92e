use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vaultscan",
    version,
    about = "Inventory certificates and raw storage across Vault namespace trees"
)]
pub struct Cli {
    #[arg(long, global = true, env = "VAULT_ADDR", help = "Vault address, e.g. https://vault:8200")]
    pub addr: Option<String>,
    #[arg(long, global = true, env = "VAULT_TOKEN", hide_env_values = true, help = "Vault token")]
    pub token: Option<String>,
    #[arg(long, global = true, help = "Skip TLS certificate verification")]
    pub insecure: bool,
    #[arg(long, global = true, help = "Connection setup timeout in seconds")]
    pub connect_timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Total per-request timeout in seconds")]
    pub timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Stop descending below this many levels")]
    pub max_depth: Option<usize>,
    #[arg(long, global = true, help = "Config file (default ~/.config/vaultscan/config.toml)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, global = true, help = "Debug diagnostics")]
    pub verbose: bool,
    #[arg(short, long, global = true, conflicts_with = "verbose", help = "No diagnostics")]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inventory every certificate issued by every pki mount in the tree.
    Certs {
        #[arg(long, help = "Flag certificates expiring within this duration (e.g. 14d, 36h)")]
        threshold: Option<String>,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Dump raw storage values, pruning subtrees that hold the sentinel key.
    Raw {
        #[arg(long, help = "Raw storage API root (default sys/raw)")]
        base_path: Option<String>,
        #[arg(long, default_value = "", help = "Start below this raw storage path")]
        prefix: String,
        #[arg(long, help = "Child key that prunes its parent's subtree")]
        sentinel: Option<String>,
        #[arg(long, help = "Report file (default raw_inventory_<timestamp>.csv)")]
        output: Option<PathBuf>,
    },
    /// Inventory every mount in every namespace.
    Mounts {
        #[arg(long, help = "Only report mounts of this engine type (e.g. pki, kv)")]
        engine: Option<String>,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Print the namespace tree.
    Namespaces {
        #[arg(long, default_value = "", help = "Namespace to start from (default root)")]
        namespace: String,
    },
}

#[derive(Args, Debug)]
pub struct ScopeArgs {
    #[arg(long, default_value = "", help = "Namespace to start from (default root)")]
    pub namespace: String,
    #[arg(long, help = "Report file (default <kind>_inventory_<timestamp>.csv)")]
    pub output: Option<PathBuf>,
}
