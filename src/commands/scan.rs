use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::domain::models::{NamespacePath, NamespaceRecord, ScanSummary};
use crate::services::certs::CertificateVisitor;
use crate::services::mounts::MountVisitor;
use crate::services::output::{print_out, print_summary};
use crate::services::raw::RawStorageVisitor;
use crate::services::walker::{walk, walk_namespaces, WalkLimits};
use crate::vault::VaultApi;
use chrono::Utc;
use std::path::{Path, PathBuf};

fn default_output(kind: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}_inventory_{}.csv",
        kind,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn report_path(explicit: &Option<PathBuf>, kind: &str) -> PathBuf {
    explicit.clone().unwrap_or_else(|| default_output(kind))
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

pub fn handle_scan_commands(
    cli: &Cli,
    settings: &Settings,
    api: &dyn VaultApi,
) -> anyhow::Result<ScanSummary> {
    let limits = WalkLimits {
        max_depth: settings.max_depth,
    };

    match &cli.command {
        Commands::Certs { scope, .. } => {
            let output = report_path(&scope.output, "cert");
            let root = NamespacePath::parse(&scope.namespace);

            tracing::info!(
                addr = %settings.connection.addr,
                root = %root.label(),
                threshold = %settings.threshold_label,
                "starting certificate scan"
            );
            let mut visitor = CertificateVisitor::new(api, Utc::now(), settings.threshold);
            let stats = walk_namespaces(api, root, limits, |ns| visitor.visit(ns));
            visitor.report.write_to(&output)?;

            let counts = visitor.report.counts();
            let summary = ScanSummary {
                kind: "certs".to_string(),
                nodes_visited: stats.nodes,
                total: counts.total,
                matches: counts.matches,
                report: Some(display(&output)),
            };
            print_summary(cli.json, &summary, "certificates")?;
            Ok(summary)
        }
        Commands::Raw {
            base_path,
            prefix,
            sentinel,
            output,
        } => {
            let base = base_path.as_deref().unwrap_or(&settings.raw_base_path);
            let sentinel = sentinel.as_deref().unwrap_or(&settings.sentinel);
            let output = report_path(output, "raw");

            tracing::info!(base, prefix = %prefix, sentinel, "starting raw storage scan");
            let mut visitor = RawStorageVisitor::new(api, base, sentinel);
            let stats = walk(&mut visitor, prefix.trim_matches('/').to_string(), limits);
            visitor.report.write_to(&output)?;
            if !visitor.pruned.is_empty() {
                tracing::info!(count = stats.pruned, "subtrees skipped for sentinel");
            }

            let counts = visitor.report.counts();
            let summary = ScanSummary {
                kind: "raw".to_string(),
                nodes_visited: stats.nodes,
                total: counts.total,
                matches: counts.matches,
                report: Some(display(&output)),
            };
            print_summary(cli.json, &summary, "raw entries")?;
            Ok(summary)
        }
        Commands::Mounts { engine, scope } => {
            let output = report_path(&scope.output, "mount");
            let root = NamespacePath::parse(&scope.namespace);

            let mut visitor = MountVisitor::new(api, engine.clone());
            let stats = walk_namespaces(api, root, limits, |ns| visitor.visit(ns));
            visitor.report.write_to(&output)?;

            let counts = visitor.report.counts();
            let summary = ScanSummary {
                kind: "mounts".to_string(),
                nodes_visited: stats.nodes,
                total: counts.total,
                matches: counts.matches,
                report: Some(display(&output)),
            };
            print_summary(cli.json, &summary, "mounts")?;
            Ok(summary)
        }
        Commands::Namespaces { namespace } => {
            let root = NamespacePath::parse(namespace);
            let base_depth = root.depth();
            let mut found = Vec::new();
            walk_namespaces(api, root, limits, |ns| {
                found.push(NamespaceRecord {
                    namespace: ns.clone(),
                    depth: ns.depth() - base_depth,
                })
            });
            print_out(cli.json, &found, |r| {
                format!("{}{}", "  ".repeat(r.depth), r.namespace.label())
            })?;
            Ok(ScanSummary {
                kind: "namespaces".to_string(),
                nodes_visited: found.len(),
                total: found.len(),
                matches: 0,
                report: None,
            })
        }
    }
}
