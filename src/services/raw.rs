use crate::domain::models::{NamespacePath, RawEntry};
use crate::services::report::{sanitize_field, Report};
use crate::services::walker::{Step, TreeVisitor};
use crate::vault::{list_keys, read_raw, VaultApi};

fn join(parent: &str, key: &str) -> String {
    let key = key.trim_end_matches('/');
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", parent, key)
    }
}

/// Walks raw storage below `base`. Nodes are storage paths relative to
/// `base`; a node without children is a leaf whose value is reported.
pub struct RawStorageVisitor<'a> {
    api: &'a dyn VaultApi,
    base: String,
    sentinel: String,
    pub report: Report<RawEntry>,
    pub pruned: Vec<String>,
}

impl<'a> RawStorageVisitor<'a> {
    pub fn new(api: &'a dyn VaultApi, base: &str, sentinel: &str) -> Self {
        Self {
            api,
            base: base.trim_matches('/').to_string(),
            sentinel: sentinel.to_string(),
            report: Report::new(),
            pruned: Vec::new(),
        }
    }

    fn api_path(&self, path: &str) -> String {
        join(&self.base, path)
    }
}

impl TreeVisitor for RawStorageVisitor<'_> {
    type Node = String;

    fn handle(&mut self, path: &String, _depth: usize) -> Step<String> {
        let api_path = self.api_path(path);
        let keys = match list_keys(self.api, &api_path, &NamespacePath::root()) {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!(path = %api_path, error = %e, "cannot list raw path");
                return Step::Descend(vec![]);
            }
        };

        if keys.iter().any(|k| *k == self.sentinel) {
            tracing::warn!(
                path = %api_path,
                sentinel = %self.sentinel,
                "sentinel key present, pruning subtree"
            );
            self.pruned.push(path.clone());
            return Step::Prune;
        }

        if !keys.is_empty() {
            return Step::Descend(keys.iter().map(|k| join(path, k)).collect());
        }

        match read_raw(self.api, &api_path) {
            Ok(Some(value)) => self.report.append(RawEntry {
                full_path: sanitize_field(path),
                value: sanitize_field(&value),
            }),
            Ok(None) => tracing::debug!(path = %api_path, "no value stored"),
            Err(e) => tracing::warn!(path = %api_path, error = %e, "cannot read raw value"),
        }
        Step::Descend(vec![])
    }

    fn depth_limited(&mut self, path: &String, children: usize) {
        tracing::warn!(path = %self.api_path(path), children, "max depth reached, not descending");
    }
}
