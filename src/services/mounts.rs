use crate::domain::models::{MountRecord, NamespacePath};
use crate::services::report::Report;
use crate::vault::{list_mounts, VaultApi};

/// Records every mount of the namespaces it is shown, optionally restricted
/// to one engine type.
pub struct MountVisitor<'a> {
    api: &'a dyn VaultApi,
    engine: Option<String>,
    pub report: Report<MountRecord>,
}

impl<'a> MountVisitor<'a> {
    pub fn new(api: &'a dyn VaultApi, engine: Option<String>) -> Self {
        Self {
            api,
            engine,
            report: Report::new(),
        }
    }

    pub fn visit(&mut self, ns: &NamespacePath) {
        let mounts = match list_mounts(self.api, ns) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(namespace = %ns.label(), error = %e, "cannot list mounts");
                return;
            }
        };
        for m in mounts {
            if let Some(want) = &self.engine {
                if m.engine_type.as_str() != want.as_str() {
                    continue;
                }
            }
            self.report.append(MountRecord {
                namespace: m.namespace,
                mount_path: m.mount_path,
                engine_type: m.engine_type,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::EngineType;
    use crate::services::walker::{walk_namespaces, WalkLimits};
    use crate::testing::FakeVault;

    fn tree() -> FakeVault {
        FakeVault::new()
            .namespaces("", &["ns-001/", "ns-002/"])
            .mounts("", &[("sys/", "system"), ("cubbyhole/", "cubbyhole")])
            .mounts("ns-001", &[("kv-001/", "kv"), ("kv-002/", "kv"), ("pki/", "pki")])
            .mounts("ns-002", &[("kv-001/", "kv")])
    }

    #[test]
    fn inventories_all_mounts_across_namespaces() {
        let api = tree();
        let mut v = MountVisitor::new(&api, None);
        let stats = walk_namespaces(&api, NamespacePath::root(), WalkLimits::default(), |ns| {
            v.visit(ns)
        });
        assert_eq!(stats.nodes, 3);
        assert_eq!(v.report.counts().total, 6);
        assert_eq!(v.report.counts().matches, 0);
    }

    #[test]
    fn engine_filter_keeps_only_that_type() {
        let api = tree();
        let mut v = MountVisitor::new(&api, Some("kv".to_string()));
        walk_namespaces(&api, NamespacePath::root(), WalkLimits::default(), |ns| {
            v.visit(ns)
        });
        assert_eq!(v.report.counts().total, 3);
        assert!(v
            .report
            .rows()
            .iter()
            .all(|r| r.engine_type == EngineType::Kv && !r.mount_path.ends_with('/')));
    }
}
