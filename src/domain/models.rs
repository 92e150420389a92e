use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Position of a namespace in the tree. The root namespace has no segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `a/b/c` (surrounding separators are ignored) into a path.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.trim_end_matches('/').to_string());
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Label used in log lines, where an empty string would be unreadable.
    pub fn label(&self) -> String {
        if self.is_root() {
            "<root>".to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl Serialize for NamespacePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineType {
    Pki,
    Kv,
    Other(String),
}

impl EngineType {
    pub fn from_type_field(raw: &str) -> Self {
        match raw {
            "pki" => EngineType::Pki,
            "kv" => EngineType::Kv,
            other => EngineType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EngineType::Pki => "pki",
            EngineType::Kv => "kv",
            EngineType::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountDescriptor {
    pub namespace: NamespacePath,
    /// Mount path without its trailing separator.
    pub mount_path: String,
    pub engine_type: EngineType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpiryStatus::Expired => "EXPIRED",
            ExpiryStatus::ExpiringSoon => "EXPIRING_SOON",
            ExpiryStatus::Valid => "VALID",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub namespace: NamespacePath,
    pub mount_path: String,
    pub serial_number: String,
    /// Already escaped for the report.
    pub subject: String,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Storage path relative to the scan base. Both fields are already
    /// escaped for the report.
    pub full_path: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRecord {
    pub namespace: NamespacePath,
    pub mount_path: String,
    pub engine_type: EngineType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRecord {
    pub namespace: NamespacePath,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub total: usize,
    pub matches: usize,
}

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub kind: String,
    pub nodes_visited: usize,
    pub total: usize,
    pub matches: usize,
    pub report: Option<String>,
}
