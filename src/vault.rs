use crate::config::ConnectionSettings;
use crate::domain::models::{EngineType, MountDescriptor, NamespacePath};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    List,
    Post,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("vault unreachable: {0}")]
    Unreachable(String),
    #[error("vault returned {status}: {}", render_messages(.messages))]
    Api { status: u16, messages: Vec<String> },
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}

fn render_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        "no error detail".to_string()
    } else {
        messages
            .iter()
            .map(|m| m.trim())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl TransportError {
    /// Vault answers `404 {"errors":[]}` when a path has nothing under it.
    pub fn is_empty_not_found(&self) -> bool {
        matches!(self, TransportError::Api { status: 404, messages } if messages.is_empty())
    }
}

/// Authenticated, namespace-scoped access to the Vault HTTP API.
pub trait VaultApi {
    fn call(
        &self,
        method: Method,
        path: &str,
        namespace: &NamespacePath,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

pub struct HttpVault {
    client: reqwest::blocking::Client,
    addr: String,
    token: String,
}

impl HttpVault {
    pub fn new(settings: &ConnectionSettings) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure)
            .build()?;
        Ok(Self {
            client,
            addr: settings.addr.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.addr, path.trim_start_matches('/'))
    }
}

impl VaultApi for HttpVault {
    fn call(
        &self,
        method: Method,
        path: &str,
        namespace: &NamespacePath,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);
        let mut req = match method {
            Method::Get => self.client.get(&url),
            Method::List => self.client.get(&url).query(&[("list", "true")]),
            Method::Post => self.client.post(&url),
        };
        req = req.header("X-Vault-Token", &self.token);
        if !namespace.is_root() {
            req = req.header("X-Vault-Namespace", namespace.to_string());
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        tracing::trace!(?method, path, namespace = %namespace.label(), "vault request");

        let resp = req
            .send()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        parse_response(status, &text)
    }
}

/// Turns a raw HTTP answer into either the JSON document or an API error.
pub fn parse_response(status: u16, text: &str) -> Result<Value, TransportError> {
    let success = (200..300).contains(&status);
    if text.trim().is_empty() {
        if success {
            return Ok(Value::Null);
        }
        return Err(TransportError::Api {
            status,
            messages: vec![],
        });
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) if success => return Err(TransportError::InvalidResponse(e.to_string())),
        Err(_) => {
            return Err(TransportError::Api {
                status,
                messages: vec![text.trim().chars().take(200).collect()],
            })
        }
    };

    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        return Err(TransportError::Api {
            status,
            messages: errors
                .iter()
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        });
    }
    if !success {
        return Err(TransportError::Api {
            status,
            messages: vec![],
        });
    }
    Ok(value)
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize, Default)]
struct KeyListData {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct MountEntry {
    #[serde(rename = "type")]
    engine_type: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CertificatePayload {
    pub certificate: String,
    #[serde(default)]
    pub serial_number: String,
}

#[derive(Deserialize)]
struct RawData {
    value: Option<String>,
}

fn data_of<T: DeserializeOwned>(value: Value) -> Result<Option<T>, TransportError> {
    if value.is_null() {
        return Ok(None);
    }
    let env: Envelope<T> = serde_json::from_value(value)
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
    Ok(env.data)
}

/// Child keys of `path`, in the order Vault returned them. Container keys keep
/// their trailing `/`. An empty or non-container path yields no keys.
pub fn list_keys(
    api: &dyn VaultApi,
    path: &str,
    namespace: &NamespacePath,
) -> Result<Vec<String>, TransportError> {
    match api.call(Method::List, path, namespace, None) {
        Ok(v) => Ok(data_of::<KeyListData>(v)?.unwrap_or_default().keys),
        Err(e) if e.is_empty_not_found() => Ok(vec![]),
        Err(e) => Err(e),
    }
}

/// Every mount in `namespace` that reports an engine type.
pub fn list_mounts(
    api: &dyn VaultApi,
    namespace: &NamespacePath,
) -> Result<Vec<MountDescriptor>, TransportError> {
    let value = api.call(Method::Get, "sys/mounts", namespace, None)?;
    let table = data_of::<serde_json::Map<String, Value>>(value)?.unwrap_or_default();
    let mut out = Vec::new();
    for (path, entry) in table {
        let entry = match serde_json::from_value::<MountEntry>(entry) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(
                    namespace = %namespace.label(),
                    mount = %path,
                    error = %e,
                    "skipping mount without an engine type"
                );
                continue;
            }
        };
        out.push(MountDescriptor {
            namespace: namespace.clone(),
            mount_path: path.trim_end_matches('/').to_string(),
            engine_type: EngineType::from_type_field(&entry.engine_type),
        });
    }
    Ok(out)
}

pub fn read_certificate(
    api: &dyn VaultApi,
    mount_path: &str,
    serial: &str,
    namespace: &NamespacePath,
) -> Result<CertificatePayload, TransportError> {
    let path = format!("{}/cert/{}", mount_path, serial);
    let value = api.call(Method::Get, &path, namespace, None)?;
    data_of::<CertificatePayload>(value)?
        .ok_or_else(|| TransportError::InvalidResponse(format!("no data for {}", path)))
}

/// Capabilities the token holds on each of `paths` (root namespace).
pub fn capabilities_self(
    api: &dyn VaultApi,
    paths: &[&str],
) -> Result<Vec<(String, Vec<String>)>, TransportError> {
    let body = serde_json::json!({ "paths": paths });
    let value = api.call(
        Method::Post,
        "sys/capabilities-self",
        &NamespacePath::root(),
        Some(&body),
    )?;
    let table = data_of::<serde_json::Map<String, Value>>(value)?.unwrap_or_default();
    Ok(table
        .into_iter()
        .filter_map(|(path, caps)| {
            let caps: Vec<String> = serde_json::from_value(caps).ok()?;
            Some((path, caps))
        })
        .collect())
}

/// Raw storage value at `path`, or `None` when nothing is stored there.
pub fn read_raw(api: &dyn VaultApi, path: &str) -> Result<Option<String>, TransportError> {
    match api.call(Method::Get, path, &NamespacePath::root(), None) {
        Ok(v) => Ok(data_of::<RawData>(v)?.and_then(|d| d.value)),
        Err(e) if e.is_empty_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
