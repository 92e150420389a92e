//! In-memory `VaultApi` used by unit tests.

use crate::domain::models::NamespacePath;
use crate::vault::{Method, TransportError, VaultApi};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;

type Key = (Method, String, String);

#[derive(Default)]
pub struct FakeVault {
    routes: HashMap<Key, Result<Value, TransportError>>,
    calls: RefCell<Vec<Key>>,
}

fn key(method: Method, ns: &str, path: &str) -> Key {
    (method, ns.to_string(), path.to_string())
}

impl FakeVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(mut self, k: Key, v: Result<Value, TransportError>) -> Self {
        self.routes.insert(k, v);
        self
    }

    pub fn namespaces(self, ns: &str, children: &[&str]) -> Self {
        self.route(
            key(Method::List, ns, "sys/namespaces"),
            Ok(json!({"data": {"keys": children}})),
        )
    }

    /// `mounts` are `(path, type)` pairs, e.g. `("pki/", "pki")`.
    pub fn mounts(self, ns: &str, mounts: &[(&str, &str)]) -> Self {
        let mut table = Map::new();
        for (path, ty) in mounts {
            table.insert(path.to_string(), json!({"type": ty}));
        }
        self.route(
            key(Method::Get, ns, "sys/mounts"),
            Ok(json!({"data": table})),
        )
    }

    /// Registers the serial listing and one fetch route per `(serial, pem)`.
    pub fn certs(mut self, ns: &str, mount: &str, certs: &[(&str, &str)]) -> Self {
        let serials: Vec<&str> = certs.iter().map(|(s, _)| *s).collect();
        self = self.route(
            key(Method::List, ns, &format!("{}/certs", mount)),
            Ok(json!({"data": {"keys": serials}})),
        );
        for (serial, pem) in certs {
            self = self.route(
                key(Method::Get, ns, &format!("{}/cert/{}", mount, serial)),
                Ok(json!({"data": {"certificate": pem, "serial_number": serial}})),
            );
        }
        self
    }

    pub fn raw_dir(self, path: &str, keys: &[&str]) -> Self {
        self.route(
            key(Method::List, "", path),
            Ok(json!({"data": {"keys": keys}})),
        )
    }

    pub fn raw_value(self, path: &str, value: &str) -> Self {
        self.route(
            key(Method::Get, "", path),
            Ok(json!({"data": {"value": value}})),
        )
    }

    pub fn fail_list(self, ns: &str, path: &str, err: TransportError) -> Self {
        self.route(key(Method::List, ns, path), Err(err))
    }

    pub fn fail_get(self, ns: &str, path: &str, err: TransportError) -> Self {
        self.route(key(Method::Get, ns, path), Err(err))
    }

    pub fn calls(&self) -> Vec<(Method, String, String)> {
        self.calls.borrow().clone()
    }

    /// Paths of every GET issued, in call order.
    pub fn get_paths(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|(m, _, _)| *m == Method::Get)
            .map(|(_, _, p)| p.clone())
            .collect()
    }
}

impl VaultApi for FakeVault {
    fn call(
        &self,
        method: Method,
        path: &str,
        namespace: &NamespacePath,
        _body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let k = key(method, &namespace.to_string(), path);
        self.calls.borrow_mut().push(k.clone());
        self.routes.get(&k).cloned().unwrap_or(Err(TransportError::Api {
            status: 404,
            messages: vec![],
        }))
    }
}
