#![allow(dead_code)]

use assert_cmd::Command;
use chrono::{Datelike, Duration, Utc};
use httpmock::{Method::GET, MockServer};
use rcgen::{date_time_ymd, CertificateParams, DistinguishedName, DnType, KeyPair};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub out_dir: PathBuf,
    pub server: MockServer,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let out_dir = tmp.path().join("out");
        std::fs::create_dir_all(&home).expect("create isolated home");
        Self {
            _tmp: tmp,
            home,
            out_dir,
            server: MockServer::start(),
        }
    }

    /// Command wired to the mock server, with an isolated HOME and cwd.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("vaultscan").expect("binary built");
        cmd.env("HOME", &self.home)
            .env("VAULT_ADDR", self.server.base_url())
            .env("VAULT_TOKEN", "s.integration")
            .env_remove("RUST_LOG")
            .current_dir(&self.home);
        cmd
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }

    pub fn read_out(&self, name: &str) -> String {
        std::fs::read_to_string(self.out(name)).expect("report written")
    }

    /// `LIST path` answered with `keys`; `ns` empty means the root namespace.
    /// Register scoped routes before root ones: the first matching mock wins.
    pub fn list(&self, ns: &str, path: &str, keys: &[&str]) {
        self.get_json(
            ns,
            path,
            true,
            200,
            json!({"data": {"keys": keys}}),
        );
    }

    pub fn get(&self, ns: &str, path: &str, data: Value) {
        self.get_json(ns, path, false, 200, json!({ "data": data }));
    }

    pub fn get_json(&self, ns: &str, path: &str, list: bool, status: u16, body: Value) {
        let full = format!("/v1/{}", path);
        let ns = ns.to_string();
        self.server.mock(move |when, then| {
            let mut when = when.method(GET).path(full);
            if list {
                when = when.query_param("list", "true");
            }
            if !ns.is_empty() {
                when.header("X-Vault-Namespace", ns.as_str());
            }
            then.status(status).json_body(body);
        });
    }
}

/// Self-signed PEM for `cn` expiring at midnight UTC `days` days from today.
pub fn pem_expiring_in(cn: &str, days: i64) -> String {
    let day = (Utc::now() + Duration::days(days)).date_naive();
    let mut params = CertificateParams::new(vec![cn.to_string()]).expect("params");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    params.not_before = date_time_ymd(2020, 1, 1);
    params.not_after = date_time_ymd(day.year(), day.month() as u8, day.day() as u8);
    let key = KeyPair::generate().expect("key");
    params.self_signed(&key).expect("self signed").pem()
}

/// root -> team1 (pki with one certificate expiring in `days`), team2 (no mounts).
pub fn team_fixture(env: &TestEnv, days: i64) {
    let pem = pem_expiring_in("svc.team1.example.com", days);
    env.list("team1", "sys/namespaces", &[]);
    env.list("team2", "sys/namespaces", &[]);
    env.get("team1", "sys/mounts", json!({"pki/": {"type": "pki"}, "secret/": {"type": "kv"}}));
    env.get("team2", "sys/mounts", json!({}));
    env.list("team1", "pki/certs", &["1a:2b"]);
    env.get(
        "team1",
        "pki/cert/1a:2b",
        json!({"certificate": pem, "serial_number": "1a:2b"}),
    );
    env.list("", "sys/namespaces", &["team1/", "team2/"]);
    env.get("", "sys/mounts", json!({"sys/": {"type": "system"}}));
}
