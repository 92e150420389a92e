use crate::domain::models::{CertificateRecord, EngineType, ExpiryStatus, NamespacePath};
use crate::services::decoder::decode;
use crate::services::report::{sanitize_field, Report};
use crate::vault::{list_keys, list_mounts, read_certificate, VaultApi};
use chrono::{DateTime, Utc};
use std::time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;

/// Status and whole days left (floored, negative once expired) for a
/// certificate expiring at `not_after`.
pub fn classify(
    not_after: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> (i64, ExpiryStatus) {
    let seconds = not_after.timestamp() - now.timestamp();
    let threshold_secs = i64::try_from(threshold.as_secs()).unwrap_or(i64::MAX);
    let status = if seconds <= 0 {
        ExpiryStatus::Expired
    } else if seconds <= threshold_secs {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    };
    (seconds.div_euclid(SECONDS_PER_DAY), status)
}

/// Collects every certificate of every pki mount of the namespaces it is
/// shown. Failures only skip the mount or serial they belong to.
pub struct CertificateVisitor<'a> {
    api: &'a dyn VaultApi,
    now: DateTime<Utc>,
    threshold: Duration,
    pub report: Report<CertificateRecord>,
}

impl<'a> CertificateVisitor<'a> {
    pub fn new(api: &'a dyn VaultApi, now: DateTime<Utc>, threshold: Duration) -> Self {
        Self {
            api,
            now,
            threshold,
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
        for mount in mounts.iter().filter(|m| m.engine_type == EngineType::Pki) {
            self.scan_mount(ns, &mount.mount_path);
        }
    }

    fn scan_mount(&mut self, ns: &NamespacePath, mount: &str) {
        let serials = match list_keys(self.api, &format!("{}/certs", mount), ns) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(namespace = %ns.label(), mount, error = %e, "cannot list certificates");
                return;
            }
        };
        tracing::debug!(namespace = %ns.label(), mount, count = serials.len(), "scanning pki mount");
        for serial in &serials {
            self.scan_certificate(ns, mount, serial);
        }
    }

    fn scan_certificate(&mut self, ns: &NamespacePath, mount: &str, serial: &str) {
        let payload = match read_certificate(self.api, mount, serial, ns) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(namespace = %ns.label(), mount, serial, error = %e, "cannot fetch certificate");
                return;
            }
        };
        let decoded = match decode(&payload.certificate) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(namespace = %ns.label(), mount, serial, error = %e, "skipping certificate");
                return;
            }
        };

        let (days_until_expiry, status) = classify(decoded.not_after, self.now, self.threshold);
        let serial_number = if payload.serial_number.is_empty() {
            serial.to_string()
        } else {
            payload.serial_number
        };
        self.report.append(CertificateRecord {
            namespace: ns.clone(),
            mount_path: mount.to_string(),
            serial_number,
            subject: sanitize_field(&decoded.subject),
            not_after: decoded.not_after,
            days_until_expiry,
            status,
        });
        if status == ExpiryStatus::ExpiringSoon {
            self.report.record_match();
            tracing::info!(
                namespace = %ns.label(),
                mount,
                serial,
                days_until_expiry,
                "certificate expiring soon"
            );
        }
    }
}
