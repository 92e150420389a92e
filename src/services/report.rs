//! Append-only inventory report and its CSV serialization.
//!
//! Free-text content, raw storage paths included, is escaped once, by the
//! producer, through [`sanitize_field`]. The writer only surrounds those
//! fields with quotes. Identifier fields are written bare unless they hold a
//! delimiter, a quote or a line break, in which case the writer escapes and
//! quotes them.

use crate::domain::models::{
    CertificateRecord, MountRecord, NamespaceRecord, RawEntry, ReportCounts,
};
use std::io::{self, Write};
use std::path::Path;

/// Makes `raw` safe to emit as one quoted CSV field on a single line:
/// quotes are doubled, carriage returns dropped and newlines written as the
/// two characters `\n`.
pub fn sanitize_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\r' => {}
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`sanitize_field`], minus the carriage returns it dropped.
/// Only round-trip checks use it.
#[cfg(test)]
pub fn unescape_field(escaped: &str) -> String {
    escaped.replace("\\n", "\n").replace("\"\"", "\"")
}

pub enum Field<'a> {
    /// Identifier or generated value; quoted only when it needs to be.
    Plain(String),
    /// Pre-escaped free text.
    Quoted(&'a str),
}

fn plain_cell(s: String) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", sanitize_field(&s))
    } else {
        s
    }
}

pub trait ReportRow {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<Field<'_>>;
}

impl ReportRow for CertificateRecord {
    const HEADER: &'static [&'static str] = &[
        "namespace",
        "mount_path",
        "serial_number",
        "subject",
        "expiration",
        "days_until_expiry",
        "status",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Plain(self.namespace.to_string()),
            Field::Plain(self.mount_path.clone()),
            Field::Plain(self.serial_number.clone()),
            Field::Quoted(&self.subject),
            Field::Plain(self.not_after.to_rfc3339()),
            Field::Plain(self.days_until_expiry.to_string()),
            Field::Plain(self.status.to_string()),
        ]
    }
}

impl ReportRow for RawEntry {
    const HEADER: &'static [&'static str] = &["path", "value"];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Quoted(&self.full_path),
            Field::Quoted(&self.value),
        ]
    }
}

impl ReportRow for MountRecord {
    const HEADER: &'static [&'static str] = &["namespace", "mount_path", "engine_type"];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Plain(self.namespace.to_string()),
            Field::Plain(self.mount_path.clone()),
            Field::Plain(self.engine_type.as_str().to_string()),
        ]
    }
}

impl ReportRow for NamespaceRecord {
    const HEADER: &'static [&'static str] = &["namespace", "depth"];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Plain(self.namespace.to_string()),
            Field::Plain(self.depth.to_string()),
        ]
    }
}

#[derive(Debug)]
pub struct Report<R> {
    rows: Vec<R>,
    matches: usize,
}

impl<R> Default for Report<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            matches: 0,
        }
    }
}

impl<R: ReportRow> Report<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, row: R) {
        self.rows.push(row);
    }

    /// Counts the most recent row as matching the threshold.
    pub fn record_match(&mut self) {
        self.matches += 1;
    }

    pub fn counts(&self) -> ReportCounts {
        ReportCounts {
            total: self.rows.len(),
            matches: self.matches,
        }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn flush<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", R::HEADER.join(","))?;
        for row in &self.rows {
            let line: Vec<String> = row
                .fields()
                .into_iter()
                .map(|f| match f {
                    Field::Plain(s) => plain_cell(s),
                    Field::Quoted(s) => format!("\"{}\"", s),
                })
                .collect();
            writeln!(out, "{}", line.join(","))?;
        }
        out.flush()
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.flush(io::BufWriter::new(file))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ExpiryStatus, NamespacePath};
    use chrono::{TimeZone, Utc};

    fn cert(ns: &str, serial: &str, subject: &str) -> CertificateRecord {
        CertificateRecord {
            namespace: NamespacePath::parse(ns),
            mount_path: "pki".to_string(),
            serial_number: serial.to_string(),
            subject: sanitize_field(subject),
            not_after: Utc.with_ymd_and_hms(2030, 1, 8, 0, 0, 0).unwrap(),
            days_until_expiry: 7,
            status: ExpiryStatus::ExpiringSoon,
        }
    }

    fn render<R: ReportRow>(report: &Report<R>) -> String {
        let mut buf = Vec::new();
        report.flush(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn escaping_round_trip_drops_only_carriage_returns() {
        let original = "line \"one\"\r\nline two\nend";
        let escaped = sanitize_field(original);
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
        assert_eq!(escaped, "line \"\"one\"\"\\nline two\\nend");
        assert_eq!(unescape_field(&escaped), "line \"one\"\nline two\nend");
    }

    #[test]
    fn flush_writes_header_then_rows_in_insertion_order() {
        let mut report = Report::new();
        report.append(cert("team2", "02", "CN=b"));
        report.append(cert("team1", "01", "CN=a"));
        report.record_match();
        let out = render(&report);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "namespace,mount_path,serial_number,subject,expiration,days_until_expiry,status"
        );
        assert_eq!(
            lines[1],
            "team2,pki,02,\"CN=b\",2030-01-08T00:00:00+00:00,7,EXPIRING_SOON"
        );
        assert!(lines[2].starts_with("team1,pki,01,"));
        assert_eq!(report.counts(), ReportCounts { total: 2, matches: 1 });
    }

    #[test]
    fn hostile_text_stays_on_one_row() {
        let mut report = Report::new();
        report.append(RawEntry {
            full_path: "logical/abc/key".to_string(),
            value: sanitize_field("a,\"b\"\r\nc"),
        });
        let out = render(&report);
        assert_eq!(out, "path,value\n\"logical/abc/key\",\"a,\"\"b\"\"\\nc\"\n");
    }

    #[test]
    fn identifiers_with_delimiters_are_quoted_in_place() {
        let mut report = Report::new();
        report.append(MountRecord {
            namespace: NamespacePath::parse("team1"),
            mount_path: "pki,\"eu\"\nint".to_string(),
            engine_type: crate::domain::models::EngineType::Pki,
        });
        report.append(MountRecord {
            namespace: NamespacePath::root(),
            mount_path: "secret".to_string(),
            engine_type: crate::domain::models::EngineType::Kv,
        });
        let out = render(&report);
        assert_eq!(
            out,
            "namespace,mount_path,engine_type\nteam1,\"pki,\"\"eu\"\"\\nint\",pki\n,secret,kv\n"
        );
    }

    #[test]
    fn write_to_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/report.csv");
        let mut report: Report<NamespaceRecord> = Report::new();
        report.append(NamespaceRecord {
            namespace: NamespacePath::root(),
            depth: 0,
        });
        report.write_to(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "namespace,depth\n,0\n"
        );
    }
}
