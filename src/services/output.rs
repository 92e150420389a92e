use crate::domain::models::{JsonOut, ScanSummary};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

/// One-line human summary, or the `--json` envelope.
pub fn print_summary(json: bool, summary: &ScanSummary, noun: &str) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: summary
            })?
        );
        return Ok(());
    }
    let unit = if summary.kind == "raw" {
        "paths"
    } else {
        "namespaces"
    };
    let mut line = format!(
        "scanned {} {}: {} {}",
        summary.nodes_visited, unit, summary.total, noun
    );
    if summary.kind == "certs" {
        line.push_str(&format!(", {} expiring within threshold", summary.matches));
    }
    if let Some(report) = &summary.report {
        line.push_str(&format!("; report: {}", report));
    }
    println!("{}", line);
    Ok(())
}
