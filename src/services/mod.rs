//! Service layer: the traversal engine, its visitors and the report.
//!
//! ## Service map
//! - `walker.rs`: generic depth-first walk + namespace tree walk.
//! - `certs.rs`: pki mount/certificate visitor and expiry classification.
//! - `raw.rs`: raw storage visitor with sentinel pruning.
//! - `mounts.rs`: mount inventory visitor.
//! - `decoder.rs`: PEM/X.509 decoding.
//! - `report.rs`: append-only report, field escaping, CSV output.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Visitors never fail a scan: errors are logged and the node is skipped.
//! - Network access goes through `vault::VaultApi` only.
//! - Keep command handlers thin; delegate to services.

pub mod certs;
pub mod decoder;
pub mod mounts;
pub mod output;
pub mod raw;
pub mod report;
pub mod walker;
