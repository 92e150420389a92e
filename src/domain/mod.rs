//! Shared data model layer (structs only).
//!
//! ## Purpose
//! - Keep record/report structs in one place.
//! - Avoid cyclic imports between the traversal engine and its visitors.
//! - Make report and `--json` schema changes explicit and reviewable.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! `ScanSummary` is the `--json` output contract.
//! Keep it synchronized with `docs/contracts/scan_summary.schema.json`.

pub mod models;
