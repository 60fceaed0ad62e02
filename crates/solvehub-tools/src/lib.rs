//! # solvehub-tools
//!
//! One-shot batch tools for SolveHub data backfills:
//!
//! - [`subject_backfill`]: resolve legacy free-text subject names on
//!   exercises into canonical `Subject` records.
//! - [`attachment_migrate`]: move legacy local-disk attachments into the
//!   configured object storage backend.
//!
//! Both tools run single-threaded and sequentially, catch and count
//! per-record failures, and are safe to re-run: already-migrated records
//! are detected by field state and skipped.

pub mod attachment_migrate;
pub mod subject_backfill;
