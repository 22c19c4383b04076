//! File-backed persistence for daily signal records.
//!
//! The store is deliberately small: one JSON array per file, keyed by
//! date, written atomically. [`JsonFileStore`] is the only shipping
//! implementation; [`RecordStore`] keeps the CLI testable against
//! in-memory doubles.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{JsonFileStore, RecordStore, UpsertOutcome};
