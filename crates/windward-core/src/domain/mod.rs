//! # Domain Models
//!
//! Canonical domain types for the windward engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockCode`] | Validated numeric exchange code |
//! | [`TradeDate`] | Calendar date with `YYYY-MM-DD` serde |
//! | [`CanonicalSymbol`] | Registry (code, name, sector) triple |
//! | [`ResolvedIdentifier`] | Best-effort resolution output |
//! | [`TurnoverRecord`] | Reconciled daily trading value |
//! | [`DailySignalRecord`] | One day of regime label + selection lists |
//! | [`Strategy`] | The five named selection strategies |
//!
//! Free-text cleaning lives here too ([`strip_markers`], [`split_names`]):
//! the ingestion boundary normalizes the source's empty/`"nan"`/null variants
//! into plain optional values before any component sees them.

mod code;
mod date;
mod models;

pub use code::StockCode;
pub use date::TradeDate;
pub use models::{
    split_names, strip_markers, CanonicalSymbol, DailySignalRecord, ResolvedIdentifier,
    SelectionLists, SignalCounts, SourceTier, Strategy, TurnoverRecord,
    DEFAULT_DECORATION_MARKERS, DEFAULT_FOOTNOTE_MARKERS, SECTOR_OTHER,
};
