// Shared fixtures for windward behavior tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

pub use std::sync::Arc;

pub use windward_core::{
    CapabilitySet, DailySignalRecord, HealthStatus, HistoryRequest, HistoryRow, HistoryTable,
    LatestQuote, LatestQuoteRequest, MarketDataSource, ProviderId, SelectionLists, SourceError,
    StockCode, TradeDate,
};

pub fn date(s: &str) -> TradeDate {
    TradeDate::parse(s).expect("valid date")
}

pub fn code(s: &str) -> StockCode {
    StockCode::parse(s).expect("valid code")
}

pub fn row(code_str: &str, date_str: &str, close: f64, volume: u64) -> HistoryRow {
    HistoryRow {
        code: code(code_str),
        date: date(date_str),
        close,
        volume,
    }
}

pub fn record(date_str: &str, label: &str) -> DailySignalRecord {
    DailySignalRecord::new(date(date_str), label)
}

/// Scripted market-data source with call counters.
///
/// History serves a fixed row set filtered to the requested codes;
/// latest quotes come from a per-code table. Either endpoint can be
/// forced to fail to exercise partial-failure paths.
#[derive(Default)]
pub struct MockMarketSource {
    pub rows: Vec<HistoryRow>,
    pub latest: HashMap<String, LatestQuote>,
    pub fail_history: bool,
    pub fail_latest: bool,
    pub history_calls: AtomicUsize,
    pub latest_calls: AtomicUsize,
}

impl MockMarketSource {
    pub fn with_rows(rows: Vec<HistoryRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_quote(mut self, code_str: &str, price: f64, volume: u64) -> Self {
        self.latest
            .insert(code_str.to_owned(), LatestQuote { price, volume });
        self
    }

    pub fn history_call_count(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn latest_call_count(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for MockMarketSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryTable, SourceError>> + Send + 'a>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail_history;
        let rows: Vec<HistoryRow> = self
            .rows
            .iter()
            .filter(|row| req.codes.contains(&row.code))
            .cloned()
            .collect();
        Box::pin(async move {
            if fail {
                Err(SourceError::unavailable("mock history outage"))
            } else {
                Ok(HistoryTable { rows })
            }
        })
    }

    fn latest<'a>(
        &'a self,
        req: LatestQuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<LatestQuote>, SourceError>> + Send + 'a>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail_latest;
        let quote = self.latest.get(req.code.as_str()).copied();
        Box::pin(async move {
            if fail {
                Err(SourceError::unavailable("mock quote outage"))
            } else {
                Ok(quote)
            }
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}
