//! Market-data source contract and request/response types.
//!
//! The reconciliation engine consumes two endpoints from any provider:
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | History | [`HistoryRequest`] | [`HistoryTable`] | Batched daily close/volume window |
//! | Latest | [`LatestQuoteRequest`] | `Option<LatestQuote>` | Lightweight per-symbol quote |
//!
//! `Latest` returning `Ok(None)` means "unavailable right now" and is not an
//! error; the engine treats it the same as a missing row.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{StockCode, TradeDate, ValidationError};

/// Canonical provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Twse,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Yahoo, Self::Twse];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Twse => "twse",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "twse" => Ok(Self::Twse),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

/// Endpoint type used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    History,
    Latest,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Latest => "latest",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub history: bool,
    pub latest: bool,
}

impl CapabilitySet {
    pub const fn new(history: bool, latest: bool) -> Self {
        Self { history, latest }
    }

    pub const fn full() -> Self {
        Self::new(true, true)
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::History => self.history,
            Endpoint::Latest => self.latest,
        }
    }
}

/// Source health, surfaced by the CLI `sources` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    Internal,
}

/// Structured error returned by source adapters.
///
/// The reconciliation engine catches these per symbol/tier; they never
/// surface past its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_endpoint(endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by this source"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request for a batched daily history window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub codes: Vec<StockCode>,
    pub start: TradeDate,
    pub end: TradeDate,
}

impl HistoryRequest {
    pub fn new(codes: Vec<StockCode>, start: TradeDate, end: TradeDate) -> Result<Self, SourceError> {
        if codes.is_empty() {
            return Err(SourceError::invalid_request(
                "history request must include at least one code",
            ));
        }
        if start > end {
            return Err(SourceError::invalid_request(
                "history request start must not be after end",
            ));
        }
        Ok(Self { codes, start, end })
    }
}

/// One daily close/volume row of a history response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub code: StockCode,
    pub date: TradeDate,
    pub close: f64,
    pub volume: u64,
}

/// Normalized batched history response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryTable {
    pub rows: Vec<HistoryRow>,
}

impl HistoryTable {
    /// Most recent row for `code` at or before `as_of`.
    pub fn latest_row_for(&self, code: &StockCode, as_of: TradeDate) -> Option<&HistoryRow> {
        self.rows
            .iter()
            .filter(|row| &row.code == code && row.date <= as_of)
            .max_by_key(|row| row.date)
    }
}

/// Request for a lightweight latest quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestQuoteRequest {
    pub code: StockCode,
}

impl LatestQuoteRequest {
    pub fn new(code: StockCode) -> Self {
        Self { code }
    }
}

/// Latest price/volume pair; `None` from the endpoint means unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestQuote {
    pub price: f64,
    pub volume: u64,
}

type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; every call carries its own timeout
/// and a failure affects only the requesting symbol, never the process.
pub trait MarketDataSource: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Supported endpoints.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetch a batched daily history window.
    fn history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, HistoryTable>;

    /// Fetch the latest quote for a single symbol.
    ///
    /// `Ok(None)` means the quote is unavailable right now.
    fn latest<'a>(&'a self, req: LatestQuoteRequest) -> SourceFuture<'a, Option<LatestQuote>>;

    /// Current health snapshot, used by the CLI `sources` command.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}
