//! Core engine for the windward market dashboard.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`domain`] | Validated codes, dates, records and selection lists |
//! | [`registry`] | Symbol resolution: aliases, markers, sector overrides |
//! | [`market_data`] | Source contract and request/response types |
//! | [`adapters`] | Yahoo and TWSE source implementations |
//! | [`reconcile`] | Tiered turnover reconciliation engine |
//! | [`regime`] | Wind-label streaks and cycle segmentation |
//! | [`monthly`] | Monthly selection statistics |
//! | [`gauge`] | Bias-and-streak gauge scoring |
//! | [`cache`] | TTL memoization store |
//! | [`throttling`] | Provider rate-budget gate |
//! | [`http_client`] | HTTP abstraction with an offline no-op client |
//! | [`retry`] | Backoff schedules for transient source failures |

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod gauge;
pub mod http_client;
pub mod market_data;
pub mod monthly;
pub mod reconcile;
pub mod regime;
pub mod registry;
pub mod retry;
pub mod throttling;

pub use cache::CacheStore;
pub use domain::{
    CanonicalSymbol, DailySignalRecord, ResolvedIdentifier, SelectionLists, SignalCounts,
    SourceTier, StockCode, Strategy, TradeDate, TurnoverRecord, SECTOR_OTHER,
};
pub use error::{CoreError, ValidationError};
pub use gauge::{GaugeConfig, GaugeMapper};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient};
pub use market_data::{
    CapabilitySet, Endpoint, HealthState, HealthStatus, HistoryRequest, HistoryRow, HistoryTable,
    LatestQuote, LatestQuoteRequest, MarketDataSource, ProviderId, SourceError, SourceErrorKind,
};
pub use monthly::MonthlyCount;
pub use reconcile::{ReconcileConfig, TurnoverReconciler};
pub use regime::{
    clean_label, current_streak, streak_as_of, BucketPerformance, CycleBucket, CycleClassifier,
    CycleRules, CycleSegment, RegimePoint, Streak,
};
pub use registry::{RegistryConfig, SymbolRegistry};
pub use retry::Backoff;
pub use throttling::{ProviderPolicy, ThrottlingQueue};
