//! Turnover reconciliation: one best-effort trading value per identifier.
//!
//! Sources are unreliable and rate limited, so values are assembled through
//! a strict precedence chain:
//!
//! 1. **Manual override**: operator JSON for the date; trusted as-is.
//! 2. **Batch window**: one multi-symbol history call looking back over
//!    weekends/holidays; most recent row at or before the target date.
//! 3. **Live fallback**: per-symbol latest quote for anything the batch
//!    missed, gated by the provider's rate budget.
//!
//! A value is accepted only when strictly positive and above the
//! materiality threshold (near-zero rows are data glitches, not turnover).
//! Symbols that survive no tier are simply absent from the result: callers
//! must treat absence as "unknown", never as zero. Failures are isolated
//! per symbol and tier; nothing escapes [`TurnoverReconciler::reconcile`].
//!
//! Whole calls are memoized by `(identifiers, date, overrides)` with a
//! bounded TTL because the dashboard re-invokes this on every render.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::domain::{ResolvedIdentifier, SourceTier, StockCode, TradeDate, TurnoverRecord};
use crate::market_data::{
    Endpoint, HistoryRequest, LatestQuoteRequest, MarketDataSource,
};
use crate::registry::SymbolRegistry;
use crate::throttling::{ProviderPolicy, ThrottlingQueue};

/// Tuning knobs for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Calendar days of history fetched before the target date; covers
    /// weekends and holidays.
    pub lookback_days: i64,
    /// Divisor applied to `close * volume`; 1e8 reports turnover in
    /// hundreds of millions of currency units.
    pub normalization: f64,
    /// Materiality threshold in normalized units.
    pub min_turnover: f64,
    /// Memoization TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            normalization: 1e8,
            min_turnover: 0.01,
            cache_ttl_secs: 600,
        }
    }
}

/// Tiered turnover reconciliation engine.
pub struct TurnoverReconciler {
    registry: Arc<SymbolRegistry>,
    source: Arc<dyn MarketDataSource>,
    throttle: ThrottlingQueue,
    cache: CacheStore,
    config: ReconcileConfig,
}

impl TurnoverReconciler {
    pub fn new(
        registry: Arc<SymbolRegistry>,
        source: Arc<dyn MarketDataSource>,
        config: ReconcileConfig,
    ) -> Self {
        let policy = ProviderPolicy::default_for(source.id());
        let cache = CacheStore::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            registry,
            source,
            throttle: ThrottlingQueue::from_policy(&policy),
            cache,
            config,
        }
    }

    /// Replace the live-tier rate budget. The default budget comes from
    /// [`ProviderPolicy::default_for`] on the source's provider id.
    pub fn with_throttle(mut self, throttle: ThrottlingQueue) -> Self {
        self.throttle = throttle;
        self
    }

    /// Reconcile a turnover value per identifier.
    ///
    /// The result is dual-keyed: every reconciled symbol appears under its
    /// display name and, when resolvable, its canonical code, so downstream
    /// lookups succeed regardless of which form they hold.
    pub async fn reconcile(
        &self,
        identifiers: &[String],
        target_date: TradeDate,
        manual_overrides: Option<&HashMap<String, f64>>,
    ) -> HashMap<String, f64> {
        let key = cache_key(identifiers, target_date, manual_overrides);
        if let Some(body) = self.cache.get(&key).await {
            if let Ok(cached) = serde_json::from_str::<HashMap<String, f64>>(&body) {
                debug!(target: "windward::reconcile", %target_date, "cache hit");
                return cached;
            }
        }

        let records = self
            .reconcile_records(identifiers, target_date, manual_overrides)
            .await;
        let map = expand_dual_keys(&records);

        if let Ok(body) = serde_json::to_string(&map) {
            self.cache.put(key, body).await;
        }
        map
    }

    /// Same chain, but returning one [`TurnoverRecord`] per resolved symbol
    /// with the tier that produced it. Not memoized.
    pub async fn reconcile_records(
        &self,
        identifiers: &[String],
        target_date: TradeDate,
        manual_overrides: Option<&HashMap<String, f64>>,
    ) -> Vec<TurnoverRecord> {
        // Dedupe by display name: "台積電" and "2330" are one symbol.
        let mut resolved: Vec<ResolvedIdentifier> = Vec::new();
        for raw in identifiers {
            let identifier = self.registry.resolve(raw);
            if !resolved
                .iter()
                .any(|seen| seen.display_name == identifier.display_name)
            {
                resolved.push(identifier);
            }
        }

        let overrides = resolve_overrides(&self.registry, manual_overrides);
        let mut records: Vec<TurnoverRecord> = Vec::new();
        let mut pending: Vec<&ResolvedIdentifier> = Vec::new();

        // Tier 1: operator overrides are trusted unconditionally and are
        // never revisited by lower tiers.
        for identifier in &resolved {
            if let Some(value) = lookup_override(&overrides, identifier) {
                records.push(TurnoverRecord {
                    symbol_key: identifier.display_name.clone(),
                    code: identifier.code.clone(),
                    value,
                    tier: SourceTier::Override,
                });
            } else {
                pending.push(identifier);
            }
        }

        // Tier 2: one batched history window for everything still open.
        let mut still_pending: Vec<&ResolvedIdentifier> = Vec::new();
        let batch_codes: Vec<StockCode> = pending
            .iter()
            .filter_map(|identifier| identifier.code.clone())
            .collect();

        if !batch_codes.is_empty() && self.source.capabilities().supports(Endpoint::History) {
            let start = target_date.days_before(self.config.lookback_days);
            match HistoryRequest::new(batch_codes, start, target_date) {
                Ok(request) => match self.source.history(request).await {
                    Ok(table) => {
                        for identifier in pending {
                            let Some(code) = identifier.code.as_ref() else {
                                still_pending.push(identifier);
                                continue;
                            };
                            let value = table
                                .latest_row_for(code, target_date)
                                .map(|row| row.close * row.volume as f64 / self.config.normalization)
                                .filter(|value| self.accepts(*value));
                            match value {
                                Some(value) => records.push(TurnoverRecord {
                                    symbol_key: identifier.display_name.clone(),
                                    code: identifier.code.clone(),
                                    value,
                                    tier: SourceTier::BatchHistory,
                                }),
                                None => still_pending.push(identifier),
                            }
                        }
                    }
                    Err(err) => {
                        warn!(target: "windward::reconcile", error = %err, "batch tier failed, falling through");
                        still_pending = pending;
                    }
                },
                Err(err) => {
                    warn!(target: "windward::reconcile", error = %err, "batch request rejected");
                    still_pending = pending;
                }
            }
        } else {
            still_pending = pending;
        }

        // Tier 3: per-symbol live quotes, budget permitting.
        for identifier in still_pending {
            let Some(code) = identifier.code.clone() else {
                // Nothing to query without a code; the symbol stays unknown.
                continue;
            };
            if !self.throttle.try_acquire() {
                warn!(
                    target: "windward::reconcile",
                    code = %code,
                    retry_after_ms = self.throttle.retry_after().as_millis() as u64,
                    "rate budget exhausted, symbol skipped"
                );
                continue;
            }
            match self.source.latest(LatestQuoteRequest::new(code.clone())).await {
                Ok(Some(quote)) => {
                    let value = quote.price * quote.volume as f64 / self.config.normalization;
                    if self.accepts(value) {
                        records.push(TurnoverRecord {
                            symbol_key: identifier.display_name.clone(),
                            code: Some(code),
                            value,
                            tier: SourceTier::LiveQuote,
                        });
                    }
                }
                Ok(None) => {
                    debug!(target: "windward::reconcile", code = %code, "live quote unavailable");
                }
                Err(err) => {
                    warn!(target: "windward::reconcile", code = %code, error = %err, "live tier failed for symbol");
                }
            }
        }

        records
    }

    fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value > 0.0 && value > self.config.min_turnover
    }
}

/// Resolve override keys so an alias key covers the canonical symbol too.
fn resolve_overrides(
    registry: &SymbolRegistry,
    manual_overrides: Option<&HashMap<String, f64>>,
) -> HashMap<String, f64> {
    let mut resolved = HashMap::new();
    let Some(overrides) = manual_overrides else {
        return resolved;
    };
    for (key, value) in overrides {
        if !value.is_finite() {
            continue;
        }
        let identifier = registry.resolve(key);
        resolved.insert(identifier.display_name, *value);
        if let Some(code) = identifier.code {
            resolved.insert(code.as_str().to_owned(), *value);
        }
    }
    resolved
}

fn lookup_override(
    overrides: &HashMap<String, f64>,
    identifier: &ResolvedIdentifier,
) -> Option<f64> {
    if let Some(value) = overrides.get(&identifier.display_name) {
        return Some(*value);
    }
    identifier
        .code
        .as_ref()
        .and_then(|code| overrides.get(code.as_str()))
        .copied()
}

fn expand_dual_keys(records: &[TurnoverRecord]) -> HashMap<String, f64> {
    let mut map = HashMap::with_capacity(records.len() * 2);
    for record in records {
        map.insert(record.symbol_key.clone(), record.value);
        if let Some(code) = &record.code {
            map.insert(code.as_str().to_owned(), record.value);
        }
    }
    map
}

/// Stable memo key over the full call signature.
fn cache_key(
    identifiers: &[String],
    target_date: TradeDate,
    manual_overrides: Option<&HashMap<String, f64>>,
) -> String {
    let mut idents: Vec<&str> = identifiers.iter().map(String::as_str).collect();
    idents.sort_unstable();
    idents.dedup();

    let mut overrides: Vec<(&str, f64)> = manual_overrides
        .map(|map| map.iter().map(|(k, v)| (k.as_str(), *v)).collect())
        .unwrap_or_default();
    overrides.sort_by(|a, b| a.0.cmp(b.0));

    let overrides_part: Vec<String> = overrides
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    format!(
        "{target_date}\u{1}{}\u{1}{}",
        idents.join("\u{2}"),
        overrides_part.join("\u{2}")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::market_data::{
        CapabilitySet, HealthStatus, HistoryRow, HistoryTable, LatestQuote, MarketDataSource,
        ProviderId, SourceError,
    };

    fn date(s: &str) -> TradeDate {
        TradeDate::parse(s).expect("valid date")
    }

    fn code(s: &str) -> StockCode {
        StockCode::parse(s).expect("valid code")
    }

    /// Scripted source: fixed history rows, fixed latest quotes, counters.
    #[derive(Default)]
    struct ScriptedSource {
        rows: Vec<HistoryRow>,
        latest: HashMap<String, LatestQuote>,
        history_calls: AtomicUsize,
        latest_calls: AtomicUsize,
        fail_history: bool,
    }

    impl MarketDataSource for ScriptedSource {
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
            let rows: Vec<HistoryRow> = self
                .rows
                .iter()
                .filter(|row| req.codes.contains(&row.code))
                .cloned()
                .collect();
            let fail = self.fail_history;
            Box::pin(async move {
                if fail {
                    Err(SourceError::unavailable("scripted outage"))
                } else {
                    Ok(HistoryTable { rows })
                }
            })
        }

        fn latest<'a>(
            &'a self,
            req: LatestQuoteRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Option<LatestQuote>, SourceError>> + Send + 'a>>
        {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            let quote = self.latest.get(req.code.as_str()).copied();
            Box::pin(async move { Ok(quote) })
        }

        fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
            Box::pin(async move { HealthStatus::healthy() })
        }
    }

    fn reconciler(source: ScriptedSource) -> TurnoverReconciler {
        TurnoverReconciler::new(
            Arc::new(SymbolRegistry::default()),
            Arc::new(source),
            ReconcileConfig::default(),
        )
    }

    #[tokio::test]
    async fn batch_tier_values_come_from_most_recent_row() {
        let source = ScriptedSource {
            rows: vec![
                HistoryRow {
                    code: code("2330"),
                    date: date("2024-01-03"),
                    close: 590.0,
                    volume: 20_000_000,
                },
                HistoryRow {
                    code: code("2330"),
                    date: date("2024-01-04"),
                    close: 600.0,
                    volume: 25_000_000,
                },
            ],
            ..Default::default()
        };
        let engine = reconciler(source);

        let map = engine
            .reconcile(&["台積電".to_owned()], date("2024-01-05"), None)
            .await;

        // 600 * 25M / 1e8 = 150 normalized units, under both keys.
        assert_eq!(map.get("台積電"), Some(&150.0));
        assert_eq!(map.get("2330"), Some(&150.0));
    }

    #[tokio::test]
    async fn manual_override_dominates_all_computed_tiers() {
        let source = ScriptedSource {
            rows: vec![HistoryRow {
                code: code("2330"),
                date: date("2024-01-04"),
                close: 600.0,
                volume: 25_000_000,
            }],
            ..Default::default()
        };
        let engine = reconciler(source);
        let overrides = HashMap::from([("台積".to_owned(), 99.5)]);

        let map = engine
            .reconcile(&["台積電".to_owned()], date("2024-01-05"), Some(&overrides))
            .await;

        // The override was keyed by an alias; it still wins for every form.
        assert_eq!(map.get("台積電"), Some(&99.5));
        assert_eq!(map.get("2330"), Some(&99.5));
    }

    #[tokio::test]
    async fn immaterial_batch_row_falls_through_to_live_tier() {
        let source = ScriptedSource {
            rows: vec![HistoryRow {
                code: code("2330"),
                date: date("2024-01-04"),
                close: 600.0,
                volume: 0,
            }],
            latest: HashMap::from([(
                "2330".to_owned(),
                LatestQuote {
                    price: 600.0,
                    volume: 10_000_000,
                },
            )]),
            ..Default::default()
        };
        let engine = reconciler(source);

        let records = engine
            .reconcile_records(&["台積電".to_owned()], date("2024-01-05"), None)
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tier, SourceTier::LiveQuote);
        assert_eq!(records[0].value, 60.0);
    }

    #[tokio::test]
    async fn batch_outage_is_isolated_and_live_tier_still_runs() {
        let source = ScriptedSource {
            fail_history: true,
            latest: HashMap::from([(
                "2454".to_owned(),
                LatestQuote {
                    price: 1000.0,
                    volume: 5_000_000,
                },
            )]),
            ..Default::default()
        };
        let engine = reconciler(source);

        let map = engine
            .reconcile(&["聯發科".to_owned()], date("2024-01-05"), None)
            .await;

        assert_eq!(map.get("聯發科"), Some(&50.0));
    }

    #[tokio::test]
    async fn unresolved_symbols_are_absent_not_zero() {
        let engine = reconciler(ScriptedSource::default());

        let map = engine
            .reconcile(
                &["台積電".to_owned(), "不存在的公司".to_owned()],
                date("2024-01-05"),
                None,
            )
            .await;

        assert!(!map.contains_key("不存在的公司"));
        assert!(!map.values().any(|value| *value == 0.0));
    }

    #[tokio::test]
    async fn identical_call_within_ttl_hits_the_memo_cache() {
        let source = Arc::new(ScriptedSource {
            rows: vec![HistoryRow {
                code: code("2330"),
                date: date("2024-01-04"),
                close: 600.0,
                volume: 25_000_000,
            }],
            ..Default::default()
        });
        let engine = TurnoverReconciler::new(
            Arc::new(SymbolRegistry::default()),
            source.clone(),
            ReconcileConfig::default(),
        );

        let first = engine
            .reconcile(&["台積電".to_owned()], date("2024-01-05"), None)
            .await;
        let second = engine
            .reconcile(&["台積電".to_owned()], date("2024-01-05"), None)
            .await;

        assert_eq!(first, second);
        assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_identifier_forms_reconcile_once() {
        let source = ScriptedSource {
            rows: vec![HistoryRow {
                code: code("2330"),
                date: date("2024-01-04"),
                close: 600.0,
                volume: 25_000_000,
            }],
            ..Default::default()
        };
        let engine = reconciler(source);

        let records = engine
            .reconcile_records(
                &["台積電".to_owned(), "2330".to_owned(), "台積".to_owned()],
                date("2024-01-05"),
                None,
            )
            .await;

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn cache_key_is_order_insensitive() {
        let a = cache_key(
            &["台積電".to_owned(), "聯發科".to_owned()],
            date("2024-01-05"),
            None,
        );
        let b = cache_key(
            &["聯發科".to_owned(), "台積電".to_owned()],
            date("2024-01-05"),
            None,
        );
        assert_eq!(a, b);

        let with_overrides = cache_key(
            &["台積電".to_owned()],
            date("2024-01-05"),
            Some(&HashMap::from([("台積電".to_owned(), 1.0)])),
        );
        assert_ne!(a, with_overrides);
    }
}
