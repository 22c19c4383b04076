use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{OffsetDateTime, Weekday};
use tracing::warn;

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::market_data::{
    CapabilitySet, HealthStatus, HistoryRequest, HistoryRow, HistoryTable, LatestQuote,
    LatestQuoteRequest, MarketDataSource, ProviderId, SourceError,
};
use crate::retry::Backoff;
use crate::{StockCode, TradeDate};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const LATEST_LOOKBACK_DAYS: i64 = 5;

/// Yahoo Finance chart adapter.
///
/// Registry codes are local numeric codes; the chart endpoint wants a
/// suffixed ticker. Listed codes use `.TW`; when a code returns no rows the
/// adapter retries once with the OTC `.TWO` suffix before giving up.
pub struct YahooAdapter {
    http: Arc<dyn HttpClient>,
    backoff: Backoff,
    max_retries: u32,
    timeout_ms: u64,
    offline: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::offline()
    }
}

impl YahooAdapter {
    /// Adapter serving deterministic synthetic data; no network.
    pub fn offline() -> Self {
        Self {
            http: Arc::new(NoopHttpClient),
            backoff: Backoff::default(),
            max_retries: 0,
            timeout_ms: 3_000,
            offline: true,
        }
    }

    /// Adapter backed by a real transport.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            backoff: Backoff::default(),
            max_retries: 2,
            timeout_ms: 3_000,
            offline: false,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(ticker: &str, start: TradeDate, end: TradeDate) -> String {
        // period2 is exclusive on the chart endpoint; push it one day out so
        // the target date itself is included.
        format!(
            "{CHART_BASE}/{ticker}?period1={}&period2={}&interval=1d",
            start.unix_timestamp(),
            end.next_day().unix_timestamp(),
        )
    }

    async fn fetch_body(&self, url: String) -> Result<String, SourceError> {
        let mut attempt = 0;
        loop {
            let request = HttpRequest::get(url.clone())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);

            match self.http.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) if response.status == 429 => {
                    if attempt >= self.max_retries {
                        return Err(SourceError::rate_limited("chart endpoint returned 429"));
                    }
                }
                Ok(response) => {
                    return Err(SourceError::unavailable(format!(
                        "chart endpoint returned status {}",
                        response.status
                    )));
                }
                Err(err) if err.retryable() && attempt < self.max_retries => {
                    warn!(target: "windward::yahoo", attempt, error = %err, "transport retry");
                }
                Err(err) => {
                    return Err(SourceError::unavailable(err.message().to_owned()));
                }
            }

            tokio::time::sleep(self.backoff.delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Rows for one code, trying the listed suffix first, then OTC.
    async fn fetch_code_rows(
        &self,
        code: &StockCode,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<HistoryRow>, SourceError> {
        let mut last_err = None;
        for suffix in [".TW", ".TWO"] {
            let ticker = format!("{}{suffix}", code.as_str());
            let url = Self::chart_url(&ticker, start, end);
            match self.fetch_body(url).await {
                Ok(body) => {
                    let rows = parse_chart_rows(&body, code)?;
                    if !rows.is_empty() {
                        return Ok(rows);
                    }
                }
                Err(err) => last_err = Some(err),
            }
        }
        match last_err {
            Some(err) => Err(err),
            None => Ok(Vec::new()),
        }
    }

    fn synthetic_history(&self, req: &HistoryRequest) -> HistoryTable {
        let mut rows = Vec::new();
        for code in &req.codes {
            let mut date = req.start;
            while date <= req.end {
                if !matches!(
                    date.date().weekday(),
                    Weekday::Saturday | Weekday::Sunday
                ) {
                    rows.push(HistoryRow {
                        code: code.clone(),
                        date,
                        close: synthetic_price(code),
                        volume: synthetic_volume(code),
                    });
                }
                let next = date.next_day();
                if next == date {
                    break;
                }
                date = next;
            }
        }
        HistoryTable { rows }
    }
}

impl MarketDataSource for YahooAdapter {
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
        Box::pin(async move {
            if self.offline {
                return Ok(self.synthetic_history(&req));
            }

            let mut table = HistoryTable::default();
            for code in &req.codes {
                match self.fetch_code_rows(code, req.start, req.end).await {
                    Ok(rows) => table.rows.extend(rows),
                    // One symbol's failure must not sink the batch.
                    Err(err) => {
                        warn!(target: "windward::yahoo", code = %code, error = %err, "history row skipped");
                    }
                }
            }
            Ok(table)
        })
    }

    fn latest<'a>(
        &'a self,
        req: LatestQuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<LatestQuote>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.offline {
                return Ok(Some(LatestQuote {
                    price: synthetic_price(&req.code),
                    volume: synthetic_volume(&req.code),
                }));
            }

            let today = TradeDate::new(OffsetDateTime::now_utc().date());
            let rows = self
                .fetch_code_rows(&req.code, today.days_before(LATEST_LOOKBACK_DAYS), today)
                .await?;
            Ok(rows.last().map(|row| LatestQuote {
                price: row.close,
                volume: row.volume,
            }))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}

// Chart payload shape, reduced to the fields we read.

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn parse_chart_rows(body: &str, code: &StockCode) -> Result<Vec<HistoryRow>, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|err| SourceError::malformed(format!("chart payload: {err}")))?;

    let Some(result) = envelope.chart.result.and_then(|mut r| r.pop()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (index, ts) in result.timestamp.iter().enumerate() {
        let close = quote.close.get(index).copied().flatten();
        let volume = quote.volume.get(index).copied().flatten();
        let (Some(close), Some(volume)) = (close, volume) else {
            continue;
        };
        let Ok(moment) = OffsetDateTime::from_unix_timestamp(*ts) else {
            continue;
        };
        rows.push(HistoryRow {
            code: code.clone(),
            date: TradeDate::new(moment.date()),
            close,
            volume,
        });
    }
    Ok(rows)
}

fn code_seed(code: &StockCode) -> u64 {
    code.as_str().parse::<u64>().unwrap_or(1)
}

fn synthetic_price(code: &StockCode) -> f64 {
    40.0 + (code_seed(code) % 700) as f64
}

fn synthetic_volume(code: &StockCode) -> u64 {
    3_000_000 + (code_seed(code) % 7) * 500_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> StockCode {
        StockCode::parse(s).expect("valid code")
    }

    fn date(s: &str) -> TradeDate {
        TradeDate::parse(s).expect("valid date")
    }

    #[tokio::test]
    async fn offline_history_covers_weekdays_only() {
        let adapter = YahooAdapter::default();
        // 2024-01-05 is a Friday; the window spans one weekend.
        let req = HistoryRequest::new(vec![code("2330")], date("2024-01-05"), date("2024-01-09"))
            .expect("valid request");
        let table = adapter.history(req).await.expect("offline never fails");

        let dates: Vec<String> = table.rows.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-08", "2024-01-09"]);
        assert!(table.rows.iter().all(|r| r.close > 0.0 && r.volume > 0));
    }

    #[tokio::test]
    async fn offline_latest_is_deterministic() {
        let adapter = YahooAdapter::default();
        let a = adapter
            .latest(LatestQuoteRequest::new(code("2330")))
            .await
            .expect("offline never fails");
        let b = adapter
            .latest(LatestQuoteRequest::new(code("2330")))
            .await
            .expect("offline never fails");
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn parses_chart_payload_skipping_null_rows() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "close": [593.0, null, 601.0],
                            "volume": [25000000, 31000000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let rows = parse_chart_rows(body, &code("2330")).expect("payload parses");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 593.0);
        assert_eq!(rows[0].volume, 25_000_000);
        assert_eq!(rows[0].date.to_string(), "2024-01-02");
    }

    #[test]
    fn malformed_payload_is_a_source_error() {
        let err = parse_chart_rows("not json", &code("2330")).expect_err("must fail");
        assert_eq!(err.code(), "source.malformed");
    }

    #[test]
    fn chart_url_widens_window_by_one_day() {
        let url = YahooAdapter::chart_url("2330.TW", date("2024-01-02"), date("2024-01-05"));
        assert!(url.contains("period1=1704153600"));
        // 2024-01-06 midnight: the target day stays inside the window.
        assert!(url.contains("period2=1704499200"));
    }
}
