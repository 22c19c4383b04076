use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::market_data::{
    CapabilitySet, Endpoint, HealthStatus, HistoryRequest, HistoryTable, LatestQuote,
    LatestQuoteRequest, MarketDataSource, ProviderId, SourceError,
};
use crate::StockCode;

const QUOTE_BASE: &str = "https://mis.twse.com.tw/stock/api/getStockInfo.jsp";

/// Exchange realtime-quote adapter; latest-only.
///
/// The endpoint reports volume in lots (1,000 shares) and dashes out the
/// price field when no trade has printed yet; both quirks are normalized
/// here so the engine sees plain price/share-volume pairs.
pub struct TwseAdapter {
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
    offline: bool,
}

impl Default for TwseAdapter {
    fn default() -> Self {
        Self::offline()
    }
}

impl TwseAdapter {
    pub fn offline() -> Self {
        Self {
            http: Arc::new(NoopHttpClient),
            timeout_ms: 3_000,
            offline: true,
        }
    }

    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            timeout_ms: 3_000,
            offline: false,
        }
    }

    fn quote_url(code: &StockCode) -> String {
        format!("{QUOTE_BASE}?ex_ch=tse_{}.tw&json=1", code.as_str())
    }
}

impl MarketDataSource for TwseAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Twse
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, true)
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryTable, SourceError>> + Send + 'a>> {
        let _ = req;
        Box::pin(async move { Err(SourceError::unsupported_endpoint(Endpoint::History)) })
    }

    fn latest<'a>(
        &'a self,
        req: LatestQuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<LatestQuote>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.offline {
                let seed = req.code.as_str().parse::<u64>().unwrap_or(1);
                return Ok(Some(LatestQuote {
                    price: 40.0 + (seed % 700) as f64,
                    volume: (2_000 + seed % 50) * 1_000,
                }));
            }

            let request = HttpRequest::get(Self::quote_url(&req.code))
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);
            let response = self
                .http
                .execute(request)
                .await
                .map_err(|err| SourceError::unavailable(err.message().to_owned()))?;

            if !response.is_success() {
                return Err(SourceError::unavailable(format!(
                    "quote endpoint returned status {}",
                    response.status
                )));
            }

            parse_latest(&response.body)
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "msgArray", default)]
    msg_array: Vec<QuoteMessage>,
}

#[derive(Debug, Deserialize)]
struct QuoteMessage {
    /// Last traded price; `"-"` before the first print of the day.
    #[serde(default)]
    z: String,
    /// Accumulated volume in lots.
    #[serde(default)]
    v: String,
}

fn parse_latest(body: &str) -> Result<Option<LatestQuote>, SourceError> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)
        .map_err(|err| SourceError::malformed(format!("quote payload: {err}")))?;

    let Some(message) = envelope.msg_array.first() else {
        return Ok(None);
    };

    let Ok(price) = message.z.trim().parse::<f64>() else {
        return Ok(None);
    };
    let lots = message.v.trim().parse::<u64>().unwrap_or(0);

    Ok(Some(LatestQuote {
        price,
        volume: lots * 1_000,
    }))
}
