use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use windward_core::adapters::{TwseAdapter, YahooAdapter};
use windward_core::http_client::ReqwestHttpClient;
use windward_core::{CapabilitySet, HealthStatus, MarketDataSource, ProviderId};

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SourceInfo {
    provider: ProviderId,
    capabilities: CapabilitySet,
    health: HealthStatus,
}

pub async fn run(offline: bool) -> Result<Value, CliError> {
    let sources: Vec<Arc<dyn MarketDataSource>> = if offline {
        vec![
            Arc::new(YahooAdapter::offline()),
            Arc::new(TwseAdapter::offline()),
        ]
    } else {
        let http = Arc::new(ReqwestHttpClient::new());
        vec![
            Arc::new(YahooAdapter::new(http.clone())),
            Arc::new(TwseAdapter::new(http)),
        ]
    };

    let mut infos = Vec::with_capacity(sources.len());
    for source in &sources {
        infos.push(SourceInfo {
            provider: source.id(),
            capabilities: source.capabilities(),
            health: source.health().await,
        });
    }

    Ok(serde_json::to_value(infos)?)
}
