mod cycles;
mod gauge;
mod monthly;
mod records;
mod resolve;
mod sources;
mod streak;
mod turnover;

use std::sync::Arc;

use serde_json::Value;

use windward_core::adapters::{TwseAdapter, YahooAdapter};
use windward_core::http_client::ReqwestHttpClient;
use windward_core::{MarketDataSource, SymbolRegistry};
use windward_store::JsonFileStore;

use crate::cli::{Cli, Command, SourceSelector};
use crate::config::WindwardConfig;
use crate::error::CliError;

/// Shared command context: loaded config, registry and record store.
pub struct Context {
    pub config: WindwardConfig,
    pub registry: Arc<SymbolRegistry>,
    pub store: JsonFileStore,
}

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = WindwardConfig::load(cli.config.as_deref())?;
    let registry = Arc::new(SymbolRegistry::new(config.registry.clone()));
    let store = JsonFileStore::new(&cli.store);
    let ctx = Context {
        config,
        registry,
        store,
    };

    match &cli.command {
        Command::Resolve(args) => resolve::run(args, &ctx),
        Command::Turnover(args) => turnover::run(args, &ctx, build_source(cli)).await,
        Command::Streak(args) => streak::run(args, &ctx),
        Command::Cycles(args) => cycles::run(args, &ctx),
        Command::Monthly(args) => monthly::run(args, &ctx),
        Command::Gauge(args) => gauge::run(args, &ctx),
        Command::Import(args) => records::import(args, &ctx),
        Command::Show(args) => records::show(args, &ctx),
        Command::Clear(args) => records::clear(args, &ctx),
        Command::Sources(_) => sources::run(cli.offline).await,
    }
}

fn build_source(cli: &Cli) -> Arc<dyn MarketDataSource> {
    match (cli.source, cli.offline) {
        (SourceSelector::Yahoo, true) => Arc::new(YahooAdapter::offline()),
        (SourceSelector::Yahoo, false) => {
            Arc::new(YahooAdapter::new(Arc::new(ReqwestHttpClient::new())))
        }
        (SourceSelector::Twse, true) => Arc::new(TwseAdapter::offline()),
        (SourceSelector::Twse, false) => {
            Arc::new(TwseAdapter::new(Arc::new(ReqwestHttpClient::new())))
        }
    }
}
