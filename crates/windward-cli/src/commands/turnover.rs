use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use windward_core::{
    DailySignalRecord, MarketDataSource, TradeDate, TurnoverReconciler, TurnoverRecord,
};
use windward_store::RecordStore;

use crate::cli::TurnoverArgs;
use crate::error::CliError;

use super::Context;

#[derive(Debug, Serialize)]
struct TurnoverResponse {
    date: TradeDate,
    records: Vec<TurnoverRecord>,
    values: HashMap<String, f64>,
}

pub async fn run(
    args: &TurnoverArgs,
    ctx: &Context,
    source: Arc<dyn MarketDataSource>,
) -> Result<Value, CliError> {
    let date = match &args.date {
        Some(raw) => TradeDate::parse(raw)?,
        None => TradeDate::new(time::OffsetDateTime::now_utc().date()),
    };
    let mut overrides = parse_overrides(&args.overrides)?;
    merge_stored_overrides(&mut overrides, &ctx.store.load_all()?, date);
    let overrides = (!overrides.is_empty()).then_some(&overrides);

    let engine = TurnoverReconciler::new(ctx.registry.clone(), source, ctx.config.reconcile.clone());
    let records = engine
        .reconcile_records(&args.names, date, overrides)
        .await;

    let mut values = HashMap::with_capacity(records.len() * 2);
    for record in &records {
        values.insert(record.symbol_key.clone(), record.value);
        if let Some(code) = &record.code {
            values.insert(code.as_str().to_owned(), record.value);
        }
    }

    Ok(serde_json::to_value(TurnoverResponse {
        date,
        records,
        values,
    })?)
}

/// Fold the stored record's overrides for `date` in under the flag
/// entries. Flags win on conflict.
fn merge_stored_overrides(
    overrides: &mut HashMap<String, f64>,
    history: &[DailySignalRecord],
    date: TradeDate,
) {
    let stored = history
        .iter()
        .find(|record| record.date == date)
        .and_then(|record| record.manual_overrides.as_ref());
    let Some(stored) = stored else {
        return;
    };
    for (name, value) in stored {
        overrides.entry(name.clone()).or_insert(*value);
    }
}

/// Parse repeated `NAME=VALUE` override flags.
fn parse_overrides(raw: &[String]) -> Result<HashMap<String, f64>, CliError> {
    let mut overrides = HashMap::with_capacity(raw.len());
    for entry in raw {
        let (name, value) = entry.split_once('=').ok_or_else(|| {
            CliError::Command(format!("override '{entry}' is not in NAME=VALUE form"))
        })?;
        let value: f64 = value.trim().parse().map_err(|_| {
            CliError::Command(format!("override '{entry}' has a non-numeric value"))
        })?;
        overrides.insert(name.trim().to_owned(), value);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    use windward_core::adapters::YahooAdapter;
    use windward_core::{SourceTier, SymbolRegistry};
    use windward_store::JsonFileStore;

    use crate::config::WindwardConfig;

    fn context(dir: &tempfile::TempDir) -> Context {
        let config = WindwardConfig::default();
        let registry = Arc::new(SymbolRegistry::new(config.registry.clone()));
        Context {
            config,
            registry,
            store: JsonFileStore::new(dir.path().join("records.json")),
        }
    }

    fn stored_record(date: &str, overrides: &[(&str, f64)]) -> DailySignalRecord {
        let mut record = DailySignalRecord::new(TradeDate::parse(date).expect("valid date"), "強");
        record.manual_overrides = Some(
            overrides
                .iter()
                .map(|(name, value)| ((*name).to_owned(), *value))
                .collect(),
        );
        record
    }

    #[tokio::test]
    async fn stored_overrides_apply_without_any_set_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        ctx.store
            .upsert_batch(&[stored_record("2024-01-05", &[("台積電", 77.0)])])
            .expect("seed store");

        let args = TurnoverArgs {
            names: vec!["台積電".to_owned()],
            date: Some("2024-01-05".to_owned()),
            overrides: vec![],
        };
        let value = run(&args, &ctx, Arc::new(YahooAdapter::offline()))
            .await
            .expect("turnover");

        assert_eq!(value["values"]["台積電"], 77.0);
        assert_eq!(
            value["records"][0]["tier"],
            serde_json::to_value(SourceTier::Override).expect("tier")
        );
    }

    #[tokio::test]
    async fn set_flags_win_over_the_stored_override_for_the_same_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        ctx.store
            .upsert_batch(&[stored_record(
                "2024-01-05",
                &[("台積電", 77.0), ("聯發科", 33.0)],
            )])
            .expect("seed store");

        let args = TurnoverArgs {
            names: vec!["台積電".to_owned(), "聯發科".to_owned()],
            date: Some("2024-01-05".to_owned()),
            overrides: vec!["台積電=88".to_owned()],
        };
        let value = run(&args, &ctx, Arc::new(YahooAdapter::offline()))
            .await
            .expect("turnover");

        // The flagged name takes the flag value; the untouched one keeps
        // its stored override.
        assert_eq!(value["values"]["台積電"], 88.0);
        assert_eq!(value["values"]["聯發科"], 33.0);
    }

    #[test]
    fn stored_overrides_from_other_dates_are_ignored() {
        let mut overrides = HashMap::new();
        let history = vec![stored_record("2024-01-04", &[("台積電", 77.0)])];
        merge_stored_overrides(
            &mut overrides,
            &history,
            TradeDate::parse("2024-01-05").expect("valid date"),
        );
        assert!(overrides.is_empty());
    }

    #[test]
    fn overrides_parse_name_value_pairs() {
        let parsed =
            parse_overrides(&["台積電=150".to_owned(), " 2454 = 42.5 ".to_owned()]).expect("parse");
        assert_eq!(parsed.get("台積電"), Some(&150.0));
        assert_eq!(parsed.get("2454"), Some(&42.5));
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!(parse_overrides(&["no-equals".to_owned()]).is_err());
        assert!(parse_overrides(&["台積電=abc".to_owned()]).is_err());
    }
}
