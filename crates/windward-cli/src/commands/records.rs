use std::fs;

use serde_json::{json, Value};

use windward_core::domain::DailySignalRecord;
use windward_store::RecordStore;

use crate::cli::{ClearArgs, ImportArgs, ShowArgs};
use crate::error::CliError;

use super::Context;

pub fn import(args: &ImportArgs, ctx: &Context) -> Result<Value, CliError> {
    let body = fs::read_to_string(&args.file).map_err(|err| {
        CliError::Command(format!("cannot read '{}': {err}", args.file.display()))
    })?;
    let records: Vec<DailySignalRecord> = serde_json::from_str(&body)?;

    let outcome = ctx.store.upsert_batch(&records)?;
    Ok(json!({
        "inserted": outcome.inserted,
        "replaced": outcome.replaced,
        "total": ctx.store.load_all()?.len(),
    }))
}

pub fn show(args: &ShowArgs, ctx: &Context) -> Result<Value, CliError> {
    let mut records = ctx.store.load_all()?;
    if let Some(raw) = &args.date {
        let date = windward_core::TradeDate::parse(raw)?;
        records.retain(|record| record.date == date);
    }
    records.truncate(args.limit);
    Ok(serde_json::to_value(records)?)
}

pub fn clear(args: &ClearArgs, ctx: &Context) -> Result<Value, CliError> {
    if !args.yes {
        return Err(CliError::Command(String::from(
            "refusing to clear the store without --yes",
        )));
    }
    ctx.store.clear()?;
    Ok(json!({ "cleared": true }))
}
