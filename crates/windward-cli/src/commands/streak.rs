use serde_json::Value;

use windward_core::{streak_as_of, TradeDate};
use windward_store::RecordStore;

use crate::cli::StreakArgs;
use crate::error::CliError;

use super::Context;

pub fn run(args: &StreakArgs, ctx: &Context) -> Result<Value, CliError> {
    let as_of = args.as_of.as_deref().map(TradeDate::parse).transpose()?;
    let records = ctx.store.load_all()?;
    Ok(serde_json::to_value(streak_as_of(&records, as_of))?)
}
