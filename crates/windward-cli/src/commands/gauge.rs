use serde::Serialize;
use serde_json::Value;

use windward_core::{streak_as_of, GaugeMapper};
use windward_store::RecordStore;

use crate::cli::GaugeArgs;
use crate::error::CliError;

use super::Context;

#[derive(Debug, Serialize)]
struct GaugeResponse {
    bias: f64,
    streak: u32,
    band: usize,
    score: f64,
}

pub fn run(args: &GaugeArgs, ctx: &Context) -> Result<Value, CliError> {
    let streak = match args.streak {
        Some(streak) => streak,
        None => streak_as_of(&ctx.store.load_all()?, None).length as u32,
    };

    let mapper = GaugeMapper::new(ctx.config.gauge.clone());
    Ok(serde_json::to_value(GaugeResponse {
        bias: args.bias,
        streak,
        band: mapper.band(args.bias),
        score: mapper.score(args.bias, streak),
    })?)
}
