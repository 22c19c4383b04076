use serde_json::Value;

use crate::cli::ResolveArgs;
use crate::error::CliError;

use super::Context;

pub fn run(args: &ResolveArgs, ctx: &Context) -> Result<Value, CliError> {
    let resolved: Vec<_> = args
        .names
        .iter()
        .map(|name| ctx.registry.resolve(name))
        .collect();
    Ok(serde_json::to_value(resolved)?)
}
