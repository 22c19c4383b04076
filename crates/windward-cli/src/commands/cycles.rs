use serde::Serialize;
use serde_json::Value;

use windward_core::{BucketPerformance, CycleClassifier, CycleSegment, RegimePoint};
use windward_store::RecordStore;

use crate::cli::CyclesArgs;
use crate::error::CliError;

use super::Context;

#[derive(Debug, Serialize)]
struct CyclesResponse {
    leverage: f64,
    segments: Vec<CycleSegment>,
    performance: Vec<BucketPerformance>,
}

pub fn run(args: &CyclesArgs, ctx: &Context) -> Result<Value, CliError> {
    let mut records = ctx.store.load_all()?;
    records.reverse();

    // Days without an index close cannot anchor a boundary price.
    let points: Vec<RegimePoint> = records
        .iter()
        .filter_map(|record| {
            record.index_close.map(|close| RegimePoint {
                date: record.date,
                label: record.regime_label.clone(),
                close,
            })
        })
        .collect();

    let classifier = CycleClassifier::new(ctx.config.cycle_rules.clone());
    let segments = classifier.segment(&points);
    let performance = classifier.bucket_returns(&segments, args.leverage);

    Ok(serde_json::to_value(CyclesResponse {
        leverage: args.leverage,
        segments,
        performance,
    })?)
}
