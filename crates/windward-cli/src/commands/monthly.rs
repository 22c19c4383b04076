use std::collections::HashMap;

use serde_json::Value;

use windward_core::monthly::aggregate;
use windward_core::{MonthlyCount, Strategy};
use windward_store::RecordStore;

use crate::cli::MonthlyArgs;
use crate::error::CliError;

use super::Context;

pub fn run(args: &MonthlyArgs, ctx: &Context) -> Result<Value, CliError> {
    let records = ctx.store.load_all()?;
    let mut rows = aggregate(&records, &ctx.registry);

    if let Some(month) = &args.month {
        rows.retain(|row| &row.month == month);
    }
    if let Some(top) = args.top {
        rows = truncate_per_group(rows, top);
    }

    Ok(serde_json::to_value(rows)?)
}

/// Keep the first `top` rows of each month/strategy group.
///
/// Rows arrive already ordered by count, so "first" means "highest".
fn truncate_per_group(rows: Vec<MonthlyCount>, top: usize) -> Vec<MonthlyCount> {
    let mut seen: HashMap<(String, Strategy), usize> = HashMap::new();
    rows.into_iter()
        .filter(|row| {
            let taken = seen.entry((row.month.clone(), row.strategy)).or_insert(0);
            *taken += 1;
            *taken <= top
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(month: &str, strategy: Strategy, symbol: &str, count: u32) -> MonthlyCount {
        MonthlyCount {
            month: month.to_owned(),
            strategy,
            symbol: symbol.to_owned(),
            count,
            sector: "Other".to_owned(),
        }
    }

    #[test]
    fn truncation_applies_per_month_and_strategy() {
        let rows = vec![
            row("2024-03", Strategy::WorkerStrong, "a", 5),
            row("2024-03", Strategy::WorkerStrong, "b", 3),
            row("2024-03", Strategy::WorkerStrong, "c", 1),
            row("2024-03", Strategy::WorkerTrend, "d", 2),
            row("2024-02", Strategy::WorkerStrong, "e", 4),
        ];

        let kept = truncate_per_group(rows, 2);
        let symbols: Vec<&str> = kept.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["a", "b", "d", "e"]);
    }
}
