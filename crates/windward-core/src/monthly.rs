//! Monthly selection statistics.
//!
//! Each daily record carries five delimited selection lists. This module
//! explodes them into per-symbol appearance counts grouped by calendar
//! month and strategy, with the sector attached through the registry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DailySignalRecord, Strategy};
use crate::registry::SymbolRegistry;

/// How often one symbol appeared in one strategy's list during one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub strategy: Strategy,
    pub symbol: String,
    pub count: u32,
    pub sector: String,
}

/// Explode daily selection lists into monthly per-symbol counts.
///
/// Symbols are keyed by resolved display name, so alias and decorated
/// forms of the same company accumulate into one row. Rows are ordered
/// by month descending, then strategy, then count descending; rows tied
/// on count keep their first-appearance order.
pub fn aggregate(history: &[DailySignalRecord], registry: &SymbolRegistry) -> Vec<MonthlyCount> {
    struct Tally {
        count: u32,
        sector: String,
        seq: usize,
    }

    let mut tallies: HashMap<(String, Strategy, String), Tally> = HashMap::new();
    let mut seq = 0usize;

    for record in history {
        let month = record.date.month_key();
        for strategy in Strategy::ALL {
            for name in record.lists.for_strategy(strategy) {
                let identifier = registry.resolve(name);
                let key = (month.clone(), strategy, identifier.display_name);
                match tallies.entry(key) {
                    Entry::Occupied(mut slot) => slot.get_mut().count += 1,
                    Entry::Vacant(slot) => {
                        slot.insert(Tally {
                            count: 1,
                            sector: identifier.sector,
                            seq,
                        });
                        seq += 1;
                    }
                }
            }
        }
    }

    let mut rows: Vec<(MonthlyCount, usize)> = tallies
        .into_iter()
        .map(|((month, strategy, symbol), tally)| {
            (
                MonthlyCount {
                    month,
                    strategy,
                    symbol,
                    count: tally.count,
                    sector: tally.sector,
                },
                tally.seq,
            )
        })
        .collect();

    rows.sort_by(|(a, a_seq), (b, b_seq)| {
        b.month
            .cmp(&a.month)
            .then_with(|| strategy_rank(a.strategy).cmp(&strategy_rank(b.strategy)))
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a_seq.cmp(b_seq))
    });

    rows.into_iter().map(|(row, _)| row).collect()
}

fn strategy_rank(strategy: Strategy) -> usize {
    Strategy::ALL
        .iter()
        .position(|&s| s == strategy)
        .unwrap_or(Strategy::ALL.len())
}
