use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{StockCode, TradeDate};

/// Decoration markers appended to operator-entered names and regime labels.
///
/// `(CB)` flags a convertible-bond pick; `*` is a footnote marker. Both exist
/// in half-width and full-width forms because the upstream data is typed by
/// hand.
pub const DEFAULT_DECORATION_MARKERS: [&str; 2] = ["(CB)", "（CB）"];
pub const DEFAULT_FOOTNOTE_MARKERS: [&str; 2] = ["*", "＊"];

/// Remove every occurrence of the given markers and trim the remainder.
pub fn strip_markers(input: &str, markers: &[impl AsRef<str>]) -> String {
    let mut cleaned = input.to_owned();
    for marker in markers {
        let marker = marker.as_ref();
        if !marker.is_empty() {
            cleaned = cleaned.replace(marker, "");
        }
    }
    cleaned.trim().to_owned()
}

/// Split a delimited selection list into clean name tokens.
///
/// The upstream file mixes ideographic commas, full-width commas and plain
/// commas, and represents absence as `""`, `"nan"` or whitespace. All of
/// those collapse to "no token" here so the core only ever sees real names.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(['、', ',', '，'])
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.eq_ignore_ascii_case("nan"))
        .map(ToOwned::to_owned)
        .collect()
}

/// Authoritative (code, name, sector) triple for one tradable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSymbol {
    pub code: StockCode,
    pub display_name: String,
    pub sector: String,
}

impl CanonicalSymbol {
    pub fn new(
        code: StockCode,
        display_name: impl Into<String>,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            code,
            display_name: display_name.into(),
            sector: sector.into(),
        }
    }
}

/// Sentinel sector for identifiers with no registry entry or override.
pub const SECTOR_OTHER: &str = "Other";

/// Best-effort resolution of a free-text identifier.
///
/// Resolution never fails: `code` is absent when no registry entry matched,
/// in which case `display_name` is the cleaned raw input, and `sector` falls
/// back to [`SECTOR_OTHER`] so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentifier {
    pub raw_input: String,
    pub code: Option<StockCode>,
    pub display_name: String,
    pub sector: String,
}

/// Which reconciliation tier produced a turnover value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// Operator-supplied override; trusted unconditionally.
    Override,
    /// Batched historical price-and-volume window.
    BatchHistory,
    /// Per-symbol latest-quote fallback.
    LiveQuote,
}

impl SourceTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::BatchHistory => "batch_history",
            Self::LiveQuote => "live_quote",
        }
    }
}

impl Display for SourceTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reconciled daily trading value for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRecord {
    /// Display name of the resolved symbol.
    pub symbol_key: String,
    /// Canonical code when resolution found one.
    pub code: Option<StockCode>,
    /// Turnover in normalized currency units.
    pub value: f64,
    /// Tier that produced the value.
    pub tier: SourceTier,
}

/// The five named selection strategies carried by each daily record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    WorkerStrong,
    WorkerTrend,
    BossPullback,
    BossBargain,
    TopRevenue,
}

impl Strategy {
    pub const ALL: [Self; 5] = [
        Self::WorkerStrong,
        Self::WorkerTrend,
        Self::BossPullback,
        Self::BossBargain,
        Self::TopRevenue,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorkerStrong => "worker_strong",
            Self::WorkerTrend => "worker_trend",
            Self::BossPullback => "boss_pullback",
            Self::BossBargain => "boss_bargain",
            Self::TopRevenue => "top_revenue",
        }
    }

    /// Operator-facing label shown on leaderboards.
    pub const fn label(self) -> &'static str {
        match self {
            Self::WorkerStrong => "強勢週",
            Self::WorkerTrend => "週趨勢",
            Self::BossPullback => "週拉回",
            Self::BossBargain => "廉價收購",
            Self::TopRevenue => "營收 TOP6",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-strategy stock-name lists for one day, already tokenized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionLists {
    #[serde(default)]
    pub worker_strong: Vec<String>,
    #[serde(default)]
    pub worker_trend: Vec<String>,
    #[serde(default)]
    pub boss_pullback: Vec<String>,
    #[serde(default)]
    pub boss_bargain: Vec<String>,
    #[serde(default)]
    pub top_revenue: Vec<String>,
}

impl SelectionLists {
    /// Build from the raw delimited strings of the source file.
    pub fn from_delimited(
        worker_strong: &str,
        worker_trend: &str,
        boss_pullback: &str,
        boss_bargain: &str,
        top_revenue: &str,
    ) -> Self {
        Self {
            worker_strong: split_names(worker_strong),
            worker_trend: split_names(worker_trend),
            boss_pullback: split_names(boss_pullback),
            boss_bargain: split_names(boss_bargain),
            top_revenue: split_names(top_revenue),
        }
    }

    pub fn for_strategy(&self, strategy: Strategy) -> &[String] {
        match strategy {
            Strategy::WorkerStrong => &self.worker_strong,
            Strategy::WorkerTrend => &self.worker_trend,
            Strategy::BossPullback => &self.boss_pullback,
            Strategy::BossBargain => &self.boss_bargain,
            Strategy::TopRevenue => &self.top_revenue,
        }
    }
}

/// Daily indicator counts surfaced on the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    #[serde(default)]
    pub part_time: u32,
    #[serde(default)]
    pub worker_strong: u32,
    #[serde(default)]
    pub worker_trend: u32,
}

/// One row of the daily signal history. Unique per `date`; the store
/// enforces uniqueness with upsert-on-save semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignalRecord {
    pub date: TradeDate,
    /// Categorical market-regime tag, possibly decorated (e.g. `強風*`).
    pub regime_label: String,
    #[serde(default)]
    pub counts: SignalCounts,
    #[serde(default)]
    pub lists: SelectionLists,
    /// Market index close carried alongside the label; boundary price for
    /// cycle-segment returns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_close: Option<f64>,
    /// Operator-authored turnover overrides for this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_overrides: Option<HashMap<String, f64>>,
    /// Display-only edit timestamp; not interpreted by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl DailySignalRecord {
    pub fn new(date: TradeDate, regime_label: impl Into<String>) -> Self {
        Self {
            date,
            regime_label: regime_label.into(),
            counts: SignalCounts::default(),
            lists: SelectionLists::default(),
            index_close: None,
            manual_overrides: None,
            last_updated: None,
        }
    }

    pub fn with_index_close(mut self, close: f64) -> Self {
        self.index_close = Some(close);
        self
    }

    pub fn with_lists(mut self, lists: SelectionLists) -> Self {
        self.lists = lists;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markers_removes_all_forms() {
        assert_eq!(strip_markers("群聯(CB)", &DEFAULT_DECORATION_MARKERS), "群聯");
        assert_eq!(strip_markers(" 強風＊ ", &DEFAULT_FOOTNOTE_MARKERS), "強風");
    }

    #[test]
    fn split_names_drops_empty_and_nan_tokens() {
        let tokens = split_names("台積電、 、nan、聯發科 ,鴻海");
        assert_eq!(tokens, vec!["台積電", "聯發科", "鴻海"]);
    }

    #[test]
    fn split_names_on_blank_input_is_empty() {
        assert!(split_names("").is_empty());
        assert!(split_names("  ").is_empty());
        assert!(split_names("nan").is_empty());
    }

    #[test]
    fn record_serde_round_trip_keeps_date_key() {
        let record = DailySignalRecord::new(
            TradeDate::parse("2024-01-02").expect("valid"),
            "強風",
        )
        .with_index_close(17500.0);

        let json = serde_json::to_string(&record).expect("serialize");
        let back: DailySignalRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }
}
