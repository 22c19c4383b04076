//! Regime streak counting and cycle segmentation.
//!
//! Daily records carry a free-form wind label such as `強風` or `無風`.
//! This module answers three questions about a label history:
//!
//! * how long has the current label persisted ([`current_streak`]),
//! * which of three coarse buckets does a label fall into
//!   ([`CycleClassifier::classify`]),
//! * where are the bucket boundaries and what did the index do inside
//!   each run ([`CycleClassifier::segment`]).
//!
//! Classification is total: every label, including blank or unknown
//! ones, maps to exactly one [`CycleBucket`].

use serde::{Deserialize, Serialize};

use crate::domain::{
    strip_markers, DailySignalRecord, TradeDate, DEFAULT_DECORATION_MARKERS,
    DEFAULT_FOOTNOTE_MARKERS,
};

/// Normalize a raw wind label for comparison.
///
/// Decoration and footnote markers are stripped, whitespace trimmed,
/// and sentinel strings left behind by tabular exports (`nan`, `NaN`)
/// collapse to the empty label. A decorated `強風*` therefore extends
/// a `強風` streak instead of breaking it.
pub fn clean_label(raw: &str) -> String {
    let stripped = strip_markers(raw, &DEFAULT_DECORATION_MARKERS);
    let stripped = strip_markers(&stripped, &DEFAULT_FOOTNOTE_MARKERS);
    if stripped.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    stripped
}

/// The current label and how many consecutive trailing days carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub label: String,
    pub length: usize,
}

/// Count the trailing run of the most recent label.
///
/// `labels` must be in chronological order. An empty history, or a most
/// recent label that cleans to empty, yields a zero-length streak.
pub fn current_streak(labels: &[String]) -> Streak {
    let Some(last_raw) = labels.last() else {
        return Streak {
            label: String::new(),
            length: 0,
        };
    };
    let label = clean_label(last_raw);
    if label.is_empty() {
        return Streak { label, length: 0 };
    }
    let length = labels
        .iter()
        .rev()
        .take_while(|raw| clean_label(raw) == label)
        .count();
    Streak { label, length }
}

/// Count the current streak over daily records, honouring an optional
/// cutoff date.
///
/// Only rows dated at or before `as_of` participate; records may arrive
/// in any order and are sorted chronologically before counting.
pub fn streak_as_of(history: &[DailySignalRecord], as_of: Option<TradeDate>) -> Streak {
    let mut rows: Vec<(&TradeDate, &str)> = history
        .iter()
        .filter(|record| as_of.is_none_or(|cutoff| record.date <= cutoff))
        .map(|record| (&record.date, record.regime_label.as_str()))
        .collect();
    rows.sort_by_key(|(date, _)| **date);

    let labels: Vec<String> = rows
        .into_iter()
        .map(|(_, label)| label.to_owned())
        .collect();
    current_streak(&labels)
}

/// Coarse cycle bucket for a wind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleBucket {
    Active,
    Passive,
    Transition,
}

impl CycleBucket {
    pub const ALL: [Self; 3] = [Self::Active, Self::Passive, Self::Transition];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
            Self::Transition => "transition",
        }
    }
}

impl std::fmt::Display for CycleBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker substrings that route a label into a bucket.
///
/// A label containing an active marker classifies `Active`, a passive
/// marker `Passive`; containing both, or neither, is `Transition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleRules {
    pub active_markers: Vec<String>,
    pub passive_markers: Vec<String>,
}

impl Default for CycleRules {
    fn default() -> Self {
        Self {
            active_markers: vec!["強".to_owned(), "亂".to_owned()],
            passive_markers: vec!["無".to_owned()],
        }
    }
}

/// One maximal run of consecutive days in the same bucket.
///
/// `end_date` is exclusive: the first day of the next run, or the day
/// after the final observation. `open` is the previous run's closing
/// index level so that returns chain across boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSegment {
    pub bucket: CycleBucket,
    pub start_date: TradeDate,
    pub end_date: TradeDate,
    pub open: f64,
    pub close: f64,
    pub return_pct: f64,
}

/// One observation fed to the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimePoint {
    pub date: TradeDate,
    pub label: String,
    pub close: f64,
}

/// Average index performance of one bucket across its segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPerformance {
    pub bucket: CycleBucket,
    pub segments: usize,
    pub avg_return_pct: f64,
}

/// Applies a [`CycleRules`] table to labels and label histories.
#[derive(Debug, Clone, Default)]
pub struct CycleClassifier {
    rules: CycleRules,
}

impl CycleClassifier {
    pub fn new(rules: CycleRules) -> Self {
        Self { rules }
    }

    /// Bucket a single label. Total over all inputs.
    pub fn classify(&self, raw: &str) -> CycleBucket {
        let label = clean_label(raw);
        let active = self
            .rules
            .active_markers
            .iter()
            .any(|marker| label.contains(marker.as_str()));
        let passive = self
            .rules
            .passive_markers
            .iter()
            .any(|marker| label.contains(marker.as_str()));
        match (active, passive) {
            (true, false) => CycleBucket::Active,
            (false, true) => CycleBucket::Passive,
            _ => CycleBucket::Transition,
        }
    }

    /// Split a chronological history into maximal same-bucket runs.
    ///
    /// Each segment's return measures the index from the previous run's
    /// close to this run's close; the opening segment measures from its
    /// own first observation, so a single-day opening run returns zero.
    pub fn segment(&self, points: &[RegimePoint]) -> Vec<CycleSegment> {
        let Some(first) = points.first() else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        let mut bucket = self.classify(&first.label);
        let mut start_date = first.date;
        let mut open = first.close;
        let mut last_close = first.close;
        let mut last_date = first.date;

        for point in &points[1..] {
            let next_bucket = self.classify(&point.label);
            if next_bucket != bucket {
                segments.push(CycleSegment {
                    bucket,
                    start_date,
                    end_date: point.date,
                    open,
                    close: last_close,
                    return_pct: percent_change(open, last_close),
                });
                bucket = next_bucket;
                start_date = point.date;
                open = last_close;
            }
            last_close = point.close;
            last_date = point.date;
        }

        segments.push(CycleSegment {
            bucket,
            start_date,
            end_date: last_date.next_day(),
            open,
            close: last_close,
            return_pct: percent_change(open, last_close),
        });
        segments
    }

    /// Average each bucket's segment returns, scaled by `leverage`.
    ///
    /// Buckets are reported in [`CycleBucket::ALL`] order, including
    /// buckets that never occurred (zero segments, zero return).
    pub fn bucket_returns(&self, segments: &[CycleSegment], leverage: f64) -> Vec<BucketPerformance> {
        CycleBucket::ALL
            .iter()
            .map(|&bucket| {
                let returns: Vec<f64> = segments
                    .iter()
                    .filter(|s| s.bucket == bucket)
                    .map(|s| s.return_pct)
                    .collect();
                let avg = if returns.is_empty() {
                    0.0
                } else {
                    returns.iter().sum::<f64>() / returns.len() as f64
                };
                BucketPerformance {
                    bucket,
                    segments: returns.len(),
                    avg_return_pct: avg * leverage,
                }
            })
            .collect()
    }
}

fn percent_change(open: f64, close: f64) -> f64 {
    if open == 0.0 || !open.is_finite() || !close.is_finite() {
        return 0.0;
    }
    (close - open) / open * 100.0
}
