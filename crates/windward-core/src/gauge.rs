//! Bias-and-streak to gauge-score mapping.
//!
//! A market bias value is bucketed into bands by a sorted boundary list;
//! each band owns an equal slice of the 0..=100 dial and the current
//! streak advances the needle linearly inside its band, capped at
//! [`GaugeConfig::max_streak`]. The mapping is monotonic in both inputs
//! and always lands inside `[0, 100]`.

use serde::{Deserialize, Serialize};

/// Gauge tuning: band boundaries and the streak saturation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Sorted bias thresholds; `n` boundaries define `n + 1` bands.
    pub boundaries: Vec<f64>,
    /// Streaks at or beyond this length pin the needle to the band top.
    pub max_streak: u32,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            boundaries: vec![-2.0, -0.5, 0.5, 2.0],
            max_streak: 10,
        }
    }
}

/// Maps `(bias, streak)` pairs onto the dial.
#[derive(Debug, Clone, Default)]
pub struct GaugeMapper {
    config: GaugeConfig,
}

impl GaugeMapper {
    pub fn new(mut config: GaugeConfig) -> Self {
        config
            .boundaries
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        config.boundaries.retain(|b| b.is_finite());
        Self { config }
    }

    /// Zero-based band index for a bias value.
    ///
    /// A bias exactly on a boundary belongs to the band above it.
    pub fn band(&self, bias: f64) -> usize {
        if !bias.is_finite() {
            return self.config.boundaries.len() / 2;
        }
        self.config
            .boundaries
            .iter()
            .filter(|boundary| bias >= **boundary)
            .count()
    }

    /// Gauge score in `[0, 100]`.
    pub fn score(&self, bias: f64, streak: u32) -> f64 {
        let bands = self.config.boundaries.len() + 1;
        let width = 100.0 / bands as f64;
        let cap = self.config.max_streak.max(1);
        let progress = f64::from(streak.min(cap)) / f64::from(cap);
        (self.band(bias) as f64 * width + progress * width).clamp(0.0, 100.0)
    }
}
