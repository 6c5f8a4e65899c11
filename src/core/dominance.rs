//! Dominance Time-Series Tracker
//!
//! Records the largest holder's share on every analysis and reads the trend
//! off the bounded history:
//! - shift: change since the previous observation
//! - slope: least-squares fit of share against hours since the first sample
//! - volatility: population standard deviation of the stored shares

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::config::DominanceConfig;
use crate::models::types::{DominanceRegime, DominanceSample, DominanceShiftResult, DominanceStatus};
use crate::store::{DominanceStore, FileStore};
use crate::utils::constants::{round_to, SHIFT_STATUS_THRESHOLD, SLOPE_REGIME_THRESHOLD, VOLATILITY_REGIME_THRESHOLD};

pub struct DominanceTracker {
    store: Arc<dyn DominanceStore>,
    history_limit: usize,
}

impl DominanceTracker {
    pub fn new(store: Arc<dyn DominanceStore>, history_limit: usize) -> Self {
        Self { store, history_limit }
    }

    /// File-backed tracker at the configured location
    pub fn from_config(config: &DominanceConfig) -> Self {
        Self::new(Arc::new(FileStore::from_config(config)), config.history_limit)
    }

    /// Record `top1_percent` now and analyze the resulting history
    pub async fn update(&self, mint: &str, top1_percent: f64) -> DominanceShiftResult {
        self.update_at(mint, top1_percent, Utc::now().timestamp()).await
    }

    /// Record an observation at an explicit unix timestamp
    pub async fn update_at(&self, mint: &str, top1_percent: f64, ts: i64) -> DominanceShiftResult {
        let sample = DominanceSample { ts, val: top1_percent };
        let appended = self.store.append(mint, sample, self.history_limit).await;
        if !appended.durable {
            warn!("💾 Dominance update for {} not persisted", mint);
        }

        let result = analyze_history(&appended.history, top1_percent);
        debug!(
            "📈 Dominance {}: shift={} slope={} regime={}",
            mint,
            result.shift,
            result.slope,
            result.regime.label()
        );
        result
    }

    /// Stored history for a token, oldest first
    pub async fn history(&self, mint: &str) -> Vec<DominanceSample> {
        self.store.get(mint).await
    }
}

/// Derive shift, slope, volatility, regime and status from a history whose
/// last entry is the current observation
pub fn analyze_history(history: &[DominanceSample], current_top1: f64) -> DominanceShiftResult {
    if history.len() < 2 {
        return DominanceShiftResult::first_record(current_top1);
    }

    let previous = history[history.len() - 2].val;
    let shift = current_top1 - previous;
    let slope = regression_slope(history);
    let volatility = volatility(history);

    let regime = if slope > SLOPE_REGIME_THRESHOLD {
        DominanceRegime::AggressiveConsolidation
    } else if slope < -SLOPE_REGIME_THRESHOLD {
        DominanceRegime::RapidDilution
    } else if volatility > VOLATILITY_REGIME_THRESHOLD {
        DominanceRegime::VolatileReallocation
    } else {
        DominanceRegime::Stable
    };

    let status = if shift > SHIFT_STATUS_THRESHOLD {
        DominanceStatus::Accumulation
    } else if shift < -SHIFT_STATUS_THRESHOLD {
        DominanceStatus::Distribution
    } else {
        DominanceStatus::Stable
    };

    DominanceShiftResult {
        previous_top1: previous,
        current_top1,
        shift: round_to(shift, 2),
        slope: round_to(slope, 4),
        volatility: round_to(volatility, 2),
        regime,
        status,
    }
}

/// OLS slope of share (percent) per hour; 0 when all samples share a timestamp
pub fn regression_slope(history: &[DominanceSample]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }

    let start = history[0].ts;
    let n = history.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for sample in history {
        let x = (sample.ts - start) as f64 / 3600.0;
        let y = sample.val;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Population standard deviation of the stored shares
pub fn volatility(history: &[DominanceSample]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let n = history.len() as f64;
    let mean = history.iter().map(|s| s.val).sum::<f64>() / n;
    let variance = history.iter().map(|s| (s.val - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
