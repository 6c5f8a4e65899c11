//! Concentration Scorer
//!
//! Maps holder-distribution percentages to a 0-100 health score.
//! Start at 100 and apply the first matching tier of each rule group,
//! largest threshold first:
//! - top-1 holder:  >40 → -60, >20 → -40, >10 → -20, >5 → -10
//! - top-10 holders: >60 → -50, >50 → -40, >35 → -30, ≥20 → -20
//! - holder count (0 = unknown): <100 → -20, <500 → -10, >2000 → +5
//!
//! Status bands on the clamped score:
//! - 85-100: Healthy Distribution
//! - 65-84: Moderate Concentration
//! - 40-64: High Concentration
//! - 0-39: Critical Centralization

use crate::models::types::{ConcentrationMetrics, ConcentrationStatus, ScoreResult};
use crate::utils::constants::round_to;

/// Score holder concentration. Pure and deterministic.
pub fn score_concentration(top1_percent: f64, top10_percent: f64, holder_count: u64) -> ScoreResult {
    let mut score = 100.0;

    score -= top1_penalty(top1_percent);
    score -= top10_penalty(top10_percent);
    score += holder_adjustment(holder_count);

    let score = score.clamp(0.0, 100.0);

    ScoreResult {
        score: round_to(score, 2),
        status: status_for(score),
        metrics: ConcentrationMetrics {
            top1_percent: round_to(top1_percent, 2),
            top10_percent: round_to(top10_percent, 2),
            gini_proxy: round_to(top1_percent / 100.0, 4),
            hhi_estimate: round_to(hhi_estimate(top1_percent, top10_percent), 2),
        },
    }
}

fn top1_penalty(top1: f64) -> f64 {
    if top1 > 40.0 {
        60.0
    } else if top1 > 20.0 {
        40.0
    } else if top1 > 10.0 {
        20.0
    } else if top1 > 5.0 {
        10.0
    } else {
        0.0
    }
}

fn top10_penalty(top10: f64) -> f64 {
    if top10 > 60.0 {
        50.0
    } else if top10 > 50.0 {
        40.0
    } else if top10 > 35.0 {
        30.0
    } else if top10 >= 20.0 {
        20.0
    } else {
        0.0
    }
}

fn holder_adjustment(holders: u64) -> f64 {
    match holders {
        0 => 0.0,
        1..=99 => -20.0,
        100..=499 => -10.0,
        2001.. => 5.0,
        _ => 0.0,
    }
}

/// Status band for a clamped score
pub fn status_for(score: f64) -> ConcentrationStatus {
    if score >= 85.0 {
        ConcentrationStatus::Healthy
    } else if score >= 65.0 {
        ConcentrationStatus::Moderate
    } else if score >= 40.0 {
        ConcentrationStatus::High
    } else {
        ConcentrationStatus::Critical
    }
}

/// HHI proxy: the top holder plus the remaining top-10 share spread evenly
/// over the other nine.
pub fn hhi_estimate(top1: f64, top10: f64) -> f64 {
    let avg_remaining = (top10 - top1).max(0.0) / 9.0;
    top1.powi(2) + 9.0 * avg_remaining.powi(2)
}
