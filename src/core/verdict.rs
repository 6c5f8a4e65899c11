//! Verdict Synthesizer
//!
//! Fuses structural, whale, dominance and price signals into one risk score.
//! Contributions are independent and additive; the total is clamped to
//! [0, 100] only once, at the end.

use crate::models::types::{
    ConcentrationStatus, CorrelationVerdict, DominanceShiftResult, PriceSignal, RiskIntensity,
    RiskVerdict, WhalePressure, WhalePressureResult,
};
use crate::utils::constants::{
    round_to, CAUSAL_FLOW_THRESHOLD, PRICE_MOVE_THRESHOLD, SLOPE_REGIME_THRESHOLD,
};

const NO_ANOMALIES: &str = "No major anomalies detected.";

/// Synthesize the final verdict. Pure and deterministic.
pub fn synthesize_verdict(
    status: ConcentrationStatus,
    whale: &WhalePressureResult,
    dominance: &DominanceShiftResult,
    price: &PriceSignal,
) -> RiskVerdict {
    let mut risk = 0.0;
    let mut notes: Vec<&'static str> = Vec::new();

    // Structural
    match status {
        ConcentrationStatus::Critical => {
            risk += 40.0;
            notes.push("Extreme centralization.");
        }
        ConcentrationStatus::High => {
            risk += 30.0;
            notes.push("High holder concentration.");
        }
        ConcentrationStatus::Moderate => risk += 15.0,
        ConcentrationStatus::Healthy => {}
    }

    // Whales & bundle
    if whale.bundle.detected {
        risk += 50.0;
        notes.push("INSIDER BUNDLE DETECTED.");
    }
    match whale.pressure {
        WhalePressure::StrongDistribution => {
            risk += 25.0;
            notes.push("Whales dumping.");
        }
        WhalePressure::Distribution => risk += 15.0,
        _ => {}
    }

    // Dominance trend
    if dominance.slope > SLOPE_REGIME_THRESHOLD {
        risk += 20.0;
        notes.push("Top holder accumulating fast.");
    }

    // Causality: who is moving the price
    let (correlation, adjustment, note) =
        correlate(price.price_change_1h, whale.net_flow_percent_supply);
    risk += adjustment;
    notes.extend(note);

    let risk = risk.clamp(0.0, 100.0);
    let (risk_intensity, label) = intensity_for(risk);

    RiskVerdict {
        risk_score: round_to(risk, 2),
        risk_intensity,
        verdict_label: label.to_string(),
        verdict_description: if notes.is_empty() {
            NO_ANOMALIES.to_string()
        } else {
            notes.join(" ")
        },
        correlation_verdict: correlation,
    }
}

/// Classify a 1h price move against whale net flow
fn correlate(price_change: f64, whale_flow: f64) -> (CorrelationVerdict, f64, Option<&'static str>) {
    if price_change > PRICE_MOVE_THRESHOLD {
        if whale_flow > CAUSAL_FLOW_THRESHOLD {
            (CorrelationVerdict::WhaleDrivenPump, 0.0, None)
        } else if whale_flow < -CAUSAL_FLOW_THRESHOLD {
            (
                CorrelationVerdict::WhalesSellingIntoPump,
                25.0,
                Some("Exit liquidity trap detected."),
            )
        } else {
            (CorrelationVerdict::OrganicRally, 0.0, None)
        }
    } else if price_change < -PRICE_MOVE_THRESHOLD {
        if whale_flow < -CAUSAL_FLOW_THRESHOLD {
            (CorrelationVerdict::WhaleDrivenDump, 10.0, None)
        } else if whale_flow > CAUSAL_FLOW_THRESHOLD {
            (
                CorrelationVerdict::WhalesAbsorbingDip,
                -15.0,
                Some("Smart money buying the dip."),
            )
        } else {
            (CorrelationVerdict::RetailPanicSell, 0.0, None)
        }
    } else {
        (CorrelationVerdict::Neutral, 0.0, None)
    }
}

fn intensity_for(risk: f64) -> (RiskIntensity, &'static str) {
    if risk >= 80.0 {
        (RiskIntensity::Critical, "HIGH RUG RISK")
    } else if risk >= 50.0 {
        (RiskIntensity::High, "CAUTION ADVISED")
    } else if risk >= 25.0 {
        (RiskIntensity::Medium, "MODERATE RISK")
    } else {
        (RiskIntensity::Low, "STABLE/HEALTHY")
    }
}
