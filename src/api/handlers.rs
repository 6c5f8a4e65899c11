//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;

use super::types::*;
use crate::core::analyzer::TokenAnalyzer;
use crate::models::types::TokenReport;
use crate::utils::constants::APP_VERSION;

/// Shared application state
pub struct AppState {
    pub analyzer: Arc<TokenAnalyzer>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(analyzer: Arc<TokenAnalyzer>) -> Self {
        Self {
            analyzer,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        analyzer: state.analyzer.stats(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Token Analysis
// ============================================

/// GET /v1/analyze/:mint
pub async fn analyze_token(
    State(state): State<Arc<AppState>>,
    Path(mint): Path<String>,
) -> Result<Json<ApiResponse<TokenReport>>, (StatusCode, Json<ApiResponse<()>>)> {
    let start = Instant::now();

    match state.analyzer.analyze(&mint).await {
        Ok(report) => Ok(Json(ApiResponse::success(report, elapsed_ms(start)))),
        Err(err) => {
            let status = StatusCode::from_u16(err.code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((
                status,
                Json(ApiResponse::error(ApiError::from(&err), elapsed_ms(start))),
            ))
        }
    }
}
