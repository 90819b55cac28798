//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::VettingPipeline;
use crate::models::AppError;
use crate::utils::VettingTelemetry;

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub pipeline: Arc<VettingPipeline>,
    pub telemetry: Arc<VettingTelemetry>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(pipeline: VettingPipeline) -> Self {
        Self::with_rate_limiter(pipeline, Arc::new(RateLimiter::default()))
    }

    pub fn with_rate_limiter(pipeline: VettingPipeline, rate_limiter: Arc<RateLimiter>) -> Self {
        let telemetry = pipeline.telemetry();
        Self {
            pipeline: Arc::new(pipeline),
            telemetry,
            rate_limiter,
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

/// Map an `AppError` onto its HTTP status and error envelope
fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = err.code_str(), "❌ {}", err.message);
    } else {
        warn!(code = err.code_str(), "🚫 {}", err.message);
    }
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        tier_config_version: state.pipeline.tiers().version.clone(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Single Scan
// ============================================

pub async fn scan_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScanData>>), ApiFailure> {
    let start = Instant::now();

    let report = state
        .pipeline
        .vet(&req.contract_address)
        .await
        .map_err(|e| failure(&e, start))?;

    if report.snapshot.is_fully_unknown() {
        return Err(failure(
            &AppError::upstream_unavailable(format!(
                "No upstream provider returned data for {}",
                report.address
            )),
            start,
        ));
    }

    let data = ScanData::from(&report);

    if report.is_too_young() {
        let message = report
            .classification
            .reason
            .as_ref()
            .map(|r| r.message())
            .unwrap_or_default();
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::rejected(data, ApiError::too_young(message), elapsed_ms(start))),
        ));
    }

    Ok((StatusCode::OK, Json(ApiResponse::success(data, elapsed_ms(start)))))
}

// ============================================
// Batch Scan
// ============================================

pub async fn batch_scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<ApiResponse<BatchData>>, ApiFailure> {
    let start = Instant::now();

    let report = state
        .pipeline
        .vet_batch(&req.contract_addresses)
        .await
        .map_err(|e| failure(&e, start))?;

    info!(
        "📦 Batch {} processed in {:.0}ms",
        report.batch_id, report.processing_time_ms
    );

    Ok(Json(ApiResponse::success(BatchData::from(&report), elapsed_ms(start))))
}

// ============================================
// Tiers
// ============================================

pub async fn list_tiers(State(state): State<Arc<AppState>>) -> Json<ApiResponse<TiersData>> {
    let start = Instant::now();
    let tiers = state.pipeline.tiers();

    let data = TiersData {
        version: tiers.version.clone(),
        min_project_age_days: tiers.min_project_age_days.max(state.pipeline.config().min_age_days),
        tiers: tiers.tiers.clone(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        vetting: state.telemetry.snapshot(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
