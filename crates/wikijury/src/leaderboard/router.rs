use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::warn;

use super::export::{to_csv_bytes, DEFAULT_EXPORT_FILE_NAME};
use super::schema::{DataType, SchemaError};
use super::scoring::ScoringOutcome;
use super::table::RawTable;
use super::views::{advisory_views, leaderboard_rows};
use super::{AnalysisOptions, AnalysisReport, LeaderboardEngine};

/// Service-wide defaults applied when a request leaves an option out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardDefaults {
    pub include_time_bonus: bool,
}

impl Default for LeaderboardDefaults {
    fn default() -> Self {
        Self {
            include_time_bonus: true,
        }
    }
}

/// An uploaded export sent inline as delimited text.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardRequest {
    pub data_type: String,
    pub csv: String,
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub include_time_bonus: Option<bool>,
}

/// Router builder exposing the ranking and export endpoints.
pub fn leaderboard_router(defaults: LeaderboardDefaults) -> Router {
    Router::new()
        .route("/api/v1/leaderboard", post(leaderboard_handler))
        .route("/api/v1/leaderboard/export", post(export_handler))
        .with_state(defaults)
}

pub(crate) async fn leaderboard_handler(
    State(defaults): State<LeaderboardDefaults>,
    axum::Json(request): axum::Json<LeaderboardRequest>,
) -> Response {
    let report = match run_analysis(defaults, request) {
        Ok(report) => report,
        Err(response) => return response,
    };

    let advisories = advisory_views(&report.advisories);
    let payload = match &report.outcome {
        ScoringOutcome::Ranked(table) => json!({
            "status": "ranked",
            "data_type": report.data_type,
            "mode": table.mode,
            "time_bonus_applied": table.time_bonus_applied,
            "advisories": advisories,
            "totals": report.totals(),
            "contributors": leaderboard_rows(table),
        }),
        ScoringOutcome::Failed(failure) => json!({
            "status": "failed",
            "data_type": report.data_type,
            "reason": failure.to_string(),
            "failure": failure,
            "advisories": advisories,
        }),
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn export_handler(
    State(defaults): State<LeaderboardDefaults>,
    axum::Json(request): axum::Json<LeaderboardRequest>,
) -> Response {
    let report = match run_analysis(defaults, request) {
        Ok(report) => report,
        Err(response) => return response,
    };

    let table = match &report.outcome {
        ScoringOutcome::Ranked(table) => table,
        ScoringOutcome::Failed(failure) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, failure.to_string());
        }
    };

    match to_csv_bytes(table) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DEFAULT_EXPORT_FILE_NAME}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

fn run_analysis(
    defaults: LeaderboardDefaults,
    request: LeaderboardRequest,
) -> Result<AnalysisReport, Response> {
    let data_type: DataType = request
        .data_type
        .parse()
        .map_err(|error: SchemaError| {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        })?;

    let raw = RawTable::from_csv_reader(request.csv.as_bytes()).map_err(|error| {
        warn!(%data_type, %error, "rejected uploaded table");
        error_response(StatusCode::BAD_REQUEST, error.to_string())
    })?;

    let options = AnalysisOptions {
        weights: request.weights,
        include_time_bonus: request
            .include_time_bonus
            .unwrap_or(defaults.include_time_bonus),
    };

    LeaderboardEngine::new(data_type)
        .analyze(&raw, &options)
        .map_err(|error| error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()))
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
