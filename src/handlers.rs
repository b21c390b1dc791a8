use crate::errors::AppError;
use crate::history::{build_heatmap, build_history, day_meals};
use crate::models::{
    AccessRequest, AccessResponse, DayRecord, GoalSet, GoalsQuery, HeatmapQuery, HeatmapResponse,
    HistoryQuery, MealBreakdown, Profile,
};
use crate::profile::{PROFILE_WINDOW_DAYS, build_profile, goals_for};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use std::future::Future;
use tracing::warn;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = with_deadline(&state, build_profile(&state, &identity)).await?;
    Ok(Json(profile))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DayRecord>>, AppError> {
    let days = query.days.unwrap_or(PROFILE_WINDOW_DAYS);
    let include_meals = query.meals.unwrap_or(false);
    let history = with_deadline(
        &state,
        build_history(&state, &identity, days, include_meals),
    )
    .await?;
    Ok(Json(history))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapResponse>, AppError> {
    let days = query.days.unwrap_or(PROFILE_WINDOW_DAYS);
    let heatmap = with_deadline(&state, build_heatmap(&state, &identity, days)).await?;
    Ok(Json(heatmap))
}

pub async fn get_day_meals(
    State(state): State<AppState>,
    Path((identity, date)): Path<(String, String)>,
) -> Result<Json<MealBreakdown>, AppError> {
    let date = parse_date(&date)?;
    let meals = with_deadline(&state, day_meals(&state, &identity, date)).await?;
    Ok(Json(meals))
}

pub async fn get_goals(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Query(query): Query<GoalsQuery>,
) -> Result<Json<GoalSet>, AppError> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let goals = with_deadline(&state, goals_for(&state, &identity, date)).await?;
    Ok(Json(goals))
}

pub async fn check_access(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Json(payload): Json<AccessRequest>,
) -> Json<AccessResponse> {
    let valid = state.credentials.validate_access(&identity, &payload.secret);
    if !valid {
        warn!(%identity, "access secret rejected");
    }
    Json(AccessResponse { valid })
}

async fn with_deadline<T>(
    state: &AppState,
    work: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(state.config.request_deadline, work).await {
        Ok(result) => result,
        Err(_) => {
            warn!(deadline = ?state.config.request_deadline, "request deadline exceeded");
            Err(AppError::UpstreamUnavailable(
                "request deadline exceeded".to_string(),
            ))
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}
