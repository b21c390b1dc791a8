use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/profile/:identity", get(handlers::get_profile))
        .route("/api/history/:identity", get(handlers::get_history))
        .route("/api/heatmap/:identity", get(handlers::get_heatmap))
        .route("/api/goals/:identity", get(handlers::get_goals))
        .route("/api/meals/:identity/:date", get(handlers::get_day_meals))
        .route("/api/access/:identity", post(handlers::check_access))
        .with_state(state)
}
