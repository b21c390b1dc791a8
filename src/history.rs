use crate::credentials::Credential;
use crate::errors::AppError;
use crate::models::{DailyTotals, DayRecord, HeatmapCell, HeatmapResponse, MealBreakdown};
use crate::state::AppState;
use crate::stats::{
    compute_streak_and_total_days_at, date_key, heatmap_zone, percent_of_goal, round1,
};
use crate::upstream::NutritionSource;
use chrono::{Duration, Local, NaiveDate};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{error, info, warn};

pub async fn build_history(
    state: &AppState,
    identity: &str,
    days: i64,
    include_meals: bool,
) -> Result<Vec<DayRecord>, AppError> {
    build_history_at(state, Local::now().date_naive(), identity, days, include_meals).await
}

/// Gap-filled window of `days` calendar days ending at `today`, oldest first.
pub async fn build_history_at(
    state: &AppState,
    today: NaiveDate,
    identity: &str,
    days: i64,
    include_meals: bool,
) -> Result<Vec<DayRecord>, AppError> {
    let window = history_window(today, days, state.config.history_max_days)?;
    let credential = state.credentials.get(identity)?;
    let binding = state.source.resolve_identity(credential).await.map_err(|err| {
        error!(%identity, error = %err, "failed to resolve upstream identity");
        AppError::from(err)
    })?;

    let history =
        assemble_history(state, credential, &binding.user_id, &window, include_meals).await?;
    info!(
        %identity,
        days,
        include_meals,
        logged_days = history.iter().filter(|day| day.calories > 0.0).count(),
        "history built"
    );
    Ok(history)
}

pub async fn build_heatmap(
    state: &AppState,
    identity: &str,
    days: i64,
) -> Result<HeatmapResponse, AppError> {
    build_heatmap_at(state, Local::now().date_naive(), identity, days).await
}

/// Colors every day of the window against today's calorie goal.
pub async fn build_heatmap_at(
    state: &AppState,
    today: NaiveDate,
    identity: &str,
    days: i64,
) -> Result<HeatmapResponse, AppError> {
    let window = history_window(today, days, state.config.history_max_days)?;
    let credential = state.credentials.get(identity)?;
    let binding = state.source.resolve_identity(credential).await?;

    let (goals, history) = tokio::try_join!(
        async {
            state
                .source
                .fetch_goals(credential, today)
                .await
                .map_err(AppError::from)
        },
        assemble_history(state, credential, &binding.user_id, &window, false),
    )?;

    let summary = compute_streak_and_total_days_at(today, &history);
    let cells = history
        .iter()
        .map(|day| {
            let percent = percent_of_goal(day.calories, goals.calories);
            HeatmapCell {
                date: day.date.clone(),
                calories: day.calories,
                percent: round1(percent),
                zone: heatmap_zone(percent),
            }
        })
        .collect();

    Ok(HeatmapResponse {
        goals,
        current_streak: summary.current_streak,
        total_days: summary.total_days,
        cells,
    })
}

/// Single-day lookup; unlike the history fan-out, failures surface.
pub async fn day_meals(
    state: &AppState,
    identity: &str,
    date: NaiveDate,
) -> Result<MealBreakdown, AppError> {
    let credential = state.credentials.get(identity)?;
    let meals = state.source.fetch_food_entries(credential, date).await?;
    Ok(meals)
}

pub fn history_window(
    today: NaiveDate,
    days: i64,
    max_days: i64,
) -> Result<Vec<NaiveDate>, AppError> {
    if days <= 0 {
        return Err(AppError::invalid_input("days must be positive"));
    }
    if days > max_days {
        return Err(AppError::invalid_input(format!("days must not exceed {max_days}")));
    }
    Ok((0..days)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect())
}

pub(crate) async fn assemble_history(
    state: &AppState,
    credential: &Credential,
    user_id: &str,
    window: &[NaiveDate],
    include_meals: bool,
) -> Result<Vec<DayRecord>, AppError> {
    let (Some(start), Some(end)) = (window.first().copied(), window.last().copied()) else {
        return Err(AppError::invalid_input("empty history window"));
    };
    let source = state.source.as_ref();
    let concurrency = state.config.meal_fetch_concurrency;

    let (totals, meals) = futures::join!(
        source.fetch_daily_totals(credential, user_id, start, end),
        async {
            if include_meals {
                Some(fetch_window_meals(source, credential, window, concurrency).await)
            } else {
                None
            }
        }
    );
    let totals = totals.map_err(|err| {
        error!(identity = %credential.identity, error = %err, "failed to fetch daily totals");
        AppError::from(err)
    })?;

    let keys: Vec<String> = window.iter().copied().map(date_key).collect();
    let mut by_date: HashMap<&str, &DailyTotals> = HashMap::with_capacity(totals.len());
    for row in &totals {
        by_date.entry(row.date.as_str()).or_insert(row);
    }

    let mut meals = meals.map(Vec::into_iter);
    let history = keys
        .iter()
        .map(|key| {
            let day_meals = meals.as_mut().map(|iter| iter.next().unwrap_or_default());
            match by_date.get(key.as_str()) {
                Some(row) => DayRecord {
                    date: key.clone(),
                    calories: round1(row.calories),
                    protein: round1(row.protein),
                    carbs: round1(row.carbs),
                    fat: round1(row.fat),
                    fiber: row.fiber.map(round1),
                    sugars: row.sugars.map(round1),
                    sodium: row.sodium.map(round1),
                    meals: day_meals,
                },
                None => empty_day(key.clone(), day_meals),
            }
        })
        .collect();

    Ok(history)
}

fn empty_day(date: String, meals: Option<MealBreakdown>) -> DayRecord {
    DayRecord {
        date,
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: None,
        sugars: None,
        sodium: None,
        meals,
    }
}

/// One breakdown per window date, in window order. A failed day is empty.
async fn fetch_window_meals(
    source: &dyn NutritionSource,
    credential: &Credential,
    window: &[NaiveDate],
    concurrency: usize,
) -> Vec<MealBreakdown> {
    stream::iter(window.iter().copied())
        .map(|date| async move {
            match source.fetch_food_entries(credential, date).await {
                Ok(meals) => meals,
                Err(err) => {
                    warn!(
                        identity = %credential.identity,
                        %date,
                        error = %err,
                        "food entries unavailable, using empty breakdown"
                    );
                    MealBreakdown::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
