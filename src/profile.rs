use crate::errors::AppError;
use crate::history::{assemble_history, history_window};
use crate::models::{GoalSet, Profile};
use crate::state::AppState;
use crate::stats::{age_on, compute_streak_and_total_days_at, parse_day};
use chrono::{Local, NaiveDate};
use tracing::{error, info};

/// Days of history behind the streak and total-days figures.
pub const PROFILE_WINDOW_DAYS: i64 = 90;

pub async fn build_profile(state: &AppState, identity: &str) -> Result<Profile, AppError> {
    build_profile_at(state, Local::now().date_naive(), identity).await
}

/// Today's goals stand in for the whole window.
pub async fn build_profile_at(
    state: &AppState,
    today: NaiveDate,
    identity: &str,
) -> Result<Profile, AppError> {
    let credential = state.credentials.get(identity)?;
    let upstream = state.source.resolve_identity(credential).await.map_err(|err| {
        error!(%identity, error = %err, "failed to resolve upstream profile");
        AppError::from(err)
    })?;

    let window = history_window(today, PROFILE_WINDOW_DAYS, PROFILE_WINDOW_DAYS)?;
    let (goals, history) = tokio::try_join!(
        async {
            state
                .source
                .fetch_goals(credential, today)
                .await
                .map_err(|err| {
                    error!(%identity, error = %err, "failed to fetch goals");
                    AppError::from(err)
                })
        },
        assemble_history(state, credential, &upstream.user_id, &window, false),
    )?;

    let summary = compute_streak_and_total_days_at(today, &history);
    let age = upstream
        .birth_date
        .as_deref()
        .and_then(parse_day)
        .and_then(|birth| age_on(birth, today));

    info!(
        %identity,
        current_streak = summary.current_streak,
        total_days = summary.total_days,
        "profile built"
    );

    Ok(Profile {
        name: upstream.name.unwrap_or_else(|| identity.to_string()),
        avatar: upstream.avatar,
        goals,
        current_streak: summary.current_streak,
        total_days: summary.total_days,
        age,
        gender: upstream.gender,
    })
}

pub async fn goals_for(
    state: &AppState,
    identity: &str,
    date: Option<NaiveDate>,
) -> Result<GoalSet, AppError> {
    let credential = state.credentials.get(identity)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let goals = state.source.fetch_goals(credential, date).await?;
    Ok(goals)
}
