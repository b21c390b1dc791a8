use crate::models::{DayRecord, HeatmapZone, StreakSummary};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

/// `value / goal * 100`.
///
/// A goal of zero (or below) means no target is set: nothing logged is 0%,
/// anything logged counts as on target (100%).
pub fn percent_of_goal(value: f64, goal: f64) -> f64 {
    if goal.is_nan() || goal <= 0.0 {
        return if value > 0.0 { 100.0 } else { 0.0 };
    }
    value / goal * 100.0
}

/// Distance from 100% where overshooting counts half as much as undershooting.
pub fn adjusted_distance(percentage: f64) -> f64 {
    if percentage < 100.0 {
        100.0 - percentage
    } else {
        (percentage - 100.0) * 0.5
    }
}

pub fn heatmap_zone(percentage: f64) -> HeatmapZone {
    if percentage.is_nan() || percentage <= 0.0 {
        return HeatmapZone::NoData;
    }

    let distance = adjusted_distance(percentage);
    if distance <= 15.0 {
        HeatmapZone::Good
    } else if distance <= 30.0 {
        HeatmapZone::Mid
    } else if distance <= 50.0 {
        HeatmapZone::Low
    } else {
        HeatmapZone::High
    }
}

/// Streak counts back from `today`, which is not exempt while still in progress.
pub fn compute_streak_and_total_days_at(today: NaiveDate, days: &[DayRecord]) -> StreakSummary {
    let total_days = days.iter().filter(|day| day.calories > 0.0).count() as u32;

    let calories_by_date: HashMap<&str, f64> = days
        .iter()
        .map(|day| (day.date.as_str(), day.calories))
        .collect();

    let mut current_streak = 0u32;
    for offset in 0..days.len() {
        let date = date_key(today - Duration::days(offset as i64));
        match calories_by_date.get(date.as_str()) {
            Some(calories) if *calories > 0.0 => current_streak += 1,
            _ => break,
        }
    }

    StreakSummary {
        current_streak,
        total_days,
    }
}

/// Whole years, one less if this year's birthday hasn't come yet.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth_date > today {
        return None;
    }
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar day of an upstream date or timestamp, read from its `YYYY-MM-DD` prefix.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

pub fn day_key(raw: &str) -> Option<String> {
    parse_day(raw).map(date_key)
}
