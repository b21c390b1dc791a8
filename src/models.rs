use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Meal label -> items logged under it, in upstream order.
pub type MealBreakdown = BTreeMap<String, Vec<FoodItem>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Sparse per-day totals as reported by the upstream trends endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTotals {
    /// `YYYY-MM-DD`
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
}

/// One slot of the gap-filled history window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    /// Absent when meals were not requested; empty when requested but none logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meals: Option<MealBreakdown>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSet {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// The upstream user behind a credential, resolved per request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub avatar: Option<String>,
    pub goals: GoalSet,
    pub current_streak: u32,
    pub total_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub total_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapZone {
    NoData,
    Low,
    Mid,
    Good,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: String,
    pub calories: f64,
    pub percent: f64,
    pub zone: HeatmapZone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    pub goals: GoalSet,
    pub current_streak: u32,
    pub total_days: u32,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
    pub meals: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GoalsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessResponse {
    pub valid: bool,
}
