use crate::credentials::Credential;
use crate::meals::{FoodEntry, build_meal_breakdown};
use crate::models::{DailyTotals, GoalSet, MealBreakdown, UpstreamProfile};
use crate::stats::{date_key, day_key};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Malformed(String),
}

/// The upstream fitness API, as seen by the aggregators.
#[async_trait]
pub trait NutritionSource: Send + Sync {
    async fn resolve_identity(
        &self,
        credential: &Credential,
    ) -> Result<UpstreamProfile, UpstreamError>;

    async fn fetch_goals(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<GoalSet, UpstreamError>;

    /// Sparse: only dates with logged data are returned.
    async fn fetch_daily_totals(
        &self,
        credential: &Credential,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTotals>, UpstreamError>;

    /// A day with nothing logged is an empty breakdown, not an error.
    async fn fetch_food_entries(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<MealBreakdown, UpstreamError>;
}

pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("http client setup: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `Ok(None)` on 404; any other non-success status is unavailable.
    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(identity = %credential.identity, %url, "upstream request");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&credential.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("GET {path}: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "GET {path} returned {status}"
            )));
        }

        resp.json::<T>()
            .await
            .map(Some)
            .map_err(|e| UpstreamError::Malformed(format!("GET {path}: {e}")))
    }

    async fn get_required<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        self.get_json(credential, path, query)
            .await?
            .ok_or_else(|| UpstreamError::Unavailable(format!("GET {path} returned 404 Not Found")))
    }

    fn absolute_avatar(&self, avatar: &str) -> String {
        if avatar.starts_with("http://") || avatar.starts_with("https://") {
            avatar.to_string()
        } else {
            format!("{}/{}", self.base_url, avatar.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl NutritionSource for UpstreamClient {
    async fn resolve_identity(
        &self,
        credential: &Credential,
    ) -> Result<UpstreamProfile, UpstreamError> {
        let body: ProfileBody = self.get_required(credential, "/auth/profiles", &[]).await?;
        let mut profile = body.into_profile()?;
        profile.avatar = profile.avatar.map(|avatar| self.absolute_avatar(&avatar));
        Ok(profile)
    }

    async fn fetch_goals(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<GoalSet, UpstreamError> {
        let path = format!("/goals/by-date/{}", date_key(date));
        let raw: RawGoals = self.get_required(credential, &path, &[]).await?;
        Ok(GoalSet {
            calories: raw.calories,
            protein: raw.protein,
            carbs: raw.carbs,
            fat: raw.fat,
        })
    }

    async fn fetch_daily_totals(
        &self,
        credential: &Credential,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTotals>, UpstreamError> {
        let start = date_key(start);
        let end = date_key(end);
        let rows: Vec<RawTrend> = self
            .get_required(
                credential,
                "/reports/mini-nutrition-trends",
                &[
                    ("userId", user_id),
                    ("startDate", start.as_str()),
                    ("endDate", end.as_str()),
                ],
            )
            .await?;

        Ok(rows.into_iter().filter_map(RawTrend::into_totals).collect())
    }

    async fn fetch_food_entries(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<MealBreakdown, UpstreamError> {
        let path = format!("/food-entries/by-date/{}", date_key(date));
        let entries: Vec<FoodEntry> = self
            .get_json(credential, &path, &[])
            .await?
            .unwrap_or_default();
        Ok(build_meal_breakdown(&entries))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Many(Vec<RawProfile>),
    One(RawProfile),
}

impl ProfileBody {
    fn into_profile(self) -> Result<UpstreamProfile, UpstreamError> {
        let raw = match self {
            ProfileBody::One(raw) => raw,
            ProfileBody::Many(list) => list
                .into_iter()
                .next()
                .ok_or_else(|| UpstreamError::Malformed("profile list is empty".into()))?,
        };

        let user_id = match raw.id {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => return Err(UpstreamError::Malformed("profile is missing its id".into())),
        };

        Ok(UpstreamProfile {
            user_id,
            name: non_empty(raw.full_name),
            avatar: non_empty(raw.avatar_url),
            birth_date: non_empty(raw.date_of_birth),
            gender: non_empty(raw.gender),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    date_of_birth: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGoals {
    #[serde(default, deserialize_with = "lenient_f64")]
    calories: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    protein: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    carbs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    fat: f64,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    #[serde(default)]
    date: Option<String>,
    #[serde(default, alias = "total_calories", deserialize_with = "lenient_f64")]
    calories: f64,
    #[serde(default, alias = "total_protein", deserialize_with = "lenient_f64")]
    protein: f64,
    #[serde(default, alias = "total_carbs", deserialize_with = "lenient_f64")]
    carbs: f64,
    #[serde(default, alias = "total_fat", deserialize_with = "lenient_f64")]
    fat: f64,
    #[serde(default, alias = "dietary_fiber", deserialize_with = "lenient_opt_f64")]
    fiber: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    sugars: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    sodium: Option<f64>,
}

impl RawTrend {
    fn into_totals(self) -> Option<DailyTotals> {
        let date = day_key(self.date.as_deref()?)?;
        Some(DailyTotals {
            date,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugars: self.sugars,
            sodium: self.sodium,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts a number, a numeric string, or null (as 0).
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
