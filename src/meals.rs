use crate::models::{FoodItem, MealBreakdown};
use crate::stats::round1;
use crate::upstream::lenient_f64;
use serde::Deserialize;

const FALLBACK_MEAL: &str = "other";

/// A food-entry record as returned by `/food-entries/by-date/{date}`.
///
/// Nutrient values are per serving; `quantity` is in the same unit as
/// `serving_size`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodEntry {
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default, alias = "name")]
    pub food_name: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub serving_size: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat: f64,
}

impl FoodEntry {
    fn scale_factor(&self) -> f64 {
        if self.serving_size > 0.0 {
            self.quantity / self.serving_size
        } else {
            1.0
        }
    }

    fn meal_label(&self) -> String {
        let label = self
            .meal_type
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_lowercase();
        if label.is_empty() {
            FALLBACK_MEAL.to_string()
        } else {
            label
        }
    }

    /// Scales per-serving nutrients to the logged quantity, then rounds.
    pub fn to_item(&self) -> FoodItem {
        let factor = self.scale_factor();
        FoodItem {
            name: self
                .food_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or("Unnamed food")
                .to_string(),
            brand: self
                .brand_name
                .as_deref()
                .map(str::trim)
                .filter(|brand| !brand.is_empty())
                .map(str::to_string),
            quantity: self.quantity,
            unit: self.unit.clone().unwrap_or_default(),
            calories: round1(self.calories * factor),
            protein: round1(self.protein * factor),
            carbs: round1(self.carbs * factor),
            fat: round1(self.fat * factor),
        }
    }
}

pub fn build_meal_breakdown(entries: &[FoodEntry]) -> MealBreakdown {
    let mut breakdown = MealBreakdown::new();
    for entry in entries {
        breakdown
            .entry(entry.meal_label())
            .or_default()
            .push(entry.to_item());
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(meal: &str, name: &str, serving: f64, quantity: f64, calories: f64) -> FoodEntry {
        FoodEntry {
            meal_type: Some(meal.to_string()),
            food_name: Some(name.to_string()),
            quantity,
            unit: Some("g".to_string()),
            serving_size: serving,
            calories,
            ..FoodEntry::default()
        }
    }

    #[test]
    fn scales_by_quantity_over_serving_size() {
        let item = entry("lunch", "Rice", 100.0, 150.0, 200.0).to_item();
        assert_eq!(item.calories, 300.0);
        assert_eq!(item.quantity, 150.0);
        assert_eq!(item.unit, "g");
    }

    #[test]
    fn scales_before_rounding() {
        let mut oats = entry("breakfast", "Oats", 30.0, 45.0, 0.0);
        oats.protein = 4.03;
        oats.fat = 2.17;
        let item = oats.to_item();
        // 4.03 * 1.5 = 6.045, 2.17 * 1.5 = 3.255
        assert_eq!(item.protein, 6.0);
        assert_eq!(item.fat, 3.3);
    }

    #[test]
    fn missing_serving_size_uses_values_as_logged() {
        let item = entry("snack", "Bar", 0.0, 2.0, 180.0).to_item();
        assert_eq!(item.calories, 180.0);
    }

    #[test]
    fn groups_by_normalized_meal_label_in_order() {
        let entries = vec![
            entry("Breakfast", "Eggs", 1.0, 2.0, 70.0),
            entry("dinner", "Salmon", 100.0, 200.0, 208.0),
            entry(" breakfast ", "Toast", 1.0, 1.0, 80.0),
            entry("Pre-Workout", "Banana", 1.0, 1.0, 105.0),
            FoodEntry {
                food_name: Some("Mystery".to_string()),
                ..FoodEntry::default()
            },
        ];

        let breakdown = build_meal_breakdown(&entries);
        let labels: Vec<&str> = breakdown.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["breakfast", "dinner", "other", "pre-workout"]);

        let breakfast: Vec<&str> = breakdown["breakfast"]
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(breakfast, vec!["Eggs", "Toast"]);
        assert_eq!(breakdown["breakfast"][0].calories, 140.0);
        assert_eq!(breakdown["dinner"][0].calories, 416.0);
    }

    #[test]
    fn parses_numeric_strings_from_upstream() {
        let raw = serde_json::json!([{
            "meal_type": "lunch",
            "food_name": "Chicken",
            "brand_name": null,
            "quantity": "150",
            "unit": "g",
            "serving_size": "100.00",
            "calories": 165,
            "protein": "31",
            "carbs": null,
            "fat": 3.6
        }]);
        let entries: Vec<FoodEntry> = serde_json::from_value(raw).unwrap();
        let item = entries[0].to_item();
        assert_eq!(item.calories, 247.5);
        assert_eq!(item.protein, 46.5);
        assert_eq!(item.carbs, 0.0);
        assert_eq!(item.fat, 5.4);
        assert_eq!(item.brand, None);
    }
}
