use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

pub const MAX_WEIGHT_KG: f64 = 300.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;
pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = TrackerError;

    /// Accepts English and Russian forms, full or single-letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "мужской" | "м" => Ok(Self::Male),
            "female" | "f" | "женский" | "ж" => Ok(Self::Female),
            other => Err(TrackerError::invalid_profile(format!(
                "unknown gender '{}', expected male or female",
                other
            ))),
        }
    }
}

/// Profile fields supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    /// Typical daily activity in minutes
    pub activity_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.weight_kg > 0.0 && self.weight_kg <= MAX_WEIGHT_KG) {
            return Err(TrackerError::invalid_profile(format!(
                "weight must be in (0, {}] kg, got {}",
                MAX_WEIGHT_KG, self.weight_kg
            )));
        }
        if !(self.height_cm > 0.0 && self.height_cm <= MAX_HEIGHT_CM) {
            return Err(TrackerError::invalid_profile(format!(
                "height must be in (0, {}] cm, got {}",
                MAX_HEIGHT_CM, self.height_cm
            )));
        }
        if !(1..=MAX_AGE).contains(&self.age) {
            return Err(TrackerError::invalid_profile(format!(
                "age must be between 1 and {}, got {}",
                MAX_AGE, self.age
            )));
        }
        Ok(())
    }
}

/// Stored profile with derived daily goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    #[serde(flatten)]
    pub input: ProfileInput,
    pub water_goal_ml: f64,
    pub calorie_goal: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub amount_ml: f64,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub product_name: String,
    /// Energy of the eaten amount, kcal
    pub calories: f64,
    pub grams: f64,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub workout_type: String,
    pub duration_minutes: u32,
    pub calories_burned: f64,
    pub logged_at: DateTime<Utc>,
}

/// Result of logging water
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLogged {
    pub entry: WaterEntry,
    pub total_today_ml: f64,
    pub goal_ml: f64,
    pub remaining_ml: f64,
}

/// Result of logging a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogged {
    pub entry: FoodEntry,
    /// Display name reported by the food database
    pub display_name: String,
    pub kcal_per_100g: f64,
    pub consumed_today: f64,
}

/// Result of logging a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogged {
    pub entry: WorkoutEntry,
    pub burned_today: f64,
    /// Recommended extra water, 0 for workouts shorter than 30 minutes
    pub extra_water_ml: u32,
}
