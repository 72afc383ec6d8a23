use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{FoodEntry, Profile, WaterEntry, WorkoutEntry};

/// Water and calorie totals for one user and day, measured against the
/// profile's goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub user_id: i64,
    pub day: NaiveDate,

    pub water_consumed_ml: f64,
    pub water_goal_ml: f64,
    /// Never negative
    pub water_remaining_ml: f64,
    pub water_percent: f64,

    pub calories_consumed: f64,
    pub calories_burned: f64,
    /// Consumed minus burned
    pub calorie_balance: f64,
    pub calorie_goal: f64,
    /// Goal minus balance; negative once the goal is exceeded
    pub calories_remaining: f64,
    pub calorie_percent: f64,

    pub water_goal_met: bool,
    pub calories_within_goal: bool,
}

fn percent(value: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        value / goal * 100.0
    } else {
        0.0
    }
}

impl DailyProgress {
    pub fn compute(
        profile: &Profile,
        day: NaiveDate,
        water: &[WaterEntry],
        food: &[FoodEntry],
        workouts: &[WorkoutEntry],
    ) -> Self {
        let water_consumed: f64 = water.iter().map(|e| e.amount_ml).sum();
        let consumed: f64 = food.iter().map(|e| e.calories).sum();
        let burned: f64 = workouts.iter().map(|e| e.calories_burned).sum();
        let balance = consumed - burned;

        Self {
            user_id: profile.user_id,
            day,
            water_consumed_ml: water_consumed,
            water_goal_ml: profile.water_goal_ml,
            water_remaining_ml: (profile.water_goal_ml - water_consumed).max(0.0),
            water_percent: percent(water_consumed, profile.water_goal_ml),
            calories_consumed: consumed,
            calories_burned: burned,
            calorie_balance: balance,
            calorie_goal: profile.calorie_goal,
            calories_remaining: profile.calorie_goal - balance,
            calorie_percent: percent(balance, profile.calorie_goal),
            water_goal_met: water_consumed >= profile.water_goal_ml,
            calories_within_goal: balance <= profile.calorie_goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, ProfileInput};
    use chrono::Utc;

    fn profile(water_goal: f64, calorie_goal: f64) -> Profile {
        Profile {
            user_id: 1,
            input: ProfileInput {
                weight_kg: 70.0,
                height_cm: 175.0,
                age: 30,
                gender: Gender::Female,
                activity_minutes: 0,
                city: None,
            },
            water_goal_ml: water_goal,
            calorie_goal,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn water(amount: f64) -> WaterEntry {
        WaterEntry {
            amount_ml: amount,
            logged_at: Utc::now(),
        }
    }

    fn food(calories: f64) -> FoodEntry {
        FoodEntry {
            product_name: "x".into(),
            calories,
            grams: 100.0,
            logged_at: Utc::now(),
        }
    }

    fn workout(burned: f64) -> WorkoutEntry {
        WorkoutEntry {
            workout_type: "running".into(),
            duration_minutes: 30,
            calories_burned: burned,
            logged_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_day() {
        let p = DailyProgress::compute(&profile(2000.0, 1800.0), day(), &[], &[], &[]);
        assert_eq!(p.water_consumed_ml, 0.0);
        assert_eq!(p.water_remaining_ml, 2000.0);
        assert_eq!(p.water_percent, 0.0);
        assert_eq!(p.calories_remaining, 1800.0);
        assert!(!p.water_goal_met);
        assert!(p.calories_within_goal);
    }

    #[test]
    fn test_totals_and_balance() {
        let p = DailyProgress::compute(
            &profile(2000.0, 2000.0),
            day(),
            &[water(500.0), water(1000.0)],
            &[food(800.0), food(700.0)],
            &[workout(300.0)],
        );
        assert_eq!(p.water_consumed_ml, 1500.0);
        assert_eq!(p.water_remaining_ml, 500.0);
        assert_eq!(p.water_percent, 75.0);
        assert_eq!(p.calories_consumed, 1500.0);
        assert_eq!(p.calories_burned, 300.0);
        assert_eq!(p.calorie_balance, 1200.0);
        assert_eq!(p.calories_remaining, 800.0);
        assert_eq!(p.calorie_percent, 60.0);
    }

    #[test]
    fn test_remaining_water_floors_at_zero() {
        let p = DailyProgress::compute(&profile(1000.0, 2000.0), day(), &[water(1500.0)], &[], &[]);
        assert_eq!(p.water_remaining_ml, 0.0);
        assert_eq!(p.water_percent, 150.0);
        assert!(p.water_goal_met);
    }

    #[test]
    fn test_calorie_goal_exceeded() {
        let p = DailyProgress::compute(&profile(1000.0, 1000.0), day(), &[], &[food(1300.0)], &[]);
        assert_eq!(p.calories_remaining, -300.0);
        assert!(!p.calories_within_goal);
    }

    #[test]
    fn test_zero_goals_give_zero_percent() {
        let p = DailyProgress::compute(&profile(0.0, 0.0), day(), &[water(250.0)], &[food(100.0)], &[]);
        assert_eq!(p.water_percent, 0.0);
        assert_eq!(p.calorie_percent, 0.0);
    }
}
