//! Daily goal and energy formulas.

use crate::types::{Gender, ProfileInput};

/// MET used for workout types not in the table
pub const DEFAULT_MET: f64 = 5.0;

const WATER_ML_PER_KG: f64 = 30.0;
const WATER_ML_PER_ACTIVITY_BLOCK: f64 = 500.0;
const EXTRA_WATER_ML_PER_WORKOUT_BLOCK: u32 = 200;
const ACTIVITY_BLOCK_MINUTES: u32 = 30;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Daily water goal in ml: 30 ml per kg plus 500 ml per full 30 minutes of activity.
pub fn water_goal(weight_kg: f64, activity_minutes: u32) -> f64 {
    let blocks = activity_minutes / ACTIVITY_BLOCK_MINUTES;
    round1(weight_kg * WATER_ML_PER_KG + f64::from(blocks) * WATER_ML_PER_ACTIVITY_BLOCK)
}

fn activity_factor(activity_minutes: u32) -> f64 {
    match activity_minutes {
        0..=29 => 1.2,
        30..=59 => 1.375,
        60..=89 => 1.55,
        _ => 1.725,
    }
}

/// Mifflin-St Jeor BMR scaled by an activity factor, kcal/day.
pub fn calorie_goal(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    activity_minutes: u32,
) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let bmr = match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };
    round1(bmr * activity_factor(activity_minutes))
}

/// Both goals for a profile, `(water_ml, kcal)`
pub fn goals_for(input: &ProfileInput) -> (f64, f64) {
    (
        water_goal(input.weight_kg, input.activity_minutes),
        calorie_goal(
            input.weight_kg,
            input.height_cm,
            input.age,
            input.gender,
            input.activity_minutes,
        ),
    )
}

/// Metabolic equivalent for a workout name (case-insensitive, English or Russian).
pub fn met_for(workout_type: &str) -> f64 {
    match workout_type.trim().to_lowercase().as_str() {
        "running" | "run" | "бег" => 8.0,
        "walking" | "walk" | "ходьба" => 3.5,
        "cycling" | "bike" | "велосипед" => 6.0,
        "swimming" | "swim" | "плавание" => 7.0,
        "strength" | "weights" | "силовые" => 5.0,
        "yoga" | "йога" => 3.0,
        "workout" | "тренировка" => 5.0,
        _ => DEFAULT_MET,
    }
}

/// Energy burned: MET × weight × hours, kcal.
pub fn workout_calories(workout_type: &str, duration_minutes: u32, weight_kg: f64) -> f64 {
    let hours = f64::from(duration_minutes) / 60.0;
    round1(met_for(workout_type) * weight_kg * hours)
}

/// Extra water after a workout: 200 ml per full 30 minutes.
pub fn extra_water_after_workout(duration_minutes: u32) -> u32 {
    (duration_minutes / ACTIVITY_BLOCK_MINUTES) * EXTRA_WATER_ML_PER_WORKOUT_BLOCK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_water_goal() {
        assert!(close(water_goal(70.0, 0), 2100.0));
        assert!(close(water_goal(70.0, 29), 2100.0));
        assert!(close(water_goal(70.0, 30), 2600.0));
        assert!(close(water_goal(70.0, 95), 3600.0));
        assert!(close(water_goal(62.33, 0), 1869.9));
    }

    #[test]
    fn test_calorie_goal_male() {
        // 10*70 + 6.25*175 - 5*30 + 5 = 1648.75; * 1.375 = 2267.03125
        assert!(close(calorie_goal(70.0, 175.0, 30, Gender::Male, 45), 2267.0));
    }

    #[test]
    fn test_calorie_goal_female() {
        // 10*60 + 6.25*165 - 5*25 - 161 = 1345.25; * 1.2 = 1614.3
        assert!(close(calorie_goal(60.0, 165.0, 25, Gender::Female, 0), 1614.3));
    }

    #[test]
    fn test_activity_factor_boundaries() {
        assert_eq!(activity_factor(29), 1.2);
        assert_eq!(activity_factor(30), 1.375);
        assert_eq!(activity_factor(59), 1.375);
        assert_eq!(activity_factor(60), 1.55);
        assert_eq!(activity_factor(89), 1.55);
        assert_eq!(activity_factor(90), 1.725);
    }

    #[test]
    fn test_met_lookup() {
        assert_eq!(met_for("Running"), 8.0);
        assert_eq!(met_for("бег"), 8.0);
        assert_eq!(met_for(" walk "), 3.5);
        assert_eq!(met_for("ВЕЛОСИПЕД"), 6.0);
        assert_eq!(met_for("swim"), 7.0);
        assert_eq!(met_for("weights"), 5.0);
        assert_eq!(met_for("йога"), 3.0);
        assert_eq!(met_for("tennis"), DEFAULT_MET);
    }

    #[test]
    fn test_workout_calories() {
        // 8 * 70 * 0.5 = 280
        assert!(close(workout_calories("running", 30, 70.0), 280.0));
        // 3.5 * 65 * 0.75 = 170.625 -> 170.6
        assert!(close(workout_calories("walking", 45, 65.0), 170.6));
        assert!(close(workout_calories("running", 0, 70.0), 0.0));
    }

    #[test]
    fn test_extra_water() {
        assert_eq!(extra_water_after_workout(20), 0);
        assert_eq!(extra_water_after_workout(30), 200);
        assert_eq!(extra_water_after_workout(75), 400);
    }
}
