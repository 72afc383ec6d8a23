//! Tracker service tying profiles, logs and food lookups together.

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use tracing::instrument;

use crate::error::{TrackerError, TrackerResult};
use crate::food::FoodLookup;
use crate::goals;
use crate::progress::DailyProgress;
use crate::store::TrackerStore;
use crate::types::{
    FoodEntry, FoodLogged, Profile, ProfileInput, WaterEntry, WaterLogged, WorkoutEntry,
    WorkoutLogged,
};

/// `[start, end)` of a UTC calendar day
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Current time at the precision the store keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn ensure_positive(what: &str, value: f64) -> TrackerResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::invalid_amount(format!(
            "{} must be a positive number, got {}",
            what, value
        )))
    }
}

/// Health tracker over a storage backend
pub struct Tracker<S: TrackerStore> {
    store: S,
}

impl<S: TrackerStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create or replace a user's profile, recomputing the daily goals.
    #[instrument(skip(self, input))]
    pub fn set_profile(&self, user_id: i64, input: ProfileInput) -> TrackerResult<Profile> {
        input.validate()?;
        let (water_goal_ml, calorie_goal) = goals::goals_for(&input);
        let stamp = now();

        let profile = self.store.save_profile(&Profile {
            user_id,
            input,
            water_goal_ml,
            calorie_goal,
            created_at: stamp,
            updated_at: stamp,
        })?;

        tracing::info!(
            user_id,
            water_goal_ml,
            calorie_goal,
            "Profile saved"
        );
        Ok(profile)
    }

    pub fn profile(&self, user_id: i64) -> TrackerResult<Profile> {
        self.store
            .profile(user_id)?
            .ok_or(TrackerError::ProfileNotFound(user_id))
    }

    #[instrument(skip(self))]
    pub fn log_water(&self, user_id: i64, amount_ml: f64) -> TrackerResult<WaterLogged> {
        ensure_positive("water amount", amount_ml)?;
        let profile = self.profile(user_id)?;

        let entry = WaterEntry {
            amount_ml,
            logged_at: now(),
        };
        self.store.add_water(user_id, &entry)?;

        let (from, to) = day_bounds(entry.logged_at.date_naive());
        let total_today_ml: f64 = self
            .store
            .water_between(user_id, from, to)?
            .iter()
            .map(|e| e.amount_ml)
            .sum();

        Ok(WaterLogged {
            entry,
            total_today_ml,
            goal_ml: profile.water_goal_ml,
            remaining_ml: (profile.water_goal_ml - total_today_ml).max(0.0),
        })
    }

    /// Look up `query` in the food database and log `grams` of it.
    #[instrument(skip(self, lookup))]
    pub async fn log_food(
        &self,
        user_id: i64,
        query: &str,
        grams: f64,
        lookup: &dyn FoodLookup,
    ) -> TrackerResult<FoodLogged> {
        ensure_positive("food amount", grams)?;
        self.profile(user_id)?;

        let info = lookup
            .lookup(query)
            .await?
            .ok_or_else(|| TrackerError::FoodNotFound(query.to_string()))?;

        let entry = FoodEntry {
            product_name: query.to_string(),
            calories: info.calories_for(grams),
            grams,
            logged_at: now(),
        };
        self.store.add_food(user_id, &entry)?;

        let (from, to) = day_bounds(entry.logged_at.date_naive());
        let consumed_today: f64 = self
            .store
            .food_between(user_id, from, to)?
            .iter()
            .map(|e| e.calories)
            .sum();

        tracing::info!(user_id, product = %info.name, calories = entry.calories, "Food logged");
        Ok(FoodLogged {
            entry,
            display_name: info.name,
            kcal_per_100g: info.kcal_per_100g,
            consumed_today,
        })
    }

    #[instrument(skip(self))]
    pub fn log_workout(
        &self,
        user_id: i64,
        workout_type: &str,
        duration_minutes: u32,
    ) -> TrackerResult<WorkoutLogged> {
        if duration_minutes == 0 {
            return Err(TrackerError::invalid_amount(
                "workout duration must be a positive number of minutes",
            ));
        }
        let workout_type = workout_type.trim();
        if workout_type.is_empty() {
            return Err(TrackerError::invalid_amount("workout type is empty"));
        }
        let profile = self.profile(user_id)?;

        let entry = WorkoutEntry {
            workout_type: workout_type.to_string(),
            duration_minutes,
            calories_burned: goals::workout_calories(
                workout_type,
                duration_minutes,
                profile.input.weight_kg,
            ),
            logged_at: now(),
        };
        self.store.add_workout(user_id, &entry)?;

        let (from, to) = day_bounds(entry.logged_at.date_naive());
        let burned_today: f64 = self
            .store
            .workouts_between(user_id, from, to)?
            .iter()
            .map(|e| e.calories_burned)
            .sum();

        Ok(WorkoutLogged {
            extra_water_ml: goals::extra_water_after_workout(duration_minutes),
            entry,
            burned_today,
        })
    }

    /// Progress for `day` (UTC)
    pub fn progress(&self, user_id: i64, day: NaiveDate) -> TrackerResult<DailyProgress> {
        let profile = self.profile(user_id)?;
        let (from, to) = day_bounds(day);

        let water = self.store.water_between(user_id, from, to)?;
        let food = self.store.food_between(user_id, from, to)?;
        let workouts = self.store.workouts_between(user_id, from, to)?;

        Ok(DailyProgress::compute(&profile, day, &water, &food, &workouts))
    }

    /// Progress for the current UTC day
    pub fn progress_today(&self, user_id: i64) -> TrackerResult<DailyProgress> {
        self.progress(user_id, Utc::now().date_naive())
    }
}
