use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tempscope_core::App;
use tempscope_tracker::{
    DailyProgress, Gender, OpenFoodFactsClient, Profile, ProfileInput, SqliteTrackerStore, Tracker,
};

use super::print_json;
use crate::error_mapping::app_error;

pub struct ProfileArgs {
    pub weight: f64,
    pub height: f64,
    pub age: u32,
    pub gender: String,
    pub activity: u32,
    pub city: Option<String>,
}

fn open_tracker(app: &App) -> Result<Tracker<SqliteTrackerStore>> {
    let path = app.config().database_path();
    tracing::debug!(path = %path.display(), "Opening tracker database");
    let store = SqliteTrackerStore::open(&path).map_err(app_error)?;
    Ok(Tracker::new(store))
}

pub fn set_profile(app: &App, user: i64, args: ProfileArgs, json: bool) -> Result<()> {
    let gender: Gender = args.gender.parse().map_err(app_error)?;
    let input = ProfileInput {
        weight_kg: args.weight,
        height_cm: args.height,
        age: args.age,
        gender,
        activity_minutes: args.activity,
        city: args.city.filter(|c| !c.trim().is_empty()),
    };

    let profile = open_tracker(app)?
        .set_profile(user, input)
        .map_err(app_error)?;

    if json {
        return print_json(&profile);
    }
    println!("Profile saved.");
    print_profile(&profile);
    Ok(())
}

pub fn show_profile(app: &App, user: i64, json: bool) -> Result<()> {
    let profile = open_tracker(app)?.profile(user).map_err(app_error)?;
    if json {
        return print_json(&profile);
    }
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &Profile) {
    let p = &profile.input;
    println!("\nProfile for user {}", profile.user_id);
    println!("  Weight:       {:.1} kg", p.weight_kg);
    println!("  Height:       {:.1} cm", p.height_cm);
    println!("  Age:          {}", p.age);
    println!("  Gender:       {}", p.gender);
    println!("  Activity:     {} min/day", p.activity_minutes);
    if let Some(city) = &p.city {
        println!("  City:         {}", city);
    }
    println!("  Water goal:   {:.0} ml", profile.water_goal_ml);
    println!("  Calorie goal: {:.0} kcal", profile.calorie_goal);
}

pub fn log_water(app: &App, user: i64, amount: f64, json: bool) -> Result<()> {
    let logged = open_tracker(app)?
        .log_water(user, amount)
        .map_err(app_error)?;

    if json {
        return print_json(&logged);
    }
    println!("Logged {:.0} ml of water", logged.entry.amount_ml);
    println!(
        "Today: {:.0} of {:.0} ml, {:.0} ml to go",
        logged.total_today_ml, logged.goal_ml, logged.remaining_ml
    );
    Ok(())
}

pub async fn log_food(app: &App, user: i64, product: &str, grams: f64, json: bool) -> Result<()> {
    let tracker = open_tracker(app)?;
    let lookup = OpenFoodFactsClient::from_config(&app.config().tracker).map_err(app_error)?;
    let logged = tracker
        .log_food(user, product, grams, &lookup)
        .await
        .map_err(app_error)?;

    if json {
        return print_json(&logged);
    }
    println!(
        "Logged {:.1} kcal ({:.0} g of {}, {:.0} kcal/100 g)",
        logged.entry.calories, logged.entry.grams, logged.display_name, logged.kcal_per_100g
    );
    println!("Consumed today: {:.0} kcal", logged.consumed_today);
    Ok(())
}

pub fn log_workout(app: &App, user: i64, kind: &str, minutes: u32, json: bool) -> Result<()> {
    let logged = open_tracker(app)?
        .log_workout(user, kind, minutes)
        .map_err(app_error)?;

    if json {
        return print_json(&logged);
    }
    println!(
        "Logged {} for {} min: {:.0} kcal burned",
        logged.entry.workout_type, logged.entry.duration_minutes, logged.entry.calories_burned
    );
    println!("Burned today: {:.0} kcal", logged.burned_today);
    if logged.extra_water_ml > 0 {
        println!("Drink an extra {} ml of water", logged.extra_water_ml);
    }
    Ok(())
}

pub fn progress(app: &App, user: i64, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let day = date.unwrap_or_else(|| Utc::now().date_naive());
    let progress = open_tracker(app)?
        .progress(user, day)
        .map_err(app_error)?;

    if json {
        return print_json(&progress);
    }
    print_progress(&progress);
    Ok(())
}

fn print_progress(p: &DailyProgress) {
    println!("\nProgress for {}", p.day);

    let water_mark = if p.water_goal_met { "done" } else { "open" };
    println!("\nWater [{}]", water_mark);
    println!("  Drunk:     {:.0} of {:.0} ml", p.water_consumed_ml, p.water_goal_ml);
    println!("  Remaining: {:.0} ml", p.water_remaining_ml);
    println!("  Progress:  {:.1}%", p.water_percent);

    let calorie_mark = if p.calories_within_goal { "ok" } else { "over" };
    println!("\nCalories [{}]", calorie_mark);
    println!("  Consumed:  {:.0} kcal", p.calories_consumed);
    println!("  Burned:    {:.0} kcal", p.calories_burned);
    println!("  Balance:   {:.0} kcal", p.calorie_balance);
    println!("  Goal:      {:.0} kcal", p.calorie_goal);
    if p.calories_remaining > 0.0 {
        println!("  Remaining: {:.0} kcal", p.calories_remaining);
    } else {
        println!("  Exceeded:  {:.0} kcal", p.calories_remaining.abs());
    }
    println!("  Progress:  {:.1}%", p.calorie_percent);
}
