//! Daily health tracker for tempscope
//!
//! Stores a per-user profile with derived water and calorie goals, logs
//! water, food and workouts to SQLite, and reports daily progress. Food
//! energy values come from Open Food Facts.

pub mod error;
pub mod food;
pub mod goals;
pub mod progress;
pub mod service;
pub mod store;
pub mod types;

pub use error::{TrackerError, TrackerResult};
pub use food::{FoodInfo, FoodLookup, OpenFoodFactsClient};
pub use progress::DailyProgress;
pub use service::Tracker;
pub use store::{SqliteTrackerStore, TrackerStore};
pub use types::*;
