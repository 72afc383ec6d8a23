//! SQLite-based tracker storage.
//!
//! `SqliteTrackerStore` keeps one row per user profile plus append-only
//! water, food and workout logs. Timestamps are stored as RFC 3339 UTC text,
//! so lexical comparison matches chronological order.

use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{TrackerError, TrackerResult};
use crate::types::{FoodEntry, Gender, Profile, ProfileInput, WaterEntry, WorkoutEntry};

/// Storage backend for profiles and logs.
///
/// Range queries take a half-open `[from, to)` interval.
pub trait TrackerStore: Send + Sync {
    /// Insert or replace the profile for `profile.user_id`.
    ///
    /// The original `created_at` is kept when a profile already exists.
    fn save_profile(&self, profile: &Profile) -> TrackerResult<Profile>;

    fn profile(&self, user_id: i64) -> TrackerResult<Option<Profile>>;

    fn add_water(&self, user_id: i64, entry: &WaterEntry) -> TrackerResult<()>;

    fn add_food(&self, user_id: i64, entry: &FoodEntry) -> TrackerResult<()>;

    fn add_workout(&self, user_id: i64, entry: &WorkoutEntry) -> TrackerResult<()>;

    fn water_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<WaterEntry>>;

    fn food_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<FoodEntry>>;

    fn workouts_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<WorkoutEntry>>;
}

/// SQLite-based tracker storage.
pub struct SqliteTrackerStore {
    conn: Mutex<Connection>,
}

/// Stored timestamps keep microseconds; anything finer is dropped on write.
fn to_db_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Read an RFC 3339 column; a malformed value fails the whole row.
fn time_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl SqliteTrackerStore {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> TrackerResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> TrackerResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> TrackerResult<()> {
        self.conn.lock().execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                weight REAL NOT NULL,
                height REAL NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                activity_minutes INTEGER NOT NULL,
                city TEXT,
                water_goal REAL NOT NULL,
                calorie_goal REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS water_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                amount REAL NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS food_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                product_name TEXT NOT NULL,
                calories REAL NOT NULL,
                amount REAL NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                workout_type TEXT NOT NULL,
                duration INTEGER NOT NULL,
                calories_burned REAL NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_water_user_time ON water_logs(user_id, logged_at);
            CREATE INDEX IF NOT EXISTS idx_food_user_time ON food_logs(user_id, logged_at);
            CREATE INDEX IF NOT EXISTS idx_workout_user_time ON workout_logs(user_id, logged_at);
            "#,
        )?;
        Ok(())
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let gender_str: String = row.get(4)?;
        // Unknown values can only come from manual edits; treat them like the
        // calorie formula does and fall back to female.
        let gender = gender_str.parse().unwrap_or(Gender::Female);

        Ok(Profile {
            user_id: row.get(0)?,
            input: ProfileInput {
                weight_kg: row.get(1)?,
                height_cm: row.get(2)?,
                age: row.get(3)?,
                gender,
                activity_minutes: row.get(5)?,
                city: row.get(6)?,
            },
            water_goal_ml: row.get(7)?,
            calorie_goal: row.get(8)?,
            created_at: time_column(row, 9)?,
            updated_at: time_column(row, 10)?,
        })
    }

    /// Number of stored profiles
    pub fn profile_count(&self) -> TrackerResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl TrackerStore for SqliteTrackerStore {
    fn save_profile(&self, profile: &Profile) -> TrackerResult<Profile> {
        let conn = self.conn.lock();

        let existing_created = conn
            .query_row(
                "SELECT created_at FROM users WHERE user_id = ?1",
                params![profile.user_id],
                |row| time_column(row, 0),
            )
            .optional()?;

        // Hand back exactly what a later read will see
        let mut saved = profile.clone();
        saved.created_at = existing_created.unwrap_or_else(|| profile.created_at.trunc_subsecs(6));
        saved.updated_at = profile.updated_at.trunc_subsecs(6);

        conn.execute(
            r#"
            INSERT INTO users (user_id, weight, height, age, gender, activity_minutes, city,
                               water_goal, calorie_goal, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(user_id) DO UPDATE SET
                weight = excluded.weight,
                height = excluded.height,
                age = excluded.age,
                gender = excluded.gender,
                activity_minutes = excluded.activity_minutes,
                city = excluded.city,
                water_goal = excluded.water_goal,
                calorie_goal = excluded.calorie_goal,
                updated_at = excluded.updated_at
            "#,
            params![
                saved.user_id,
                saved.input.weight_kg,
                saved.input.height_cm,
                saved.input.age,
                saved.input.gender.as_str(),
                saved.input.activity_minutes,
                saved.input.city,
                saved.water_goal_ml,
                saved.calorie_goal,
                to_db_time(&saved.created_at),
                to_db_time(&saved.updated_at),
            ],
        )?;

        tracing::debug!(user_id = saved.user_id, "Saved profile");
        Ok(saved)
    }

    fn profile(&self, user_id: i64) -> TrackerResult<Option<Profile>> {
        let conn = self.conn.lock();
        let profile = conn
            .query_row(
                "SELECT user_id, weight, height, age, gender, activity_minutes, city,
                        water_goal, calorie_goal, created_at, updated_at
                 FROM users WHERE user_id = ?1",
                params![user_id],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    fn add_water(&self, user_id: i64, entry: &WaterEntry) -> TrackerResult<()> {
        self.conn.lock().execute(
            "INSERT INTO water_logs (user_id, amount, logged_at) VALUES (?1, ?2, ?3)",
            params![user_id, entry.amount_ml, to_db_time(&entry.logged_at)],
        )?;
        Ok(())
    }

    fn add_food(&self, user_id: i64, entry: &FoodEntry) -> TrackerResult<()> {
        self.conn.lock().execute(
            "INSERT INTO food_logs (user_id, product_name, calories, amount, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                entry.product_name,
                entry.calories,
                entry.grams,
                to_db_time(&entry.logged_at)
            ],
        )?;
        Ok(())
    }

    fn add_workout(&self, user_id: i64, entry: &WorkoutEntry) -> TrackerResult<()> {
        self.conn.lock().execute(
            "INSERT INTO workout_logs (user_id, workout_type, duration, calories_burned, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                entry.workout_type,
                entry.duration_minutes,
                entry.calories_burned,
                to_db_time(&entry.logged_at)
            ],
        )?;
        Ok(())
    }

    fn water_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<WaterEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT amount, logged_at FROM water_logs
             WHERE user_id = ?1 AND logged_at >= ?2 AND logged_at < ?3
             ORDER BY logged_at",
        )?;
        let rows = stmt.query_map(
            params![user_id, to_db_time(&from), to_db_time(&to)],
            |row| {
                Ok(WaterEntry {
                    amount_ml: row.get(0)?,
                    logged_at: time_column(row, 1)?,
                })
            },
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(TrackerError::from)
    }

    fn food_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<FoodEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT product_name, calories, amount, logged_at FROM food_logs
             WHERE user_id = ?1 AND logged_at >= ?2 AND logged_at < ?3
             ORDER BY logged_at",
        )?;
        let rows = stmt.query_map(
            params![user_id, to_db_time(&from), to_db_time(&to)],
            |row| {
                Ok(FoodEntry {
                    product_name: row.get(0)?,
                    calories: row.get(1)?,
                    grams: row.get(2)?,
                    logged_at: time_column(row, 3)?,
                })
            },
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(TrackerError::from)
    }

    fn workouts_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TrackerResult<Vec<WorkoutEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT workout_type, duration, calories_burned, logged_at FROM workout_logs
             WHERE user_id = ?1 AND logged_at >= ?2 AND logged_at < ?3
             ORDER BY logged_at",
        )?;
        let rows = stmt.query_map(
            params![user_id, to_db_time(&from), to_db_time(&to)],
            |row| {
                Ok(WorkoutEntry {
                    workout_type: row.get(0)?,
                    duration_minutes: row.get(1)?,
                    calories_burned: row.get(2)?,
                    logged_at: time_column(row, 3)?,
                })
            },
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(TrackerError::from)
    }
}
