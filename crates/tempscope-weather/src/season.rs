use chrono::Local;
use tempscope_analysis::Season;

/// Season of today's local date
pub fn current_season() -> Season {
    Season::of_date(Local::now().date_naive())
}
