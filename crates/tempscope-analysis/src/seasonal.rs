//! Per-season temperature baselines.

use std::collections::BTreeMap;

use crate::stats;
use crate::types::{Reading, Season, SeasonalBaseline, SeasonalBaselines};

/// Mean and sample standard deviation of temperature for each season that
/// has at least one reading. Single-reading seasons get a deviation of 0.
pub fn seasonal_baselines(city: &str, readings: &[Reading]) -> SeasonalBaselines {
    let mut groups: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for reading in readings {
        groups
            .entry(reading.season)
            .or_default()
            .push(reading.temperature);
    }

    let by_season = groups
        .into_iter()
        .filter_map(|(season, temps)| {
            let mean_temp = stats::mean(&temps)?;
            let std_temp = stats::sample_std_dev(&temps).unwrap_or(0.0);
            Some((
                season,
                SeasonalBaseline {
                    mean_temp,
                    std_temp,
                    count: temps.len(),
                },
            ))
        })
        .collect();

    SeasonalBaselines {
        city: city.to_string(),
        by_season,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(day: u32, temperature: f64, season: Season) -> Reading {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Reading::new("Berlin", date, temperature, season)
    }

    #[test]
    fn test_groups_by_season() {
        let readings = vec![
            reading(1, 0.0, Season::Winter),
            reading(2, 2.0, Season::Winter),
            reading(3, 20.0, Season::Summer),
            reading(4, 24.0, Season::Summer),
        ];
        let baselines = seasonal_baselines("Berlin", &readings);

        assert_eq!(baselines.city, "Berlin");
        assert_eq!(baselines.by_season.len(), 2);

        let winter = baselines.get(Season::Winter).unwrap();
        assert!((winter.mean_temp - 1.0).abs() < 1e-12);
        assert!((winter.std_temp - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(winter.count, 2);

        let summer = baselines.get(Season::Summer).unwrap();
        assert!((summer.mean_temp - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_reading_has_zero_std() {
        let baselines = seasonal_baselines("Berlin", &[reading(1, -4.5, Season::Winter)]);
        let winter = baselines.get(Season::Winter).unwrap();
        assert_eq!(winter.mean_temp, -4.5);
        assert_eq!(winter.std_temp, 0.0);
        assert!(!winter.std_temp.is_nan());
    }

    #[test]
    fn test_one_season_only() {
        let readings: Vec<Reading> = (1..=10)
            .map(|d| reading(d, f64::from(d), Season::Spring))
            .collect();
        let baselines = seasonal_baselines("Berlin", &readings);

        assert!(baselines.get(Season::Spring).is_some());
        for season in [Season::Winter, Season::Summer, Season::Autumn] {
            assert!(baselines.get(season).is_none());
            assert!(baselines.normal_range(season).is_none());
        }
    }

    #[test]
    fn test_empty_input() {
        let baselines = seasonal_baselines("Nowhere", &[]);
        assert!(baselines.by_season.is_empty());
    }
}
