//! Per-city analysis pipeline and multi-city execution.
//!
//! A city is analysed by sorting its readings by date, smoothing them,
//! flagging residual anomalies and computing seasonal baselines. Cities are
//! independent, so a dataset can be processed sequentially or on a fixed
//! pool of worker threads with the same results per city.

use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::anomaly::detect_anomalies;
use crate::error::AnalysisError;
use crate::seasonal::seasonal_baselines;
use crate::smoothing::centered_moving_average;
use crate::stats;
use crate::types::{
    AnalysisReport, AnalyzedPoint, AnalyzedSeries, CityAnalysis, Reading, TemperatureSummary,
};

/// Default rolling window, in readings (days)
pub const DEFAULT_WINDOW: usize = 30;
/// Default residual threshold, in standard deviations
pub const DEFAULT_THRESHOLD_STD: f64 = 2.0;

/// Smoothing and anomaly parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Moving-average window, in readings
    pub window: usize,
    /// Residuals beyond this many standard deviations are anomalies
    pub threshold_std: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold_std: DEFAULT_THRESHOLD_STD,
        }
    }
}

impl AnalysisParams {
    pub fn new(window: usize, threshold_std: f64) -> Self {
        Self {
            window,
            threshold_std,
        }
    }

    /// Check the parameters before any data is touched.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window == 0 {
            return Err(AnalysisError::invalid("window", "must be at least 1"));
        }
        if !self.threshold_std.is_finite() || self.threshold_std < 0.0 {
            return Err(AnalysisError::invalid(
                "threshold_std",
                format!("must be a non-negative number, got {}", self.threshold_std),
            ));
        }
        Ok(())
    }
}

/// How cities of a dataset are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// One city after another on the calling thread
    #[default]
    Sequential,
    /// A fixed number of worker threads pulling cities from a shared queue
    WorkerPool { workers: NonZeroUsize },
}

impl ExecutionStrategy {
    /// Worker pool sized to the machine's available parallelism
    pub fn available_parallelism() -> Self {
        let workers = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self::WorkerPool { workers }
    }

    /// Worker pool with `workers` threads; zero means one per available CPU.
    pub fn with_workers(workers: usize) -> Self {
        match NonZeroUsize::new(workers) {
            Some(workers) => Self::WorkerPool { workers },
            None => Self::available_parallelism(),
        }
    }
}

/// Analyse the readings of a single city.
///
/// Readings belonging to other cities are ignored. Input order does not
/// matter: readings are sorted by date (stable on equal dates) first.
pub fn analyze_city(
    city: &str,
    readings: &[Reading],
    params: &AnalysisParams,
) -> Result<CityAnalysis, AnalysisError> {
    params.validate()?;

    let own: Vec<Reading> = readings
        .iter()
        .filter(|r| r.city == city)
        .cloned()
        .collect();
    if own.is_empty() {
        return Err(AnalysisError::CityNotFound(city.to_string()));
    }

    Ok(run_city(city.to_string(), own, params))
}

/// Runs the pipeline over a non-empty group of one city's readings.
fn run_city(city: String, mut readings: Vec<Reading>, params: &AnalysisParams) -> CityAnalysis {
    readings.sort_by_key(|r| r.timestamp);

    let temps: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    let moving_average = centered_moving_average(&temps, params.window);
    let flags = detect_anomalies(&temps, &moving_average, params.threshold_std);
    let baselines = seasonal_baselines(&city, &readings);

    let mean = stats::mean(&temps).unwrap_or(f64::NAN);
    let (min, max) = stats::min_max(&temps).unwrap_or((f64::NAN, f64::NAN));

    let points: Vec<AnalyzedPoint> = readings
        .into_iter()
        .zip(moving_average)
        .zip(flags)
        .map(|((reading, moving_average), is_anomaly)| AnalyzedPoint {
            reading,
            moving_average,
            is_anomaly,
        })
        .collect();

    let anomaly_count = points.iter().filter(|p| p.is_anomaly).count();
    let total_count = points.len();

    tracing::debug!(
        city = %city,
        total_count,
        anomaly_count,
        seasons = baselines.by_season.len(),
        "City analysed"
    );

    CityAnalysis {
        series: AnalyzedSeries {
            city,
            points,
            anomaly_count,
            total_count,
        },
        baselines,
        summary: TemperatureSummary {
            mean,
            min,
            max,
            anomaly_count,
        },
    }
}

/// Split readings into per-city groups, keyed and ordered by city name.
pub fn group_by_city(readings: &[Reading]) -> BTreeMap<String, Vec<Reading>> {
    let mut groups: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
    for reading in readings {
        groups
            .entry(reading.city.clone())
            .or_default()
            .push(reading.clone());
    }
    groups
}

/// Multi-city analyser
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    params: AnalysisParams,
    strategy: ExecutionStrategy,
}

impl Analyzer {
    pub fn new(params: AnalysisParams, strategy: ExecutionStrategy) -> Self {
        Self { params, strategy }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Analyse every city present in `readings`.
    pub fn analyze(&self, readings: &[Reading]) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_with_cancel(readings, &CancellationToken::new())
    }

    /// Analyse every city, stopping early once `cancel` fires.
    ///
    /// Cancellation discards all results, including cities that already
    /// finished.
    pub fn analyze_with_cancel(
        &self,
        readings: &[Reading],
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.params.validate()?;

        let started = Instant::now();
        let groups = group_by_city(readings);
        let city_count = groups.len();

        let cities = match self.strategy {
            ExecutionStrategy::Sequential => run_sequential(groups, &self.params, cancel)?,
            ExecutionStrategy::WorkerPool { workers } => {
                run_worker_pool(groups, &self.params, workers, cancel)?
            }
        };

        let report = AnalysisReport { cities };
        tracing::info!(
            cities = city_count,
            readings = report.total_readings(),
            anomalies = report.total_anomalies(),
            strategy = ?self.strategy,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(report)
    }
}

fn run_sequential(
    groups: BTreeMap<String, Vec<Reading>>,
    params: &AnalysisParams,
    cancel: &CancellationToken,
) -> Result<BTreeMap<String, CityAnalysis>, AnalysisError> {
    let mut results = BTreeMap::new();
    for (city, readings) in groups {
        if cancel.is_cancelled() {
            tracing::info!("Analysis cancelled");
            return Err(AnalysisError::Cancelled);
        }
        let analysis = run_city(city.clone(), readings, params);
        results.insert(city, analysis);
    }
    Ok(results)
}

fn run_worker_pool(
    groups: BTreeMap<String, Vec<Reading>>,
    params: &AnalysisParams,
    workers: NonZeroUsize,
    cancel: &CancellationToken,
) -> Result<BTreeMap<String, CityAnalysis>, AnalysisError> {
    let workers = workers.get().min(groups.len()).max(1);
    let queue = Mutex::new(groups.into_iter().collect::<VecDeque<_>>());
    let (tx, rx) = mpsc::channel();

    tracing::debug!(workers, "Starting analysis worker pool");

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || loop {
                if cancel.is_cancelled() {
                    tracing::debug!(worker, "Worker stopping on cancellation");
                    break;
                }
                let next = queue.lock().pop_front();
                let Some((city, readings)) = next else {
                    break;
                };
                let analysis = run_city(city.clone(), readings, params);
                if tx.send((city, analysis)).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    if cancel.is_cancelled() {
        tracing::info!("Analysis cancelled");
        return Err(AnalysisError::Cancelled);
    }

    Ok(rx.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Season;
    use chrono::{Duration, NaiveDate};

    fn series(city: &str, temps: &[f64]) -> Vec<Reading> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let date = start + Duration::days(i as i64);
                Reading::new(city, date, *t, Season::of_date(date))
            })
            .collect()
    }

    #[test]
    fn test_params_validation() {
        assert!(AnalysisParams::default().validate().is_ok());
        assert!(AnalysisParams::new(0, 2.0).validate().is_err());
        assert!(AnalysisParams::new(5, -1.0).validate().is_err());
        assert!(AnalysisParams::new(5, f64::NAN).validate().is_err());
        assert!(AnalysisParams::new(5, 0.0).validate().is_ok());
    }

    #[test]
    fn test_with_workers() {
        assert_eq!(
            ExecutionStrategy::with_workers(3),
            ExecutionStrategy::WorkerPool {
                workers: NonZeroUsize::new(3).unwrap()
            }
        );
        assert!(matches!(
            ExecutionStrategy::with_workers(0),
            ExecutionStrategy::WorkerPool { .. }
        ));
    }

    #[test]
    fn test_analyze_city_sorts_readings() {
        let mut readings = series("Rome", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        readings.reverse();

        let analysis = analyze_city("Rome", &readings, &AnalysisParams::new(3, 2.0)).unwrap();
        let dates: Vec<NaiveDate> = analysis
            .series
            .points
            .iter()
            .map(|p| p.reading.timestamp)
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(analysis.series.points[2].moving_average, Some(3.0));
    }

    #[test]
    fn test_analyze_city_ignores_other_cities() {
        let mut readings = series("Rome", &[1.0, 2.0, 3.0]);
        readings.extend(series("Paris", &[9.0, 9.0]));

        let analysis = analyze_city("Rome", &readings, &AnalysisParams::new(3, 2.0)).unwrap();
        assert_eq!(analysis.series.total_count, 3);
        assert_eq!(analysis.summary.max, 3.0);
    }

    #[test]
    fn test_analyze_city_unknown_city() {
        let readings = series("Rome", &[1.0]);
        let err = analyze_city("Oslo", &readings, &AnalysisParams::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::CityNotFound(c) if c == "Oslo"));
    }

    #[test]
    fn test_summary() {
        let readings = series("Rome", &[4.0, -2.0, 7.0, 3.0]);
        let analysis = analyze_city("Rome", &readings, &AnalysisParams::default()).unwrap();
        assert_eq!(analysis.summary.min, -2.0);
        assert_eq!(analysis.summary.max, 7.0);
        assert!((analysis.summary.mean - 3.0).abs() < 1e-12);
        assert_eq!(analysis.summary.anomaly_count, 0);
    }

    #[test]
    fn test_group_by_city() {
        let mut readings = series("Rome", &[1.0, 2.0]);
        readings.extend(series("Cairo", &[30.0]));
        let groups = group_by_city(&readings);
        let names: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Cairo", "Rome"]);
        assert_eq!(groups["Rome"].len(), 2);
    }

    #[test]
    fn test_cancelled_before_start() {
        let readings = series("Rome", &[1.0, 2.0, 3.0]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        for strategy in [ExecutionStrategy::Sequential, ExecutionStrategy::with_workers(2)] {
            let analyzer = Analyzer::new(AnalysisParams::new(3, 2.0), strategy);
            let err = analyzer.analyze_with_cancel(&readings, &cancel).unwrap_err();
            assert!(matches!(err, AnalysisError::Cancelled));
        }
    }

    #[test]
    fn test_invalid_params_rejected_before_work() {
        let analyzer = Analyzer::new(AnalysisParams::new(0, 2.0), ExecutionStrategy::Sequential);
        let err = analyzer.analyze(&series("Rome", &[1.0])).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter { name: "window", .. }));
    }

    #[test]
    fn test_empty_dataset() {
        let analyzer = Analyzer::new(AnalysisParams::default(), ExecutionStrategy::with_workers(4));
        let report = analyzer.analyze(&[]).unwrap();
        assert!(report.cities.is_empty());
    }
}
