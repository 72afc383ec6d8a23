use std::path::Path;

use anyhow::Result;
use tempscope_analysis::{
    analyze_city, load_csv, AnalysisParams, AnalysisReport, Analyzer, CityAnalysis,
    DatasetSummary, ExecutionStrategy, Reading, Season,
};
use tempscope_core::{App, AppError, DataError};
use tokio_util::sync::CancellationToken;

use super::{format_temp, print_json};
use crate::error_mapping::app_error;

pub struct AnalyzeOptions {
    pub window: Option<usize>,
    pub threshold: Option<f64>,
    pub workers: Option<usize>,
    pub sequential: bool,
    pub city: Option<String>,
}

/// Load a dataset and log its shape
pub(crate) fn load_readings(csv: &Path) -> Result<Vec<Reading>> {
    let readings = load_csv(csv).map_err(app_error)?;
    let summary = DatasetSummary::from_readings(&readings);
    tracing::info!(
        path = %csv.display(),
        records = summary.records,
        cities = summary.cities,
        first = ?summary.first_date,
        last = ?summary.last_date,
        "Loaded dataset"
    );
    Ok(readings)
}

pub(crate) fn params_from(app: &App, window: Option<usize>, threshold: Option<f64>) -> AnalysisParams {
    let config = &app.config().analysis;
    AnalysisParams::new(
        window.unwrap_or(config.window),
        threshold.unwrap_or(config.threshold_std),
    )
}

/// Run the analyser off the async runtime; Ctrl-C cancels it.
pub(crate) async fn run_analysis(analyzer: Analyzer, readings: Vec<Reading>) -> Result<AnalysisReport> {
    let cancel = CancellationToken::new();

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling analysis");
                cancel.cancel();
            }
        })
    };

    let result =
        tokio::task::spawn_blocking(move || analyzer.analyze_with_cancel(&readings, &cancel)).await;
    interrupt.abort();

    result?.map_err(app_error)
}

pub async fn analyze(app: &App, csv: &Path, opts: AnalyzeOptions, json: bool) -> Result<()> {
    let params = params_from(app, opts.window, opts.threshold);
    params.validate().map_err(app_error)?;

    let strategy = if opts.sequential {
        ExecutionStrategy::Sequential
    } else {
        ExecutionStrategy::with_workers(opts.workers.unwrap_or(app.config().analysis.workers))
    };

    let mut readings = load_readings(csv)?;
    if let Some(city) = &opts.city {
        readings.retain(|r| &r.city == city);
        if readings.is_empty() {
            return Err(AppError::Data(DataError::NotFound(city.clone())).into());
        }
    }

    let report = run_analysis(Analyzer::new(params, strategy), readings).await?;

    if json {
        return print_json(&report);
    }

    println!(
        "\nTemperature analysis (window {}, threshold {}σ)",
        params.window, params.threshold_std
    );
    println!(
        "{:<20} | {:>8} | {:>9} | {:>9} | {:>9} | {:>9}",
        "City", "Readings", "Mean", "Min", "Max", "Anomalies"
    );
    println!("{:-<20}-|-{:-<8}-|-{:-<9}-|-{:-<9}-|-{:-<9}-|-{:-<9}", "", "", "", "", "", "");
    for (city, analysis) in &report.cities {
        let s = &analysis.summary;
        println!(
            "{:<20} | {:>8} | {:>9} | {:>9} | {:>9} | {:>9}",
            city,
            analysis.series.total_count,
            format_temp(s.mean),
            format_temp(s.min),
            format_temp(s.max),
            s.anomaly_count
        );
    }

    for (city, analysis) in &report.cities {
        print_anomalies(city, analysis);
    }

    println!(
        "\n{} anomalies in {} readings",
        report.total_anomalies(),
        report.total_readings()
    );
    Ok(())
}

fn print_anomalies(city: &str, analysis: &CityAnalysis) {
    if analysis.series.anomaly_count == 0 {
        return;
    }
    println!("\nAnomalies in {}:", city);
    for point in analysis.series.anomalies() {
        let (Some(ma), Some(residual)) = (point.moving_average, point.residual()) else {
            continue;
        };
        println!(
            "  {}  {:>9}  (trend {}, residual {:+.1})",
            point.reading.timestamp,
            format_temp(point.reading.temperature),
            format_temp(ma),
            residual
        );
    }
}

pub fn baseline(
    app: &App,
    csv: &Path,
    city: &str,
    season: Option<Season>,
    json: bool,
) -> Result<()> {
    let params = params_from(app, None, None);
    let readings = load_readings(csv)?;
    let analysis = analyze_city(city, &readings, &params).map_err(app_error)?;
    let baselines = &analysis.baselines;

    let seasons: Vec<Season> = match season {
        Some(s) => vec![s],
        None => baselines.iter().map(|(s, _)| s).collect(),
    };

    if json {
        let entries: Vec<_> = seasons
            .iter()
            .map(|s| {
                serde_json::json!({
                    "season": s,
                    "baseline": baselines.get(*s),
                    "normal_range": baselines.normal_range(*s),
                })
            })
            .collect();
        return print_json(&serde_json::json!({ "city": city, "seasons": entries }));
    }

    println!("\nSeasonal baselines for {}", city);
    println!(
        "{:<8} | {:>9} | {:>6} | {:>6} | Normal range",
        "Season", "Mean", "Std", "Count"
    );
    println!("{:-<8}-|-{:-<9}-|-{:-<6}-|-{:-<6}-|-{:-<22}", "", "", "", "", "");
    for s in seasons {
        match baselines.get(s) {
            Some(b) => {
                let range = b.normal_range();
                println!(
                    "{:<8} | {:>9} | {:>6.2} | {:>6} | {} .. {}",
                    s,
                    format_temp(b.mean_temp),
                    b.std_temp,
                    b.count,
                    format_temp(range.low),
                    format_temp(range.high)
                );
            }
            None => println!("{:<8} | no readings", s),
        }
    }
    Ok(())
}
