use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tempscope_analysis::Season;
use tempscope_core::{App, AppError};

mod commands;
mod error_mapping;

#[derive(Parser)]
#[command(
    name = "tempscope",
    about = "Historical temperature analysis, live seasonal checks and a daily health tracker",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true, env = "TEMPSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON output for machine parsing
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smooth, flag anomalies and compute seasonal baselines for a CSV dataset
    Analyze {
        /// CSV with columns city, timestamp, temperature, season
        csv: PathBuf,

        /// Moving-average window in readings
        #[arg(long)]
        window: Option<usize>,

        /// Anomaly threshold in standard deviations
        #[arg(long)]
        threshold: Option<f64>,

        /// Worker threads (0 = one per CPU)
        #[arg(long, conflicts_with = "sequential")]
        workers: Option<usize>,

        /// Analyse cities one after another on a single thread
        #[arg(long)]
        sequential: bool,

        /// Only report this city
        #[arg(long)]
        city: Option<String>,
    },

    /// Show seasonal baselines and normal ranges for a city
    Baseline {
        csv: PathBuf,

        #[arg(long)]
        city: String,

        /// Only this season
        #[arg(long)]
        season: Option<Season>,
    },

    /// Compare current temperatures with the seasonal norm (needs an OpenWeatherMap key)
    Current {
        csv: PathBuf,

        /// City to check; repeat for several cities
        #[arg(long = "city", required = true)]
        cities: Vec<String>,

        /// Season to compare against (defaults to the current season)
        #[arg(long)]
        season: Option<Season>,
    },

    /// Manage the tracker profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Log water, food or a workout
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Show water and calorie progress for a day
    Progress {
        #[arg(long)]
        user: i64,

        /// Day in YYYY-MM-DD (UTC), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or replace a profile
    Set {
        #[arg(long)]
        user: i64,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        #[arg(long)]
        age: u32,

        /// male/female (m/f also accepted)
        #[arg(long)]
        gender: String,

        /// Typical daily activity in minutes
        #[arg(long, default_value = "0")]
        activity: u32,

        #[arg(long)]
        city: Option<String>,
    },

    /// Show a profile and its daily goals
    Show {
        #[arg(long)]
        user: i64,
    },
}

#[derive(Subcommand)]
enum LogAction {
    /// Log drunk water in ml
    Water {
        #[arg(long)]
        user: i64,

        amount: f64,
    },

    /// Log eaten food; energy is looked up on Open Food Facts
    Food {
        #[arg(long)]
        user: i64,

        /// Eaten amount in grams
        #[arg(long)]
        grams: f64,

        /// Product name
        #[arg(required = true, num_args = 1..)]
        product: Vec<String>,
    },

    /// Log a workout
    Workout {
        #[arg(long)]
        user: i64,

        /// Duration in minutes
        #[arg(long)]
        minutes: u32,

        /// Workout type, e.g. running, yoga, cycling
        #[arg(required = true, num_args = 1..)]
        kind: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = tempscope_core::init() {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut app = App::load(cli.config.as_deref())?;
    app.initialize()?;

    let json = cli.json;
    let result = match cli.command {
        Commands::Analyze {
            csv,
            window,
            threshold,
            workers,
            sequential,
            city,
        } => {
            let opts = commands::analysis::AnalyzeOptions {
                window,
                threshold,
                workers,
                sequential,
                city,
            };
            commands::analysis::analyze(&app, &csv, opts, json).await
        }
        Commands::Baseline { csv, city, season } => {
            commands::analysis::baseline(&app, &csv, &city, season, json)
        }
        Commands::Current {
            csv,
            cities,
            season,
        } => commands::weather::current(&app, &csv, &cities, season, json).await,
        Commands::Profile { action } => match action {
            ProfileAction::Set {
                user,
                weight,
                height,
                age,
                gender,
                activity,
                city,
            } => {
                let args = commands::tracker::ProfileArgs {
                    weight,
                    height,
                    age,
                    gender,
                    activity,
                    city,
                };
                commands::tracker::set_profile(&app, user, args, json)
            }
            ProfileAction::Show { user } => commands::tracker::show_profile(&app, user, json),
        },
        Commands::Log { action } => match action {
            LogAction::Water { user, amount } => {
                commands::tracker::log_water(&app, user, amount, json)
            }
            LogAction::Food {
                user,
                grams,
                product,
            } => commands::tracker::log_food(&app, user, &product.join(" "), grams, json).await,
            LogAction::Workout {
                user,
                minutes,
                kind,
            } => commands::tracker::log_workout(&app, user, &kind.join(" "), minutes, json),
        },
        Commands::Progress { user, date } => commands::tracker::progress(&app, user, date, json),
    };

    finish(result, app.shutdown())
}

/// The command's own error wins; a shutdown failure only surfaces when the command succeeded.
fn finish(result: Result<()>, shutdown: Result<()>) -> Result<()> {
    match (result, shutdown) {
        (Err(e), Err(shutdown_err)) => {
            tracing::warn!(error = %shutdown_err, "Shutdown failed after command error");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), shutdown) => shutdown,
    }
}

/// Print a user-facing message, plus the technical chain for debugging
fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<AppError>() {
        Some(app_error) => {
            tracing::error!(error = %app_error, "Command failed");
            eprintln!("Error: {}", app_error.user_message());
            eprintln!("  ({})", app_error);
        }
        None => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
        }
    }
}
