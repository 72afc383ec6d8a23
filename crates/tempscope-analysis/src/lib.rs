//! Temperature analysis for tempscope
//!
//! Turns per-city daily readings into a smoothed trend, residual-based
//! anomaly flags and per-season baselines. Everything here is a pure
//! function of its input; loading the readings (see [`ingest`]) and fetching
//! live observations live at the edges.

pub mod anomaly;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod seasonal;
pub mod smoothing;
pub mod stats;
pub mod types;

pub use error::{AnalysisError, IngestError};
pub use ingest::{load_csv, read_csv, DatasetSummary};
pub use pipeline::{analyze_city, AnalysisParams, Analyzer, ExecutionStrategy};
pub use types::*;
