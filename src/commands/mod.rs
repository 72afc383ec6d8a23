//! Command handlers for the tempscope CLI.

pub mod analysis;
pub mod tracker;
pub mod weather;

use anyhow::Result;
use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn format_temp(value: f64) -> String {
    format!("{:+.1}°C", value)
}
