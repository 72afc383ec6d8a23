//! Live weather for tempscope
//!
//! Fetches current temperatures from OpenWeatherMap and checks them against
//! the seasonal normal range computed by `tempscope-analysis`.

pub mod monitor;
pub mod provider;
pub mod season;
pub mod types;

pub use monitor::{check_current, fetch_many};
pub use provider::{OpenWeatherClient, TemperatureSource};
pub use season::current_season;
pub use types::*;
