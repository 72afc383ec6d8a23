//! Food energy lookup backed by the Open Food Facts search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempscope_core::{with_retry, RetryPolicy, TrackerConfig};
use tracing::instrument;

use crate::error::TrackerError;

const DEFAULT_API_URL: &str = "https://world.openfoodfacts.org";
const SEARCH_PATH: &str = "/cgi/search.pl";
const KJ_PER_KCAL: f64 = 4.184;

/// Energy density of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodInfo {
    pub name: String,
    pub kcal_per_100g: f64,
}

impl FoodInfo {
    /// Energy of `grams` of this product, kcal
    pub fn calories_for(&self, grams: f64) -> f64 {
        self.kcal_per_100g * grams / 100.0
    }
}

/// Anything that can resolve a product name to its energy density.
///
/// `Ok(None)` means the product is unknown or has no energy value.
#[async_trait]
pub trait FoodLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<FoodInfo>, TrackerError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    product_name: Option<String>,
    product_name_en: Option<String>,
    product_name_ru: Option<String>,
    #[serde(default)]
    nutriments: serde_json::Map<String, Value>,
}

/// Read a nutriment that may be encoded as a number or a numeric string.
fn nutriment(nutriments: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Product {
    /// kcal/100g, falling back to the generic kcal field, then kJ converted.
    /// Zero values count as missing.
    fn kcal_per_100g(&self) -> f64 {
        let present = |v: Option<f64>| v.filter(|x| *x != 0.0);
        present(nutriment(&self.nutriments, "energy-kcal_100g"))
            .or_else(|| present(nutriment(&self.nutriments, "energy-kcal")))
            .unwrap_or_else(|| nutriment(&self.nutriments, "energy").unwrap_or(0.0) / KJ_PER_KCAL)
    }

    fn display_name(&self, query: &str) -> String {
        non_empty(&self.product_name)
            .or_else(|| non_empty(&self.product_name_en))
            .or_else(|| non_empty(&self.product_name_ru))
            .unwrap_or(query)
            .to_string()
    }

    fn into_food_info(self, query: &str) -> Option<FoodInfo> {
        let kcal = self.kcal_per_100g();
        if !kcal.is_finite() || kcal <= 0.0 {
            return None;
        }
        Some(FoodInfo {
            name: self.display_name(query),
            kcal_per_100g: kcal,
        })
    }
}

/// Open Food Facts search client
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenFoodFactsClient {
    pub fn new() -> Result<Self, TrackerError> {
        Self::with_options(DEFAULT_API_URL, Duration::from_secs(10), RetryPolicy::default())
    }

    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tempscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::Lookup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_options(
            &config.food_api_url,
            Duration::from_secs(config.timeout_secs),
            config.retry_policy(),
        )
    }
}

#[async_trait]
impl FoodLookup for OpenFoodFactsClient {
    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<Option<FoodInfo>, TrackerError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let params = [
            ("action", "process"),
            ("search_terms", query),
            ("json", "true"),
        ];

        let response = with_retry(&self.retry, || {
            self.client.get(&url).query(&params).send()
        })
        .await
        .map_err(|e| TrackerError::Lookup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, query, "Food search returned an error status");
            return Err(TrackerError::Lookup(format!("food search returned {}", status)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| TrackerError::Lookup(format!("invalid search response: {}", e)))?;

        let found = body
            .products
            .into_iter()
            .next()
            .and_then(|p| p.into_food_info(query));

        tracing::debug!(query, found = found.is_some(), "Food search complete");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(json: serde_json::Value) -> Product {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_kcal_prefers_per_100g() {
        let p = product(serde_json::json!({
            "product_name": "Banana",
            "nutriments": { "energy-kcal_100g": 89, "energy-kcal": 120, "energy": 372 }
        }));
        assert_eq!(p.kcal_per_100g(), 89.0);
    }

    #[test]
    fn test_kcal_falls_back_to_generic_then_kj() {
        let p = product(serde_json::json!({
            "nutriments": { "energy-kcal": 52.0 }
        }));
        assert_eq!(p.kcal_per_100g(), 52.0);

        let p = product(serde_json::json!({
            "nutriments": { "energy-kcal_100g": 0, "energy": 418.4 }
        }));
        assert!((p.kcal_per_100g() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_kcal_accepts_numeric_strings() {
        let p = product(serde_json::json!({
            "nutriments": { "energy-kcal_100g": "250.5" }
        }));
        assert_eq!(p.kcal_per_100g(), 250.5);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let p = product(serde_json::json!({
            "product_name": "",
            "product_name_en": "Apple",
            "nutriments": {}
        }));
        assert_eq!(p.display_name("яблоко"), "Apple");

        let p = product(serde_json::json!({ "product_name_ru": "Яблоко" }));
        assert_eq!(p.display_name("apple"), "Яблоко");

        let p = product(serde_json::json!({}));
        assert_eq!(p.display_name("apple"), "apple");
    }

    #[test]
    fn test_zero_energy_is_not_found() {
        let p = product(serde_json::json!({ "product_name": "Water", "nutriments": {} }));
        assert!(p.into_food_info("water").is_none());
    }

    #[test]
    fn test_calories_for_amount() {
        let info = FoodInfo {
            name: "Rice".into(),
            kcal_per_100g: 130.0,
        };
        assert!((info.calories_for(250.0) - 325.0).abs() < 1e-9);
    }
}
