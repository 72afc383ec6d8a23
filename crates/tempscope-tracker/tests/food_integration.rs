//! Integration tests for OpenFoodFactsClient and the tracker using wiremock.

use std::time::Duration;

use tempscope_core::RetryPolicy;
use tempscope_tracker::{
    FoodLookup, Gender, OpenFoodFactsClient, ProfileInput, SqliteTrackerStore, Tracker,
    TrackerError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenFoodFactsClient {
    OpenFoodFactsClient::with_options(&server.uri(), Duration::from_secs(2), RetryPolicy::none())
        .unwrap()
}

async fn mount_search(server: &MockServer, terms: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .and(query_param("action", "process"))
        .and(query_param("search_terms", terms))
        .and(query_param("json", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lookup_takes_first_product() {
    let mock_server = MockServer::start().await;
    mount_search(
        &mock_server,
        "banana",
        serde_json::json!({
            "count": 2,
            "products": [
                { "product_name": "Banana", "nutriments": { "energy-kcal_100g": 89 } },
                { "product_name": "Banana chips", "nutriments": { "energy-kcal_100g": 519 } }
            ]
        }),
    )
    .await;

    let info = client_for(&mock_server).lookup("banana").await.unwrap().unwrap();
    assert_eq!(info.name, "Banana");
    assert_eq!(info.kcal_per_100g, 89.0);
}

#[tokio::test]
async fn test_lookup_converts_kilojoules() {
    let mock_server = MockServer::start().await;
    mount_search(
        &mock_server,
        "oats",
        serde_json::json!({
            "products": [{ "product_name_en": "Oats", "nutriments": { "energy": 1569.0 } }]
        }),
    )
    .await;

    let info = client_for(&mock_server).lookup("oats").await.unwrap().unwrap();
    assert_eq!(info.name, "Oats");
    assert!((info.kcal_per_100g - 1569.0 / 4.184).abs() < 1e-9);
}

#[tokio::test]
async fn test_lookup_no_products() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "zzz", serde_json::json!({ "count": 0, "products": [] })).await;

    assert!(client_for(&mock_server).lookup("zzz").await.unwrap().is_none());
}

#[tokio::test]
async fn test_lookup_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).lookup("banana").await;
    assert!(matches!(result, Err(TrackerError::Lookup(_))));
}

#[tokio::test]
async fn test_tracker_logs_food_from_server() {
    let mock_server = MockServer::start().await;
    mount_search(
        &mock_server,
        "rice",
        serde_json::json!({
            "products": [{ "product_name": "White rice", "nutriments": { "energy-kcal": 130 } }]
        }),
    )
    .await;

    let tracker = Tracker::new(SqliteTrackerStore::in_memory().unwrap());
    tracker
        .set_profile(
            42,
            ProfileInput {
                weight_kg: 60.0,
                height_cm: 165.0,
                age: 25,
                gender: Gender::Female,
                activity_minutes: 0,
                city: None,
            },
        )
        .unwrap();

    let logged = tracker
        .log_food(42, "rice", 200.0, &client_for(&mock_server))
        .await
        .unwrap();
    assert_eq!(logged.display_name, "White rice");
    assert!((logged.entry.calories - 260.0).abs() < 1e-9);

    let progress = tracker.progress_today(42).unwrap();
    assert!((progress.calories_consumed - 260.0).abs() < 1e-9);
    assert_eq!(progress.calorie_goal, 1614.3);
}
