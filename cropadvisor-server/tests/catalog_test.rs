//! Tests for crops, timelines and the crop detail view

mod common;

use common::{create_crop, create_prediction, create_test_server, MISSING_ID};
use serde_json::{json, Value};

async fn crop_id(server: &axum_test::TestServer, scientific_name: &str) -> String {
    let crops: Value = server.get("/api/crops").await.json();
    crops
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["scientificName"] == scientific_name)
        .and_then(|c| c["_id"].as_str())
        .expect("Crop should be listed")
        .to_string()
}

/// Test: crops are created and fetched by id
#[tokio::test]
async fn test_create_and_get_crop() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;

    let id = crop_id(&server, "Oryza sativa").await;
    let crop: Value = server.get(&format!("/api/crop/{}", id)).await.json();
    assert_eq!(crop["cropName"], "Rice");
    assert_eq!(crop["season"], "Monsoon");
    assert_eq!(crop["marketValue"], 45.0);
}

/// Test: creation times come from the server
#[tokio::test]
async fn test_created_at_ignored_on_create() {
    let (server, _) = create_test_server();

    server
        .post("/api/crop")
        .json(&json!({
            "cropName": "Rice",
            "scientificName": "Oryza sativa",
            "createdAt": "2001-01-01T00:00:00Z"
        }))
        .await;
    let id = crop_id(&server, "Oryza sativa").await;
    let crop: Value = server.get(&format!("/api/crop/{}", id)).await.json();
    assert_ne!(crop["createdAt"], "2001-01-01T00:00:00Z");
    assert!(!crop["createdAt"].as_str().unwrap().starts_with("2001"));

    let timeline: Value = server
        .post("/api/timeline")
        .json(&json!({
            "scientificName": "Oryza sativa",
            "tasks": [],
            "createdAt": "2001-01-01T00:00:00Z"
        }))
        .await
        .json();
    assert!(!timeline["createdAt"].as_str().unwrap().starts_with("2001"));

    let response = server
        .put(&format!("/api/update/crop/{}", id))
        .json(&json!({ "createdAt": "2001-01-01T00:00:00Z" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let after: Value = server.get(&format!("/api/crop/{}", id)).await.json();
    assert_eq!(after["createdAt"], crop["createdAt"]);
}

/// Test: scientific names are unique, whatever the case
#[tokio::test]
async fn test_duplicate_crop() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;

    let response = server
        .post("/api/crop")
        .json(&json!({ "cropName": "Paddy", "scientificName": "oryza SATIVA" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Crop already exists.");
}

/// Test: an empty catalog lists as 404
#[tokio::test]
async fn test_list_crops_empty() {
    let (server, _) = create_test_server();

    let response = server.get("/api/crops").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Crop data not found.");
}

/// Test: update and delete a crop
#[tokio::test]
async fn test_update_and_delete_crop() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;
    create_crop(&server, "Maize", "Zea mays").await;
    let id = crop_id(&server, "Oryza sativa").await;

    let response = server
        .put(&format!("/api/update/crop/{}", id))
        .json(&json!({ "marketValue": "52.5", "tips": "Keep fields flooded" }))
        .await;
    // marketValue is numeric
    assert_eq!(response.status_code(), 400);

    let response = server
        .put(&format!("/api/update/crop/{}", id))
        .json(&json!({ "marketValue": 52.5, "tips": "Keep fields flooded" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Crop Updated successfully.");

    let crop: Value = server.get(&format!("/api/crop/{}", id)).await.json();
    assert_eq!(crop["marketValue"], 52.5);
    assert_eq!(crop["tips"], "Keep fields flooded");

    let response = server
        .put(&format!("/api/update/crop/{}", id))
        .json(&json!({ "scientificName": "Zea mays" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server.delete(&format!("/api/delete/crop/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Crop deleted successfully.");

    let response = server.get(&format!("/api/crop/{}", id)).await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Crop not found.");

    let response = server.delete(&format!("/api/delete/crop/{}", MISSING_ID)).await;
    assert_eq!(response.status_code(), 404);
}

/// Test: timelines need a crop and are unique per crop
#[tokio::test]
async fn test_create_timeline_checks() {
    let (server, _) = create_test_server();
    let timeline = json!({
        "scientificName": "Oryza sativa",
        "tasks": [{ "day": 1, "title": "Sow", "details": "Sow pre-soaked seed" }]
    });

    let response = server.post("/api/timeline").json(&timeline).await;
    assert_eq!(response.status_code(), 404);

    create_crop(&server, "Rice", "Oryza sativa").await;
    let response = server.post("/api/timeline").json(&timeline).await;
    assert_eq!(response.status_code(), 201);

    let response = server.post("/api/timeline").json(&timeline).await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Timeline already exists.");
}

/// Test: tasks are stored ordered by day
#[tokio::test]
async fn test_timeline_tasks_sorted() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;

    let response = server
        .post("/api/timeline")
        .json(&json!({
            "scientificName": "Oryza sativa",
            "tasks": [
                { "day": 45, "title": "Top dress", "details": "Apply urea" },
                { "day": 1, "title": "Sow", "details": "Sow nursery" },
                { "day": 21, "title": "Transplant", "details": "Move seedlings" }
            ]
        }))
        .await;
    let created: Value = response.json();
    let days: Vec<u64> = created["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["day"].as_u64().unwrap())
        .collect();
    assert_eq!(days, [1, 21, 45]);

    let id = created["_id"].as_str().unwrap();
    let fetched: Value = server.get(&format!("/api/timeline/{}", id)).await.json();
    assert_eq!(fetched["tasks"], created["tasks"]);
}

/// Test: update, list and delete timelines
#[tokio::test]
async fn test_update_and_delete_timeline() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;

    let created: Value = server
        .post("/api/timeline")
        .json(&json!({ "scientificName": "Oryza sativa", "tasks": [] }))
        .await
        .json();
    let id = created["_id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/update/timeline/{}", id))
        .json(&json!({
            "tasks": [
                { "day": 10, "title": "Weed", "details": "Hand weeding" },
                { "day": 2, "title": "Irrigate", "details": "Flood to 5 cm" }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: Value = response.json();
    assert_eq!(updated["tasks"][0]["title"], "Irrigate");
    assert_eq!(updated["scientificName"], "Oryza sativa");

    // Moving the timeline onto a crop that does not exist
    let response = server
        .put(&format!("/api/update/timeline/{}", id))
        .json(&json!({ "scientificName": "Zea mays" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let listed: Value = server.get("/api/timelines").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = server.delete(&format!("/api/delete/timeline/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Deleted successfully");

    let response = server.get(&format!("/api/timeline/{}", id)).await;
    assert_eq!(response.status_code(), 404);

    let listed: Value = server.get("/api/timelines").await.json();
    assert!(listed.as_array().unwrap().is_empty());
}

/// Test: the detail view joins crop, timeline and recommendation
#[tokio::test]
async fn test_crop_details() {
    let (server, _) = create_test_server();
    create_crop(&server, "Rice", "Oryza sativa").await;
    server
        .post("/api/timeline")
        .json(&json!({
            "scientificName": "Oryza sativa",
            "tasks": [{ "day": 1, "title": "Sow", "details": "Sow nursery" }]
        }))
        .await;
    let prediction = create_prediction(&server, MISSING_ID).await;
    let id = prediction["_id"].as_str().unwrap();

    let response = server
        .get(&format!("/api/predictions/{}/crops/oryza-sativa", id))
        .await;
    assert_eq!(response.status_code(), 200);

    let details: Value = response.json();
    assert_eq!(details["scientificName"], "oryza sativa");
    assert_eq!(details["crop"]["cropName"], "Rice");
    assert_eq!(details["tasks"][0]["title"], "Sow");
    assert_eq!(details["suitability"], 92.0);
    assert_eq!(details["risk"], "Low");
    assert_eq!(details["predictedAt"], prediction["predictedAt"]);
    assert_eq!(details["locationCoordinates"]["lat"], 27.5291);
}

/// Test: missing pieces fall back to placeholders
#[tokio::test]
async fn test_crop_details_unmatched() {
    let (server, _) = create_test_server();
    let prediction = create_prediction(&server, MISSING_ID).await;
    let id = prediction["_id"].as_str().unwrap();

    let details: Value = server
        .get(&format!("/api/predictions/{}/crops/zea-mays", id))
        .await
        .json();
    assert!(details["crop"].is_null());
    assert_eq!(details["tasks"], json!([]));
    assert_eq!(details["suitability"], 71.0);
    assert_eq!(details["risk"], "Medium");

    let details: Value = server
        .get(&format!("/api/predictions/{}/crops/cicer-arietinum", id))
        .await
        .json();
    assert_eq!(details["suitability"], 0.0);
    assert_eq!(details["risk"], "Unknown");

    let response = server
        .get(&format!("/api/predictions/{}/crops/zea-mays", MISSING_ID))
        .await;
    assert_eq!(response.status_code(), 404);
}
