//! Tests for the SQLite-backed stores

mod common;

use common::{create_crop, create_prediction, create_sqlite_test_server, create_user};
use cropadvisor_core::document::create;
use cropadvisor_core::{Admin, ObjectId, Prediction, SelectedCrop, Timeline};
use cropadvisor_server::store::{AccountStore, CatalogStore, PredictionStore, SqliteStore};
use cropadvisor_server::ApiError;
use serde_json::{json, Value};
use tempfile::TempDir;

fn create_test_store() -> (SqliteStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    (store, dir) // Return dir to keep it alive
}

fn prediction_for(user_id: ObjectId) -> Prediction {
    create(json!({
        "userId": user_id,
        "inputData": { "soilType": "Clay" },
        "recommendedCrops": [{ "cropName": "Rice", "scientificName": "Oryza sativa" }]
    }))
    .unwrap()
}

/// Test: documents survive reopening the database file
#[test]
fn test_reopen_keeps_documents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    let path = path.to_str().unwrap();

    let prediction = prediction_for(ObjectId::new());
    {
        let store = SqliteStore::open(path).unwrap();
        store.create_prediction(&prediction).unwrap();
    }

    let store = SqliteStore::open(path).unwrap();
    let loaded = store.get_prediction(prediction.id).unwrap();
    assert_eq!(loaded, Some(prediction));
}

/// Test: predictions list in creation order and filter by user
#[test]
fn test_predictions_by_user() {
    let (store, _dir) = create_test_store();
    let sita = ObjectId::new();
    let hari = ObjectId::new();

    let first = prediction_for(sita);
    let second = prediction_for(hari);
    let third = prediction_for(sita);
    for p in [&first, &second, &third] {
        store.create_prediction(p).unwrap();
    }

    let all: Vec<_> = store.list_predictions().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(all, [first.id, second.id, third.id]);

    let mine: Vec<_> = store
        .list_predictions_by_user(sita)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(mine, [first.id, third.id]);

    assert!(store.delete_prediction(second.id).unwrap());
    assert!(!store.delete_prediction(second.id).unwrap());
    assert_eq!(store.list_predictions().unwrap().len(), 2);
}

/// Test: latest selection and cascading removal
#[test]
fn test_selected_crops() {
    let (store, _dir) = create_test_store();
    let prediction = prediction_for(ObjectId::new());
    store.create_prediction(&prediction).unwrap();

    let rice = SelectedCrop::new(prediction.id, "Rice", "Oryza sativa");
    let maize = SelectedCrop::new(prediction.id, "Maize", "Zea mays");
    store.create_selected_crop(&rice).unwrap();
    store.create_selected_crop(&maize).unwrap();

    let latest = store.latest_selected_crop(prediction.id).unwrap().unwrap();
    assert_eq!(latest.id, maize.id);
    assert_eq!(store.list_selected_crops().unwrap()[0].id, maize.id);

    assert_eq!(store.delete_selected_crops_for_prediction(prediction.id).unwrap(), 2);
    assert!(store.latest_selected_crop(prediction.id).unwrap().is_none());
}

/// Test: admin emails are unique in the table
#[test]
fn test_admin_email_unique() {
    let (store, _dir) = create_test_store();

    store
        .create_admin(&Admin::new(None, "ram@example.com", "pw"))
        .unwrap();
    let result = store.create_admin(&Admin::new(None, "RAM@example.com", "pw"));
    assert!(matches!(result, Err(ApiError::AdminAlreadyExists)));

    let admin = store.find_admin_by_email("ram@example.com").unwrap().unwrap();
    assert_eq!(admin.name, "Admin User");
}

/// Test: catalog lookups by scientific name ignore case
#[test]
fn test_timeline_lookup_ignores_case() {
    let (store, _dir) = create_test_store();
    let timeline: Timeline = create(json!({ "scientificName": "Oryza sativa", "tasks": [] })).unwrap();
    store.create_timeline(&timeline).unwrap();

    let found = store.find_timeline_by_scientific_name("ORYZA SATIVA").unwrap();
    assert_eq!(found.map(|t| t.id), Some(timeline.id));
    assert!(store.find_timeline_by_scientific_name("Zea mays").unwrap().is_none());
}

/// Test: the HTTP API works the same over SQLite
#[tokio::test]
async fn test_api_over_sqlite() {
    let (server, _dir) = create_sqlite_test_server();
    let user_id = create_user(&server, "sita@example.com").await;
    create_crop(&server, "Rice", "Oryza sativa").await;
    let prediction = create_prediction(&server, &user_id).await;

    let listed: Value = server.get("/api/predictions").await.json();
    assert_eq!(listed[0]["_id"], prediction["_id"]);
    assert_eq!(listed[0]["userId"]["email"], "sita@example.com");

    let details: Value = server
        .get(&format!(
            "/api/predictions/{}/crops/Oryza-sativa",
            prediction["_id"].as_str().unwrap()
        ))
        .await
        .json();
    assert_eq!(details["crop"]["cropName"], "Rice");
}
