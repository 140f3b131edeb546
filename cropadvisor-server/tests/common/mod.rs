//! Common test utilities for advisory server integration tests

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use cropadvisor_server::{
    routes, AppState, Config, InMemoryAccountStore, InMemoryCatalogStore,
    InMemoryPredictionStore, Recommender, SqliteStore,
};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Mock recommender that records inputs and answers with a fixed crop
#[derive(Clone)]
pub struct MockRecommender {
    /// Captured request bodies
    pub inputs: Arc<RwLock<Vec<Value>>>,
    /// Error to return instead of an answer
    pub failure: Option<String>,
}

impl MockRecommender {
    pub fn new() -> Self {
        Self {
            inputs: Arc::new(RwLock::new(Vec::new())),
            failure: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new()
        }
    }
}

impl Recommender for MockRecommender {
    fn recommend(&self, input: &Value) -> Result<Value, String> {
        self.inputs.write().unwrap().push(input.clone());
        match &self.failure {
            Some(reason) => Err(reason.clone()),
            None => Ok(json!({ "recommended_crop": "rice" })),
        }
    }
}

/// Create a test server over in-memory stores
pub fn create_test_server() -> (TestServer, MockRecommender) {
    create_test_server_with_config(Config::default())
}

/// Create a test server over in-memory stores with the given configuration
pub fn create_test_server_with_config(config: Config) -> (TestServer, MockRecommender) {
    create_test_server_with_recommender(config, MockRecommender::new())
}

pub fn create_test_server_with_recommender(
    config: Config,
    recommender: MockRecommender,
) -> (TestServer, MockRecommender) {
    let state = Arc::new(AppState::new(
        config,
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryPredictionStore::new()),
        Arc::new(recommender.clone()),
    ));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, recommender)
}

/// Create a test server backed by a SQLite file in a temporary directory
pub fn create_sqlite_test_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("advisor.db");
    let store = Arc::new(SqliteStore::open(path.to_str().unwrap()).unwrap());

    let state = Arc::new(AppState::new(
        Config::default(),
        store.clone(),
        store.clone(),
        store,
        Arc::new(MockRecommender::new()),
    ));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, dir) // Return dir to keep it alive
}

/// A syntactically valid id that no document has
pub const MISSING_ID: &str = "0123456789abcdef01234567";

/// Register a farmer and return their id
pub async fn create_user(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/user")
        .json(&json!({
            "firstName": "Sita",
            "lastName": "Sharma",
            "email": email,
            "address": "Chitwan",
            "password": "secret123"
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let users: Value = server.get("/api/users").await.json();
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .and_then(|u| u["_id"].as_str())
        .expect("User should be listed")
        .to_string()
}

/// Prediction body recommending rice and maize
pub fn prediction_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "inputData": {
            "location": "Chitwan",
            "locationCoordinates": { "lat": 27.5291, "lng": 84.3542 },
            "soilType": "Loamy",
            "soilpH": "6.5",
            "rainfall": "1200"
        },
        "recommendedCrops": [
            { "cropName": "Rice", "scientificName": "Oryza sativa", "suitability": 92, "risk": "Low" },
            { "cropName": "Maize", "scientificName": "Zea mays", "suitability": 71, "risk": "Medium" }
        ]
    })
}

/// Store a prediction and return the created document
pub async fn create_prediction(server: &TestServer, user_id: &str) -> Value {
    let response = server
        .post("/api/predictions")
        .json(&prediction_body(user_id))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    body["prediction"].clone()
}

/// Add a crop to the catalog
pub async fn create_crop(server: &TestServer, crop_name: &str, scientific_name: &str) {
    let response = server
        .post("/api/crop")
        .json(&json!({
            "cropName": crop_name,
            "scientificName": scientific_name,
            "season": "Monsoon",
            "marketValue": 45
        }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Create an admin and log in, returning the token
pub async fn admin_token(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/admin")
        .json(&json!({ "name": "Ram", "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 201);

    let response = server
        .post("/admin/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}
