//! Tests for farmer accounts

mod common;

use common::{create_test_server, create_user, MISSING_ID};
use serde_json::{json, Value};

/// Test: registering a user and reading it back without the password
#[tokio::test]
async fn test_create_and_get_user() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/user")
        .json(&json!({
            "firstName": "Sita",
            "lastName": "Sharma",
            "email": "sita@example.com",
            "address": "Chitwan",
            "phoneNumber": 9800000000u64,
            "farmSize": 2,
            "password": "secret123"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "User created successfully.");

    let users: Value = server.get("/api/users").await.json();
    let id = users[0]["_id"].as_str().unwrap();

    let user: Value = server.get(&format!("/api/user/{}", id)).await.json();
    assert_eq!(user["firstName"], "Sita");
    assert_eq!(user["role"], "User");
    assert_eq!(user["status"], "Active");
    assert_eq!(user["phoneNumber"], "9800000000");
    assert_eq!(user["farmSize"], "2");
    assert!(user.get("password").is_none());
}

/// Test: required fields
#[tokio::test]
async fn test_create_user_requires_fields() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/user")
        .json(&json!({ "firstName": "Sita", "email": "sita@example.com" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/api/user")
        .json(&json!({
            "firstName": "Sita",
            "lastName": "Sharma",
            "email": "sita@example.com",
            "address": "Chitwan",
            "role": "Farmer"
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: an email can only be registered once
#[tokio::test]
async fn test_duplicate_user_email() {
    let (server, _) = create_test_server();
    create_user(&server, "sita@example.com").await;

    let response = server
        .post("/api/user")
        .json(&json!({
            "firstName": "Other",
            "lastName": "Person",
            "email": "sita@example.com",
            "address": "Kathmandu"
        }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "User already exists.");
}

/// Test: listing an empty user collection is a 404
#[tokio::test]
async fn test_list_users_empty() {
    let (server, _) = create_test_server();

    let response = server.get("/api/users").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "User data not found.");
}

/// Test: unknown and malformed user ids
#[tokio::test]
async fn test_get_user_errors() {
    let (server, _) = create_test_server();

    let response = server.get(&format!("/api/user/{}", MISSING_ID)).await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "User not found.");

    let response = server.get("/api/user/123").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid user ID format");
}

/// Test: admins can suspend a user
#[tokio::test]
async fn test_update_user_status() {
    let (server, _) = create_test_server();
    let id = create_user(&server, "sita@example.com").await;

    let response = server
        .put(&format!("/api/update/user/{}", id))
        .json(&json!({ "status": "Suspended", "farmLocation": "Bharatpur" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "User Updated successfully.");

    let user: Value = server.get(&format!("/api/user/{}", id)).await.json();
    assert_eq!(user["status"], "Suspended");
    assert_eq!(user["farmLocation"], "Bharatpur");
    assert_eq!(user["firstName"], "Sita");

    let response = server
        .put(&format!("/api/update/user/{}", id))
        .json(&json!({ "status": "Banned" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .put(&format!("/api/update/user/{}", MISSING_ID))
        .json(&json!({ "status": "Inactive" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Test: deleting a user is physical
#[tokio::test]
async fn test_delete_user() {
    let (server, _) = create_test_server();
    let id = create_user(&server, "sita@example.com").await;

    let response = server.delete(&format!("/api/delete/user/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "User deleted successfully.");

    let response = server.get(&format!("/api/user/{}", id)).await;
    assert_eq!(response.status_code(), 404);

    let response = server.delete(&format!("/api/delete/user/{}", id)).await;
    assert_eq!(response.status_code(), 404);
}

/// Test: farmer login
#[tokio::test]
async fn test_user_login() {
    let (server, _) = create_test_server();
    let id = create_user(&server, "sita@example.com").await;

    let response = server
        .post("/api/login")
        .json(&json!({ "email": "sita@example.com", "password": "secret123" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["lastName"], "Sharma");
    assert_eq!(body["user"]["role"], "User");
    assert!(body.get("token").is_none());

    let response = server
        .post("/api/login")
        .json(&json!({ "email": "sita@example.com", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .post("/api/login")
        .json(&json!({ "password": "secret123" }))
        .await;
    assert_eq!(response.status_code(), 400);
}
