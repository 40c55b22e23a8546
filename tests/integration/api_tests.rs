//! API integration tests
//!
//! These run against a live server backed by a scratch database.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000/api/v1";

/// Create a book with a unique id and return that id
async fn create_book(client: &Client, stock: i32) -> String {
    let book_id = format!("it-{}", Uuid::new_v4());
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "publicationYear": 1969,
            "publisher": "Ace",
            "price": 20.0,
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    book_id
}

/// Create a user with a unique email and return that email
async fn create_user(client: &Client, balance: f64) -> String {
    let email = format!("reader-{}@example.com", Uuid::new_v4().simple());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "email": email, "balance": balance }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    email
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let book_id = create_book(&client, 2).await;

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["bookId"], book_id.as_str());
    assert_eq!(body["stock"], 2);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_rejected() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "title": "Duplicate",
            "author": "Nobody",
            "publicationYear": 2000,
            "price": 1.0
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_search_books_by_author() {
    let client = Client::new();
    create_book(&client, 1).await;

    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .query(&[("author", "Ursula K. Le Guin"), ("limit", "5")])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["totalRecords"].as_i64().unwrap_or(0) >= 1);
}

#[tokio::test]
#[ignore]
async fn test_reserve_and_finish() {
    let client = Client::new();
    let book_id = create_book(&client, 3).await;
    let email = create_user(&client, 10.0).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "userEmail": email,
            "bookCount": 2,
            "returnDate": (Utc::now() + Duration::days(7)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["stock"], 1);

    let body: Value = client
        .get(format!("{}/reservations/book/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let reservation_id = body["reservations"][0]["id"]
        .as_str()
        .expect("No reservation id")
        .to_string();

    // Book with an active reservation cannot be deleted
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .patch(format!("{}/reservations/finish/{}", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Second finish is rejected
    let response = client
        .patch(format!("{}/reservations/finish/{}", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_reservation_insufficient_balance() {
    let client = Client::new();
    let book_id = create_book(&client, 3).await;
    let email = create_user(&client, 1.0).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "userEmail": email,
            "bookCount": 1,
            "returnDate": (Utc::now() + Duration::days(3)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_update_balance_unknown_user() {
    let client = Client::new();

    let response = client
        .patch(format!("{}/users/nobody-{}@example.com/balance", BASE_URL, Uuid::new_v4().simple()))
        .json(&json!({ "balance": 5.0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_reservations_for_unknown_book() {
    let client = Client::new();

    let response = client
        .get(format!("{}/reservations/book/missing-{}", BASE_URL, Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
