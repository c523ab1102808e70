//! Integration tests for the response envelopes: `{ items, next_cursor }`
//! for lists, `{ error: { message, code } }` for failures, with the HTTP
//! status carried by the error kind.
//!
//! Run with: `cargo test --test envelope_test`
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use launchwork_backend::error::ApiError;
use launchwork_backend::models::ratings::CreateRating;
use launchwork_backend::pagination::{Cursor, Page};

async fn body_json(err: &ApiError) -> serde_json::Value {
    let resp = err.error_response();
    let bytes = to_bytes(resp.into_body()).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[actix_web::test]
async fn error_envelope_carries_code_and_message() {
    let body = body_json(&ApiError::AlreadyContracted).await;
    assert_eq!(body["error"]["code"], "already_contracted");
    assert_eq!(body["error"]["message"], "this gig already has a contract");
    assert!(body["error"]["details"].is_null());
}

#[actix_web::test]
async fn store_errors_never_leak_internals() {
    let err = ApiError::Db(sea_orm::DbErr::Custom(
        "connection refused at 10.0.0.3:5432".to_string(),
    ));
    assert_eq!(err.status_code().as_u16(), 500);

    let body = body_json(&err).await;
    assert_eq!(body["error"]["code"], "internal_error");
    assert_eq!(body["error"]["message"], "internal server error");
}

#[actix_web::test]
async fn validation_failures_are_field_addressable() {
    let bad = CreateRating {
        score: 9,
        review_text: None,
    };
    let err = ApiError::Validation(bad.validate().unwrap_err());
    assert_eq!(err.status_code().as_u16(), 400);

    let body = body_json(&err).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(
        body["error"]["details"]["score"].is_array(),
        "expected a per-field entry for 'score', got: {body}"
    );
}

#[actix_web::test]
async fn invalid_cursor_is_a_client_error() {
    let err = Cursor::decode("not-a-cursor").unwrap_err();
    assert_eq!(err.status_code().as_u16(), 400);

    let body = body_json(&err).await;
    assert_eq!(body["error"]["code"], "invalid_cursor");
}

#[test]
fn list_envelope_has_items_and_next_cursor() {
    let rows = vec![
        Cursor::new(Utc::now(), Uuid::new_v4()),
        Cursor::new(Utc::now(), Uuid::new_v4()),
    ];

    // Short fetch: end of data.
    let page = Page::from_rows(rows.clone(), 5, |c| *c).map(|c| c.encode());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert!(json["next_cursor"].is_null());

    // Overfull fetch: trimmed, cursor present.
    let page = Page::from_rows(rows, 1, |c| *c).map(|c| c.encode());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert!(json["next_cursor"].is_string());
}
